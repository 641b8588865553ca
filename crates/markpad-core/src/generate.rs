//! Random credential material.
//!
//! Two generators back the subsystem: short numeric codes that are mailed to a
//! person and typed back in, and long hex tokens that live inside share links.
//! Both draw from [`rand::thread_rng`]; neither is derived from a counter or a
//! timestamp.

use rand::{Rng as _, RngCore as _};

/// Number of random bytes behind a share token (256 bits of entropy).
const SHARE_TOKEN_BYTES: usize = 32;

/// Generates a 6-digit verification code.
///
/// Uniform over `100000..=999999`, so the code is always exactly six ASCII
/// digits and never starts with a zero.
pub fn verification_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Generates an opaque share token: 32 random bytes as 64 lowercase hex chars.
pub fn share_token() -> String {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
