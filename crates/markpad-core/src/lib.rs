//! # Markpad Core
//!
//! Shared foundations for the Markpad credential subsystem.
//!
//! This crate provides the two leaf components everything else builds on:
//!
//! - [`clock`]: injected time source ([`Clock`], [`SystemClock`], [`ManualClock`])
//!   so expiry logic is deterministic and testable without wall-clock waits
//! - [`generate`]: random credential material (6-digit verification codes,
//!   64-hex-char share tokens)
//!
//! # Example
//!
//! ```ignore
//! use markpad_core::{Clock, SystemClock, generate};
//!
//! let clock = SystemClock;
//! let issued_at = clock.now();
//!
//! let code = generate::verification_code(); // "483920"
//! let token = generate::share_token();      // 64 hex chars
//! ```

pub mod clock;
pub mod generate;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
