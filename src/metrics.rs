//! Business metric helpers built on the `metrics` facade.
//!
//! The crate only records; the embedding application decides whether anything
//! listens by installing (or not installing) an exporter. Without a recorder
//! every call here is a no-op.

use metrics::counter;

use crate::verification::Purpose;

/// Track verification code lifecycle events
pub fn track_code_issued(purpose: Purpose) {
    counter!("verification_codes_issued_total", "purpose" => purpose.as_str()).increment(1);
}

pub fn track_code_rejected_active(purpose: Purpose) {
    counter!("verification_codes_rejected_total", "purpose" => purpose.as_str(), "reason" => "already_active")
        .increment(1);
}

/// Outcome is one of `ok`, `missing`, `expired`, `mismatch`.
pub fn track_code_consumed(purpose: Purpose, outcome: &'static str) {
    counter!("verification_codes_consumed_total", "purpose" => purpose.as_str(), "outcome" => outcome)
        .increment(1);
}

pub fn track_code_withdrawn(purpose: Purpose) {
    counter!("verification_codes_withdrawn_total", "purpose" => purpose.as_str()).increment(1);
}

pub fn track_codes_swept(count: usize) {
    if count > 0 {
        counter!("verification_codes_swept_total").increment(count as u64);
    }
}

/// Track verification email dispatch
pub fn track_email_dispatch(success: bool) {
    let status = if success { "sent" } else { "failed" };
    counter!("verification_emails_total", "status" => status).increment(1);
}

/// Track session token events
pub fn track_session_issued() {
    counter!("session_tokens_issued_total").increment(1);
}

pub fn track_session_validation(outcome: &'static str) {
    counter!("session_token_validations_total", "outcome" => outcome).increment(1);
}

/// Track share token lifecycle events
pub fn track_share_token_minted() {
    counter!("share_tokens_minted_total").increment(1);
}

pub fn track_share_token_reused() {
    counter!("share_tokens_reused_total").increment(1);
}

pub fn track_share_resolution(granted: bool) {
    let outcome = if granted { "granted" } else { "denied" };
    counter!("share_token_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn track_share_store_timeout() {
    counter!("share_store_timeouts_total").increment(1);
}

pub fn track_shares_purged(count: u64) {
    if count > 0 {
        counter!("share_tokens_purged_total").increment(count);
    }
}
