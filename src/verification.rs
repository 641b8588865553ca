//! One-time verification codes for proving control of an email address.
//!
//! Codes are six ASCII digits, live for ten minutes by default, and are keyed
//! by `(subject, purpose)` so a registration code can never satisfy a
//! password reset. The store is in-memory only; pending codes lost on restart
//! are simply requested again.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use markpad_config::VerificationConfig;
use markpad_core::{Clock, generate};

use crate::error::CredentialError;
use crate::metrics;

/// What a verification code lets its holder prove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Ownership of an address during account registration.
    Registration,
    /// Ownership of an address before a password reset.
    PasswordReset,
}

impl Purpose {
    /// Stable lowercase name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Registration => "registration",
            Purpose::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending code and the instant it stops being accepted.
#[derive(Debug, Clone)]
struct VerificationEntry {
    code: String,
    expires_at: DateTime<Utc>,
}

impl VerificationEntry {
    /// Expiry predicate shared by every access path and the sweep.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-memory store of pending verification codes.
///
/// At most one live code exists per `(subject, purpose)` pair, and a live
/// code is consumed at most once no matter how many callers race on it: the
/// map's shard lock is held across every check-then-mutate, and no operation
/// blocks beyond that.
///
/// Clones are cheap and share the same underlying map.
#[derive(Clone)]
pub struct VerificationCodeStore {
    codes: Arc<DashMap<(String, Purpose), VerificationEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl VerificationCodeStore {
    pub fn new(config: &VerificationConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: Arc::new(DashMap::new()),
            ttl: Duration::seconds(config.code_ttl_secs),
            clock,
        }
    }

    /// Issues a fresh code for `(subject, purpose)`.
    ///
    /// Fails with [`CredentialError::AlreadyActive`] while an unexpired code
    /// is pending for the pair, which keeps a retry-happy client from
    /// triggering a burst of duplicate emails. An expired leftover is
    /// replaced in place.
    pub fn issue(&self, subject: &str, purpose: Purpose) -> Result<String, CredentialError> {
        let now = self.clock.now();

        match self.codes.entry((subject.to_owned(), purpose)) {
            Entry::Occupied(slot) if !slot.get().is_expired(now) => {
                debug!(subject, purpose = %purpose, "verification code still active");
                metrics::track_code_rejected_active(purpose);
                Err(CredentialError::AlreadyActive)
            }
            Entry::Occupied(mut slot) => {
                let code = generate::verification_code();
                slot.insert(VerificationEntry {
                    code: code.clone(),
                    expires_at: now + self.ttl,
                });
                metrics::track_code_issued(purpose);
                Ok(code)
            }
            Entry::Vacant(slot) => {
                let code = generate::verification_code();
                slot.insert(VerificationEntry {
                    code: code.clone(),
                    expires_at: now + self.ttl,
                });
                metrics::track_code_issued(purpose);
                Ok(code)
            }
        }
    }

    /// Checks `candidate` against the pending code for `(subject, purpose)`.
    ///
    /// Returns true and removes the entry only on an exact match while
    /// unexpired; at most one of any number of racing callers sees true. A
    /// wrong candidate leaves the entry in place, so the real code still
    /// works afterwards. An expired entry is removed on the way out and
    /// reported as a plain false.
    pub fn consume(&self, subject: &str, purpose: Purpose, candidate: &str) -> bool {
        let now = self.clock.now();

        let Entry::Occupied(slot) = self.codes.entry((subject.to_owned(), purpose)) else {
            metrics::track_code_consumed(purpose, "missing");
            return false;
        };

        if slot.get().is_expired(now) {
            slot.remove();
            debug!(subject, purpose = %purpose, "verification code expired");
            metrics::track_code_consumed(purpose, "expired");
            return false;
        }

        if slot.get().code != candidate {
            debug!(subject, purpose = %purpose, "verification code mismatch");
            metrics::track_code_consumed(purpose, "mismatch");
            return false;
        }

        slot.remove();
        debug!(subject, purpose = %purpose, "verification code consumed");
        metrics::track_code_consumed(purpose, "ok");
        true
    }

    /// True while an unexpired code is pending for the pair.
    ///
    /// An expired leftover reports false and is swept on the spot.
    pub fn has_active(&self, subject: &str, purpose: Purpose) -> bool {
        let now = self.clock.now();

        let Entry::Occupied(slot) = self.codes.entry((subject.to_owned(), purpose)) else {
            return false;
        };

        if slot.get().is_expired(now) {
            slot.remove();
            return false;
        }
        true
    }

    /// Withdraws a just-issued code whose delivery failed; reports whether
    /// an entry was removed.
    ///
    /// Removes the entry only when it still holds exactly `code`, so a
    /// withdraw racing a later reissue never deletes the newer code.
    pub fn retract(&self, subject: &str, purpose: Purpose, code: &str) -> bool {
        let removed = self
            .codes
            .remove_if(&(subject.to_owned(), purpose), |_, pending| {
                pending.code == code
            });

        if removed.is_some() {
            debug!(subject, purpose = %purpose, "verification code withdrawn");
            metrics::track_code_withdrawn(purpose);
        }
        removed.is_some()
    }

    /// Removes every expired entry; returns how many were dropped.
    ///
    /// Day-to-day removal happens lazily inside [`consume`](Self::consume)
    /// and [`has_active`](Self::has_active); the sweep exists so entries
    /// nobody ever looks at again still go away.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut swept = 0;

        self.codes.retain(|_, pending| {
            if pending.is_expired(now) {
                swept += 1;
                false
            } else {
                true
            }
        });

        if swept > 0 {
            debug!(swept, "swept expired verification codes");
        }
        metrics::track_codes_swept(swept);
        swept
    }

    /// Spawns a background task sweeping expired entries every `interval`.
    pub fn start_sweeper(&self, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.sweep_expired();
            }
        })
    }
}
