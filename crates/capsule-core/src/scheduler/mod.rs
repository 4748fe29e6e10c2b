//! Unlock scheduler.
//!
//! Each polling cycle scans the store for due capsules and walks every one
//! through authenticate -> decrypt -> display -> commit. Failures are
//! isolated per capsule: a missing blob, a wrong password or a display
//! error skips that capsule (it stays locked) and the cycle moves on.
//! A capsule is marked unlocked only after its display call succeeds.

mod collaborators;
mod shutdown;

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{decrypt, derive_key, DEFAULT_ITERATIONS};
use crate::error::{CapsuleError, Result};
use crate::storage::{Capsule, CapsuleStore};

pub use collaborators::{ContentDisplay, FixedPassword, PasswordSource};
pub use shutdown::Shutdown;

/// Why a due capsule was left locked during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BlobMissing,
    Storage,
    PasswordUnavailable,
    AuthenticationFailed,
    Display,
    Commit,
}

/// A due capsule that stayed locked.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCapsule {
    pub id: i64,
    pub reason: SkipReason,
    pub message: String,
}

/// Outcome of one `check_and_unlock` cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnlockReport {
    pub unlocked: Vec<i64>,
    pub skipped: Vec<SkippedCapsule>,
}

impl UnlockReport {
    /// Number of capsules that were due this cycle.
    pub fn due(&self) -> usize {
        self.unlocked.len() + self.skipped.len()
    }

    fn skip(&mut self, id: i64, reason: SkipReason, err: &CapsuleError) {
        self.skipped.push(SkippedCapsule {
            id,
            reason,
            message: err.to_string(),
        });
    }
}

/// Drives unlocking of due capsules in a store.
pub struct Scheduler<S: CapsuleStore> {
    store: S,
    kdf_iterations: u32,
}

impl<S: CapsuleStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            kdf_iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Override the KDF iteration count; it must match the one used when sealing.
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Run one cycle: unlock every capsule due at `now`.
    ///
    /// # Errors
    ///
    /// Only a failure to list due capsules is returned. Per-capsule failures
    /// are logged and recorded in the report's `skipped` list.
    pub fn check_and_unlock<P, D>(
        &mut self,
        now: DateTime<Utc>,
        passwords: &mut P,
        display: &mut D,
    ) -> Result<UnlockReport>
    where
        P: PasswordSource + ?Sized,
        D: ContentDisplay + ?Sized,
    {
        let due = self.store.list_due(now)?;
        let mut report = UnlockReport::default();

        for capsule in due {
            info!(
                capsule_id = capsule.id,
                title = %capsule.title,
                unlock_time = %capsule.unlock_time,
                "capsule is due, attempting unlock"
            );
            match self.unlock_one(&capsule, passwords, display) {
                Ok(()) => {
                    info!(capsule_id = capsule.id, "capsule unlocked");
                    report.unlocked.push(capsule.id);
                }
                Err((reason, err)) => {
                    match reason {
                        SkipReason::BlobMissing | SkipReason::Storage | SkipReason::Commit => {
                            error!(capsule_id = capsule.id, error = %err, "skipping capsule")
                        }
                        _ => warn!(capsule_id = capsule.id, error = %err, "skipping capsule"),
                    }
                    report.skip(capsule.id, reason, &err);
                }
            }
        }

        Ok(report)
    }

    fn unlock_one<P, D>(
        &mut self,
        capsule: &Capsule,
        passwords: &mut P,
        display: &mut D,
    ) -> std::result::Result<(), (SkipReason, CapsuleError)>
    where
        P: PasswordSource + ?Sized,
        D: ContentDisplay + ?Sized,
    {
        let ciphertext = self
            .store
            .read_ciphertext(&capsule.ciphertext_ref)
            .map_err(|err| match err {
                CapsuleError::BlobMissing(_) => (SkipReason::BlobMissing, err),
                other => (SkipReason::Storage, other),
            })?;

        let plaintext = {
            let password = passwords
                .password_for(capsule)
                .map_err(|err| (SkipReason::PasswordUnavailable, err))?;
            let key = derive_key(password.expose_secret(), &capsule.salt, self.kdf_iterations)
                .map_err(|err| (SkipReason::Storage, err))?;
            decrypt(&capsule.nonce, &ciphertext, key.as_bytes()).map_err(|err| match err {
                CapsuleError::AuthenticationFailure => (SkipReason::AuthenticationFailed, err),
                other => (SkipReason::Storage, other),
            })?
        };
        let plaintext = Zeroizing::new(plaintext);

        display
            .show(capsule.content_type, &plaintext, &capsule.title)
            .map_err(|err| (SkipReason::Display, err))?;

        self.store
            .mark_unlocked(capsule.id)
            .map_err(|err| (SkipReason::Commit, err))
    }

    /// Run cycles every `poll_interval` until `shutdown` is cancelled.
    ///
    /// Errors returned by a cycle are logged and the loop carries on.
    /// Cancellation is observed between cycles, never mid-capsule.
    ///
    /// # Returns
    ///
    /// Returns the number of cycles that ran.
    pub fn auto_unlock_loop<P, D>(
        &mut self,
        poll_interval: Duration,
        passwords: &mut P,
        display: &mut D,
        shutdown: &Shutdown,
    ) -> u64
    where
        P: PasswordSource + ?Sized,
        D: ContentDisplay + ?Sized,
    {
        info!(
            poll_interval_secs = poll_interval.as_secs_f64(),
            "starting auto-unlock loop"
        );
        let mut cycles = 0;

        while !shutdown.is_cancelled() {
            match self.check_and_unlock(Utc::now(), passwords, display) {
                Ok(report) if report.due() > 0 => info!(
                    unlocked = report.unlocked.len(),
                    skipped = report.skipped.len(),
                    "unlock cycle finished"
                ),
                Ok(_) => {}
                Err(err) => error!(error = %err, "unlock cycle failed, retrying next cycle"),
            }
            cycles += 1;

            if shutdown.wait_timeout(poll_interval) {
                break;
            }
        }

        info!(cycles, "auto-unlock loop stopped");
        cycles
    }
}
