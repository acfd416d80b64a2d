use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::OfficerAccount;

const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;
const DEFAULT_LOCKOUT_MINUTES: i64 = 15;

/// Signed-in officer as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerIdentity {
    pub uid: String,
    pub email: String,
}

/// Failure codes an identity provider may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("no account matches the supplied email")]
    UserNotFound,
    #[error("password does not match")]
    WrongPassword,
    #[error("credential rejected")]
    InvalidCredential,
    #[error("too many failed attempts")]
    TooManyRequests,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External service that checks officer credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<OfficerIdentity, ProviderError>;

    async fn sign_out(&self, identity: &OfficerIdentity) -> Result<(), ProviderError>;
}

struct Account {
    identity: OfficerIdentity,
    password_digest: Vec<u8>,
}

/// Consecutive failures for one account, with the time of the latest.
#[derive(Debug, Clone, Copy)]
struct FailureRun {
    count: u32,
    last_failure: DateTime<Utc>,
}

/// Identity provider backed by a fixed list of officer accounts.
///
/// Mirrors hosted providers by locking an account out after a run of failed
/// attempts. The lock lifts once `lockout_window` has passed since the last
/// failure, and a successful sign-in resets the count. Only configured accounts
/// are tracked.
pub struct StaticIdentityProvider {
    accounts: Vec<Account>,
    failures: Mutex<HashMap<String, FailureRun>>,
    max_failed_attempts: u32,
    lockout_window: Duration,
}

fn digest(password: &str) -> Vec<u8> {
    Sha256::digest(password.as_bytes()).to_vec()
}

impl StaticIdentityProvider {
    pub fn new(officers: &[OfficerAccount]) -> Self {
        let accounts = officers
            .iter()
            .enumerate()
            .map(|(index, officer)| Account {
                identity: OfficerIdentity {
                    uid: format!("officer-{:03}", index + 1),
                    email: officer.email.to_ascii_lowercase(),
                },
                password_digest: digest(&officer.password),
            })
            .collect();

        Self {
            accounts,
            failures: Mutex::new(HashMap::new()),
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            lockout_window: Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        }
    }

    pub fn with_max_failed_attempts(mut self, attempts: u32) -> Self {
        self.max_failed_attempts = attempts.max(1);
        self
    }

    pub fn with_lockout_window(mut self, window: Duration) -> Self {
        self.lockout_window = window;
        self
    }

    pub fn officer_count(&self) -> usize {
        self.accounts.len()
    }

    /// Whether `email` is locked at `now`. Expired runs are dropped.
    fn is_locked(&self, email: &str, now: DateTime<Utc>) -> bool {
        let mut guard = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.get(email).copied() {
            Some(run) if now - run.last_failure >= self.lockout_window => {
                guard.remove(email);
                false
            }
            Some(run) => run.count >= self.max_failed_attempts,
            None => false,
        }
    }

    fn record_failure(&self, email: &str, now: DateTime<Utc>) {
        let mut guard = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let run = guard.entry(email.to_string()).or_insert(FailureRun {
            count: 0,
            last_failure: now,
        });
        run.count += 1;
        run.last_failure = now;
    }

    fn clear_failures(&self, email: &str) {
        let mut guard = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(email);
    }

    #[cfg(test)]
    fn tracked_accounts(&self) -> usize {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn sign_in_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<OfficerIdentity, ProviderError> {
        let email = email.trim().to_ascii_lowercase();
        let account = self
            .accounts
            .iter()
            .find(|account| account.identity.email == email)
            .ok_or(ProviderError::UserNotFound)?;

        if self.is_locked(&email, now) {
            return Err(ProviderError::TooManyRequests);
        }

        if account.password_digest != digest(password) {
            self.record_failure(&email, now);
            return Err(ProviderError::WrongPassword);
        }

        self.clear_failures(&email);
        Ok(account.identity.clone())
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<OfficerIdentity, ProviderError> {
        self.sign_in_at(email, password, Utc::now())
    }

    async fn sign_out(&self, identity: &OfficerIdentity) -> Result<(), ProviderError> {
        debug!(uid = %identity.uid, "officer signed out");
        Ok(())
    }
}
