//! services/dashboard/src/adapters/accounts.rs
//!
//! Email/password accounts, stored as documents in the `accounts` collection of
//! the same document store that holds profiles. Passwords are hashed with argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use pregnancy_tracker_core::domain::{Credentials, Identity};
use pregnancy_tracker_core::ports::{DocumentStore, PortError, PortResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const ACCOUNTS_COLLECTION: &str = "accounts";
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("Password must be at least 8 characters")]
    WeakPassword,
    #[error("An account already exists for {0}")]
    EmailTaken(String),
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    identity: Identity,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn DocumentStore>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates an account and returns its freshly issued identity.
    pub async fn register(&self, credentials: &Credentials) -> Result<Identity, AccountError> {
        let email = normalize_email(&credentials.email);
        if !email_pattern().is_match(&email) {
            return Err(AccountError::InvalidEmail(credentials.email.clone()));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        match self.store.get(ACCOUNTS_COLLECTION, &email).await {
            Ok(_) => return Err(AccountError::EmailTaken(email)),
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(credentials.password.as_bytes(), &salt)
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .to_string();

        let record = AccountRecord {
            identity: Identity::new(Uuid::new_v4().to_string()),
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        let fields = match serde_json::to_value(&record) {
            Ok(Value::Object(map)) => map,
            _ => return Err(PortError::Unexpected("Account record is not an object".into()).into()),
        };
        self.store
            .set(ACCOUNTS_COLLECTION, &email, fields, false)
            .await?;

        info!("Registered account {} for {}", record.identity, email);
        Ok(record.identity)
    }

    /// Checks the credentials and returns the account's identity.
    pub async fn verify(&self, credentials: &Credentials) -> PortResult<Identity> {
        let invalid = || PortError::Auth("Invalid email or password".to_string());
        let email = normalize_email(&credentials.email);

        let document = match self.store.get(ACCOUNTS_COLLECTION, &email).await {
            Ok(document) => document,
            Err(PortError::NotFound(_)) => return Err(invalid()),
            Err(e) => return Err(e),
        };
        let record: AccountRecord = serde_json::from_value(Value::Object(document))
            .map_err(|e| PortError::Unexpected(format!("Malformed account {}: {}", email, e)))?;

        let parsed_hash = PasswordHash::new(&record.password_hash)
            .map_err(|e| PortError::Unexpected(format!("Malformed password hash: {}", e)))?;
        if Argon2::default()
            .verify_password(credentials.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            warn!("Rejected sign-in for {}", email);
            return Err(invalid());
        }
        Ok(record.identity)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}
