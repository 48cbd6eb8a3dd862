// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification and claims minting.
//!
//! Emails are stored and looked up only as salted SHA-256 digests; the raw
//! address never reaches storage or the logs. Passwords are argon2id PHC
//! strings with a per-hash random salt.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::claims::Claims;
use super::error::AuthError;
use super::roles::Role;

/// Application-wide salt mixed into email digests. Fixed so lookups stay
/// deterministic across restarts.
const EMAIL_SALT: &str = "qL83nVtrWZkeJpB7yfdmA2shQxOUo4cgR9wKiT6EuDbvXNzMCaYH01lGjPrSF5";

/// How long an issued token stays valid.
fn token_validity() -> Duration {
    Duration::hours(1)
}

/// Stored credential material for one account, as returned by the user
/// store. Absence of a record is an expected outcome, not an error.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// Durable subject identifier (becomes the token's `sub`).
    pub subject: String,
    /// argon2 PHC string of the account password.
    pub password_hash: String,
    /// Roles granted to the account.
    pub roles: BTreeSet<Role>,
}

/// Lookup seam towards the user store.
///
/// Keyed by email *digest*: callers hash the submitted address with
/// [`hash_email`] before lookup.
pub trait UserStore {
    fn credentials_by_email_hash(&self, email_hash: &str) -> Option<StoredCredentials>;
}

/// Hash an email address for storage and lookup.
pub fn hash_email(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(EMAIL_SALT.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::AuthenticationFailed)
}

/// Verify a password against a stored PHC string. Constant-time under the
/// hood via the argon2 verifier.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash the unknown-identifier path verifies against, so a missing record
/// costs the same argon2 work as a wrong password.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("decoy-password").expect("hashing a static password cannot fail")
    })
}

/// Turns a submitted identifier + secret into freshly minted claims.
pub struct CredentialVerifier {
    issuer: String,
    audience: String,
}

impl CredentialVerifier {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Validate credentials and build claims for the account.
    ///
    /// Unknown email and wrong password are indistinguishable: both paths
    /// return the identical [`AuthError::AuthenticationFailed`] value and
    /// both run a full argon2 verification.
    pub fn authenticate(
        &self,
        store: &dyn UserStore,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let record = store.credentials_by_email_hash(&hash_email(email));

        let Some(record) = record else {
            let _ = verify_password(password, dummy_hash());
            return Err(AuthError::AuthenticationFailed);
        };

        if !verify_password(password, &record.password_hash) {
            return Err(AuthError::AuthenticationFailed);
        }

        Ok(Claims::new(
            self.issuer.clone(),
            record.subject,
            self.audience.clone(),
            record.roles,
            now,
            token_validity(),
        ))
    }
}
