// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! The authenticator owns the process's single active signing key and its
//! key id. Verification resolves the public key for whatever key id a
//! presented token names, so tokens signed before a rotation keep
//! verifying as long as the resolver still holds the old public key.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, EncodingKey, Header, Validation};

use super::claims::Claims;
use super::error::{ConfigError, TokenError};
use super::keys::KeyResolver;

/// Parse a configured algorithm name, rejecting anything outside the
/// supported RSA family.
fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
    }
}

/// Signs claims into tokens and verifies tokens back into claims.
///
/// Construction happens once at startup; afterwards the authenticator is
/// immutable and safe to share across request tasks. Both operations are
/// CPU-bound and never suspend.
pub struct Authenticator {
    encoding_key: EncodingKey,
    key_id: String,
    algorithm: Algorithm,
    resolver: Arc<dyn KeyResolver>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Build an authenticator from a private key PEM, the key id under
    /// which the matching public key is published, the signature
    /// algorithm name, and the resolver used during verification.
    ///
    /// Fails with [`ConfigError`] on an unsupported algorithm or
    /// unparseable key material. These are startup faults; nothing here
    /// is recoverable at request time.
    pub fn new(
        private_key_pem: &[u8],
        key_id: impl Into<String>,
        algorithm: &str,
        resolver: Arc<dyn KeyResolver>,
    ) -> Result<Self, ConfigError> {
        let algorithm = parse_algorithm(algorithm)?;
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| ConfigError::InvalidKeyMaterial(e.to_string()))?;

        Ok(Self {
            encoding_key,
            key_id: key_id.into(),
            algorithm,
            resolver,
        })
    }

    /// Key id of the active signing key.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign claims into a compact token.
    ///
    /// The header carries the algorithm and the active key id, so any
    /// verifier can fetch the matching public key without trial and error.
    pub fn issue_token(&self, claims: &Claims) -> Result<String, ConfigError> {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(self.key_id.clone());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| ConfigError::InvalidKeyMaterial(e.to_string()))
    }

    /// Verify a presented token and recover its claims.
    ///
    /// Failure taxonomy, in evaluation order:
    /// - [`TokenError::Malformed`]: not a decodable three-segment token,
    ///   or no key id in the header;
    /// - [`TokenError::UnknownKey`]: the key id does not resolve. A token
    ///   naming a decommissioned key fails closed here;
    /// - [`TokenError::InvalidSignature`]: signature mismatch under the
    ///   resolved public key;
    /// - [`TokenError::Expired`]: expiry reached. Checked after the
    ///   signature, with zero leeway: a token whose `exp` equals the
    ///   current second is already rejected.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        let kid = header.kid.ok_or(TokenError::Malformed)?;

        let decoding_key = self
            .resolver
            .resolve(&kid)
            .map_err(|_| TokenError::UnknownKey)?;

        // Expiry is checked below against our own clock; the library
        // check is disabled so the zero-leeway boundary is owned here.
        // Only the configured algorithm is accepted, so a header claiming
        // anything else fails before the signature is even looked at.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims::<&str>(&[]);

        let data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        check_expiry(data.claims.exp, Utc::now().timestamp())?;

        Ok(data.claims)
    }
}

/// Zero-leeway expiry predicate: a token expiring at exactly `now` is
/// already rejected; one second of remaining validity passes.
fn check_expiry(exp: i64, now: i64) -> Result<(), TokenError> {
    if now >= exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
