// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! The internal taxonomy distinguishes every failure mode (tests and logs
//! rely on that), but responses are deliberately uniform: any verification
//! failure is a bare 401 and any policy failure a bare 403, so clients
//! cannot probe *why* a token or login was rejected.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Startup-time configuration failures.
///
/// These abort process startup and are never produced at request time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("reading key file {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },

    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
}

/// Key resolution failures, surfaced by [`super::keys::KeyResolver`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyResolverError {
    #[error("no public key found for key id")]
    NotFound,
}

/// Token verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not a well-formed three-segment JWS.
    #[error("token is malformed")]
    Malformed,

    /// The header's key id did not resolve to a public key.
    #[error("token signing key is unknown")]
    UnknownKey,

    /// The signature does not verify under the resolved public key.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token's expiry has elapsed.
    #[error("token has expired")]
    Expired,
}

/// Request-level authentication/authorization failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingAuthHeader,

    #[error("authorization header is not a bearer token")]
    InvalidAuthHeader,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Credential check failed. Unknown identifier and wrong secret both
    /// produce this exact value so callers cannot tell them apart.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// No claims in the request context: the authorize stage ran without
    /// an authenticate stage ahead of it.
    #[error("claims missing from request context")]
    MissingClaims,

    #[error("missing required role")]
    InsufficientRole,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl AuthError {
    /// HTTP status for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::Token(_)
            | AuthError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AuthError::MissingClaims | AuthError::InsufficientRole => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // The precise cause goes to the log only; the client sees a
        // uniform body per status class.
        tracing::debug!(error = %self, "request rejected");

        let status = self.status_code();
        let body = match self {
            AuthError::AuthenticationFailed => "authentication failed",
            _ if status == StatusCode::FORBIDDEN => "forbidden",
            _ => "unauthorized",
        };

        (status, Json(ErrorBody { error: body })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn verification_failures_are_uniform_401() {
        for err in [
            AuthError::MissingAuthHeader,
            AuthError::InvalidAuthHeader,
            AuthError::Token(TokenError::Malformed),
            AuthError::Token(TokenError::UnknownKey),
            AuthError::Token(TokenError::InvalidSignature),
            AuthError::Token(TokenError::Expired),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(body.as_ref(), br#"{"error":"unauthorized"}"#);
        }
    }

    #[tokio::test]
    async fn policy_failures_are_uniform_403() {
        for err in [AuthError::MissingClaims, AuthError::InsufficientRole] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(body.as_ref(), br#"{"error":"forbidden"}"#);
        }
    }

    #[tokio::test]
    async fn failed_login_has_single_generic_body() {
        let response = AuthError::AuthenticationFailed.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"error":"authentication failed"}"#);
    }
}
