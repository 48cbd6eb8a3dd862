// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for verified claims.
//!
//! These read the [`Claims`] injected by the authenticate middleware
//! stage and never verify tokens themselves. Absent claims mean the
//! route was wired without the authenticate layer, which is refused the
//! same way an out-of-order authorize stage is.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.sub is the authenticated subject
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::Claims;
use super::error::AuthError;
use super::roles::Role;

/// Extractor for the verified claims of the current request.
#[derive(Debug)]
pub struct Auth(pub Claims);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingClaims)
    }
}

/// Extractor that additionally requires the admin role.
///
/// For handlers whose *data rules* are admin-gated (for example the
/// country active-flag toggle) while the route itself only requires
/// authentication.
#[derive(Debug)]
pub struct AdminOnly(pub Claims);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;

        if !claims.authorized(Role::Admin) {
            return Err(AuthError::InsufficientRole);
        }

        Ok(AdminOnly(claims))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use axum::http::Request;
    use chrono::{Duration, Utc};

    use super::*;

    fn claims_with_roles(roles: &[Role]) -> Claims {
        Claims::new(
            "atlas",
            "user_123",
            "users",
            roles.iter().copied().collect::<BTreeSet<_>>(),
            Utc::now(),
            Duration::hours(1),
        )
    }

    fn parts_with(claims: Option<Claims>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(claims) = claims {
            parts.extensions.insert(claims);
        }
        parts
    }

    #[tokio::test]
    async fn auth_reads_injected_claims() {
        let mut parts = parts_with(Some(claims_with_roles(&[Role::User])));

        let Auth(claims) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(claims.sub, "user_123");
    }

    #[tokio::test]
    async fn auth_without_claims_is_a_wiring_error() {
        let mut parts = parts_with(None);

        let err = Auth::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err, AuthError::MissingClaims);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(claims_with_roles(&[Role::User])));

        let err = AdminOnly::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientRole);
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let mut parts = parts_with(Some(claims_with_roles(&[Role::Admin])));

        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }
}
