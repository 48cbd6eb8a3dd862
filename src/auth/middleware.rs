// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-pipeline authentication and authorization stages.
//!
//! Two composable layers guard protected routes:
//!
//! 1. [`authenticate`] reads the bearer token, verifies it and injects
//!    the resulting [`Claims`] into the request extensions;
//! 2. [`authorize`] reads those claims and checks the required role.
//!
//! Order matters: `authorize` must run *after* `authenticate`. With
//! axum's onion layering the authenticate layer therefore has to be added
//! last on a route so it sits outermost:
//!
//! ```rust,ignore
//! router
//!     .route_layer(middleware::from_fn(|req, next| authorize(Role::Admin, req, next)))
//!     .route_layer(middleware::from_fn_with_state(authenticator, authenticate))
//! ```
//!
//! Neither stage knows anything about business routes; the same pair is
//! reused verbatim across every protected endpoint.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::authenticator::Authenticator;
use super::claims::Claims;
use super::error::AuthError;
use super::roles::Role;

/// Pull the bearer token out of the Authorization header.
fn bearer_token(request: &Request) -> Result<&str, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Authentication stage.
///
/// Rejects the request with a uniform 401 before the handler runs if the
/// header is absent or malformed, or if the token fails verification for
/// any reason. On success the verified [`Claims`] become available to
/// downstream stages and the handler via request extensions.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match bearer_token(&request)
        .and_then(|token| authenticator.verify_token(token).map_err(AuthError::from))
    {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Authorization stage.
///
/// Reads the claims injected by [`authenticate`]; absent claims mean the
/// stages were wired out of order and the request is refused rather than
/// let through unchecked. The role check is plain set membership: an
/// admin token does not pass a `User` gate unless the account also holds
/// that role.
pub async fn authorize(required: Role, request: Request, next: Next) -> Response {
    match request.extensions().get::<Claims>() {
        None => AuthError::MissingClaims.into_response(),
        Some(claims) if !claims.authorized(required) => {
            AuthError::InsufficientRole.into_response()
        }
        Some(_) => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::keys::KeyStore;
    use crate::auth::test_keys::{PRIVATE_KEY_PEM, PUBLIC_KEY_PEM};

    const KID: &str = "test-key";

    fn authenticator() -> Arc<Authenticator> {
        let store = KeyStore::new();
        store.register(KID, PUBLIC_KEY_PEM.as_bytes()).unwrap();
        Arc::new(
            Authenticator::new(PRIVATE_KEY_PEM.as_bytes(), KID, "RS256", Arc::new(store)).unwrap(),
        )
    }

    fn token_with_roles(auth: &Authenticator, roles: &[Role]) -> String {
        let claims = Claims::new(
            "atlas",
            "user_1",
            "users",
            roles.iter().copied().collect::<BTreeSet<_>>(),
            Utc::now(),
            Duration::hours(1),
        );
        auth.issue_token(&claims).unwrap()
    }

    async fn echo_subject(Extension(claims): Extension<Claims>) -> String {
        claims.sub
    }

    fn guarded_router(auth: Arc<Authenticator>, required: Role) -> Router {
        // authenticate added last so it runs first.
        Router::new()
            .route("/protected", get(echo_subject))
            .route_layer(middleware::from_fn(move |req, next| {
                authorize(required, req, next)
            }))
            .route_layer(middleware::from_fn_with_state(auth, authenticate))
    }

    fn request(token: Option<&str>) -> HttpRequest<Body> {
        let builder = HttpRequest::builder().uri("/protected");
        let builder = match token {
            Some(t) => builder.header(AUTHORIZATION, format!("Bearer {t}")),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_rejected_without_invoking_handler() {
        let auth = authenticator();
        let invoked = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&invoked);

        let app = Router::new()
            .route(
                "/protected",
                get(move || {
                    seen.store(true, Ordering::SeqCst);
                    async { "ok" }
                }),
            )
            .route_layer(middleware::from_fn_with_state(auth, authenticate));

        let response = app.oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = guarded_router(authenticator(), Role::User);
        let req = HttpRequest::builder()
            .uri("/protected")
            .header(AUTHORIZATION, "Basic YWxpY2U6cHc=")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_claims() {
        let auth = authenticator();
        let token = token_with_roles(&auth, &[Role::User]);
        let app = guarded_router(auth, Role::User);

        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"user_1");
    }

    #[tokio::test]
    async fn admin_token_passes_admin_gate_but_not_user_gate() {
        let auth = authenticator();
        let token = token_with_roles(&auth, &[Role::Admin]);

        let admin_gate = guarded_router(Arc::clone(&auth), Role::Admin);
        let response = admin_gate.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Flat role model: Admin alone does not satisfy a User gate.
        let user_gate = guarded_router(auth, Role::User);
        let response = user_gate.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let auth = authenticator();
        let token = token_with_roles(&auth, &[Role::User]);
        let tampered = format!("{}AAAA", &token[..token.len() - 4]);

        let app = guarded_router(auth, Role::User);
        let response = app.oneshot(request(Some(&tampered))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authorize_without_authenticate_fails_closed() {
        let auth = authenticator();
        let token = token_with_roles(&auth, &[Role::Admin]);

        // Mis-wired chain: authorize runs with no authenticate stage, so
        // no claims are ever injected.
        let app = Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(|req, next| {
                authorize(Role::Admin, req, next)
            }));

        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
