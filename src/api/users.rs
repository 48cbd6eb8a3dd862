// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account endpoints and the token (login) endpoint.
//!
//! Listing and creating accounts sit behind the route-level admin gate;
//! update and delete share the `/users/{id}` path with the self-readable
//! GET, so their admin requirement is enforced by the [`AdminOnly`]
//! extractor instead.

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;

use crate::{
    auth::{AdminOnly, Auth, AuthError},
    error::ApiError,
    models::{NewUser, PageQuery, TokenResponse, UpdateUser, UserInfo},
    state::AppState,
};

/// Pull email and password out of a Basic authorization header.
///
/// The raw email is used only for the in-memory digest lookup and is
/// never logged.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(AuthError::InvalidAuthHeader)?;
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::InvalidAuthHeader)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidAuthHeader)?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or(AuthError::InvalidAuthHeader)?;
    Ok((email.to_string(), password.to_string()))
}

/// Exchange Basic credentials for a signed bearer token.
///
/// The path names the key id the caller expects to be signed with; only
/// the active signing key is ever used, so any other kid fails closed
/// with the same generic 401 as bad credentials.
#[utoipa::path(
    get,
    path = "/v1/token/{kid}",
    params(("kid" = String, Path, description = "Expected signing key id")),
    tag = "Users",
    responses(
        (status = 200, description = "Freshly issued token", body = TokenResponse),
        (status = 401, description = "Unknown credentials or signing key"),
    )
)]
pub async fn token(
    State(state): State<AppState>,
    Path(kid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AuthError> {
    let (email, password) = basic_credentials(&headers)?;

    if kid != state.authenticator.key_id() {
        return Err(AuthError::AuthenticationFailed);
    }

    let claims = {
        let store = state.store.read().await;
        state
            .verifier
            .authenticate(&*store, &email, &password, Utc::now())?
    };

    let token = state.authenticator.issue_token(&claims).map_err(|e| {
        tracing::error!(error = %e, "signing failed for issued claims");
        AuthError::AuthenticationFailed
    })?;

    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/v1/users",
    params(PageQuery),
    tag = "Users",
    responses((status = 200, body = [UserInfo]))
)]
pub async fn query(
    State(state): State<AppState>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    let (offset, rows) = paging.bounds()?;
    let store = state.store.read().await;
    Ok(Json(store.query_users(offset, rows)))
}

/// Fetch a single account. `me` resolves to the caller; non-admins may
/// only fetch themselves.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "Account id, or `me`")),
    tag = "Users",
    responses(
        (status = 200, body = UserInfo),
        (status = 403, description = "Not your account"),
        (status = 404, description = "No such account"),
    )
)]
pub async fn query_by_id(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserInfo>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.user_by_id(&claims, &id)?))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = NewUser,
    tag = "Users",
    responses(
        (status = 201, body = UserInfo),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let mut store = state.store.write().await;
    let user = store.create_user(new, Utc::now())?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "Account id")),
    request_body = UpdateUser,
    tag = "Users",
    responses(
        (status = 204),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn update(
    AdminOnly(_claims): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<UpdateUser>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.update_user(&id, update, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "Account id")),
    tag = "Users",
    responses(
        (status = 204),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn remove(
    AdminOnly(_claims): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_user(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
