// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Jurisdiction reference data, mirroring the country endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{Jurisdiction, PageQuery},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/jurisdictions",
    params(PageQuery),
    tag = "Jurisdictions",
    responses((status = 200, body = [Jurisdiction]))
)]
pub async fn query(
    State(state): State<AppState>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Vec<Jurisdiction>>, ApiError> {
    let (offset, rows) = paging.bounds()?;
    let store = state.store.read().await;
    Ok(Json(store.query_jurisdictions(offset, rows)))
}

#[utoipa::path(
    get,
    path = "/v1/jurisdictions/{code}",
    params(("code" = String, Path, description = "Jurisdiction code")),
    tag = "Jurisdictions",
    responses(
        (status = 200, body = Jurisdiction),
        (status = 404, description = "Unknown or inactive jurisdiction"),
    )
)]
pub async fn query_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Jurisdiction>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.jurisdiction_by_code(&code)?))
}

/// Flip a jurisdiction's active flag. The store refuses non-admin callers.
#[utoipa::path(
    put,
    path = "/v1/jurisdictions/{code}",
    params(("code" = String, Path, description = "Jurisdiction code")),
    tag = "Jurisdictions",
    responses(
        (status = 204),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn toggle_active(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.toggle_jurisdiction(&claims, &code)?;
    Ok(StatusCode::NO_CONTENT)
}
