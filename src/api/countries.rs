// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Country reference data. Countries are seeded at startup; the API only
//! lists them and lets admins toggle visibility.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{Country, PageQuery},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/countries",
    params(PageQuery),
    tag = "Countries",
    responses((status = 200, body = [Country]))
)]
pub async fn query(
    State(state): State<AppState>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Vec<Country>>, ApiError> {
    let (offset, rows) = paging.bounds()?;
    let store = state.store.read().await;
    Ok(Json(store.query_countries(offset, rows)))
}

#[utoipa::path(
    get,
    path = "/v1/countries/{code}",
    params(("code" = String, Path, description = "ISO 3166-1 alpha-2 code")),
    tag = "Countries",
    responses(
        (status = 200, body = Country),
        (status = 404, description = "Unknown or inactive country"),
    )
)]
pub async fn query_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Country>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.country_by_code(&code)?))
}

/// Flip a country's active flag. The store refuses non-admin callers.
#[utoipa::path(
    put,
    path = "/v1/countries/{code}",
    params(("code" = String, Path, description = "ISO 3166-1 alpha-2 code")),
    tag = "Countries",
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
    store.toggle_country(&claims, &code)?;
    Ok(StatusCode::NO_CONTENT)
}
