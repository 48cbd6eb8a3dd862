// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{Category, NewCategory, PageQuery, UpdateCategory},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/categories",
    params(PageQuery),
    tag = "Categories",
    responses((status = 200, body = [Category]))
)]
pub async fn query(
    State(state): State<AppState>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let (offset, rows) = paging.bounds()?;
    let store = state.store.read().await;
    Ok(Json(store.query_categories(offset, rows)))
}

#[utoipa::path(
    get,
    path = "/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    tag = "Categories",
    responses(
        (status = 200, body = Category),
        (status = 404, description = "No such category"),
    )
)]
pub async fn query_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.category_by_id(&id)?))
}

/// Create a category owned by the authenticated account.
#[utoipa::path(
    post,
    path = "/v1/categories",
    request_body = NewCategory,
    tag = "Categories",
    responses((status = 201, body = Category))
)]
pub async fn create(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Json(new): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let mut store = state.store.write().await;
    let category = store.create_category(&claims, new, Utc::now());
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category. Only the owner or an admin may modify it.
#[utoipa::path(
    put,
    path = "/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = UpdateCategory,
    tag = "Categories",
    responses(
        (status = 204),
        (status = 403, description = "Not the owner"),
    )
)]
pub async fn update(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<UpdateCategory>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.update_category(&claims, &id, update, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    tag = "Categories",
    responses((status = 204))
)]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_category(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::testutil::{claims_for, state_with_user};
    use crate::auth::Role;

    use super::*;

    #[tokio::test]
    async fn create_update_delete_round_trip() {
        let (state, user) = state_with_user("alice@example.com", "gophers", &[Role::User]).await;
        let claims = claims_for(&user.id.to_string(), &[Role::User]);

        let (status, Json(category)) = create(
            Auth(claims.clone()),
            State(state.clone()),
            Json(NewCategory {
                slug: "energy".into(),
                name: "Energy".into(),
                parent_id: None,
            }),
        )
        .await
        .expect("category creation succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(category.user_id, user.id.to_string());

        let status = update(
            Auth(claims.clone()),
            State(state.clone()),
            Path(category.id.to_string()),
            Json(UpdateCategory {
                name: Some("Energy & Utilities".into()),
                ..Default::default()
            }),
        )
        .await
        .expect("category update succeeds");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(fetched) = query_by_id(State(state.clone()), Path(category.id.to_string()))
            .await
            .unwrap();
        assert_eq!(fetched.name, "Energy & Utilities");

        let status = remove(State(state.clone()), Path(category.id.to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = query_by_id(State(state), Path(category.id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_by_stranger_is_forbidden() {
        let (state, user) = state_with_user("alice@example.com", "gophers", &[Role::User]).await;
        let owner = claims_for(&user.id.to_string(), &[Role::User]);

        let (_, Json(category)) = create(
            Auth(owner),
            State(state.clone()),
            Json(NewCategory {
                slug: "energy".into(),
                name: "Energy".into(),
                parent_id: None,
            }),
        )
        .await
        .unwrap();

        let stranger = claims_for("someone-else", &[Role::User]);
        let err = update(
            Auth(stranger),
            State(state),
            Path(category.id.to_string()),
            Json(UpdateCategory::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
