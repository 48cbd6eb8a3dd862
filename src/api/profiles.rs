// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{NewProfile, PageQuery, Profile, UpdateProfile},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/profiles",
    params(PageQuery),
    tag = "Profiles",
    responses((status = 200, body = [Profile]))
)]
pub async fn query(
    State(state): State<AppState>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let (offset, rows) = paging.bounds()?;
    let store = state.store.read().await;
    Ok(Json(store.query_profiles(offset, rows)))
}

#[utoipa::path(
    get,
    path = "/v1/profiles/{handle}",
    params(("handle" = String, Path, description = "Public handle")),
    tag = "Profiles",
    responses(
        (status = 200, body = Profile),
        (status = 404, description = "No such profile"),
    )
)]
pub async fn query_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.profile_by_handle(&handle)?))
}

/// Fetch the profile attached to an account.
#[utoipa::path(
    get,
    path = "/v1/users/{id}/profile",
    params(("id" = String, Path, description = "Account id")),
    tag = "Profiles",
    responses(
        (status = 200, body = Profile),
        (status = 404, description = "Account has no profile"),
    )
)]
pub async fn query_by_user_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.profile_by_user_id(&id)?))
}

/// Create a profile owned by the authenticated account.
#[utoipa::path(
    post,
    path = "/v1/profiles",
    request_body = NewProfile,
    tag = "Profiles",
    responses(
        (status = 201, body = Profile),
        (status = 409, description = "Handle already taken"),
    )
)]
pub async fn create(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Json(new): Json<NewProfile>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let mut store = state.store.write().await;
    let profile = store.create_profile(&claims, new)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Update a profile. Only the owner or an admin may modify it.
#[utoipa::path(
    put,
    path = "/v1/profiles/{handle}",
    params(("handle" = String, Path, description = "Public handle")),
    request_body = UpdateProfile,
    tag = "Profiles",
    responses(
        (status = 204),
        (status = 403, description = "Not the owner"),
    )
)]
pub async fn update(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(update): Json<UpdateProfile>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.update_profile(&claims, &handle, update)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/profiles/{handle}",
    params(("handle" = String, Path, description = "Public handle")),
    tag = "Profiles",
    responses((status = 204))
)]
pub async fn remove(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_profile(&handle)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::testutil::{claims_for, state_with_user};
    use crate::auth::Role;

    use super::*;

    #[tokio::test]
    async fn profile_lifecycle() {
        let (state, user) = state_with_user("alice@example.com", "gophers", &[Role::User]).await;
        let claims = claims_for(&user.id.to_string(), &[Role::User]);

        let (status, Json(profile)) = create(
            Auth(claims.clone()),
            State(state.clone()),
            Json(NewProfile {
                handle: "wile".into(),
                screen_name: "Wile E.".into(),
            }),
        )
        .await
        .expect("profile creation succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile.user_id, user.id.to_string());

        let Json(by_handle) = query_by_handle(State(state.clone()), Path("wile".to_string()))
            .await
            .unwrap();
        assert_eq!(by_handle.id, profile.id);

        let Json(by_user) = query_by_user_id(State(state.clone()), Path(user.id.to_string()))
            .await
            .unwrap();
        assert_eq!(by_user.id, profile.id);

        let status = update(
            Auth(claims),
            State(state.clone()),
            Path("wile".to_string()),
            Json(UpdateProfile {
                screen_name: Some("Wile E. Coyote".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let status = remove(State(state.clone()), Path("wile".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = query_by_handle(State(state), Path("wile".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_handle_conflicts() {
        let (state, user) = state_with_user("alice@example.com", "gophers", &[Role::User]).await;
        let claims = claims_for(&user.id.to_string(), &[Role::User]);

        create(
            Auth(claims.clone()),
            State(state.clone()),
            Json(NewProfile {
                handle: "wile".into(),
                screen_name: "Wile E.".into(),
            }),
        )
        .await
        .unwrap();

        let err = create(
            Auth(claims),
            State(state),
            Json(NewProfile {
                handle: "wile".into(),
                screen_name: "Impostor".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
