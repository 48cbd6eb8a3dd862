// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP surface: route table, middleware wiring and OpenAPI doc.
//!
//! Every `/v1` route except the token endpoint sits behind the
//! authenticate stage; user management additionally sits behind an
//! `authorize(Admin)` stage. The two stages are the only place tokens are
//! inspected; handlers read the injected claims and apply data-level
//! rules (owner-or-admin, self-only) through the store.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::{authenticate, authorize},
    auth::Role,
    models::{
        Category, Country, Jurisdiction, NewCategory, NewProfile, NewUser, Profile, TokenResponse,
        UpdateCategory, UpdateProfile, UpdateUser, UserInfo,
    },
    state::AppState,
};

pub mod categories;
pub mod countries;
pub mod health;
pub mod jurisdictions;
pub mod profiles;
pub mod users;

pub fn router(state: AppState) -> Router {
    // Admin-gated account listing and creation. Update/delete share the
    // `/users/{id}` path with the self-readable GET, so their admin
    // requirement lives in the AdminOnly extractor instead.
    let admin_routes = Router::new()
        .route("/users", get(users::query).post(users::create))
        .route_layer(from_fn(|req, next| authorize(Role::Admin, req, next)));

    // Routes any authenticated principal may reach; data-level rules
    // (self-only, owner-or-admin, admin toggle) live in the store.
    let protected_routes = Router::new()
        .route(
            "/users/{id}",
            get(users::query_by_id)
                .put(users::update)
                .delete(users::remove),
        )
        .route("/users/{id}/profile", get(profiles::query_by_user_id))
        .route("/categories", get(categories::query).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::query_by_id)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/countries", get(countries::query))
        .route(
            "/countries/{code}",
            get(countries::query_by_code).put(countries::toggle_active),
        )
        .route("/jurisdictions", get(jurisdictions::query))
        .route(
            "/jurisdictions/{code}",
            get(jurisdictions::query_by_code).put(jurisdictions::toggle_active),
        )
        .route("/profiles", get(profiles::query).post(profiles::create))
        .route(
            "/profiles/{handle}",
            get(profiles::query_by_handle)
                .put(profiles::update)
                .delete(profiles::remove),
        );

    let v1_routes = protected_routes
        .merge(admin_routes)
        // Added last so authenticate runs before the authorize layers.
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        // Registered after the layer: the login endpoint is public.
        .route("/token/{kid}", get(users::token));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        health::readiness,
        users::token,
        users::query,
        users::query_by_id,
        users::create,
        users::update,
        users::remove,
        categories::query,
        categories::query_by_id,
        categories::create,
        categories::update,
        categories::remove,
        countries::query,
        countries::query_by_code,
        countries::toggle_active,
        jurisdictions::query,
        jurisdictions::query_by_code,
        jurisdictions::toggle_active,
        profiles::query,
        profiles::query_by_handle,
        profiles::query_by_user_id,
        profiles::create,
        profiles::update,
        profiles::remove,
    ),
    components(
        schemas(
            Role,
            UserInfo,
            NewUser,
            UpdateUser,
            TokenResponse,
            Category,
            NewCategory,
            UpdateCategory,
            Country,
            Jurisdiction,
            Profile,
            NewProfile,
            UpdateProfile,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Users", description = "Account management and token issuance"),
        (name = "Categories", description = "User-owned category labels"),
        (name = "Countries", description = "Country reference data"),
        (name = "Jurisdictions", description = "Jurisdiction reference data"),
        (name = "Profiles", description = "Public profiles"),
    )
)]
struct ApiDoc;


#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::testutil::state_with_user;
    use super::*;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _user) =
            state_with_user("admin@example.com", "root-pw", &[Role::Admin]).await;
        let app = router(state);
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn liveness_is_public() {
        let (state, _user) =
            state_with_user("admin@example.com", "root-pw", &[Role::Admin]).await;
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let (state, _user) =
            state_with_user("admin@example.com", "root-pw", &[Role::Admin]).await;
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/countries")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
