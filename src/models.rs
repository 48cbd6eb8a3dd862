// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Model Categories
//!
//! - **Users**: accounts that can authenticate (emails stored hashed)
//! - **Categories**: user-owned hierarchical labels
//! - **Countries / Jurisdictions**: curated geographic reference data
//! - **Profiles**: public handles attached to user accounts

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::ApiError;

// =============================================================================
// Pagination
// =============================================================================

fn default_page() -> i64 {
    1
}

fn default_rows() -> i64 {
    50
}

/// Paging query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// One-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Rows per page.
    #[serde(default = "default_rows")]
    pub rows: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, rows: 50 }
    }
}

impl PageQuery {
    /// Validate the parameters and return the zero-based offset and page
    /// size.
    pub fn bounds(&self) -> Result<(usize, usize), ApiError> {
        page_bounds(self.page, self.rows)
    }
}

/// Validate one-based page parameters and return the zero-based offset and
/// page size.
pub fn page_bounds(page: i64, rows: i64) -> Result<(usize, usize), ApiError> {
    if page < 1 {
        return Err(ApiError::bad_request(format!("invalid page: {page}")));
    }
    if rows < 1 {
        return Err(ApiError::bad_request(format!("invalid rows: {rows}")));
    }
    Ok((((page - 1) * rows) as usize, rows as usize))
}

// =============================================================================
// User Models
// =============================================================================

/// An account, as returned by the API.
///
/// The email appears only as its salted digest and the password hash is
/// never serialized at all.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserInfo {
    /// Durable account identifier (the token subject).
    pub id: Uuid,
    /// Salted SHA-256 digest of the account email.
    pub email_hash: String,
    /// Roles granted to the account.
    pub roles: BTreeSet<Role>,
    /// When the account was created.
    pub date_created: DateTime<Utc>,
    /// When the account was last modified.
    pub date_updated: DateTime<Utc>,
}

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    /// Email address (hashed before storage; never persisted raw).
    pub email: String,
    /// Plain password (hashed with argon2 before storage).
    pub password: String,
    /// Initial role set.
    pub roles: BTreeSet<Role>,
}

/// Request to modify an account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// =============================================================================
// Category Models
// =============================================================================

/// A user-owned category label, optionally nested under a parent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier.
    pub id: Uuid,
    /// URL-safe unique name.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Subject id of the owning account.
    pub user_id: String,
    /// Parent category, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCategory {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Request to modify a category. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCategory {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
}

// =============================================================================
// Country / Jurisdiction Models
// =============================================================================

/// Geographic reference data for a country.
///
/// Countries are seeded, not created through the API; the only mutation is
/// the admin-gated active flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    /// GeoNames identifier.
    pub gnid: i64,
    pub name: String,
    pub currency_code: String,
    pub currency_name: String,
    /// Whether the country is visible in listings.
    pub active: bool,
}

/// A legal jurisdiction within a country.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Jurisdiction {
    /// Jurisdiction code (unique).
    pub code: String,
    /// GeoNames identifier.
    pub gnid: i64,
    /// Owning country code.
    pub country_code: String,
    pub name: String,
    pub active: bool,
}

// =============================================================================
// Profile Models
// =============================================================================

/// A public profile attached to an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Profile {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique public handle.
    pub handle: String,
    /// Display name.
    pub screen_name: String,
    /// Subject id of the owning account.
    pub user_id: String,
}

/// Request to create a profile for the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewProfile {
    pub handle: String,
    pub screen_name: String,
}

/// Request to modify a profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub handle: Option<String>,
    pub screen_name: Option<String>,
}
