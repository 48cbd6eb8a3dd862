// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for accounts and reference data.
//!
//! The store owns the access rules that belong to the data rather than the
//! route: non-admins may only read their own account, category updates are
//! owner-or-admin, and the country/jurisdiction active flag is admin-only.
//! Route-level gating (which endpoints require which role) lives in the
//! router; both checks consult the same [`Claims`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::credentials::{hash_email, hash_password, StoredCredentials, UserStore};
use crate::auth::{Claims, Role};
use crate::error::ApiError;
use crate::models::{
    Category, Country, Jurisdiction, NewCategory, NewProfile, NewUser, Profile, UpdateCategory,
    UpdateProfile, UpdateUser, UserInfo,
};

/// A stored account. Unlike [`UserInfo`] this carries the password hash
/// and never leaves the store.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email_hash: String,
    pub password_hash: String,
    pub roles: std::collections::BTreeSet<Role>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl UserRecord {
    fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            email_hash: self.email_hash.clone(),
            roles: self.roles.clone(),
            date_created: self.date_created,
            date_updated: self.date_updated,
        }
    }
}

/// Seed fixture shape for reference data (see `SEED_DATA_FILE`).
#[derive(Debug, Deserialize)]
pub struct ReferenceFixture {
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub jurisdictions: Vec<Jurisdiction>,
}

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<Uuid, UserRecord>,
    categories: HashMap<Uuid, Category>,
    countries: HashMap<String, Country>,
    jurisdictions: HashMap<String, Jurisdiction>,
    profiles: HashMap<Uuid, Profile>,
}

fn page<T>(mut items: Vec<T>, offset: usize, rows: usize) -> Vec<T> {
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(rows);
    items
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn create_user(&mut self, new: NewUser, now: DateTime<Utc>) -> Result<UserInfo, ApiError> {
        let email_hash = hash_email(&new.email);
        if self.users.values().any(|u| u.email_hash == email_hash) {
            return Err(ApiError::conflict("email already registered"));
        }

        let password_hash = hash_password(&new.password)
            .map_err(|_| ApiError::bad_request("unable to hash password"))?;

        let record = UserRecord {
            id: Uuid::new_v4(),
            email_hash,
            password_hash,
            roles: new.roles,
            date_created: now,
            date_updated: now,
        };
        let info = record.info();
        self.users.insert(record.id, record);
        Ok(info)
    }

    pub fn update_user(
        &mut self,
        id: &str,
        update: UpdateUser,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let id = parse_id(id)?;

        if let Some(email) = &update.email {
            let email_hash = hash_email(email);
            if self
                .users
                .values()
                .any(|u| u.email_hash == email_hash && u.id != id)
            {
                return Err(ApiError::conflict("email already registered"));
            }
        }

        let Some(record) = self.users.get_mut(&id) else {
            return Err(ApiError::not_found("user not found"));
        };

        if let Some(email) = update.email {
            record.email_hash = hash_email(&email);
        }
        if let Some(password) = update.password {
            record.password_hash = hash_password(&password)
                .map_err(|_| ApiError::bad_request("unable to hash password"))?;
        }
        if let Some(roles) = update.roles {
            record.roles = roles;
        }
        record.date_updated = now;
        Ok(())
    }

    pub fn delete_user(&mut self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        if self.users.remove(&id).is_none() {
            return Err(ApiError::not_found("user not found"));
        }
        Ok(())
    }

    pub fn query_users(&self, offset: usize, rows: usize) -> Vec<UserInfo> {
        let mut users: Vec<UserInfo> = self.users.values().map(UserRecord::info).collect();
        users.sort_by_key(|u| u.id);
        page(users, offset, rows)
    }

    /// Fetch one account. `"me"` resolves to the caller's own subject; a
    /// non-admin asking for anyone else is refused.
    pub fn user_by_id(&self, claims: &Claims, id: &str) -> Result<UserInfo, ApiError> {
        let id = if id.eq_ignore_ascii_case("me") {
            &claims.sub
        } else {
            id
        };
        let id = parse_id(id)?;

        if !claims.authorized(Role::Admin) && claims.sub != id.to_string() {
            return Err(ApiError::forbidden());
        }

        self.users
            .get(&id)
            .map(UserRecord::info)
            .ok_or_else(|| ApiError::not_found("user not found"))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn create_category(
        &mut self,
        claims: &Claims,
        new: NewCategory,
        now: DateTime<Utc>,
    ) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            slug: new.slug,
            name: new.name,
            user_id: claims.sub.clone(),
            parent_id: new.parent_id,
            date_created: now,
            date_updated: now,
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    pub fn update_category(
        &mut self,
        claims: &Claims,
        id: &str,
        update: UpdateCategory,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        let Some(category) = self.categories.get_mut(&id) else {
            return Err(ApiError::not_found("category not found"));
        };

        // Only the owner (or an admin) may modify a category.
        if !claims.authorized(Role::Admin) && category.user_id != claims.sub {
            return Err(ApiError::forbidden());
        }

        if let Some(slug) = update.slug {
            category.slug = slug;
        }
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(parent_id) = update.parent_id {
            category.parent_id = Some(parent_id);
        }
        category.date_updated = now;
        Ok(())
    }

    pub fn delete_category(&mut self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        if self.categories.remove(&id).is_none() {
            return Err(ApiError::not_found("category not found"));
        }
        Ok(())
    }

    pub fn query_categories(&self, offset: usize, rows: usize) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        page(categories, offset, rows)
    }

    pub fn category_by_id(&self, id: &str) -> Result<Category, ApiError> {
        let id = parse_id(id)?;
        self.categories
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("category not found"))
    }

    // =========================================================================
    // Countries
    // =========================================================================

    pub fn insert_country(&mut self, country: Country) {
        self.countries.insert(country.code.clone(), country);
    }

    /// List active countries ordered by code.
    pub fn query_countries(&self, offset: usize, rows: usize) -> Vec<Country> {
        let mut countries: Vec<Country> =
            self.countries.values().filter(|c| c.active).cloned().collect();
        countries.sort_by(|a, b| a.code.cmp(&b.code));
        page(countries, offset, rows)
    }

    /// Fetch an active country; inactive ones read as absent.
    pub fn country_by_code(&self, code: &str) -> Result<Country, ApiError> {
        self.countries
            .get(code)
            .filter(|c| c.active)
            .cloned()
            .ok_or_else(|| ApiError::not_found("country not found"))
    }

    /// Flip a country's active flag. Admin only.
    pub fn toggle_country(&mut self, claims: &Claims, code: &str) -> Result<(), ApiError> {
        if !claims.authorized(Role::Admin) {
            return Err(ApiError::forbidden());
        }
        let Some(country) = self.countries.get_mut(code) else {
            return Err(ApiError::not_found("country not found"));
        };
        country.active = !country.active;
        Ok(())
    }

    // =========================================================================
    // Jurisdictions
    // =========================================================================

    pub fn insert_jurisdiction(&mut self, jurisdiction: Jurisdiction) {
        self.jurisdictions
            .insert(jurisdiction.code.clone(), jurisdiction);
    }

    pub fn query_jurisdictions(&self, offset: usize, rows: usize) -> Vec<Jurisdiction> {
        let mut jurisdictions: Vec<Jurisdiction> = self
            .jurisdictions
            .values()
            .filter(|j| j.active)
            .cloned()
            .collect();
        jurisdictions.sort_by(|a, b| a.code.cmp(&b.code));
        page(jurisdictions, offset, rows)
    }

    pub fn jurisdiction_by_code(&self, code: &str) -> Result<Jurisdiction, ApiError> {
        self.jurisdictions
            .get(code)
            .filter(|j| j.active)
            .cloned()
            .ok_or_else(|| ApiError::not_found("jurisdiction not found"))
    }

    pub fn toggle_jurisdiction(&mut self, claims: &Claims, code: &str) -> Result<(), ApiError> {
        if !claims.authorized(Role::Admin) {
            return Err(ApiError::forbidden());
        }
        let Some(jurisdiction) = self.jurisdictions.get_mut(code) else {
            return Err(ApiError::not_found("jurisdiction not found"));
        };
        jurisdiction.active = !jurisdiction.active;
        Ok(())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    pub fn create_profile(
        &mut self,
        claims: &Claims,
        new: NewProfile,
    ) -> Result<Profile, ApiError> {
        if self.profiles.values().any(|p| p.handle == new.handle) {
            return Err(ApiError::conflict("handle already taken"));
        }

        let profile = Profile {
            id: Uuid::new_v4(),
            handle: new.handle,
            screen_name: new.screen_name,
            user_id: claims.sub.clone(),
        };
        self.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    pub fn query_profiles(&self, offset: usize, rows: usize) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.handle.cmp(&b.handle));
        page(profiles, offset, rows)
    }

    pub fn profile_by_handle(&self, handle: &str) -> Result<Profile, ApiError> {
        self.profiles
            .values()
            .find(|p| p.handle == handle)
            .cloned()
            .ok_or_else(|| ApiError::not_found("profile not found"))
    }

    pub fn profile_by_user_id(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("profile not found"))
    }

    pub fn update_profile(
        &mut self,
        claims: &Claims,
        handle: &str,
        update: UpdateProfile,
    ) -> Result<(), ApiError> {
        let id = self
            .profiles
            .values()
            .find(|p| p.handle == handle)
            .map(|p| p.id)
            .ok_or_else(|| ApiError::not_found("profile not found"))?;

        let profile = self.profiles.get_mut(&id).expect("profile exists");
        if !claims.authorized(Role::Admin) && profile.user_id != claims.sub {
            return Err(ApiError::forbidden());
        }

        if let Some(handle) = update.handle {
            profile.handle = handle;
        }
        if let Some(screen_name) = update.screen_name {
            profile.screen_name = screen_name;
        }
        Ok(())
    }

    pub fn delete_profile(&mut self, handle: &str) -> Result<(), ApiError> {
        let id = self
            .profiles
            .values()
            .find(|p| p.handle == handle)
            .map(|p| p.id)
            .ok_or_else(|| ApiError::not_found("profile not found"))?;
        self.profiles.remove(&id);
        Ok(())
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Create the initial admin account unless the email is registered.
    pub fn seed_admin(
        &mut self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserInfo>, ApiError> {
        let email_hash = hash_email(email);
        if self.users.values().any(|u| u.email_hash == email_hash) {
            return Ok(None);
        }
        self.create_user(
            NewUser {
                email: email.to_string(),
                password: password.to_string(),
                roles: [Role::Admin, Role::User].into_iter().collect(),
            },
            now,
        )
        .map(Some)
    }

    /// Load countries and jurisdictions from a JSON fixture.
    pub fn load_reference_fixture(&mut self, json: &str) -> Result<(usize, usize), ApiError> {
        let fixture: ReferenceFixture = serde_json::from_str(json)
            .map_err(|e| ApiError::bad_request(format!("invalid reference fixture: {e}")))?;

        let counts = (fixture.countries.len(), fixture.jurisdictions.len());
        for country in fixture.countries {
            self.insert_country(country);
        }
        for jurisdiction in fixture.jurisdictions {
            self.insert_jurisdiction(jurisdiction);
        }
        Ok(counts)
    }
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("ID is not in its proper form"))
}

impl UserStore for InMemoryStore {
    fn credentials_by_email_hash(&self, email_hash: &str) -> Option<StoredCredentials> {
        self.users
            .values()
            .find(|u| u.email_hash == email_hash)
            .map(|u| StoredCredentials {
                subject: u.id.to_string(),
                password_hash: u.password_hash.clone(),
                roles: u.roles.clone(),
            })
    }
}
