// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the role-membership check.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Identity and authorization assertions carried inside a signed token.
///
/// Claims are built once at login, serialized into the token payload, and
/// recovered verbatim by verification. They are never mutated afterwards.
///
/// Roles are a set: duplicates collapse and ordering is irrelevant, so two
/// Claims values compare equal iff every field matches and the role sets
/// have the same members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Token-issuing system.
    pub iss: String,

    /// Durable identifier of the principal.
    pub sub: String,

    /// Intended token consumers (e.g. "users").
    pub aud: String,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds. Always strictly greater than `iat`.
    pub exp: i64,

    /// Roles granted to the principal.
    pub roles: BTreeSet<Role>,
}

impl Claims {
    /// Build claims for a principal with a validity window starting at `now`.
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        audience: impl Into<String>,
        roles: BTreeSet<Role>,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            aud: audience.into(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
            roles,
        }
    }

    /// Pure set-membership check: true iff `required` is among the
    /// principal's roles. Callers decide policy; there is no implicit
    /// admin bypass here.
    pub fn authorized(&self, required: Role) -> bool {
        self.roles.contains(&required)
    }

    /// Expiry as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims(roles: &[Role]) -> Claims {
        Claims::new(
            "atlas",
            "user_123",
            "users",
            roles.iter().copied().collect(),
            Utc::now(),
            Duration::hours(1),
        )
    }

    #[test]
    fn validity_window_is_strictly_positive() {
        let claims = sample_claims(&[Role::User]);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn authorized_is_set_membership() {
        let claims = sample_claims(&[Role::Admin, Role::User]);
        assert!(claims.authorized(Role::Admin));
        assert!(claims.authorized(Role::User));

        let admin_only = sample_claims(&[Role::Admin]);
        assert!(admin_only.authorized(Role::Admin));
        assert!(!admin_only.authorized(Role::User));
    }

    #[test]
    fn duplicate_roles_collapse() {
        let claims = sample_claims(&[Role::User, Role::User, Role::User]);
        assert_eq!(claims.roles.len(), 1);
    }

    #[test]
    fn equality_ignores_role_insertion_order() {
        let now = Utc::now();
        let a = Claims::new(
            "atlas",
            "u1",
            "users",
            [Role::Admin, Role::User].into_iter().collect(),
            now,
            Duration::hours(1),
        );
        let b = Claims::new(
            "atlas",
            "u1",
            "users",
            [Role::User, Role::Admin].into_iter().collect(),
            now,
            Duration::hours(1),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_with_jwt_short_names() {
        let claims = sample_claims(&[Role::Admin]);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iss"], "atlas");
        assert_eq!(json["sub"], "user_123");
        assert_eq!(json["aud"], "users");
        assert_eq!(json["roles"], serde_json::json!(["ADMIN"]));
        assert!(json["iat"].is_i64());
        assert!(json["exp"].is_i64());
    }
}
