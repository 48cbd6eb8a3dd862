// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::RwLock;

use crate::auth::{Authenticator, CredentialVerifier};
use crate::store::InMemoryStore;

/// Shared application state.
///
/// The authenticator and credential verifier are constructed once at
/// startup and immutable afterwards; the store sits behind an async
/// `RwLock` so handlers hold it only across a single operation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub authenticator: Arc<Authenticator>,
    pub verifier: Arc<CredentialVerifier>,
}

impl AppState {
    pub fn new(
        store: InMemoryStore,
        authenticator: Authenticator,
        verifier: CredentialVerifier,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            authenticator: Arc::new(authenticator),
            verifier: Arc::new(verifier),
        }
    }
}

/// Lets the authenticate middleware take `State<Arc<Authenticator>>`
/// directly when layered with the full application state.
impl FromRef<AppState> for Arc<Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.authenticator)
    }
}
