// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use atlas::api::router;
use atlas::auth::{Authenticator, CredentialVerifier, KeyStore};
use atlas::config::{Config, SIGNING_ALGORITHM, TOKEN_AUDIENCE, TOKEN_ISSUER};
use atlas::state::AppState;
use atlas::store::InMemoryStore;

/// Configuration problems abort startup; they are never surfaced to
/// clients at request time.
fn fatal(err: impl std::fmt::Display) -> ! {
    tracing::error!(%err, "startup failed");
    std::process::exit(1);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().unwrap_or_else(|e| fatal(e));

    // Key material: the active key pair plus any historical public keys.
    let keystore = KeyStore::new();
    keystore
        .register_from_file(config.key_id.clone(), &config.public_key_file)
        .unwrap_or_else(|e| fatal(e));
    if let Some(dir) = &config.keys_dir {
        let loaded = keystore.load_dir(dir).unwrap_or_else(|e| fatal(e));
        tracing::info!(loaded, dir = %dir.display(), "loaded historical public keys");
    }

    let private_pem = std::fs::read(&config.private_key_file).unwrap_or_else(|e| fatal(e));
    let authenticator = Authenticator::new(
        &private_pem,
        config.key_id.clone(),
        SIGNING_ALGORITHM,
        Arc::new(keystore),
    )
    .unwrap_or_else(|e| fatal(e));
    tracing::info!(kid = %config.key_id, "signing key loaded");

    // Seed the store.
    let mut store = InMemoryStore::new();
    if let Some((email, password)) = &config.seed_admin {
        match store.seed_admin(email, password, Utc::now()) {
            Ok(Some(user)) => tracing::info!(user_id = %user.id, "seeded admin account"),
            Ok(None) => tracing::info!("admin account already present"),
            Err(e) => fatal(e.message),
        }
    }
    if let Some(path) = &config.seed_data_file {
        let json = std::fs::read_to_string(path).unwrap_or_else(|e| fatal(e));
        let (countries, jurisdictions) = store
            .load_reference_fixture(&json)
            .unwrap_or_else(|e| fatal(e.message));
        tracing::info!(countries, jurisdictions, "loaded reference fixture");
    }

    let state = AppState::new(
        store,
        authenticator,
        CredentialVerifier::new(TOKEN_ISSUER, TOKEN_AUDIENCE),
    );
    let app = router(state);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .unwrap_or_else(|e| fatal(format!("invalid bind address: {e}")));

    tracing::info!(%addr, "atlas server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| fatal(e));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| fatal(e));
}
