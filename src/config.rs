// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Key
//! material problems abort the process here; nothing configuration-related
//! surfaces at request time.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_PRIVATE_KEY_FILE` | PEM file with the active RSA signing key | Required |
//! | `AUTH_PUBLIC_KEY_FILE` | PEM file with the matching public key | Required |
//! | `AUTH_KEY_ID` | Key id published in issued token headers | Required |
//! | `AUTH_KEYS_DIR` | Directory of historical `<kid>.pem` public keys | Optional |
//! | `SEED_ADMIN_EMAIL` | Email for the initial admin account | Optional |
//! | `SEED_ADMIN_PASSWORD` | Password for the initial admin account | Optional |
//! | `SEED_DATA_FILE` | JSON fixture with countries/jurisdictions | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;

use crate::auth::ConfigError;

/// Issuer written into every token this process signs.
pub const TOKEN_ISSUER: &str = "Atlas Reference Service";

/// Audience tag for tokens issued to API users.
pub const TOKEN_AUDIENCE: &str = "users";

/// Signature algorithm for the active signing key.
pub const SIGNING_ALGORITHM: &str = "RS256";

/// Startup configuration, resolved from the environment.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub private_key_file: PathBuf,
    pub public_key_file: PathBuf,
    pub key_id: String,
    pub keys_dir: Option<PathBuf>,
    pub seed_admin: Option<(String, String)>,
    pub seed_data_file: Option<PathBuf>,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let seed_admin = match (
            env::var("SEED_ADMIN_EMAIL").ok(),
            env::var("SEED_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            private_key_file: required("AUTH_PRIVATE_KEY_FILE")?.into(),
            public_key_file: required("AUTH_PUBLIC_KEY_FILE")?.into(),
            key_id: required("AUTH_KEY_ID")?,
            keys_dir: env::var("AUTH_KEYS_DIR").ok().map(PathBuf::from),
            seed_admin,
            seed_data_file: env::var("SEED_DATA_FILE").ok().map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
