// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification-key resolution.
//!
//! Every issued token names its signing key by an opaque key id (`kid`).
//! Verification looks the public key up through [`KeyResolver`], so keys
//! can rotate: the active signing key changes while historical public keys
//! stay resolvable until the last token signed with them has expired.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use jsonwebtoken::DecodingKey;

use super::error::{ConfigError, KeyResolverError};

/// Maps a key id to the public key needed to verify a signature.
///
/// Resolution is synchronous: it sits on the hot verification path, which
/// must not suspend. A miss is an expected outcome (decommissioned or
/// foreign key id), never a process fault.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, kid: &str) -> Result<DecodingKey, KeyResolverError>;
}

/// PEM-backed key store.
///
/// The map lives behind an `RwLock` so registering a rotated-in key is an
/// atomic swap from the point of view of concurrent verifications: a
/// reader sees either the full old set or the full new set.
#[derive(Default)]
pub struct KeyStore {
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a public key under a key id.
    ///
    /// Registering an id that already exists replaces the key, which is
    /// how a re-issued key pair with a reused id takes effect.
    pub fn register(&self, kid: impl Into<String>, public_key_pem: &[u8]) -> Result<(), ConfigError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| ConfigError::InvalidKeyMaterial(e.to_string()))?;

        let mut keys = self.keys.write().expect("key store lock poisoned");
        keys.insert(kid.into(), key);
        Ok(())
    }

    /// Register a public key read from a PEM file.
    pub fn register_from_file(&self, kid: impl Into<String>, path: &Path) -> Result<(), ConfigError> {
        let pem = std::fs::read(path).map_err(|source| ConfigError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        self.register(kid, &pem)
    }

    /// Load every `<kid>.pem` file in a directory.
    ///
    /// This mirrors the deployment layout: the active key pair plus any
    /// historical public keys, one file per key id.
    pub fn load_dir(&self, dir: &Path) -> Result<usize, ConfigError> {
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::KeyFile {
            path: dir.display().to_string(),
            source,
        })?;

        let mut loaded = 0;
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::KeyFile {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pem") {
                continue;
            }
            let Some(kid) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            self.register_from_file(kid.to_string(), &path)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.read().expect("key store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyResolver for KeyStore {
    fn resolve(&self, kid: &str) -> Result<DecodingKey, KeyResolverError> {
        let keys = self.keys.read().expect("key store lock poisoned");
        keys.get(kid).cloned().ok_or(KeyResolverError::NotFound)
    }
}
