// Application state: the persisted aggregate and its on-disk mirror.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Privilege tiers, ordered `read < write < admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

impl AccessLevel {
    /// Whether a key at this level may perform an action requiring `required`.
    /// Admin satisfies everything; write additionally satisfies read.
    pub fn satisfies(self, required: AccessLevel) -> bool {
        match (self, required) {
            (AccessLevel::Admin, _) => true,
            (level, required) if level == required => true,
            (AccessLevel::Write, AccessLevel::Read) => true,
            _ => false,
        }
    }
}

/// An opaque bearer credential and the tier it grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub key: String,
    pub access_level: AccessLevel,
    pub enabled: bool,
}

/// One variant (blue or green) of a flag's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagPart {
    pub value: bool,
    pub name: String,
    pub description: String,
    pub applies_to: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagVariant {
    Blue,
    Green,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagData {
    pub blue: FlagPart,
    pub green: FlagPart,
    #[serde(rename = "default")]
    pub default_variant: FlagVariant,
}

/// A blue/green toggle with a designated default variant.
///
/// `enabled` is carried through persistence and the API but is not consulted
/// during evaluation; see DESIGN.md.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub tag: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub data: FlagData,
}

/// The entire persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub flags: Vec<Flag>,
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize app data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Owns the in-memory `AppData` and its backing file.
///
/// Callers must serialize access; the server wraps this in a `RwLock` so a
/// read-modify-write-persist sequence holds the write lock throughout.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    pub data: AppData,
}

impl Store {
    /// Read the persisted document at `path`. A missing, unreadable, or
    /// unparsable file starts the store empty instead of failing the process.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("could not parse {}: {}; starting empty", path.display(), e);
                    AppData::default()
                }
            },
            Err(e) => {
                tracing::warn!("could not read {}: {}; starting empty", path.display(), e);
                AppData::default()
            }
        };
        Self { path, data }
    }

    /// Serialize the full aggregate and overwrite the backing file.
    pub fn persist(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, text).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// If no API keys survived the load, synthesize one admin key so the
    /// server is never unreachable. Uses `configured` when supplied, otherwise
    /// a fresh UUIDv4. Returns the credential when one was created.
    pub fn bootstrap_admin_key(
        &mut self,
        configured: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        if !self.data.api_keys.is_empty() {
            return Ok(None);
        }
        let key = configured
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.data.api_keys.push(ApiKey {
            key: key.clone(),
            access_level: AccessLevel::Admin,
            enabled: true,
        });
        self.persist()?;
        Ok(Some(key))
    }
}
