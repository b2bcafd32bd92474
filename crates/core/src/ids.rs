//! Entity identity: locally minted temporary ids and store-assigned
//! canonical ids, plus the natural key used for deduplication.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix distinguishing locally minted ids from canonical ones.
pub const TEMP_ID_PREFIX: &str = "local-";

/// Identity of a domain entity.
///
/// An entity holds exactly one identifier at a time. Temporary ids are
/// process-unique and are swapped in place for the canonical id the remote
/// store assigns on first successful persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityId {
    /// Locally minted, never persisted remotely.
    Temp(String),
    /// Assigned by the remote store, globally unique.
    Canonical(String),
}

impl EntityId {
    /// Mint a fresh temporary identifier.
    pub fn mint_temp() -> Self {
        Self::Temp(format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()))
    }

    /// Wrap a store-assigned identifier.
    pub fn canonical(raw: impl Into<String>) -> Self {
        Self::Canonical(raw.into())
    }

    /// Classify a raw id string by its prefix.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(TEMP_ID_PREFIX) {
            Self::Temp(raw)
        } else {
            Self::Canonical(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Temp(raw) | Self::Canonical(raw) => raw,
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, Self::Temp(_))
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Self::Canonical(_))
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.as_str().to_string()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive natural key (name + kind discriminator).
///
/// Two entities sharing a natural key are "the same" record as far as the
/// user is concerned; the resolver reuses the canonical row instead of
/// creating a remote twin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    name: String,
    discriminator: String,
}

impl NaturalKey {
    pub fn new(name: &str, discriminator: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            discriminator: discriminator.trim().to_lowercase(),
        }
    }
}
