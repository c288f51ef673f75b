//! Persistent key-value storage for the pharmacy collections.
//!
//! Each collection lives under one string key as a JSON blob, mirroring the
//! browser-storage layout the data originally used. Absent or corrupt slots
//! degrade to the caller's default; write failures are surfaced.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;

/// Storage keys, one per collection.
pub mod keys {
    /// Medicines collection (reserved by the legacy schema)
    pub const MEDICINES: &str = "medicines";
    /// Sales collection (reserved by the legacy schema)
    pub const SALES: &str = "sales";
    /// Customers collection (reserved by the legacy schema)
    pub const CUSTOMERS: &str = "customers";
    /// Suppliers collection (reserved by the legacy schema)
    pub const SUPPLIERS: &str = "suppliers";
    /// Registered pharmacies
    pub const PHARMACIES: &str = "pharmacies";
    /// Wellness programs
    pub const WELLNESS_PROGRAMS: &str = "wellnessPrograms";
    /// Append-only import audit log
    pub const UPLOAD_HISTORY: &str = "uploadHistory";
    /// Singleton user profile
    pub const USER_PROFILE: &str = "userProfile";
    /// Chat conversations
    pub const CONVERSATIONS: &str = "conversations";
    /// Tracked prescriptions
    pub const PRESCRIPTIONS: &str = "pharmacare:prescriptions";
    /// Wellness diary, one record per calendar day
    pub const WELLNESS_DIARY: &str = "pharmacare:wellness";

    /// Every key the store knows about, for whole-store export.
    pub const ALL: [&str; 11] = [
        MEDICINES,
        SALES,
        CUSTOMERS,
        SUPPLIERS,
        PHARMACIES,
        WELLNESS_PROGRAMS,
        UPLOAD_HISTORY,
        USER_PROFILE,
        CONVERSATIONS,
        PRESCRIPTIONS,
        WELLNESS_DIARY,
    ];
}

/// String-keyed JSON store backed by sled.
#[derive(Debug, Clone)]
pub struct Store {
    db: sled::Db,
}

impl Store {
    /// Open (or create) the store at the given directory.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Read and deserialize the value under `key`.
    ///
    /// Absent slots, unreadable slots and corrupt JSON all yield `None`;
    /// corruption is logged and swallowed, never propagated.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.db.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, %err, "storage read failed, treating slot as empty");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "corrupt value in storage, falling back to default");
                None
            }
        }
    }

    /// Read the value under `key`, or the supplied default when the slot is
    /// absent or corrupt.
    #[must_use]
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Serialize `value` as JSON and persist it under `key`.
    ///
    /// A failed write is fatal to the calling operation: no mutation may be
    /// reported as applied when the flush did not land.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_vec(value)?;
        self.db.insert(key, raw)?;
        self.db.flush()?;
        Ok(())
    }

    /// Delete the slot under `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }

    /// Dump every known, present slot as raw JSON for export.
    #[must_use]
    pub fn dump(&self) -> Vec<(String, serde_json::Value)> {
        keys::ALL
            .iter()
            .filter_map(|key| {
                self.get::<serde_json::Value>(key)
                    .map(|value| ((*key).to_string(), value))
            })
            .collect()
    }
}
