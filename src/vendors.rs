use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::models::error::StoreError;
use crate::models::vendor::VendorRecord;

/// Supplies the vendor records a nearby query runs over.
#[async_trait]
pub trait VendorSource: Send + Sync {
    async fn vendors(&self) -> Result<Vec<VendorRecord>, StoreError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VendorDocument {
    List(Vec<VendorRecord>),
    Envelope { restaurants: Vec<VendorRecord> },
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryVendorStore {
    vendors: Vec<VendorRecord>,
}

impl InMemoryVendorStore {
    pub fn new(vendors: Vec<VendorRecord>) -> Self {
        Self { vendors }
    }

    /// Accepts either a bare array of vendors or `{ "restaurants": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let vendors = match serde_json::from_str(json)? {
            VendorDocument::List(vendors) => vendors,
            VendorDocument::Envelope { restaurants } => restaurants,
        };
        Ok(Self::new(vendors))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_json(&json)?;
        info!("Loaded {} vendors from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

#[async_trait]
impl VendorSource for InMemoryVendorStore {
    async fn vendors(&self) -> Result<Vec<VendorRecord>, StoreError> {
        Ok(self.vendors.clone())
    }
}
