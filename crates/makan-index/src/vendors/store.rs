use super::domain::{Vendor, VendorPatch};
use super::repository::{RepositoryError, VendorRepository};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// In-memory store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryVendorStore {
    records: Mutex<Vec<Vendor>>,
}

impl MemoryVendorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Vendor>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl VendorRepository for MemoryVendorStore {
    fn list(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let guard = self.records.lock().expect("vendor store mutex poisoned");
        Ok(guard.clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<Vendor>, RepositoryError> {
        let guard = self.records.lock().expect("vendor store mutex poisoned");
        Ok(guard.iter().find(|vendor| vendor.id == id).cloned())
    }

    fn insert(&self, vendor: Vendor) -> Result<Vendor, RepositoryError> {
        let mut guard = self.records.lock().expect("vendor store mutex poisoned");
        if guard.iter().any(|existing| existing.id == vendor.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(vendor.clone());
        Ok(vendor)
    }

    fn update(&self, id: &str, patch: VendorPatch) -> Result<Vendor, RepositoryError> {
        let mut guard = self.records.lock().expect("vendor store mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|vendor| vendor.id == id)
            .ok_or(RepositoryError::NotFound)?;
        patch.apply(record);
        Ok(record.clone())
    }

    fn delete(&self, id: &str) -> Result<Vendor, RepositoryError> {
        let mut guard = self.records.lock().expect("vendor store mutex poisoned");
        let index = guard
            .iter()
            .position(|vendor| vendor.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(guard.remove(index))
    }
}

/// Flat-file store: the whole collection lives in one JSON array, re-written
/// after every mutation. Mutations are staged on a copy so a failed write
/// leaves the in-memory view and the file consistent.
#[derive(Debug)]
pub struct JsonVendorStore {
    path: PathBuf,
    records: Mutex<Vec<Vendor>>,
}

impl JsonVendorStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            Vec::new()
        };

        info!(path = %path.display(), vendors = records.len(), "vendor store opened");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn persist(path: &Path, records: &[Vendor]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(records).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, raw).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl VendorRepository for JsonVendorStore {
    fn list(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let guard = self.records.lock().expect("vendor store mutex poisoned");
        Ok(guard.clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<Vendor>, RepositoryError> {
        let guard = self.records.lock().expect("vendor store mutex poisoned");
        Ok(guard.iter().find(|vendor| vendor.id == id).cloned())
    }

    fn insert(&self, vendor: Vendor) -> Result<Vendor, RepositoryError> {
        let mut guard = self.records.lock().expect("vendor store mutex poisoned");
        if guard.iter().any(|existing| existing.id == vendor.id) {
            return Err(RepositoryError::Conflict);
        }

        let mut staged = guard.clone();
        staged.push(vendor.clone());
        Self::persist(&self.path, &staged)
            .map_err(|err| RepositoryError::Storage(err.to_string()))?;
        *guard = staged;
        Ok(vendor)
    }

    fn update(&self, id: &str, patch: VendorPatch) -> Result<Vendor, RepositoryError> {
        let mut guard = self.records.lock().expect("vendor store mutex poisoned");
        let mut staged = guard.clone();
        let record = staged
            .iter_mut()
            .find(|vendor| vendor.id == id)
            .ok_or(RepositoryError::NotFound)?;
        patch.apply(record);
        let updated = record.clone();

        Self::persist(&self.path, &staged)
            .map_err(|err| RepositoryError::Storage(err.to_string()))?;
        *guard = staged;
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<Vendor, RepositoryError> {
        let mut guard = self.records.lock().expect("vendor store mutex poisoned");
        let mut staged = guard.clone();
        let index = staged
            .iter()
            .position(|vendor| vendor.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let removed = staged.remove(index);

        Self::persist(&self.path, &staged)
            .map_err(|err| RepositoryError::Storage(err.to_string()))?;
        *guard = staged;
        Ok(removed)
    }
}

/// Flat-file I/O and serialization failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read vendor data from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write vendor data to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid vendor data in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
