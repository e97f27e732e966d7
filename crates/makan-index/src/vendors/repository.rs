use super::domain::{Vendor, VendorPatch};

/// Storage abstraction so the service and routers can be exercised against
/// an in-memory store in tests and the flat-file store in production.
/// Implementations preserve insertion order for `list`.
pub trait VendorRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Vendor>, RepositoryError>;
    fn fetch(&self, id: &str) -> Result<Option<Vendor>, RepositoryError>;
    /// Insert a new record, rejecting duplicate ids and leaving the store
    /// unchanged on failure.
    fn insert(&self, vendor: Vendor) -> Result<Vendor, RepositoryError>;
    /// Merge the provided fields into an existing record.
    fn update(&self, id: &str, patch: VendorPatch) -> Result<Vendor, RepositoryError>;
    /// Remove a record, returning it.
    fn delete(&self, id: &str) -> Result<Vendor, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("vendor id already exists")]
    Conflict,
    #[error("vendor not found")]
    NotFound,
    #[error("vendor store unavailable: {0}")]
    Storage(String),
}
