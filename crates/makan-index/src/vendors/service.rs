use std::sync::Arc;

use super::domain::{Vendor, VendorPatch};
use super::listing::{self, ListingPage, ListingQuery};
use super::repository::{RepositoryError, VendorRepository};

/// Service composing record validation, the repository, and the listing
/// pipeline. Routers and the CLI only ever talk to this facade.
pub struct VendorService<R> {
    repository: Arc<R>,
}

impl<R> VendorService<R>
where
    R: VendorRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// The full collection in insertion order; the listing UI fetches this
    /// once and filters locally.
    pub fn list(&self) -> Result<Vec<Vendor>, VendorServiceError> {
        Ok(self.repository.list()?)
    }

    /// Server-side run of the listing pipeline over the full collection.
    pub fn page(&self, query: &ListingQuery) -> Result<ListingPage, VendorServiceError> {
        let vendors = self.repository.list()?;
        Ok(listing::run(&vendors, query))
    }

    pub fn get(&self, id: &str) -> Result<Vendor, VendorServiceError> {
        let vendor = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(vendor)
    }

    pub fn create(&self, vendor: Vendor) -> Result<Vendor, VendorServiceError> {
        vendor.validate()?;
        Ok(self.repository.insert(vendor)?)
    }

    pub fn update(&self, id: &str, patch: VendorPatch) -> Result<Vendor, VendorServiceError> {
        patch.validate()?;
        Ok(self.repository.update(id, patch)?)
    }

    /// Remove a record, returning the removed vendor.
    pub fn delete(&self, id: &str) -> Result<Vendor, VendorServiceError> {
        Ok(self.repository.delete(id)?)
    }
}

/// Error raised by the vendor service.
#[derive(Debug, thiserror::Error)]
pub enum VendorServiceError {
    #[error(transparent)]
    Validation(#[from] super::domain::ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
