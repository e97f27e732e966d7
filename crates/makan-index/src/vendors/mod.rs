pub mod domain;
pub mod listing;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{Region, ValidationError, Vendor, VendorPatch};
pub use listing::{ListingPage, ListingQuery, SortOrder, PAGE_SIZE};
pub use repository::{RepositoryError, VendorRepository};
pub use router::vendor_router;
pub use service::{VendorService, VendorServiceError};
pub use store::{JsonVendorStore, MemoryVendorStore, StoreError};
