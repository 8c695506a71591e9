pub mod records;
pub mod store;
pub mod summary;

pub use records::{CrimeStats, Dataset, DatasetError, Demographics, HateCrime, Location};
pub use store::{LocationStats, LocationStore, MemoryStore, StoreError};
pub use summary::{record_fingerprint, DatasetCounts, DatasetSummary, DatasetSums, LastUpdated};
