pub mod identifiers;
pub mod ranked;

pub use identifiers::{DatasetFingerprint, LocationId, FINGERPRINT_LEN};
pub use ranked::{CacheStatus, PageInfo, RankedLocation, RankedPage, ScoreBreakdown, ScoreResult, SubScores};
