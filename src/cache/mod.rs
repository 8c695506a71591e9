pub mod cache;
pub mod clock;
pub mod key;

pub use cache::{CacheEntry, MemoryScoresCache, ScoresCache, DEFAULT_TTL_MS};
pub use clock::{Clock, SystemClock};
pub use key::CacheKey;
