use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the full SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(i64);

impl LocationId {
    pub fn new(raw: i64) -> Self {
        LocationId(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short content hash summarizing aggregate dataset state.
///
/// Two datasets with identical counts and sums share a fingerprint; it is a
/// coarse invalidation signal, not a full content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetFingerprint(String);

impl DatasetFingerprint {
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload);

        let hash = hasher.finalize();
        let mut hex = hex::encode(hash);
        hex.truncate(FINGERPRINT_LEN);

        DatasetFingerprint(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_twelve_lowercase_hex_chars() {
        let fp = DatasetFingerprint::from_payload(b"{}");
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn fingerprint_is_prefix_of_full_digest() {
        // sha256("abc")
        let fp = DatasetFingerprint::from_payload(b"abc");
        assert_eq!(fp.as_str(), "ba7816bf8f01");
    }
}
