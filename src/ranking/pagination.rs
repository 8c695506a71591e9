use crate::types::ranked::RankedLocation;

/// `results[offset .. offset + limit]`, truncated at the end of the list.
/// An offset past the end yields an empty page.
pub fn paginate(results: &[RankedLocation], limit: usize, offset: usize) -> Vec<RankedLocation> {
    results.iter().skip(offset).take(limit).cloned().collect()
}
