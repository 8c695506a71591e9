//! Livability scoring and ranking for U.S. locations.
//!
//! `trueplace` turns per-location hate-crime, crime and diversity indices
//! into a 0–100 score, ranks locations by it, and serves the results over a
//! small JSON API. Rankings are cached per dataset fingerprint, a short hash
//! of aggregate counts and sums, so any change to the data invalidates them.

pub mod api;
pub mod cache;
pub mod dataset;
pub mod ranking;
pub mod scoring;
pub mod types;
