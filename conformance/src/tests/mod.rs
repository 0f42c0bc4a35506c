//! Shared test data for the validators.

pub mod fixtures;
