//! Validators, one module per concern. Each returns a [`ConformanceReport`](crate::ConformanceReport).

pub mod documents;
pub mod hierarchy;
pub mod repository;
