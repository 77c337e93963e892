//! Common utilities for pgnview
//!
//! This crate provides the square and piece text conversions shared by the
//! PGN core and the UCI engine adapter.

pub mod converters;

// Re-export commonly used items
pub use converters::*;
