//! rosecheck property-based testing library.
//!
//! This is the main entry point, re-exporting the engine: generators,
//! properties, and the check driver with rose-tree shrinking.

pub use rosecheck_core::*;
