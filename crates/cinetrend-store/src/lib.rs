//! CineTrend Store - Search counter storage
//!
//! This crate provides:
//! - The `CounterStore` trait: atomic create-or-increment plus top-K reads
//! - An in-memory store for single sessions and tests
//! - A file-backed store whose counts outlive the process

pub mod counter;
pub mod error;
pub mod local;
pub mod location;
pub mod memory;

pub use counter::*;
pub use error::*;
pub use local::*;
pub use location::*;
pub use memory::*;
