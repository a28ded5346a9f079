//! Entity-state containers.
//!
//! A container holds canonical data next to path-addressed edits, errors,
//! view modes and in-flight markers. Every transition consumes the container
//! and returns the next one.

mod container;
mod operations;

pub use container::{EntityState, PathMap};
pub use operations::apply_changes;
