//! Layout Definition Types
//!
//! This crate contains the schema types for packed bit-layout definition
//! files. It provides pure data structures without any file I/O or code
//! generation logic.

pub mod types;

// Re-export commonly used types at the crate root
pub use types::*;
