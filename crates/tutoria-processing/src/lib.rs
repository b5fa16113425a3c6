//! Tutoria Processing Library
//!
//! Pure utilities used by the upload pipeline: file validation, unique name
//! generation, content hashing, and image transforms (optimization and
//! thumbnail derivation). Nothing in this crate performs storage I/O.

pub mod hashing;
pub mod image;
pub mod naming;
pub mod validator;

// Re-export commonly used types
pub use hashing::content_hash;
pub use image::{generate_thumbnail, optimize, ImageOutputFormat, OptimizeOutcome};
pub use naming::{generate_unique_name, sanitize_stem};
pub use validator::{FileValidator, ValidationError};
