//! Image transform utilities
//!
//! Best-effort optimization (bounded downscale + quality re-encode) and
//! cover-fit thumbnail derivation. Both operations are non-blocking for the
//! upload: optimization falls back to the original bytes, thumbnails fall
//! back to `None`.

pub mod optimizer;
pub mod thumbnail;

pub use optimizer::{optimize, ImageOutputFormat, OptimizeOutcome};
pub use thumbnail::generate_thumbnail;
