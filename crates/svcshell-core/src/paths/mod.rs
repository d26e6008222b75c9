//! Packaged-vs-checkout detection and resource path resolution.
//!
//! The shell embeds the service when it runs from a packaged distribution
//! and spawns it when it runs from a development checkout; these helpers
//! decide which situation applies.

mod error;
mod platform;

pub use error::PathError;
pub use platform::{absolutize, is_packaged, repo_root, resource_root};
