//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod advice;
pub mod principles;

// Re-export all handlers for use in router
pub use advice::*;
pub use principles::*;
