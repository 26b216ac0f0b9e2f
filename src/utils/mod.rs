//! Utility functions and helpers
//!
//! Application paths and the tracing setup shared by both front ends.

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
