//! Configuration module
//!
//! Settings file handling: data source, display, table behavior and
//! key bindings.

pub mod config;
