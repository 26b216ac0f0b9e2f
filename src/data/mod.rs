//! Data layer
//!
//! The record store plus the pure derivations the table is drawn from:
//! the filtered view and the page window.

pub mod pager;
pub mod record;
pub mod store;
pub mod view_filter;
