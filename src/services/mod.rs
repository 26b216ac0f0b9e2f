//! Service layer
//!
//! Work that sits between the table state and the outside world.

pub mod data_loader_service;
