//! State components
//!
//! The pieces of table state with a lifecycle of their own, orchestrated
//! by [`crate::table_view::TableView`].

pub mod edit_session;
pub mod events;
pub mod row_actions;
pub mod selection;
