pub mod api_client;
pub mod classic;
pub mod config;
pub mod data;
pub mod services;
pub mod state;
pub mod table_display;
pub mod table_view;
pub mod ui;
pub mod utils;
