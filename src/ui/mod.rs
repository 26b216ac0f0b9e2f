pub mod actions;
pub mod key_mapper;
pub mod table_render_context;
pub mod table_renderer;
pub mod tui_app;
