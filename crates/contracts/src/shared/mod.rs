pub mod api;
pub mod list_view;
