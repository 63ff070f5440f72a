pub mod app_state;
pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod list_view;
pub mod llm;
pub mod mail;
pub mod retry;
