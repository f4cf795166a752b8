// src/lib.rs

pub mod api;
pub mod app;
pub mod chat_message;
pub mod config;
pub mod constants;
pub mod errors;
pub mod highlight;
pub mod key_handlers;
pub mod logging;
pub mod markdown;
pub mod math;
pub mod models;
pub mod session;
pub mod status_indicator;
pub mod ui;

pub use app::{App, AppState};
pub use errors::{ChatError, ChatResult};
