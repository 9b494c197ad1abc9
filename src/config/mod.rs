// src/config/mod.rs
pub mod ai;
pub mod app;

pub use ai::AiConfig;
pub use app::{AppConfig, NewsConfig, ServerConfig};
