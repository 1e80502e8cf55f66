//! Bookswap
//!
//! REST backend for a peer-to-peer book exchange and loan marketplace:
//! users list books, request exchanges or loans from each other, message,
//! rate counterparties and receive notifications.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
