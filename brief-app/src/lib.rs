//! Brief web application: service layer, HTML UI and axum routes.

pub mod server;
pub mod service;
pub mod ui;

pub use server::{AppState, router};
pub use service::{AppError, ArticleSummary, BriefService, CacheStats, CardOutcome};
