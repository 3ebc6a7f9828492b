// Content Hub - page and media management backend

// Document store, blob store, identity and request viewer plumbing
pub mod infrastructure;

// Persisted document models
pub mod models;

// Page drafts, the save protocol and editing sessions
pub mod pages;

// Activity log, media library and dashboard
pub mod services;

// HTTP surface
pub mod api;
pub mod app_state;

// Common utilities
pub mod config;
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use error::{AppError, AppResult};
