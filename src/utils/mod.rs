//! Utility modules for error handling, configuration and library layout

pub mod config;
pub mod error;
pub mod organizer;

// Re-export for convenience
pub use config::{AppConfig, CONFIG_FILE_NAME};
pub use error::VodError;
pub use organizer::{destination_path, sanitize_path, sanitize_segment};
