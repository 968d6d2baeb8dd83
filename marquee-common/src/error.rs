//! Common error types for marquee

use thiserror::Error;

/// Common result type for marquee operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across marquee crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
