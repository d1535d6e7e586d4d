//! Error types for census-query.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for census-query operations.
#[derive(Error, Debug)]
pub enum CensusError {
    /// Unrecognised geography resolution. Ends the whole session.
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    /// Provider API errors (transport failures, HTTP status, malformed responses)
    #[error("API error: {0}")]
    Api(String),

    /// Area name or code lookups that found nothing
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Prompt input errors (closed stdin, exhausted script, etc.)
    #[error("Input error: {0}")]
    Input(String),

    /// Configuration errors (invalid config file, bad CLI combination, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors while writing cached artifacts
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CensusError {
    /// Creates an invalid-resolution error for the given token.
    pub fn invalid_resolution(token: impl Into<String>) -> Self {
        Self::InvalidResolution(token.into())
    }

    /// Creates an API error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Creates a lookup error with the given message.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Creates an input error with the given message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidResolution(_) => "Invalid Resolution",
            Self::Api(_) => "API Error",
            Self::Lookup(_) => "Lookup Error",
            Self::Input(_) => "Input Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for errors that must terminate the session outright.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidResolution(_))
    }
}

/// Result type alias using CensusError.
pub type Result<T> = std::result::Result<T, CensusError>;
