//! Error Types
//!
//! This module defines the error types used throughout Marionette.
//!
//! # Overview
//!
//! The main error type [`MarionetteError`] covers the failure modes that can
//! surface at the edges of the retargeting pipeline:
//! - Landmark sequence loading and decoding
//! - Settings parsing and validation
//! - Avatar selection
//!
//! Per-sample and per-bone problems never become errors. They are gated at
//! the validator or the resolver and the affected update is skipped.
//!
//! # Usage
//!
//! Fallible entry points return [`Result<T>`], an alias for
//! `std::result::Result<T, MarionetteError>`.
//!
//! ```rust,ignore
//! use marionette_core::errors::{MarionetteError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for Marionette.
#[derive(Error, Debug)]
pub enum MarionetteError {
    // ========================================================================
    // Loading Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A landmark entry could not be decoded into a point.
    #[error("Malformed landmark in frame {frame}, key `{key}`, index {index}: {reason}")]
    MalformedLandmark {
        /// Frame index within the sequence
        frame: usize,
        /// Landmark group (`pose`, `left_hand`, ...)
        key: &'static str,
        /// Index within the group
        index: usize,
        /// What was wrong with the entry
        reason: String,
    },

    /// The document is not a frame list or a `{ "frames": [...] }` object.
    #[error("Malformed landmark sequence: {0}")]
    MalformedSequence(String),

    /// The sequence contained no frames.
    #[error("Landmark sequence contains no frames")]
    EmptySequence,

    // ========================================================================
    // Avatar Errors
    // ========================================================================
    /// No avatar is registered under the requested identifier.
    #[error("Unknown avatar: {0}")]
    UnknownAvatar(String),

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// A settings value is out of range.
    #[error("Invalid settings value: {field} - {message}")]
    InvalidSettings {
        /// Dotted path of the offending field
        field: String,
        /// Why the value was rejected
        message: String,
    },
}

impl MarionetteError {
    /// Shorthand for building an [`InvalidSettings`](Self::InvalidSettings) error.
    #[must_use]
    pub fn invalid_settings(field: &str, message: &str) -> Self {
        Self::InvalidSettings {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Alias for `Result<T, MarionetteError>`.
pub type Result<T> = std::result::Result<T, MarionetteError>;
