//! # Error Types
//!
//! This module defines the single error type for chart merging.
//!
//! Every variant is a precondition violation detected at the start of the
//! offending operation, so a failed call never leaves a half-transformed chart
//! behind.
//!
//! ## Error Groups
//! - Algebra: `InvalidTempo`, `InvalidSpeed`, `InvalidSongLength`,
//!   `MalformedHold`, `ClipRangeInvalid`
//! - Decoding: `MissingField`, `InvalidValue`, `MissingHoldTail`, `Xml`, `Json`
//! - Orchestration: `Config`, `Io`
//!
//! ## Usage
//! ```rust
//! use dymerge::{Chart, MergeError};
//!
//! let chart = Chart::new(0.0);
//! match chart.change_bpm(120.0) {
//!     Err(MergeError::InvalidTempo(tempo)) => eprintln!("bad tempo {}", tempo),
//!     Err(e) => eprintln!("Error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Tempo is zero, negative or not finite.
    ///
    /// Rescaling divides by the tempo, so every retime and concatenation
    /// rejects such a chart up front.
    ///
    /// # Example
    /// ```
    /// # use dymerge::MergeError;
    /// let err = MergeError::InvalidTempo(0.0);
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid tempo: 0 (must be a positive number of bars per minute)"
    /// );
    /// ```
    #[error("Invalid tempo: {0} (must be a positive number of bars per minute)")]
    InvalidTempo(f64),

    /// Playback speed factor is zero, negative or not finite.
    #[error("Invalid speed factor: {0} (must be positive)")]
    InvalidSpeed(f64),

    /// Song length handed to a concatenation is negative or not finite.
    #[error("Invalid song length: {0}s (must be a non-negative number of seconds)")]
    InvalidSongLength(f64),

    /// A note ends before it starts.
    ///
    /// Construction clamps `end` to `start`, so this only fires when a note was
    /// edited by hand after construction.
    ///
    /// # Example
    /// ```
    /// # use dymerge::MergeError;
    /// let err = MergeError::MalformedHold { index: 3, start: 5.0, end: 2.0 };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Malformed hold at note 3: ends at bar 2 before it starts at bar 5"
    /// );
    /// ```
    #[error("Malformed hold at note {index}: ends at bar {end} before it starts at bar {start}")]
    MalformedHold { index: usize, start: f64, end: f64 },

    /// Clip window ends before it starts.
    #[error("Invalid clip range: end {end} is before start {start}")]
    ClipRangeInvalid { start: f64, end: f64 },

    /// A required key is absent from a chart document.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A key is present but its value has the wrong shape.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A hold head points at a tail id that does not exist.
    #[error("Hold note {id} refers to missing tail {sub_id}")]
    MissingHoldTail { id: i64, sub_id: i64 },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid merge plan.
    #[error("Invalid merge plan: {0}")]
    Config(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}
