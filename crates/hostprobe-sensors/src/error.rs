//! Error types for the host sensors library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while taking a measurement.
#[derive(Error, Debug)]
pub enum Error {
    /// The provider has nothing to measure (no battery, no input device).
    #[error("{0}")]
    Unavailable(String),

    /// An external utility could not be started.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Provider output did not contain the expected value.
    #[error("{0}")]
    Parse(String),

    /// OS battery API error.
    #[error("battery provider error: {0}")]
    Battery(String),

    /// Audio capture error.
    #[error("audio capture error: {0}")]
    Audio(String),

    /// CPU counter error.
    #[error("CPU counter error: {0}")]
    Cpu(String),

    /// Spectrum sink error.
    #[error("spectrum plot error: {0}")]
    Plot(String),
}
