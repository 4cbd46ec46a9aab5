//! Error taxonomy for text-generation calls.

use thiserror::Error;

/// Failure of a generation call itself. Never raised for a call that
/// succeeded but produced unexpected text; interpreting content is the
/// caller's job.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Connection, DNS, or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider answered 2xx but the payload carried no usable text.
    #[error("unusable provider response: {0}")]
    Malformed(String),
}
