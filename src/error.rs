//! Errors at the host bridge
//!
//! Pagination itself never fails: bad options fall back to defaults and
//! missing host pieces turn into no-ops. Only decoding host input and
//! encoding output can go wrong.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// The rendered line list could not be decoded
    #[error("Invalid lines: {0}")]
    InvalidLines(String),

    /// A unit option bag could not be decoded
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The unit index or document flags could not be decoded
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Failed to encode output: {0}")]
    Encode(String),
}
