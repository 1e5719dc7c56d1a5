//! Client for the external Domino recruitment-data API.
//!
//! Domino is consumed strictly through its documented REST interface: a
//! base URL, an API key header, and list endpoints per record category.
//! Nothing here reproduces Domino's internal behavior.

pub mod client;
pub mod types;

use thiserror::Error;

pub use client::DominoClient;
pub use types::{DominoJob, DominoLead, DominoShop, RecordCategory};

/// Errors from the Domino API client.
#[derive(Debug, Error)]
pub enum DominoError {
    /// Transport-level failure (connect, timeout, TLS, decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be built from the configured base.
    #[error("invalid Domino URL: {0}")]
    Url(#[from] url::ParseError),

    /// Domino answered with a non-success status.
    #[error("Domino API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },
}
