//! Error types for Saathi

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the ML service. Carries the status code and
    /// the response body verbatim so callers can decide whether to surface the
    /// outage or switch to the statistical fallback.
    #[error("ML service error {status}: {body}")]
    MlService { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, Error>;
