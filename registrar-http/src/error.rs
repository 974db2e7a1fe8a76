use thiserror::Error;

/// Represents all the ways the HTTP directory can fail to start.
///
/// Failures of individual calls are reported as `registrar::DirectoryError`.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured base URL is not an absolute `http` or `https` URL.
    #[error("invalid upstream base url `{0}`")]
    InvalidBaseUrl(String),
    /// The underlying HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}
