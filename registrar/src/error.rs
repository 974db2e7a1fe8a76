use crate::decision::EnrollmentError;
use crate::directory::DirectoryError;

/// Represents all the ways a coordinator operation can fail.
///
/// Every operation ends in exactly one of these outcomes; no partial success is reported.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request is missing an identifier.
    #[error("{0}")]
    InvalidRequest(String),
    /// A domain rule rejected the operation. No mutation was attempted.
    #[error(transparent)]
    Domain(#[from] EnrollmentError),
    /// The upstream rejected the caller's credential.
    #[error("Unauthorized")]
    Unauthorized,
    /// A read from the upstream failed.
    #[error("API error: {0}")]
    UpstreamUnavailable(#[source] DirectoryError),
    /// The upstream refused to create the enrollment.
    #[error("Enrollment failed: {0}")]
    EnrollmentFailed(#[source] DirectoryError),
    /// The upstream refused to delete the enrollment.
    #[error("Failed to delete enrollment: {0}")]
    UnenrollmentFailed(#[source] DirectoryError),
}

impl Error {
    pub(crate) fn missing_identifiers() -> Self {
        Error::InvalidRequest("User ID and Course ID are required".to_string())
    }

    /// Classifies a failed upstream read.
    pub(crate) fn read(err: DirectoryError) -> Self {
        if err.is_unauthorized() {
            Error::Unauthorized
        } else {
            Error::UpstreamUnavailable(err)
        }
    }

    /// Returns `true` when the failure is the caller's to correct.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRequest(_) | Error::Domain(_) | Error::Unauthorized
        )
    }
}
