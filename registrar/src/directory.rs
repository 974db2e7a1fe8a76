//! The directory is the upstream academic-records service as seen by the coordinator.
//!
//! It is designed to be implemented by different transports: the HTTP client used in
//! production and the in-memory directory used by tests. Every read returns the full,
//! unfiltered collection; there is no server-side filtering and no caching, so each
//! operation observes the upstream as it is at the time of the call.
use async_trait::async_trait;

use crate::credential::Credential;
use crate::model::{CourseOffering, Enrollment, EnrollmentId, Student};
use crate::BoxDynError;

/// Represents all the ways a directory call can fail.
#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    /// The upstream rejected the credential (`401`).
    #[error("unauthorized")]
    Unauthorized,
    /// The upstream answered with a non-success status other than `401`.
    #[error("upstream responded with status {0}")]
    Status(u16),
    /// The request never produced a response.
    #[error("upstream request failed: {0}")]
    Transport(#[source] BoxDynError),
    /// The response body does not match the expected record shape.
    #[error("malformed upstream payload: {0}")]
    Decode(#[source] BoxDynError),
}

impl DirectoryError {
    /// Maps a non-success HTTP status to the matching error.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => DirectoryError::Unauthorized,
            status => DirectoryError::Status(status),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DirectoryError::Unauthorized)
    }
}

/// The upstream academic-records service.
///
/// Each method performs exactly one authenticated call carrying `credential` as the
/// `Authorization` header.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetches every course offering.
    async fn offerings(&self, credential: &Credential)
        -> Result<Vec<CourseOffering>, DirectoryError>;

    /// Fetches every enrollment.
    async fn enrollments(&self, credential: &Credential) -> Result<Vec<Enrollment>, DirectoryError>;

    /// Fetches every student.
    async fn students(&self, credential: &Credential) -> Result<Vec<Student>, DirectoryError>;

    /// Creates an enrollment record.
    async fn create_enrollment(
        &self,
        credential: &Credential,
        enrollment: &Enrollment,
    ) -> Result<(), DirectoryError>;

    /// Deletes the enrollment record identified by `enrollment_id`.
    async fn delete_enrollment(
        &self,
        credential: &Credential,
        enrollment_id: &EnrollmentId,
    ) -> Result<(), DirectoryError>;
}
