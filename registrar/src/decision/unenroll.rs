use crate::decision::{Change, Decision, EnrollmentError, EnrollmentRequest, Roster};
use crate::model::CourseOffering;
use crate::resolver::resolve_enrollment;

/// Removes the enrollment linking a student to the offering behind a course code.
///
/// Absence is observable: once the enrollment is gone a repeated unenroll reports
/// `EnrollmentNotFound` instead of succeeding again.
#[derive(Debug, Clone)]
pub struct Unenroll {
    request: EnrollmentRequest,
}

impl Unenroll {
    pub fn new(request: EnrollmentRequest) -> Self {
        Self { request }
    }
}

impl Decision for Unenroll {
    fn name(&self) -> &'static str {
        "unenroll"
    }

    fn request(&self) -> &EnrollmentRequest {
        &self.request
    }

    fn process(
        &self,
        offering: &CourseOffering,
        roster: &Roster,
    ) -> Result<Change, EnrollmentError> {
        resolve_enrollment(
            &self.request.student_id,
            &offering.offering_id,
            &roster.enrollments,
        )
        .cloned()
        .map(Change::Delete)
        .ok_or(EnrollmentError::EnrollmentNotFound)
    }
}
