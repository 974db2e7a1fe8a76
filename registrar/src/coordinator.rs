//! The coordinator executes enrollment decisions against the directory.
//!
//! Each operation is one strictly ordered sequence: read, resolve, judge, mutate at most once.
//! Nothing is shared between invocations apart from the identifier minter, and concurrent
//! invocations are not synchronized against each other.
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::credential::Caller;
use crate::decision::{
    Change, Decision, Enroll, EnrollmentError, EnrollmentRequest, Roster, Unenroll,
};
use crate::directory::{Directory, DirectoryError};
use crate::error::Error;
use crate::identifier::EnrollmentIdMinter;
use crate::model::{CourseOffering, Enrollment};
use crate::projection::{EnrolledCourse, Unenrolled};
use crate::resolver::{resolve_offering, resolve_offering_by_id};

/// The outcome of an applied decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDecision {
    offering: CourseOffering,
    enrollment: Enrollment,
}

impl AppliedDecision {
    /// Returns the offering as it was read before the change.
    pub fn offering(&self) -> &CourseOffering {
        &self.offering
    }

    /// Returns the enrollment created or deleted by the change.
    pub fn enrollment(&self) -> &Enrollment {
        &self.enrollment
    }
}

/// Executes enrollment decisions.
#[derive(Clone)]
pub struct Coordinator<D> {
    directory: D,
    minter: Arc<EnrollmentIdMinter>,
}

impl<D: Directory> Coordinator<D> {
    /// Creates a new instance of `Coordinator`.
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            minter: Arc::new(EnrollmentIdMinter::new()),
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Enrolls the student in the offering behind the course code.
    pub async fn enroll(
        &self,
        request: EnrollmentRequest,
        caller: Caller<'_>,
    ) -> Result<EnrolledCourse, Error> {
        let applied = self.make(&Enroll::new(request), caller).await?;
        Ok(EnrolledCourse::project(applied.offering(), applied.enrollment()))
    }

    /// Removes the student's enrollment in the offering behind the course code.
    pub async fn unenroll(
        &self,
        request: EnrollmentRequest,
        caller: Caller<'_>,
    ) -> Result<Unenrolled, Error> {
        let applied = self.make(&Unenroll::new(request), caller).await?;
        Ok(Unenrolled::project(
            &applied.enrollment().student_id,
            &applied.offering().course_code,
        ))
    }

    /// Makes the given decision.
    ///
    /// Hydrates the offerings, resolves and admits the offering, hydrates the roster the
    /// decision asks for, processes it and applies the resulting change with a single
    /// upstream call. Any failure is logged once here; a rejected credential also revokes the
    /// caller's session.
    #[instrument(
        skip_all,
        fields(
            operation = decision.name(),
            student_id = %decision.request().student_id,
            course_code = %decision.request().course_code,
        )
    )]
    pub async fn make<DC: Decision>(
        &self,
        decision: &DC,
        caller: Caller<'_>,
    ) -> Result<AppliedDecision, Error> {
        let result = self.try_make(decision, caller).await;
        match &result {
            Ok(applied) => info!(
                enrollment_id = %applied.enrollment.enrollment_id,
                offering_id = %applied.offering.offering_id,
                "{} applied",
                decision.name()
            ),
            Err(err) => report(decision.name(), err, caller),
        }
        result
    }

    async fn try_make<DC: Decision>(
        &self,
        decision: &DC,
        caller: Caller<'_>,
    ) -> Result<AppliedDecision, Error> {
        let request = decision.request();
        if !request.is_complete() {
            return Err(Error::missing_identifiers());
        }
        let credential = caller.credential();

        let offerings = self.directory.offerings(credential).await.map_err(Error::read)?;
        let offering = resolve_offering(&request.course_code, &offerings)
            .cloned()
            .ok_or(EnrollmentError::CourseNotFound)?;
        decision.admit(&offering)?;

        let roster = self.roster(decision, caller).await?;
        let change = decision.process(&offering, &roster)?;

        let enrollment = match change {
            Change::Create {
                student_id,
                offering_id,
            } => {
                let enrollment = Enrollment {
                    enrollment_id: self.minter.mint(&roster.enrollments),
                    student_id,
                    offering_id,
                    enrollment_date: Utc::now().date_naive(),
                    grade: None,
                };
                self.directory
                    .create_enrollment(credential, &enrollment)
                    .await
                    .map_err(|err| mutation_failed(err, Error::EnrollmentFailed))?;
                enrollment
            }
            Change::Delete(enrollment) => {
                self.directory
                    .delete_enrollment(credential, &enrollment.enrollment_id)
                    .await
                    .map_err(|err| mutation_failed(err, Error::UnenrollmentFailed))?;
                enrollment
            }
        };

        Ok(AppliedDecision {
            offering,
            enrollment,
        })
    }

    async fn roster<DC: Decision>(
        &self,
        decision: &DC,
        caller: Caller<'_>,
    ) -> Result<Roster, Error> {
        let credential = caller.credential();
        let enrollments = self
            .directory
            .enrollments(credential)
            .await
            .map_err(Error::read)?;
        let students = if decision.roster_query().includes_students() {
            self.directory.students(credential).await.map_err(Error::read)?
        } else {
            vec![]
        };
        Ok(Roster {
            enrollments,
            students,
        })
    }

    /// Lists the courses the student is enrolled in.
    ///
    /// Offerings are only fetched when the student has at least one enrollment. Enrollments
    /// pointing at an offering that no longer exists are left out.
    #[instrument(skip(self, caller))]
    pub async fn enrolled_courses(
        &self,
        student_id: &str,
        caller: Caller<'_>,
    ) -> Result<Vec<EnrolledCourse>, Error> {
        let result = self.try_enrolled_courses(student_id, caller).await;
        if let Err(err) = &result {
            report("enrolled_courses", err, caller);
        }
        result
    }

    async fn try_enrolled_courses(
        &self,
        student_id: &str,
        caller: Caller<'_>,
    ) -> Result<Vec<EnrolledCourse>, Error> {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(Error::InvalidRequest("User ID is required".to_string()));
        }
        let credential = caller.credential();

        let enrollments: Vec<Enrollment> = self
            .directory
            .enrollments(credential)
            .await
            .map_err(Error::read)?
            .into_iter()
            .filter(|enrollment| enrollment.student_id == student_id)
            .collect();
        if enrollments.is_empty() {
            return Ok(vec![]);
        }

        let offerings = self.directory.offerings(credential).await.map_err(Error::read)?;
        Ok(enrollments
            .iter()
            .filter_map(|enrollment| {
                resolve_offering_by_id(&enrollment.offering_id, &offerings)
                    .map(|offering| EnrolledCourse::project(offering, enrollment))
            })
            .collect())
    }
}

fn mutation_failed(err: DirectoryError, failed: fn(DirectoryError) -> Error) -> Error {
    if err.is_unauthorized() {
        Error::Unauthorized
    } else {
        failed(err)
    }
}

fn report(operation: &str, err: &Error, caller: Caller<'_>) {
    if matches!(err, Error::Unauthorized) {
        caller.revoke();
    }
    if err.is_caller_error() {
        warn!(operation, error = %err, "{operation} rejected");
    } else {
        error!(operation, error = %err, "{operation} failed");
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use mockall::{mock, predicate::eq};

    use super::*;
    use crate::credential::{Credential, MemorySession, SessionStore};
    use crate::model::{EnrollmentId, Student};
    use crate::testing::{enrollment, offering, student};

    mock! {
        Upstream {}
        #[async_trait]
        impl Directory for Upstream {
            async fn offerings(&self, credential: &Credential) -> Result<Vec<CourseOffering>, DirectoryError>;
            async fn enrollments(&self, credential: &Credential) -> Result<Vec<Enrollment>, DirectoryError>;
            async fn students(&self, credential: &Credential) -> Result<Vec<Student>, DirectoryError>;
            async fn create_enrollment(&self, credential: &Credential, enrollment: &Enrollment) -> Result<(), DirectoryError>;
            async fn delete_enrollment(&self, credential: &Credential, enrollment_id: &EnrollmentId) -> Result<(), DirectoryError>;
        }
    }

    fn request(student_id: &str, course_code: &str) -> EnrollmentRequest {
        EnrollmentRequest::new(student_id, course_code)
    }

    #[tokio::test]
    async fn it_enrolls_with_a_fresh_enrollment_dated_today() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .once()
            .returning(|_| Ok(vec![offering("O1", "CS101", 1)]));
        directory
            .expect_enrollments()
            .once()
            .returning(|_| Ok(vec![]));
        directory
            .expect_students()
            .once()
            .returning(|_| Ok(vec![student("S1")]));
        directory
            .expect_create_enrollment()
            .once()
            .withf(|credential, enrollment| {
                credential.header_value() == "Bearer t"
                    && enrollment.student_id == "S1"
                    && enrollment.offering_id == "O1"
                    && enrollment.enrollment_id.starts_with('E')
                    && enrollment.grade.is_none()
            })
            .returning(|_, _| Ok(()));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::new("Bearer t");

        let course = coordinator
            .enroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await
            .unwrap();

        assert_eq!(course.id, "CS101");
        assert_eq!(course.seats, 1);
        assert_eq!(course.enrollment_date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn it_should_not_create_an_enrollment_in_a_full_course() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .once()
            .returning(|_| Ok(vec![offering("O1", "CS101", 0)]));
        directory.expect_enrollments().never();
        directory.expect_students().never();
        directory.expect_create_enrollment().never();
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let result = coordinator
            .enroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(
            result,
            Err(Error::Domain(EnrollmentError::CourseFull))
        ));
    }

    #[tokio::test]
    async fn it_should_not_fetch_enrollments_for_an_unknown_course() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .once()
            .returning(|_| Ok(vec![offering("O1", "CS101", 3)]));
        directory.expect_enrollments().never();
        directory.expect_create_enrollment().never();
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let result = coordinator
            .enroll(request("S1", "MA201"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(
            result,
            Err(Error::Domain(EnrollmentError::CourseNotFound))
        ));
    }

    #[tokio::test]
    async fn it_should_not_call_the_upstream_for_an_incomplete_request() {
        let mut directory = MockUpstream::new();
        directory.expect_offerings().never();
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let result = coordinator
            .unenroll(request("", "CS101"), Caller::new(&credential, &session))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(err.to_string(), "User ID and Course ID are required");
    }

    #[tokio::test]
    async fn it_deletes_the_matching_enrollment_exactly_once() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .once()
            .returning(|_| Ok(vec![offering("O1", "CS101", 1)]));
        directory
            .expect_enrollments()
            .once()
            .returning(|_| Ok(vec![enrollment("E1", "S1", "O1")]));
        directory.expect_students().never();
        directory
            .expect_delete_enrollment()
            .once()
            .with(mockall::predicate::always(), eq("E1".to_string()))
            .returning(|_, _| Ok(()));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let unenrolled = coordinator
            .unenroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await
            .unwrap();

        assert_eq!(unenrolled, Unenrolled::project("S1", "CS101"));
    }

    #[tokio::test]
    async fn it_reports_a_rejected_create_as_enrollment_failed() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .returning(|_| Ok(vec![offering("O1", "CS101", 1)]));
        directory.expect_enrollments().returning(|_| Ok(vec![]));
        directory
            .expect_students()
            .returning(|_| Ok(vec![student("S1")]));
        directory
            .expect_create_enrollment()
            .once()
            .returning(|_, _| Err(DirectoryError::Status(500)));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let result = coordinator
            .enroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(
            result,
            Err(Error::EnrollmentFailed(DirectoryError::Status(500)))
        ));
    }

    #[tokio::test]
    async fn it_reports_a_rejected_delete_as_unenrollment_failed() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .returning(|_| Ok(vec![offering("O1", "CS101", 1)]));
        directory
            .expect_enrollments()
            .returning(|_| Ok(vec![enrollment("E1", "S1", "O1")]));
        directory
            .expect_delete_enrollment()
            .once()
            .returning(|_, _| Err(DirectoryError::Status(503)));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let result = coordinator
            .unenroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(
            result,
            Err(Error::UnenrollmentFailed(DirectoryError::Status(503)))
        ));
    }

    #[tokio::test]
    async fn it_reports_a_failed_read_as_upstream_unavailable() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .once()
            .returning(|_| Err(DirectoryError::Status(502)));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let result = coordinator
            .unenroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(result, Err(Error::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn it_revokes_the_session_when_the_upstream_rejects_the_credential() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .once()
            .returning(|_| Ok(vec![offering("O1", "CS101", 1)]));
        directory
            .expect_enrollments()
            .once()
            .returning(|_| Err(DirectoryError::Unauthorized));
        directory.expect_delete_enrollment().never();
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::new(Some("expired".into()));
        let credential = Credential::resolve(None, &session);

        let result = coordinator
            .unenroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(result, Err(Error::Unauthorized)));
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn it_surfaces_an_unauthorized_create_as_unauthorized() {
        let mut directory = MockUpstream::new();
        directory
            .expect_offerings()
            .returning(|_| Ok(vec![offering("O1", "CS101", 1)]));
        directory.expect_enrollments().returning(|_| Ok(vec![]));
        directory
            .expect_students()
            .returning(|_| Ok(vec![student("S1")]));
        directory
            .expect_create_enrollment()
            .once()
            .returning(|_, _| Err(DirectoryError::Unauthorized));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::new(Some("expired".into()));
        let credential = Credential::resolve(None, &session);

        let result = coordinator
            .enroll(request("S1", "CS101"), Caller::new(&credential, &session))
            .await;

        assert!(matches!(result, Err(Error::Unauthorized)));
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn it_lists_enrolled_courses_without_fetching_offerings_when_there_are_none() {
        let mut directory = MockUpstream::new();
        directory
            .expect_enrollments()
            .once()
            .returning(|_| Ok(vec![enrollment("E1", "S2", "O1")]));
        directory.expect_offerings().never();
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let courses = coordinator
            .enrolled_courses("S1", Caller::new(&credential, &session))
            .await
            .unwrap();

        assert!(courses.is_empty());
    }

    #[tokio::test]
    async fn it_lists_enrolled_courses_skipping_vanished_offerings() {
        let mut directory = MockUpstream::new();
        directory.expect_enrollments().once().returning(|_| {
            Ok(vec![
                enrollment("E1", "S1", "O1"),
                enrollment("E2", "S1", "O9"),
                enrollment("E3", "S2", "O2"),
            ])
        });
        directory
            .expect_offerings()
            .once()
            .returning(|_| Ok(vec![offering("O1", "CS101", 4), offering("O2", "CS102", 4)]));
        let coordinator = Coordinator::new(directory);
        let session = MemorySession::default();
        let credential = Credential::default();

        let courses = coordinator
            .enrolled_courses("S1", Caller::new(&credential, &session))
            .await
            .unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, "CS101");
        assert_eq!(courses[0].seats, 4);
    }
}
