//! Utilities for testing decisions and coordinators.
//!
//! The test harness allows you to set up the upstream collections, perform the given decision,
//! and make assertions about the resulting change. The in-memory directory stands in for the
//! upstream service when a whole operation has to be exercised.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::credential::Credential;
use crate::decision::{Change, Decision, EnrollmentError, Roster};
use crate::directory::{Directory, DirectoryError};
use crate::model::{CourseOffering, Enrollment, EnrollmentId, Student};
use crate::resolver::resolve_offering;

/// Test harness for testing decisions.
pub struct TestHarness;

impl TestHarness {
    /// Sets up the upstream collections.
    ///
    /// # Arguments
    ///
    /// * `offerings` - The course offerings the decision resolves against.
    /// * `enrollments` - The enrollments the decision observes.
    ///
    /// # Returns
    ///
    /// A `TestHarnessStep` representing the "given" step.
    pub fn given(
        offerings: impl Into<Vec<CourseOffering>>,
        enrollments: impl Into<Vec<Enrollment>>,
    ) -> TestHarnessStep<Given> {
        TestHarnessStep {
            step: Given {
                offerings: offerings.into(),
                roster: Roster {
                    enrollments: enrollments.into(),
                    students: vec![],
                },
            },
        }
    }
}

/// Represents the given step of the test harness.
pub struct Given {
    offerings: Vec<CourseOffering>,
    roster: Roster,
}

/// Represents when step of the test harness.
pub struct When {
    result: Result<Change, EnrollmentError>,
}

pub struct TestHarnessStep<ST> {
    step: ST,
}

impl TestHarnessStep<Given> {
    /// Adds the students the decision can observe.
    pub fn with_students(mut self, students: impl Into<Vec<Student>>) -> Self {
        self.step.roster.students = students.into();
        self
    }

    /// Executes a decision on the given collections.
    ///
    /// The offering is resolved and admitted before the roster is handed to the decision,
    /// in the same order the coordinator follows.
    pub fn when<D: Decision>(self, decision: D) -> TestHarnessStep<When> {
        let Given {
            offerings,
            mut roster,
        } = self.step;
        if !decision.roster_query().includes_students() {
            roster.students.clear();
        }
        let result = resolve_offering(&decision.request().course_code, &offerings)
            .ok_or(EnrollmentError::CourseNotFound)
            .and_then(|offering| {
                decision.admit(offering)?;
                decision.process(offering, &roster)
            });
        TestHarnessStep {
            step: When { result },
        }
    }
}

impl TestHarnessStep<When> {
    /// Makes assertions about the change.
    ///
    /// # Panics
    ///
    /// Panics if the decision failed or if the change does not match the expected change.
    #[track_caller]
    pub fn then(self, expected: Change) {
        assert_eq!(Ok(expected), self.step.result);
    }

    /// Makes assertions about the expected error result.
    ///
    /// # Panics
    ///
    /// Panics if the decision succeeded or if the error does not match the expected error.
    #[track_caller]
    pub fn then_err(self, expected: EnrollmentError) {
        assert_eq!(Err(expected), self.step.result);
    }
}

/// The directory operations, used to inspect and script the in-memory directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchOfferings,
    FetchEnrollments,
    FetchStudents,
    CreateEnrollment,
    DeleteEnrollment,
}

/// A call received by the in-memory directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub credential: String,
    /// The enrollment id a mutation targeted.
    pub target: Option<EnrollmentId>,
}

#[derive(Debug, Default)]
struct Upstream {
    offerings: Vec<CourseOffering>,
    enrollments: Vec<Enrollment>,
    students: Vec<Student>,
    calls: Vec<Call>,
    failures: HashMap<Operation, u16>,
    required_credential: Option<String>,
    enforce_capacity: bool,
}

/// Directory backed by in-process collections.
///
/// Like the real service it performs no integrity checks: duplicate enrollments are stored
/// and seat counters are left untouched, unless capacity enforcement is switched on.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    upstream: Mutex<Upstream>,
}

impl InMemoryDirectory {
    pub fn new(
        offerings: impl Into<Vec<CourseOffering>>,
        enrollments: impl Into<Vec<Enrollment>>,
        students: impl Into<Vec<Student>>,
    ) -> Self {
        Self {
            upstream: Mutex::new(Upstream {
                offerings: offerings.into(),
                enrollments: enrollments.into(),
                students: students.into(),
                ..Default::default()
            }),
        }
    }

    /// Rejects every call whose credential differs from `header_value` with `401`.
    pub fn require_credential(self, header_value: &str) -> Self {
        self.lock().required_credential = Some(header_value.to_string());
        self
    }

    /// Makes the upstream own the seat counter: a create takes a seat and is refused with
    /// `409` when none is left, a delete gives the seat back.
    pub fn enforce_capacity(self) -> Self {
        self.lock().enforce_capacity = true;
        self
    }

    /// Answers every subsequent `operation` with `status`.
    pub fn fail(&self, operation: Operation, status: u16) {
        self.lock().failures.insert(operation, status);
    }

    /// The offerings as currently stored, seat counters included.
    pub fn stored_offerings(&self) -> Vec<CourseOffering> {
        self.lock().offerings.clone()
    }

    pub fn stored_enrollments(&self) -> Vec<Enrollment> {
        self.lock().enrollments.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Counts the calls received for `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Upstream> {
        self.upstream.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn receive(
        &self,
        operation: Operation,
        credential: &Credential,
        target: Option<&str>,
    ) -> Result<std::sync::MutexGuard<'_, Upstream>, DirectoryError> {
        let mut upstream = self.lock();
        upstream.calls.push(Call {
            operation,
            credential: credential.header_value().to_string(),
            target: target.map(str::to_string),
        });
        if let Some(required) = &upstream.required_credential {
            if required != credential.header_value() {
                return Err(DirectoryError::Unauthorized);
            }
        }
        if let Some(status) = upstream.failures.get(&operation) {
            return Err(DirectoryError::from_status(*status));
        }
        Ok(upstream)
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn offerings(
        &self,
        credential: &Credential,
    ) -> Result<Vec<CourseOffering>, DirectoryError> {
        let upstream = self.receive(Operation::FetchOfferings, credential, None)?;
        Ok(upstream.offerings.clone())
    }

    async fn enrollments(&self, credential: &Credential) -> Result<Vec<Enrollment>, DirectoryError> {
        let upstream = self.receive(Operation::FetchEnrollments, credential, None)?;
        Ok(upstream.enrollments.clone())
    }

    async fn students(&self, credential: &Credential) -> Result<Vec<Student>, DirectoryError> {
        let upstream = self.receive(Operation::FetchStudents, credential, None)?;
        Ok(upstream.students.clone())
    }

    async fn create_enrollment(
        &self,
        credential: &Credential,
        enrollment: &Enrollment,
    ) -> Result<(), DirectoryError> {
        let mut upstream = self.receive(
            Operation::CreateEnrollment,
            credential,
            Some(&enrollment.enrollment_id),
        )?;
        if upstream.enforce_capacity {
            let offering = upstream
                .offerings
                .iter_mut()
                .find(|offering| offering.offering_id == enrollment.offering_id)
                .ok_or(DirectoryError::Status(404))?;
            if !offering.has_open_seats() {
                return Err(DirectoryError::Status(409));
            }
            offering.available_seats -= 1;
        }
        upstream.enrollments.push(enrollment.clone());
        Ok(())
    }

    async fn delete_enrollment(
        &self,
        credential: &Credential,
        enrollment_id: &EnrollmentId,
    ) -> Result<(), DirectoryError> {
        let mut upstream =
            self.receive(Operation::DeleteEnrollment, credential, Some(enrollment_id))?;
        let removed: Vec<Enrollment> = upstream
            .enrollments
            .iter()
            .filter(|enrollment| &enrollment.enrollment_id == enrollment_id)
            .cloned()
            .collect();
        upstream
            .enrollments
            .retain(|enrollment| &enrollment.enrollment_id != enrollment_id);
        if upstream.enforce_capacity {
            for enrollment in removed {
                if let Some(offering) = upstream
                    .offerings
                    .iter_mut()
                    .find(|offering| offering.offering_id == enrollment.offering_id)
                {
                    offering.available_seats += 1;
                }
            }
        }
        Ok(())
    }
}

/// Builds an offering with placeholder descriptive fields.
pub fn offering(offering_id: &str, course_code: &str, available_seats: i32) -> CourseOffering {
    CourseOffering {
        offering_id: offering_id.to_string(),
        course_code: course_code.to_string(),
        course_name: format!("{course_code} course"),
        instructor: "Dr. Hopper".to_string(),
        semester: "Fall".to_string(),
        year: 2024,
        available_seats,
    }
}

/// Builds an ungraded enrollment dated 2024-09-03.
pub fn enrollment(enrollment_id: &str, student_id: &str, offering_id: &str) -> Enrollment {
    Enrollment {
        enrollment_id: enrollment_id.to_string(),
        student_id: student_id.to_string(),
        offering_id: offering_id.to_string(),
        enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap_or_default(),
        grade: None,
    }
}

pub fn student(student_id: &str) -> Student {
    Student {
        student_id: student_id.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        status: "active".to_string(),
        program_id: "P1".to_string(),
        enrolled_courses: vec![],
        completed_courses: vec![],
    }
}
