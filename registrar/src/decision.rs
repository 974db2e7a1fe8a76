//! A Decision is the pure part of an enrollment operation.
//!
//! The coordinator hydrates what the decision asks for from the directory, lets the decision
//! judge it and then applies the single change the decision returns. Decisions never talk to
//! the upstream themselves, which keeps every rule testable against plain collections.
mod enroll;
mod unenroll;

pub use enroll::Enroll;
pub use unenroll::Unenroll;

use crate::model::{CourseCode, CourseOffering, Enrollment, OfferingId, Student, StudentId};

/// Domain failures a decision can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Course is full")]
    CourseFull,
    #[error("Student not found")]
    StudentNotFound,
    #[error("Student is already enrolled in this course")]
    AlreadyEnrolled,
    #[error("Enrollment not found")]
    EnrollmentNotFound,
}

/// The identifiers an enroll or unenroll request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub student_id: StudentId,
    pub course_code: CourseCode,
}

impl EnrollmentRequest {
    /// Builds a request from caller input. Surrounding whitespace is dropped.
    pub fn new(student_id: impl Into<StudentId>, course_code: impl Into<CourseCode>) -> Self {
        let student_id: StudentId = student_id.into();
        let course_code: CourseCode = course_code.into();
        Self {
            student_id: student_id.trim().to_string(),
            course_code: course_code.trim().to_string(),
        }
    }

    /// Returns `true` when both identifiers are present.
    pub fn is_complete(&self) -> bool {
        !self.student_id.is_empty() && !self.course_code.is_empty()
    }
}


/// The collections a decision needs once its offering has been resolved and admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterQuery {
    Enrollments,
    EnrollmentsAndStudents,
}

impl RosterQuery {
    pub fn includes_students(&self) -> bool {
        matches!(self, RosterQuery::EnrollmentsAndStudents)
    }
}

/// Snapshot of the relationship collections taken for a single decision.
///
/// `students` stays empty unless the decision asked for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub enrollments: Vec<Enrollment>,
    pub students: Vec<Student>,
}

/// The one upstream mutation a decision results in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Link the student to the offering with a freshly minted enrollment.
    Create {
        student_id: StudentId,
        offering_id: OfferingId,
    },
    /// Remove an existing enrollment.
    Delete(Enrollment),
}

/// Represents an enrollment decision taken from the upstream collections.
pub trait Decision: Send + Sync {
    /// Name used to label logs.
    fn name(&self) -> &'static str;

    /// The identifiers the decision is about.
    fn request(&self) -> &EnrollmentRequest;

    /// Checks the resolved offering before any further collection is fetched.
    ///
    /// A rejection here short-circuits the operation: the roster is never read.
    fn admit(&self, _offering: &CourseOffering) -> Result<(), EnrollmentError> {
        Ok(())
    }

    /// The collections `process` needs.
    fn roster_query(&self) -> RosterQuery {
        RosterQuery::Enrollments
    }

    /// Process the decision from the resolved offering and the roster.
    fn process(&self, offering: &CourseOffering, roster: &Roster)
        -> Result<Change, EnrollmentError>;
}
