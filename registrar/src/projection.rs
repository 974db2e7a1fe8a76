//! Projection of coordinator outcomes into the response contract.
//!
//! Everything here is a pure mapping: no I/O and no further validation.
use serde::{Deserialize, Serialize};

use crate::decision::EnrollmentError;
use crate::error::Error;
use crate::model::{CourseCode, CourseOffering, Enrollment, StudentId};

/// A course as seen by an enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub id: CourseCode,
    pub title: String,
    pub description: String,
    pub instructor: String,
    /// Seats available when the offering was read, before this enrollment.
    pub seats: i32,
    #[serde(with = "crate::model::date_format")]
    pub enrollment_date: chrono::NaiveDate,
    /// Left out until the enrollment is graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl EnrolledCourse {
    pub fn project(offering: &CourseOffering, enrollment: &Enrollment) -> Self {
        Self {
            id: offering.course_code.clone(),
            title: offering.course_name.clone(),
            description: format!(
                "{} - {} {}",
                offering.course_code, offering.semester, offering.year
            ),
            instructor: offering.instructor.clone(),
            seats: offering.available_seats,
            enrollment_date: enrollment.enrollment_date,
            grade: enrollment.grade.clone(),
        }
    }
}

/// Confirmation of a removed enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unenrolled {
    pub message: String,
    pub course_id: CourseCode,
    pub user_id: StudentId,
}

impl Unenrolled {
    pub fn project(student_id: &str, course_code: &str) -> Self {
        Self {
            message: "Enrollment deleted successfully".to_string(),
            course_id: course_code.to_string(),
            user_id: student_id.to_string(),
        }
    }
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl Error {
    /// The HTTP status the failure is reported with.
    pub fn status(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::Domain(EnrollmentError::CourseFull) => 400,
            Error::Domain(EnrollmentError::AlreadyEnrolled) => 409,
            Error::Domain(
                EnrollmentError::CourseNotFound
                | EnrollmentError::StudentNotFound
                | EnrollmentError::EnrollmentNotFound,
            ) => 404,
            Error::Unauthorized => 401,
            Error::UpstreamUnavailable(_)
            | Error::EnrollmentFailed(_)
            | Error::UnenrollmentFailed(_) => 500,
        }
    }
}
