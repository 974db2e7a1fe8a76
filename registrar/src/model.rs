//! Records exchanged with the academic-records service.
//!
//! The shapes mirror the upstream JSON collections. Deserialization is the validation step:
//! a record with a missing or mistyped field is rejected where it enters the crate instead of
//! travelling further as a partially filled value.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type StudentId = String;
pub type OfferingId = String;
pub type EnrollmentId = String;
pub type CourseCode = String;

/// A scheduled instance of a course.
///
/// `available_seats` is owned by the upstream service. It is read to decide whether a new
/// enrollment is admissible and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub offering_id: OfferingId,
    pub course_code: CourseCode,
    pub course_name: String,
    pub instructor: String,
    pub semester: String,
    pub year: i32,
    pub available_seats: i32,
}

impl CourseOffering {
    pub fn has_open_seats(&self) -> bool {
        self.available_seats > 0
    }
}

/// The relationship between a student and an offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrollment_id: EnrollmentId,
    pub student_id: StudentId,
    pub offering_id: OfferingId,
    #[serde(with = "date_format")]
    pub enrollment_date: NaiveDate,
    pub grade: Option<String>,
}

impl Enrollment {
    /// Returns `true` when this record links `student_id` to `offering_id`.
    pub fn links(&self, student_id: &str, offering_id: &str) -> bool {
        self.student_id == student_id && self.offering_id == offering_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub program_id: String,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    #[serde(default)]
    pub completed_courses: Vec<String>,
}

/// Enrollment dates are written as `YYYY-MM-DD`.
///
/// The upstream also stores ISO datetimes such as `2024-09-03T10:15:30.123456` in the same
/// field; those are read as their date.
pub(crate) mod date_format {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";
    const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).map_err(serde::de::Error::custom)
    }

    fn parse(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map(|at| at.date()))
    }
}
