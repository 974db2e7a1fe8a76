//! Resolution between the caller-facing course code and the upstream relationship keys.
//!
//! A course code is assumed to identify a single offering and a `(student, offering)` pair is
//! assumed to be linked by at most one enrollment. Neither assumption is verified here: when
//! the upstream holds duplicates, the first match in collection order wins.
use crate::model::{CourseOffering, Enrollment};

/// Returns the offering whose `course_code` equals `course_code`.
pub fn resolve_offering<'a>(
    course_code: &str,
    offerings: &'a [CourseOffering],
) -> Option<&'a CourseOffering> {
    offerings
        .iter()
        .find(|offering| offering.course_code == course_code)
}

/// Returns the offering whose `offering_id` equals `offering_id`.
pub fn resolve_offering_by_id<'a>(
    offering_id: &str,
    offerings: &'a [CourseOffering],
) -> Option<&'a CourseOffering> {
    offerings
        .iter()
        .find(|offering| offering.offering_id == offering_id)
}

/// Returns the enrollment linking `student_id` to `offering_id`.
pub fn resolve_enrollment<'a>(
    student_id: &str,
    offering_id: &str,
    enrollments: &'a [Enrollment],
) -> Option<&'a Enrollment> {
    enrollments
        .iter()
        .find(|enrollment| enrollment.links(student_id, offering_id))
}
