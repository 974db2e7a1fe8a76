use crate::decision::{Change, Decision, EnrollmentError, EnrollmentRequest, Roster, RosterQuery};
use crate::model::CourseOffering;
use crate::resolver::resolve_enrollment;

/// Enrolls a student in the offering behind a course code.
///
/// The seat check is advisory. Two concurrent callers can both observe the last open seat;
/// only a capacity constraint enforced by the upstream store can settle that race.
#[derive(Debug, Clone)]
pub struct Enroll {
    request: EnrollmentRequest,
}

impl Enroll {
    pub fn new(request: EnrollmentRequest) -> Self {
        Self { request }
    }
}

impl Decision for Enroll {
    fn name(&self) -> &'static str {
        "enroll"
    }

    fn request(&self) -> &EnrollmentRequest {
        &self.request
    }

    fn admit(&self, offering: &CourseOffering) -> Result<(), EnrollmentError> {
        if !offering.has_open_seats() {
            return Err(EnrollmentError::CourseFull);
        }
        Ok(())
    }

    fn roster_query(&self) -> RosterQuery {
        RosterQuery::EnrollmentsAndStudents
    }

    fn process(
        &self,
        offering: &CourseOffering,
        roster: &Roster,
    ) -> Result<Change, EnrollmentError> {
        let student_id = &self.request.student_id;

        if resolve_enrollment(student_id, &offering.offering_id, &roster.enrollments).is_some() {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        if !roster
            .students
            .iter()
            .any(|student| &student.student_id == student_id)
        {
            return Err(EnrollmentError::StudentNotFound);
        }

        Ok(Change::Create {
            student_id: student_id.clone(),
            offering_id: offering.offering_id.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{enrollment, offering, student};
    use crate::TestHarness;

    fn enroll(student_id: &str, course_code: &str) -> Enroll {
        Enroll::new(EnrollmentRequest::new(student_id, course_code))
    }

    #[test]
    fn it_enrolls_a_student() {
        TestHarness::given([offering("O1", "CS101", 1)], [])
            .with_students([student("S1")])
            .when(enroll("S1", "CS101"))
            .then(Change::Create {
                student_id: "S1".into(),
                offering_id: "O1".into(),
            });
    }

    #[test]
    fn it_should_not_enroll_a_student_in_an_unknown_course() {
        TestHarness::given([offering("O1", "CS101", 1)], [])
            .with_students([student("S1")])
            .when(enroll("S1", "MA201"))
            .then_err(EnrollmentError::CourseNotFound);
    }

    #[test]
    fn it_should_not_enroll_a_student_in_a_full_course() {
        TestHarness::given([offering("O1", "CS101", 0)], [])
            .with_students([student("S1")])
            .when(enroll("S1", "CS101"))
            .then_err(EnrollmentError::CourseFull);
    }

    #[test]
    fn it_should_not_enroll_a_student_that_is_already_enrolled() {
        TestHarness::given(
            [offering("O1", "CS101", 4)],
            [enrollment("E1", "S1", "O1")],
        )
        .with_students([student("S1")])
        .when(enroll("S1", "CS101"))
        .then_err(EnrollmentError::AlreadyEnrolled);
    }

    #[test]
    fn it_enrolls_a_student_enrolled_in_another_offering() {
        TestHarness::given(
            [offering("O1", "CS101", 4), offering("O2", "CS102", 4)],
            [enrollment("E1", "S1", "O2"), enrollment("E2", "S2", "O1")],
        )
        .with_students([student("S1"), student("S2")])
        .when(enroll("S1", "CS101"))
        .then(Change::Create {
            student_id: "S1".into(),
            offering_id: "O1".into(),
        });
    }

    #[test]
    fn it_should_not_enroll_an_unknown_student() {
        TestHarness::given([offering("O1", "CS101", 1)], [])
            .with_students([student("S2")])
            .when(enroll("S1", "CS101"))
            .then_err(EnrollmentError::StudentNotFound);
    }
}
