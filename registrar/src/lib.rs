#![doc = include_str!("../README.md")]

mod coordinator;
mod credential;
mod decision;
mod directory;
mod error;
mod identifier;
mod model;
mod projection;
mod resolver;
pub mod testing;

#[doc(inline)]
pub use crate::coordinator::{AppliedDecision, Coordinator};
#[doc(inline)]
pub use crate::credential::{Caller, Credential, MemorySession, SessionStore};
#[doc(inline)]
pub use crate::decision::{
    Change, Decision, Enroll, EnrollmentError, EnrollmentRequest, Roster, RosterQuery, Unenroll,
};
#[doc(inline)]
pub use crate::directory::{Directory, DirectoryError};
#[doc(inline)]
pub use crate::error::Error;
#[doc(inline)]
pub use crate::identifier::EnrollmentIdMinter;
#[doc(inline)]
pub use crate::model::{
    CourseCode, CourseOffering, Enrollment, EnrollmentId, OfferingId, Student, StudentId,
};
#[doc(inline)]
pub use crate::projection::{EnrolledCourse, ErrorBody, Unenrolled};
#[doc(inline)]
pub use crate::resolver::{resolve_enrollment, resolve_offering, resolve_offering_by_id};
#[doc(inline)]
pub use crate::testing::TestHarness;

pub type BoxDynError = Box<dyn std::error::Error + 'static + Send + Sync>;
