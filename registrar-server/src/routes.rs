use actix_web::http::header::AUTHORIZATION;
use actix_web::web::{self, Data, Json, Query};
use actix_web::{HttpRequest, HttpResponse};
use registrar::{Caller, Coordinator, Credential, Directory, EnrollmentRequest, MemorySession};
use serde::Deserialize;
use serde_json::json;

use crate::error::{json_error, query_error, Error};

/// Registers the enrollment endpoints for a coordinator backed by `D`.
///
/// The app must provide `Data<Coordinator<D>>` and `Data<MemorySession>`.
pub fn configure<D: Directory + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/enroll", web::post().to(enroll::<D>))
        .route("/unenroll", web::post().to(unenroll::<D>))
        .route("/enrollments", web::get().to(enrolled_courses::<D>))
        .route("/health", web::get().to(health));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentBody {
    user_id: Option<String>,
    course_id: Option<String>,
}

impl From<EnrollmentBody> for EnrollmentRequest {
    fn from(body: EnrollmentBody) -> Self {
        EnrollmentRequest::new(
            body.user_id.unwrap_or_default(),
            body.course_id.unwrap_or_default(),
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentQuery {
    user_id: Option<String>,
}

/// The inbound `Authorization` header, falling back to the session token.
fn credential(req: &HttpRequest, session: &MemorySession) -> Credential {
    let inbound = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    Credential::resolve(inbound, session)
}

async fn enroll<D: Directory + 'static>(
    coordinator: Data<Coordinator<D>>,
    session: Data<MemorySession>,
    req: HttpRequest,
    body: Json<EnrollmentBody>,
) -> Result<HttpResponse, Error> {
    let credential = credential(&req, &session);
    let course = coordinator
        .enroll(
            body.into_inner().into(),
            Caller::new(&credential, session.get_ref()),
        )
        .await?;
    Ok(HttpResponse::Created().json(course))
}

async fn unenroll<D: Directory + 'static>(
    coordinator: Data<Coordinator<D>>,
    session: Data<MemorySession>,
    req: HttpRequest,
    body: Json<EnrollmentBody>,
) -> Result<HttpResponse, Error> {
    let credential = credential(&req, &session);
    let unenrolled = coordinator
        .unenroll(
            body.into_inner().into(),
            Caller::new(&credential, session.get_ref()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(unenrolled))
}

async fn enrolled_courses<D: Directory + 'static>(
    coordinator: Data<Coordinator<D>>,
    session: Data<MemorySession>,
    req: HttpRequest,
    query: Query<StudentQuery>,
) -> Result<HttpResponse, Error> {
    let credential = credential(&req, &session);
    let student_id = query.into_inner().user_id.unwrap_or_default();
    let courses = coordinator
        .enrolled_courses(&student_id, Caller::new(&credential, session.get_ref()))
        .await?;
    Ok(HttpResponse::Ok().json(courses))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
