//! HTTP Directory
//!
//! This module provides an implementation of the `Directory` trait on top of the
//! academic-records REST API. Collections are read in full with `GET`, enrollments are
//! created with `POST` and removed with `DELETE`.
use async_trait::async_trait;
use registrar::{
    CourseOffering, Credential, Directory, DirectoryError, Enrollment, EnrollmentId, Student,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{DirectoryConfig, Error};

const OFFERINGS: &str = "course_offerings/";
const ENROLLMENTS: &str = "enrollments/";
const STUDENTS: &str = "students/";

/// HTTP directory implementation.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: Client,
    offerings: Url,
    enrollments: Url,
    students: Url,
}

impl HttpDirectory {
    /// Creates a new instance of `HttpDirectory`.
    ///
    /// No request is made until the first directory call.
    ///
    /// # Arguments
    ///
    /// * `config` - The upstream base URL and optional request timeout.
    pub fn new(config: &DirectoryConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            offerings: config.endpoint(OFFERINGS)?,
            enrollments: config.endpoint(ENROLLMENTS)?,
            students: config.endpoint(STUDENTS)?,
        })
    }

    fn request(&self, method: Method, url: Url, credential: &Credential) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, credential.header_value())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &Url,
        credential: &Credential,
    ) -> Result<Vec<T>, DirectoryError> {
        let response = send(self.request(Method::GET, url.clone(), credential)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| DirectoryError::Transport(Box::new(err)))?;
        serde_json::from_slice(&body).map_err(|err| DirectoryError::Decode(Box::new(err)))
    }

    fn enrollment_url(&self, enrollment_id: &str) -> Result<Url, DirectoryError> {
        let mut url = self.enrollments.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::Transport("enrollments url cannot be a base".into()))?
            .pop_if_empty()
            .push(enrollment_id);
        Ok(url)
    }
}

/// Sends the request and turns any non-success status into a `DirectoryError`.
async fn send(request: RequestBuilder) -> Result<Response, DirectoryError> {
    let response = request
        .send()
        .await
        .map_err(|err| DirectoryError::Transport(Box::new(err)))?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "upstream responded");
    if status.is_success() {
        Ok(response)
    } else {
        Err(DirectoryError::from_status(status.as_u16()))
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn offerings(
        &self,
        credential: &Credential,
    ) -> Result<Vec<CourseOffering>, DirectoryError> {
        self.fetch(&self.offerings, credential).await
    }

    async fn enrollments(&self, credential: &Credential) -> Result<Vec<Enrollment>, DirectoryError> {
        self.fetch(&self.enrollments, credential).await
    }

    async fn students(&self, credential: &Credential) -> Result<Vec<Student>, DirectoryError> {
        self.fetch(&self.students, credential).await
    }

    async fn create_enrollment(
        &self,
        credential: &Credential,
        enrollment: &Enrollment,
    ) -> Result<(), DirectoryError> {
        let request = self
            .request(Method::POST, self.enrollments.clone(), credential)
            .json(enrollment);
        send(request).await?;
        Ok(())
    }

    async fn delete_enrollment(
        &self,
        credential: &Credential,
        enrollment_id: &EnrollmentId,
    ) -> Result<(), DirectoryError> {
        let url = self.enrollment_url(enrollment_id)?;
        send(self.request(Method::DELETE, url, credential)).await?;
        Ok(())
    }
}
