use std::time::Duration;

use reqwest::Url;

use crate::Error;

/// Where the academic-records API lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    base_url: Url,
    timeout: Option<Duration>,
}

impl DirectoryConfig {
    /// Parses the base URL of the upstream API.
    ///
    /// The collections are resolved relative to it, so `https://records.test/api` serves
    /// offerings from `https://records.test/api/course_offerings/`.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidBaseUrl(base_url.to_string());
        let mut url = Url::parse(base_url.trim()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid());
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            timeout: None,
        })
    }

    /// Bounds every upstream call. Without a timeout a hung upstream blocks the operation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))
    }
}
