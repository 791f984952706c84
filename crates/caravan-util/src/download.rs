//! Shared HTTP client: text fetches and streaming downloads with SHA-256.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::UtilError;

/// Credentials sent as an HTTP `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    /// The `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!(
            "Basic {}",
            base64::encode(format!("{}:{}", self.username, self.password))
        )
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A blocking HTTP client with connect and global timeouts.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_connect(Some(Duration::from_secs(30)))
                .timeout_global(Some(Duration::from_secs(600)))
                .build(),
        );
        Self { agent }
    }

    fn get(
        &self,
        url: &str,
        auth: Option<&BasicAuth>,
    ) -> Result<ureq::http::Response<ureq::Body>, UtilError> {
        let mut request = self.agent.get(url);
        if let Some(auth) = auth {
            request = request.header("Authorization", auth.header_value());
        }
        log::trace!("GET {url}");
        request.call().map_err(|e| match e {
            ureq::Error::StatusCode(404) => UtilError::NotFound {
                url: url.to_owned(),
            },
            other => UtilError::Download {
                url: url.to_owned(),
                message: other.to_string(),
            },
        })
    }

    /// Fetch a small text resource such as `maven-metadata.xml`.
    ///
    /// # Errors
    /// Returns `UtilError::NotFound` on HTTP 404 and `UtilError::Download` on
    /// any other transport or status failure.
    pub fn get_text(&self, url: &str, auth: Option<&BasicAuth>) -> Result<String, UtilError> {
        let response = self.get(url, auth)?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| UtilError::Download {
                url: url.to_owned(),
                message: e.to_string(),
            })
    }

    /// Stream `url` into `dest`, computing SHA-256 on the way.
    ///
    /// Returns the hex-encoded SHA-256 hash of the downloaded content.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the file cannot be written,
    /// or a read error occurs during streaming.
    pub fn download(
        &self,
        url: &str,
        dest: &Path,
        auth: Option<&BasicAuth>,
    ) -> Result<String, UtilError> {
        let response = self.get(url, auth)?;

        let content_length: Option<u64> = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        let mut body = response.into_body();
        let mut reader = body.as_reader();
        let mut file = std::fs::File::create(dest).map_err(|source| UtilError::Io {
            path: dest.display().to_string(),
            source,
        })?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            let n = reader.read(&mut buf).map_err(|e| UtilError::Download {
                url: url.to_owned(),
                message: e.to_string(),
            })?;
            if n == 0 {
                break;
            }
            let Some(chunk) = buf.get(..n) else {
                break;
            };
            file.write_all(chunk).map_err(|source| UtilError::Io {
                path: dest.display().to_string(),
                source,
            })?;
            hasher.update(chunk);
            downloaded = downloaded.saturating_add(n as u64);
        }

        match content_length {
            Some(total) => log::debug!("downloaded {url} ({downloaded} of {total} bytes)"),
            None => log::debug!("downloaded {url} ({downloaded} bytes)"),
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}
