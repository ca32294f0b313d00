//! HTTP client for the build server.

use super::{
    APK_FIELD, APK_VERSION_HEADER, CommitHash, LATEST_COMMIT_HASH_ENDPOINT, LATEST_COMMITS_FIELD,
    SECRET_KEY_HEADER, SecretKey, ServerError, UPLOAD_ENDPOINT, endpoint_url,
};
use crate::build_tool::{BuildToolError, TASK_VERSION_CODE};
use crate::error::{CliError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use url::Url;

/// Per-request deadline
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("dev_build_uploader/", env!("CARGO_PKG_VERSION"));

const APK_MIME: &str = "application/vnd.android.package-archive";

/// What the server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Size of the uploaded package in bytes
    pub bytes: u64,
}

/// Client for one build server, bound to one secret key and package version.
pub struct BuildServerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BuildServerClient {
    /// Creates a client whose requests all carry the secret key and version headers.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server base URL; endpoints are resolved below it
    /// * `secret_key` - Shared secret for the `SECRET_KEY` header
    /// * `version` - Package version for the `APK_VERSION` header
    /// * `timeout` - Deadline for each request, including the upload
    pub fn new(
        base_url: &Url,
        secret_key: &SecretKey,
        version: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut secret = HeaderValue::from_str(secret_key.expose()).map_err(|_| {
            CliError::InvalidArguments {
                reason: "secret key contains characters that cannot be sent in an HTTP header"
                    .to_string(),
            }
        })?;
        secret.set_sensitive(true);

        let version =
            HeaderValue::from_str(version).map_err(|_| BuildToolError::UnexpectedOutput {
                task: TASK_VERSION_CODE.to_string(),
                output: version.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(SECRET_KEY_HEADER), secret);
        headers.insert(HeaderName::from_static(APK_VERSION_HEADER), version);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.clone(),
        })
    }

    /// Fetches the last commit hash the server has a build for.
    ///
    /// An empty hash means the server has no prior build.
    pub async fn latest_commit_hash(&self) -> Result<CommitHash> {
        let url = endpoint_url(&self.base_url, LATEST_COMMIT_HASH_ENDPOINT)?;
        log::debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(
                ServerError::unexpected_status(LATEST_COMMIT_HASH_ENDPOINT, status, &body).into(),
            );
        }

        let hash = std::str::from_utf8(&body).map_err(|_| ServerError::InvalidBody {
            endpoint: LATEST_COMMIT_HASH_ENDPOINT.to_string(),
        })?;

        Ok(CommitHash::new(hash))
    }

    /// Uploads the package and the commit log.
    ///
    /// The package is streamed from disk. The file handle is owned by the
    /// request body, so it is closed whether the upload succeeds or fails.
    pub async fn upload(&self, artifact: &Path, commit_log: &str) -> Result<UploadReceipt> {
        let url = endpoint_url(&self.base_url, UPLOAD_ENDPOINT)?;

        let file = tokio::fs::File::open(artifact).await.map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("cannot open package {}: {}", artifact.display(), e),
            )
        })?;
        let bytes = file.metadata().await?.len();

        let file_name = artifact
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("app.apk")
            .to_string();

        let apk = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), bytes)
            .file_name(file_name)
            .mime_str(APK_MIME)?;
        let form = Form::new()
            .part(APK_FIELD, apk)
            .text(LATEST_COMMITS_FIELD, commit_log.to_string());

        log::debug!("POST {} ({} bytes)", url, bytes);

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ServerError::unexpected_status(UPLOAD_ENDPOINT, status, &body).into());
        }

        Ok(UploadReceipt { bytes })
    }
}
