//! Build server protocol.
//!
//! Two endpoints, both relative to a base URL:
//!
//! - `GET latest_commit_hash` returns the last commit hash the server has a
//!   build for (empty body when it has none)
//! - `POST upload` takes a multipart body with the package (`apk`) and the
//!   commit log (`latest_commits`)
//!
//! Every request carries the `SECRET_KEY` and `APK_VERSION` headers. Anything
//! but `200 OK` is an error.

mod client;

pub use client::{BuildServerClient, DEFAULT_HTTP_TIMEOUT, UploadReceipt};

use std::fmt;
use thiserror::Error;
use url::Url;

/// Endpoint returning the last recorded commit hash.
pub const LATEST_COMMIT_HASH_ENDPOINT: &str = "latest_commit_hash";

/// Endpoint accepting the package upload.
pub const UPLOAD_ENDPOINT: &str = "upload";

/// Header carrying the shared secret.
pub const SECRET_KEY_HEADER: &str = "secret_key";

/// Header carrying the package version.
pub const APK_VERSION_HEADER: &str = "apk_version";

/// Multipart field holding the package file.
pub const APK_FIELD: &str = "apk";

/// Multipart field holding the commit log.
pub const LATEST_COMMITS_FIELD: &str = "latest_commits";

/// Longest response body quoted back in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Errors reported by the build server itself
#[derive(Error, Debug)]
pub enum ServerError {
    /// Server answered with something other than 200
    #[error("{endpoint} returned {status}: {body}")]
    UnexpectedStatus {
        /// Endpoint that was called
        endpoint: String,
        /// Status received
        status: reqwest::StatusCode,
        /// Start of the response body
        body: String,
    },

    /// Response body was not UTF-8
    #[error("{endpoint} returned a body that is not valid UTF-8")]
    InvalidBody {
        /// Endpoint that was called
        endpoint: String,
    },
}

impl ServerError {
    pub(crate) fn unexpected_status(
        endpoint: &str,
        status: reqwest::StatusCode,
        body: &[u8],
    ) -> Self {
        let body = String::from_utf8_lossy(body);
        let mut body: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
        if body.is_empty() {
            body.push_str("<empty body>");
        }
        Self::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status,
            body,
        }
    }
}

/// Shared secret sent with every request. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for putting on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl std::str::FromStr for SecretKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Last commit hash the server has a build for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// No prior build is recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Resolves `name` relative to `base`, treating `base` as a directory even
/// without a trailing slash.
pub fn endpoint_url(base: &Url, name: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(name)
}
