//! Upload pipeline.
//!
//! A single run is strictly sequential: branch check, version, last known
//! commit hash, commit log, upload. The only business rule is that an empty
//! commit log means nothing changed and nothing is uploaded.

mod orchestrator;

pub use orchestrator::UploadPipeline;

use crate::server::CommitHash;
use std::fmt;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The branch does not exist; nothing was asked of the server.
    BranchMissing {
        /// Branch that was checked
        branch: String,
    },

    /// No commits since the server's last build; nothing was uploaded.
    NothingToUpload {
        /// Hash the server reported
        since: CommitHash,
    },

    /// The package and commit log were uploaded.
    Uploaded {
        /// Package version sent in the headers
        version: String,
        /// Hash the server reported before the upload
        since: CommitHash,
        /// Lines in the uploaded commit log
        commits: usize,
        /// Package size in bytes
        bytes: u64,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BranchMissing { branch } => {
                write!(f, "Branch {} does not exist, nothing to upload", branch)
            }
            Self::NothingToUpload { since } => {
                write!(f, "No new commits since {}, nothing to upload", since)
            }
            Self::Uploaded {
                version,
                since,
                commits,
                bytes,
            } => write!(
                f,
                "Uploaded version {} ({} bytes, {} commit line(s) since {})",
                version, bytes, commits, since
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_summaries() {
        let missing = Outcome::BranchMissing {
            branch: "release/5".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Branch release/5 does not exist, nothing to upload"
        );

        let uploaded = Outcome::Uploaded {
            version: "4321".to_string(),
            since: CommitHash::default(),
            commits: 3,
            bytes: 1024,
        };
        assert_eq!(
            uploaded.to_string(),
            "Uploaded version 4321 (1024 bytes, 3 commit line(s) since <none>)"
        );
    }
}
