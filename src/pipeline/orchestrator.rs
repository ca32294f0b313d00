//! The upload run, step by step.

use super::Outcome;
use crate::build_tool::{BuildTasks, BuildTool};
use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::server::BuildServerClient;

/// One upload run against one build server.
pub struct UploadPipeline<'a, B> {
    config: &'a RuntimeConfig,
    tasks: BuildTasks<B>,
}

impl<'a, B: BuildTool> UploadPipeline<'a, B> {
    /// Creates a pipeline that asks `tool` for versions and commit logs.
    pub fn new(config: &'a RuntimeConfig, tool: B) -> Self {
        Self {
            config,
            tasks: BuildTasks::new(tool),
        }
    }

    /// The build tool queries this pipeline runs.
    pub fn tasks(&self) -> &BuildTasks<B> {
        &self.tasks
    }

    /// Runs every step in order, stopping at the first failure.
    ///
    /// 1. Check the branch exists (unless disabled)
    /// 2. Resolve the package version
    /// 3. Fetch the last commit hash the server knows
    /// 4. Resolve the commit log since that hash
    /// 5. Upload, unless the log is empty
    pub async fn run(&self) -> Result<Outcome> {
        let config = self.config;
        let branch = config.branch_name.as_str();

        if config.check_branch {
            config.progress(&format!("Checking that branch {} exists...", branch))?;
            if !self.tasks.branch_exists(branch).await? {
                log::warn!("Branch {} does not exist, nothing to upload", branch);
                return Ok(Outcome::BranchMissing {
                    branch: branch.to_string(),
                });
            }
        }

        config.progress("Resolving package version...")?;
        let version = self.tasks.version_code().await?;
        log::info!("Package version: {}", version);

        let client = BuildServerClient::new(
            &config.base_url,
            &config.secret_key,
            &version,
            config.http_timeout,
        )?;

        config.progress("Fetching latest commit hash from the build server...")?;
        let since = client.latest_commit_hash().await?;
        log::info!("Server's latest commit hash: {}", since);

        config.progress(&format!("Collecting commits on {} since {}...", branch, since))?;
        let commit_log = self.tasks.commit_log(branch, since.as_str()).await?;

        if commit_log.is_empty() {
            log::info!("No new commits since {}", since);
            return Ok(Outcome::NothingToUpload { since });
        }

        let commits = commit_log.lines().count();
        config.indent(&commit_log)?;

        config.progress(&format!(
            "Uploading {}...",
            config.apk_path.display()
        ))?;
        let receipt = client.upload(&config.apk_path, &commit_log).await?;
        log::info!(
            "Uploaded {} bytes with {} commit line(s)",
            receipt.bytes,
            commits
        );

        Ok(Outcome::Uploaded {
            version,
            since,
            commits,
            bytes: receipt.bytes,
        })
    }
}
