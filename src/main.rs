//! Dev build uploader - pushes a freshly built package and its commit log to
//! the build server when there are new commits.

use dev_build_uploader::cli::{self, EXIT_FAILURE, OutputManager};
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            log::debug!("Run failed: {:?}", e);
            // Nothing left to report to if stdout itself is gone
            let _ = OutputManager::default().error(&e.to_string());
            EXIT_FAILURE
        }
    };

    process::exit(exit_code);
}
