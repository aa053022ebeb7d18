//! FILENAME: app/cli/src/publish.rs
//! PURPOSE: Publish step - commits and pushes a freshly written snapshot.
//! CONTEXT: Runs only after the snapshot was saved; a failure here never
//! rolls the snapshot back.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use crate::config::PublishConfig;
use crate::{log_debug, log_info};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

pub trait Publisher {
    fn publish(&self, snapshot: &Path) -> Result<(), PublishError>;
}

/// Commit message for a snapshot published at `now`.
pub fn commit_message(prefix: &str, now: NaiveDateTime) -> String {
    format!("{} {}", prefix, now.format("%Y-%m-%d %H:%M"))
}

/// `git add`, `git commit`, `git push` in the configured repository.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo: PathBuf,
    remote: String,
    branch: Option<String>,
    message_prefix: String,
}

impl GitPublisher {
    pub fn from_config(config: &PublishConfig, snapshot: &Path) -> Self {
        let repo = config.repo_path.clone().unwrap_or_else(|| {
            snapshot
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        GitPublisher {
            repo,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            message_prefix: config.message_prefix.clone(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<String, PublishError> {
        let command = format!("git {}", args.join(" "));
        log_debug!("PUBLISH", "{} (in {})", command, self.repo.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .map_err(|source| PublishError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }
        // `git commit` with a clean tree exits non-zero; the snapshot is already published.
        if args.first() == Some(&"commit") && stdout.contains("nothing to commit") {
            return Ok(stdout);
        }
        Err(PublishError::Failed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, snapshot: &Path) -> Result<(), PublishError> {
        // git runs inside the repository, so hand it an absolute path
        let file = std::fs::canonicalize(snapshot)
            .unwrap_or_else(|_| snapshot.to_path_buf())
            .to_string_lossy()
            .into_owned();
        let message = commit_message(&self.message_prefix, Local::now().naive_local());

        self.git(&["add", file.as_str()])?;
        self.git(&["commit", "-m", message.as_str()])?;
        match &self.branch {
            Some(branch) => self.git(&["push", self.remote.as_str(), branch.as_str()])?,
            None => self.git(&["push", self.remote.as_str()])?,
        };

        log_info!("PUBLISH", "pushed {} to {}", snapshot.display(), self.remote);
        Ok(())
    }
}

/// Publishing disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn publish(&self, _snapshot: &Path) -> Result<(), PublishError> {
        Ok(())
    }
}
