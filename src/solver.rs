//! External planner process with a wall-clock deadline.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::traits::Solver;

const STDERR_PREVIEW_CHARS: usize = 2_000;

/// How hard the planner should work on the plan cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Weighted search that optimizes the metric within `budget`.
    CostOptimizing { budget: u32 },
    /// Plain search for any legal plan.
    Relaxed,
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("planner exceeded its {0:?} budget")]
    Timeout(Duration),
    #[error("failed to start planner '{path}': {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("planner exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("planner I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl SolverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SolverError::Timeout(_))
    }
}

/// Runs the planner executable as `<program> -o <domain> -f <problem> [-s <budget>]`.
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    program: PathBuf,
    domain: PathBuf,
    timeout: Duration,
}

impl ExternalSolver {
    pub fn new(program: impl Into<PathBuf>, domain: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            domain: domain.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(&config.solver_path, &config.domain_path, config.timeout())
    }

    fn args(&self, problem: &Path, strategy: SearchStrategy) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-o".into(),
            self.domain.clone().into_os_string(),
            "-f".into(),
            problem.as_os_str().to_owned(),
        ];
        if let SearchStrategy::CostOptimizing { budget } = strategy {
            args.push("-s".into());
            args.push(budget.to_string().into());
        }
        args
    }
}

#[async_trait]
impl Solver for ExternalSolver {
    async fn run(&self, problem: &Path, strategy: SearchStrategy) -> Result<String, SolverError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(problem, strategy));
        cmd.kill_on_drop(true);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| SolverError::Spawn {
            path: self.program.clone(),
            source,
        })?;
        debug!(pid = child.id(), ?strategy, "planner started");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = timeout(self.timeout, async {
            tokio::join!(child.wait(), read_all(stdout), read_all(stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(result) => result,
            Err(_) => {
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill planner after deadline");
                }
                return Err(SolverError::Timeout(self.timeout));
            }
        };

        let status = status?;
        if !status.success() {
            let stderr = stderr.unwrap_or_default();
            return Err(SolverError::Exit {
                status: status.to_string(),
                stderr: preview(&stderr, STDERR_PREVIEW_CHARS),
            });
        }
        Ok(stdout?)
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}
