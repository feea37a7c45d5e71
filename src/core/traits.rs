//! Core traits and types for NuGet publishing
//!
//! This module defines the seams between the publishing flow and the
//! outside world: subprocess execution and CI reporting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::security::CommandError;

// ============================================================================
// Subprocess execution
// ============================================================================

/// Captured result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Short description of a failed run for error messages
    pub fn failure_summary(&self) -> String {
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        match self.code {
            Some(code) if detail.is_empty() => format!("exit code {}", code),
            Some(code) => format!("exit code {}: {}", code, detail),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs toolchain and version-control commands
///
/// Arguments are passed as a vector and never re-tokenized, so an argument
/// may contain spaces.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and capture its output
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}

// ============================================================================
// CI reporting
// ============================================================================

/// Sink for progress logs, annotations and step outputs
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);

    /// Non-fatal problem, surfaced as a warning annotation
    fn warning(&self, message: &str);

    /// Fatal problem, surfaced as an error annotation
    fn error(&self, message: &str);

    /// Publish a named step output
    fn set_output(&self, name: &str, value: &str);
}
