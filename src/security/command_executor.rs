//! SafeCommandExecutor: whitelisted, argument-vector command execution
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only `dotnet` and `git` can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, never a shell
//! - **Argument safety**: Arguments are passed as a vector, so they may contain spaces
//! - **Working directory validation**: Validates existence before execution
//! - **Secret masking**: Logged command lines have registry keys masked
//!
//! Commands run without a timeout; a hung toolchain blocks the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use publish_nuget::core::CommandRunner;
//! use publish_nuget::security::SafeCommandExecutor;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let executor = SafeCommandExecutor::new(std::env::temp_dir())?;
//! let output = executor.run("dotnet", &["--version".to_string()]).await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

use crate::core::traits::{CommandOutput, CommandRunner};
use crate::security::token_manager::SecureTokenManager;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Allowed commands whitelist for security.
const ALLOWED_COMMANDS: &[&str] = &["dotnet", "git"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

/// Safe command executor with security controls
#[derive(Debug)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
    /// Masks secrets in the echoed command line
    token_manager: SecureTokenManager,
    /// Echo each command line before running it
    echo: bool,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            token_manager: SecureTokenManager::default(),
            echo: false,
        })
    }

    /// Echo every command line (with secrets masked) before it runs
    pub fn with_echo(mut self, token_manager: SecureTokenManager) -> Self {
        self.token_manager = token_manager;
        self.echo = true;
        self
    }

    /// Command line as it should appear in logs
    pub fn display_command(&self, command: &str, args: &[String]) -> String {
        let line = std::iter::once(command)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self.token_manager.mask_tokens_in_string(&line)
    }
}

#[async_trait]
impl CommandRunner for SafeCommandExecutor {
    async fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        // Whitelist validation: Only pre-approved commands
        if !ALLOWED_COMMANDS.contains(&command) {
            return Err(CommandError::CommandNotAllowed(command.to_string()));
        }

        if self.echo {
            println!("executing: [{}]", self.display_command(command, args));
        }

        let output = Command::new(command)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
