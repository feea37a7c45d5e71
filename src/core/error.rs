//! Error handling for NuGet publishing
//!
//! This module provides the error type shared by every publishing step,
//! together with the continue-on-error policy that decides whether a
//! failure aborts the run or only degrades it.

use thiserror::Error;

/// Main error type for publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Configuration errors
    #[error("project file not found: {path}")]
    ProjectFileNotFound { path: String },

    #[error("version file not found: {path}")]
    VersionFileNotFound { path: String },

    #[error("input {input} must be a JSON boolean, got '{value}'")]
    InvalidBooleanInput { input: String, value: String },

    #[error("invalid version regex '{pattern}': {message}")]
    InvalidVersionRegex { pattern: String, message: String },

    #[error("unable to extract version info from {path}")]
    VersionNotExtracted { path: String },

    // Registry source errors
    #[error("[{source_name}] failed to register package source: {message}")]
    SourceRegistrationFailed { source_name: String, message: String },

    // Toolchain errors
    #[error("command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("failed to read working directory: {message}")]
    WorkspaceError { message: String },

    // Network errors
    #[error("registry responded with {status} {reason}")]
    UnexpectedStatus { status: u16, reason: String },

    #[error("network error: {message}")]
    NetworkError { message: String },

    #[error("invalid registry response: {message}")]
    InvalidRegistryResponse { message: String },

    // Registry content errors
    #[error("{message}")]
    PushRejected { message: String },

    // Version control errors
    #[error("failed to tag commit with {tag}: {message}")]
    TaggingFailed { tag: String, message: String },
}

impl PublishError {
    /// Check if this error may be downgraded to a warning by continue-on-error
    ///
    /// Configuration problems detected while loading inputs, source
    /// registration and tagging are always fatal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidBooleanInput { .. }
                | Self::InvalidVersionRegex { .. }
                | Self::SourceRegistrationFailed { .. }
                | Self::TaggingFailed { .. }
        )
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ProjectFileNotFound { .. } => vec![
                "Check PROJECT_FILE_PATH is relative to the repository root",
                "Make sure the repository was checked out before this step",
            ],
            Self::VersionFileNotFound { .. } => {
                vec!["Check VERSION_FILE_PATH or set VERSION_STATIC instead"]
            }
            Self::InvalidBooleanInput { .. } => vec!["Use true or false (lowercase)"],
            Self::InvalidVersionRegex { .. } => vec![
                "Make sure VERSION_REGEX compiles",
                "VERSION_REGEX needs a capture group around the version",
            ],
            Self::VersionNotExtracted { .. } => vec![
                "Check VERSION_REGEX matches a line in the version file",
                "Set VERSION_STATIC to bypass extraction",
            ],
            Self::SourceRegistrationFailed { .. } => vec![
                "Check NUGET_SOURCE is reachable",
                "Check NUGET_KEY and GITHUB_USER for GitHub Packages",
            ],
            Self::CommandFailed { .. } => vec![
                "Check the command output above",
                "Make sure the .NET SDK is installed on the runner",
            ],
            Self::WorkspaceError { .. } => vec!["Check permissions on the working directory"],
            Self::UnexpectedStatus { .. } => vec![
                "Check the registry status page",
                "Check NUGET_KEY has read access to the feed",
            ],
            Self::NetworkError { .. } => vec![
                "Check the runner's network connection",
                "Check NUGET_SOURCE is spelled correctly",
            ],
            Self::InvalidRegistryResponse { .. } => {
                vec!["Check NUGET_SOURCE points to a NuGet v3 feed"]
            }
            Self::PushRejected { .. } => vec![
                "Check NUGET_KEY is valid and allowed to push this package id",
                "Check the push output above",
            ],
            Self::TaggingFailed { .. } => vec![
                "Check the workflow has contents: write permission",
                "Check the tag does not already exist",
            ],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProjectFileNotFound { .. } => "PROJECT_FILE_NOT_FOUND",
            Self::VersionFileNotFound { .. } => "VERSION_FILE_NOT_FOUND",
            Self::InvalidBooleanInput { .. } => "INVALID_BOOLEAN_INPUT",
            Self::InvalidVersionRegex { .. } => "INVALID_VERSION_REGEX",
            Self::VersionNotExtracted { .. } => "VERSION_NOT_EXTRACTED",
            Self::SourceRegistrationFailed { .. } => "SOURCE_REGISTRATION_FAILED",
            Self::CommandFailed { .. } => "COMMAND_FAILED",
            Self::WorkspaceError { .. } => "WORKSPACE_ERROR",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::NetworkError { .. } => "NETWORK_ERROR",
            Self::InvalidRegistryResponse { .. } => "INVALID_REGISTRY_RESPONSE",
            Self::PushRejected { .. } => "PUSH_REJECTED",
            Self::TaggingFailed { .. } => "TAGGING_FAILED",
        }
    }
}

/// Continue-on-error switch for recoverable failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorPolicy {
    pub continue_on_error: bool,
}

impl ErrorPolicy {
    pub fn new(continue_on_error: bool) -> Self {
        Self { continue_on_error }
    }

    /// Decide what to do with a failure on the publish path.
    ///
    /// Returns `Ok(error)` when the run should wind down with a warning,
    /// and `Err(error)` when it must abort.
    pub fn absorb(&self, error: PublishError) -> Result<PublishError, PublishError> {
        if self.continue_on_error && error.is_recoverable() {
            Ok(error)
        } else {
            Err(error)
        }
    }
}
