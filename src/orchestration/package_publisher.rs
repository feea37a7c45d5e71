//! Package Publisher - Main orchestrator for the publish step
//!
//! Manages the complete workflow:
//! - Project file check
//! - Registry source registration
//! - Version resolution
//! - Existence check against the registry
//! - Build, pack, push and tag for new versions
//!
//! Failures pass through the continue-on-error policy: recoverable ones
//! are reported as a warning and end the run early, the rest abort it.

use crate::core::config::Settings;
use crate::core::error::{ErrorPolicy, PublishError};
use crate::core::traits::{CommandRunner, Reporter};
use crate::orchestration::artifact_publisher::{ArtifactPublisher, PublishReport};
use crate::registry::{Existence, ExistenceChecker, SourceManager};
use crate::validation::{VersionResolver, VersionValidator};

/// How a run ended when it did not abort
#[derive(Debug)]
pub enum RunOutcome {
    /// A new version was pushed
    Published(PublishReport),
    /// The registry already lists this version
    AlreadyPublished { version: String },
    /// The version is new but no push key was configured
    SkippedNoKey { version: String },
    /// A recoverable failure was downgraded to a warning
    Degraded(PublishError),
}

/// Main publish step orchestrator
pub struct PackagePublisher<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
    checker: ExistenceChecker,
    policy: ErrorPolicy,
}

impl<'a> PackagePublisher<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            settings,
            runner,
            reporter,
            checker: ExistenceChecker::new(),
            policy: ErrorPolicy::new(settings.continue_on_error),
        }
    }

    /// Run the step once
    ///
    /// `Err` means the step must fail; every other outcome exits cleanly.
    pub async fn run(&self) -> Result<RunOutcome, PublishError> {
        let settings = self.settings;

        if !settings.project_file.is_file() {
            return self.recover(PublishError::ProjectFileNotFound {
                path: settings.project_file.display().to_string(),
            });
        }
        self.reporter.info(&format!(
            "Project Filepath: {}",
            settings.project_file.display()
        ));

        SourceManager::new(self.runner, self.reporter)
            .ensure_source(settings)
            .await?;

        let version = match VersionResolver::new(self.reporter).resolve(settings).await {
            Ok(version) => version,
            Err(error) => return self.recover(error),
        };
        self.reporter.info(&format!("Version: {}", version));
        if let Some(advisory) = VersionValidator::new().advisory(&version) {
            self.reporter.warning(&advisory);
        }

        let package_name = settings.resolved_package_name();
        self.reporter.info(&format!("Package Name: {}", package_name));

        match self.checker.check(settings, &package_name, &version).await {
            Ok(Existence::Published) => {
                self.reporter.info(&format!(
                    "👍 found {} {} in {}, nothing to publish",
                    package_name, version, settings.source.name
                ));
                return Ok(RunOutcome::AlreadyPublished { version });
            }
            Ok(Existence::NotPublished) => {}
            Err(error) => return self.recover(error),
        }

        let publisher = ArtifactPublisher::new(settings, self.runner, self.reporter);
        match publisher.publish(&package_name, &version).await {
            Ok(Some(report)) => Ok(RunOutcome::Published(report)),
            Ok(None) => Ok(RunOutcome::SkippedNoKey { version }),
            Err(error) => self.recover(error),
        }
    }

    fn recover(&self, error: PublishError) -> Result<RunOutcome, PublishError> {
        let error = self.policy.absorb(error)?;
        self.reporter.warning(&format!("😢 {}", error));
        Ok(RunOutcome::Degraded(error))
    }
}

/// Report how the run ended and map it to the process exit code
///
/// Only a fatal error fails the step; degraded runs exit cleanly.
pub fn conclude(result: &Result<RunOutcome, PublishError>, reporter: &dyn Reporter) -> i32 {
    match result {
        Ok(RunOutcome::Published(report)) => {
            for artifact in &report.artifacts {
                reporter.info(&format!("✅ published {}", artifact.package_name));
            }
            if let Some(ref tag) = report.tag {
                reporter.info(&format!("🏷️  tagged {}", tag));
            }
            0
        }
        Ok(RunOutcome::AlreadyPublished { version }) => {
            reporter.info(&format!("✅ {} is already published", version));
            0
        }
        Ok(RunOutcome::SkippedNoKey { version }) => {
            reporter.info(&format!("⏭️  {} was not published", version));
            0
        }
        Ok(RunOutcome::Degraded(error)) => {
            reporter.info(&format!("⚠️  step finished early: {}", error));
            0
        }
        Err(error) => {
            reporter.error(&format!("😭 [{}] {}", error.code(), error));
            let actions = error.suggested_actions();
            if !actions.is_empty() {
                reporter.info("Suggested actions:");
                for action in actions {
                    reporter.info(&format!("  - {}", action));
                }
            }
            1
        }
    }
}
