//! Artifact Publisher - Builds, packs, signs, pushes and tags
//!
//! Runs only after the registry reported the version as missing. The
//! working directory is treated as scratch space: stale packages are
//! deleted before packing.

use crate::core::config::{RegistryKind, Settings};
use crate::core::error::PublishError;
use crate::core::traits::{CommandOutput, CommandRunner, Reporter};
use std::path::PathBuf;
use tokio::fs;

/// Timestamping authority used when signing packages
pub const TIMESTAMPER_URL: &str = "http://timestamp.digicert.com";

const PACKAGE_EXTENSION: &str = ".nupkg";
const SYMBOLS_EXTENSION: &str = ".snupkg";

/// A pushed package and its symbols companion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub package_name: String,
    pub package_path: PathBuf,
    pub symbols_name: Option<String>,
    pub symbols_path: Option<PathBuf>,
}

/// Everything a successful publish produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub version: String,
    pub artifacts: Vec<PublishedArtifact>,
    /// Tag created for the commit, when tagging is enabled
    pub tag: Option<String>,
}

/// Produces and uploads the package for one version
pub struct ArtifactPublisher<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
}

impl<'a> ArtifactPublisher<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            settings,
            runner,
            reporter,
        }
    }

    /// Build, pack, push and optionally tag
    ///
    /// Returns `Ok(None)` when the registry needs a push key and none is set.
    pub async fn publish(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<PublishReport>, PublishError> {
        self.reporter.info(&format!(
            "✨ found new version ({}) of {}",
            version, package_name
        ));

        if self.settings.source.kind.requires_push_key() && self.settings.nuget_key.is_none() {
            self.reporter.warning("😢 NUGET_KEY not given");
            return Ok(None);
        }

        self.clean_artifacts().await?;

        if self.settings.skip_build {
            self.reporter.info("⏭️  SKIP_BUILD is set, packing existing build output");
        } else {
            self.dotnet(&self.build_args(version)).await?;
        }

        self.dotnet(&self.pack_args(version)).await?;

        let artifacts = self.list_artifacts().await?;
        self.reporter.info(&format!(
            "📦 Generated Package(s): {}",
            artifacts.join(", ")
        ));

        let mut report = PublishReport {
            version: version.to_string(),
            ..Default::default()
        };

        for package in artifacts.iter().filter(|a| a.ends_with(PACKAGE_EXTENSION)) {
            if let Some(ref cert) = self.settings.signing_cert {
                self.reporter.info(&format!("🔏 signing {}", package));
                self.dotnet(&sign_args(package, &cert.display().to_string()))
                    .await?;
            }

            self.push(package).await?;
            report.artifacts.push(self.emit_artifact_outputs(package));
        }

        if self.settings.tag_commit {
            report.tag = Some(self.tag_commit(version).await?);
        }

        Ok(Some(report))
    }

    /// Delete packages left over from earlier runs
    async fn clean_artifacts(&self) -> Result<(), PublishError> {
        for name in self.list_artifacts().await? {
            fs::remove_file(self.settings.working_dir.join(&name))
                .await
                .map_err(|e| PublishError::WorkspaceError {
                    message: format!("failed to delete {}: {}", name, e),
                })?;
        }
        Ok(())
    }

    /// File names ending in `nupkg` (packages and symbol packages), sorted
    async fn list_artifacts(&self) -> Result<Vec<String>, PublishError> {
        let workspace_error = |e: std::io::Error| PublishError::WorkspaceError {
            message: e.to_string(),
        };

        let mut entries = fs::read_dir(&self.settings.working_dir)
            .await
            .map_err(workspace_error)?;
        let mut artifacts = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(workspace_error)? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with("nupkg") && entry.path().is_file() {
                artifacts.push(name);
            }
        }

        artifacts.sort();
        Ok(artifacts)
    }

    fn build_args(&self, version: &str) -> Vec<String> {
        vec![
            "build".to_string(),
            "-c".to_string(),
            "Release".to_string(),
            self.settings.project_file.display().to_string(),
            format!("/p:Version={}", version),
        ]
    }

    fn pack_args(&self, version: &str) -> Vec<String> {
        let mut args = vec![
            "pack".to_string(),
            "--no-build".to_string(),
            "-c".to_string(),
            "Release".to_string(),
            self.settings.project_file.display().to_string(),
            "-o".to_string(),
            ".".to_string(),
            format!("/p:Version={}", version),
        ];
        if self.settings.include_symbols {
            args.push("--include-symbols".to_string());
            args.push("-p:SymbolPackageFormat=snupkg".to_string());
        }
        args
    }

    fn push_args(&self, package: &str) -> Vec<String> {
        let source = &self.settings.source;
        let mut args = vec!["nuget".to_string(), "push".to_string(), package.to_string()];

        match source.kind {
            RegistryKind::NuGet => {
                args.extend(["-s".to_string(), source.index_url()]);
                if let Some(key) = self.settings.nuget_key() {
                    args.extend(["-k".to_string(), key.to_string()]);
                }
            }
            // credentials were stored with the source at registration
            RegistryKind::Gpr => args.extend(["-s".to_string(), source.name.clone()]),
        }

        args.push("--skip-duplicate".to_string());
        if !self.settings.include_symbols {
            args.push("--no-symbols".to_string());
        }
        args
    }

    async fn push(&self, package: &str) -> Result<(), PublishError> {
        let args = self.push_args(package);
        let output = self
            .runner
            .run("dotnet", &args)
            .await
            .map_err(|e| command_failed("dotnet nuget push", e.to_string()))?;

        let text = output
            .stdout
            .lines()
            .chain(output.stderr.lines())
            .collect::<Vec<_>>()
            .join("\n");
        if !text.trim().is_empty() {
            self.reporter.info(text.trim_end());
        }

        // dotnet may exit 0 while reporting a soft failure in its output
        if let Some(line) = first_error_line(&text) {
            return Err(PublishError::PushRejected {
                message: line.to_string(),
            });
        }
        if !output.success() {
            return Err(command_failed("dotnet nuget push", output.failure_summary()));
        }

        Ok(())
    }

    fn emit_artifact_outputs(&self, package: &str) -> PublishedArtifact {
        let package_path = self.settings.working_dir.join(package);
        self.reporter.set_output("PACKAGE_NAME", package);
        self.reporter
            .set_output("PACKAGE_PATH", &package_path.display().to_string());

        let stem = package.trim_end_matches(PACKAGE_EXTENSION);
        let symbols_name = format!("{}{}", stem, SYMBOLS_EXTENSION);
        let symbols_path = self.settings.working_dir.join(&symbols_name);

        if symbols_path.is_file() {
            self.reporter.set_output("SYMBOLS_PACKAGE_NAME", &symbols_name);
            self.reporter
                .set_output("SYMBOLS_PACKAGE_PATH", &symbols_path.display().to_string());
            PublishedArtifact {
                package_name: package.to_string(),
                package_path,
                symbols_name: Some(symbols_name),
                symbols_path: Some(symbols_path),
            }
        } else {
            if self.settings.include_symbols {
                self.reporter
                    .warning(&format!("symbols package {} not found", symbols_name));
            }
            PublishedArtifact {
                package_name: package.to_string(),
                package_path,
                symbols_name: None,
                symbols_path: None,
            }
        }
    }

    /// Create and push the version tag; any failure is fatal
    pub async fn tag_commit(&self, version: &str) -> Result<String, PublishError> {
        let tag = self.settings.tag_for(version);
        self.reporter.info(&format!("✨ creating new tag {}", tag));

        for args in [
            vec!["tag".to_string(), tag.clone()],
            vec!["push".to_string(), "origin".to_string(), tag.clone()],
        ] {
            let failed = |message: String| PublishError::TaggingFailed {
                tag: tag.clone(),
                message,
            };
            let output = self
                .runner
                .run("git", &args)
                .await
                .map_err(|e| failed(e.to_string()))?;
            if !output.success() {
                return Err(failed(output.failure_summary()));
            }
        }

        self.reporter.set_output("VERSION", &tag);
        Ok(tag)
    }

    async fn dotnet(&self, args: &[String]) -> Result<CommandOutput, PublishError> {
        let command = format!("dotnet {}", args.first().map(String::as_str).unwrap_or(""));
        let output = self
            .runner
            .run("dotnet", args)
            .await
            .map_err(|e| command_failed(&command, e.to_string()))?;

        if !output.success() {
            return Err(command_failed(&command, output.failure_summary()));
        }
        Ok(output)
    }
}

fn sign_args(package: &str, certificate: &str) -> Vec<String> {
    vec![
        "nuget".to_string(),
        "sign".to_string(),
        package.to_string(),
        "--certificate-path".to_string(),
        certificate.to_string(),
        "--timestamper".to_string(),
        TIMESTAMPER_URL.to_string(),
    ]
}

fn command_failed(command: &str, message: String) -> PublishError {
    PublishError::CommandFailed {
        command: command.to_string(),
        message,
    }
}

/// First output line mentioning `error`
pub fn first_error_line(output: &str) -> Option<&str> {
    output
        .lines()
        .find(|line| line.contains("error"))
        .map(str::trim)
}
