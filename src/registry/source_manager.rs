//! Registry Source Manager - Makes sure dotnet knows the target feed
//!
//! Registration edits the user's NuGet configuration, so this runs once
//! before any package operation. Every failure here is fatal.

use crate::core::config::{RegistryKind, RegistrySource, Settings};
use crate::core::error::PublishError;
use crate::core::traits::{CommandRunner, Reporter};

/// Ensures the configured registry is registered and enabled
pub struct SourceManager<'a> {
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
}

impl<'a> SourceManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, reporter: &'a dyn Reporter) -> Self {
        Self { runner, reporter }
    }

    /// Register the source if missing, then enable it
    pub async fn ensure_source(&self, settings: &Settings) -> Result<(), PublishError> {
        let source = &settings.source;
        self.reporter.info(&format!("NuGet Source: {}", source.url));

        let listing = self.list_sources(settings).await?;
        if !is_listed(&listing, source) {
            self.reporter
                .info(&format!("➕ registering package source {}", source.name));
            let args = registration_args(settings)?;
            self.dotnet(settings, &args).await?;
        }

        let listing = self.list_sources(settings).await?;
        self.reporter.info(listing.trim_end());

        self.dotnet(
            settings,
            &[
                "nuget".to_string(),
                "enable".to_string(),
                "source".to_string(),
                source.name.clone(),
            ],
        )
        .await?;

        Ok(())
    }

    async fn list_sources(&self, settings: &Settings) -> Result<String, PublishError> {
        let args = ["nuget", "list", "source"].map(String::from);
        self.dotnet(settings, &args).await
    }

    async fn dotnet(&self, settings: &Settings, args: &[String]) -> Result<String, PublishError> {
        let failed = |message: String| PublishError::SourceRegistrationFailed {
            source_name: settings.source.name.clone(),
            message,
        };

        let output = self
            .runner
            .run("dotnet", args)
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !output.success() {
            return Err(failed(output.failure_summary()));
        }

        Ok(output.stdout)
    }
}

/// Whether a source listing has a line naming this feed's URL
///
/// Listings put each feed URL on its own line; a longer URL sharing the
/// same prefix does not count.
fn is_listed(listing: &str, source: &RegistrySource) -> bool {
    let index_url = source.index_url();
    listing
        .lines()
        .map(|line| line.trim().trim_end_matches('/'))
        .any(|line| {
            line.eq_ignore_ascii_case(&index_url) || line.eq_ignore_ascii_case(&source.url)
        })
}

/// Arguments for `dotnet nuget add source`
fn registration_args(settings: &Settings) -> Result<Vec<String>, PublishError> {
    let source = &settings.source;
    let mut args = vec![
        "nuget".to_string(),
        "add".to_string(),
        "source".to_string(),
        source.index_url(),
        "-n".to_string(),
        source.name.clone(),
    ];

    if source.kind == RegistryKind::Gpr {
        let (Some(actor), Some(key)) = (settings.actor.as_ref(), settings.nuget_key()) else {
            return Err(PublishError::SourceRegistrationFailed {
                source_name: source.name.clone(),
                message: "GitHub Packages needs GITHUB_USER and NUGET_KEY".to_string(),
            });
        };
        args.extend([
            "-u".to_string(),
            actor.clone(),
            "-p".to_string(),
            key.to_string(),
            "--store-password-in-clear-text".to_string(),
        ]);
    }

    Ok(args)
}
