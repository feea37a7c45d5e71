//! Version Resolver - Produces the version to publish
//!
//! The version is either given explicitly or extracted from a text file
//! with the configured pattern (capture group 1).

use crate::core::config::Settings;
use crate::core::error::PublishError;
use crate::core::traits::Reporter;
use regex::Regex;
use tokio::fs;

/// Resolves the package version from settings
pub struct VersionResolver<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> VersionResolver<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    /// Resolve the version to publish
    ///
    /// The project file is expected to exist already; a version file equal
    /// to the project file is not checked again.
    pub async fn resolve(&self, settings: &Settings) -> Result<String, PublishError> {
        if let Some(ref version) = settings.version_static {
            if settings.has_separate_version_file() {
                self.reporter.info(&format!(
                    "VERSION_STATIC is set, ignoring VERSION_FILE_PATH ({}) and VERSION_REGEX",
                    settings.version_file.display()
                ));
            }
            return Ok(version.clone());
        }

        let version_file = &settings.version_file;
        if settings.has_separate_version_file() && !version_file.is_file() {
            return Err(PublishError::VersionFileNotFound {
                path: version_file.display().to_string(),
            });
        }

        self.reporter
            .info(&format!("Version Filepath: {}", version_file.display()));
        self.reporter.info(&format!(
            "Version Regex: {}",
            settings.version_regex.as_str()
        ));

        let content = fs::read_to_string(version_file).await.map_err(|_| {
            PublishError::VersionFileNotFound {
                path: version_file.display().to_string(),
            }
        })?;

        extract_version(&settings.version_regex, &content).ok_or_else(|| {
            PublishError::VersionNotExtracted {
                path: version_file.display().to_string(),
            }
        })
    }
}

/// Capture group 1 of the first match, if any
///
/// ```
/// use publish_nuget::core::ConfigLoader;
/// use publish_nuget::validation::extract_version;
///
/// let regex = ConfigLoader::compile_version_regex("<Version>(.*)</Version>").unwrap();
/// assert_eq!(
///     extract_version(&regex, "<Version>3.4.5</Version>"),
///     Some("3.4.5".to_string())
/// );
/// ```
pub fn extract_version(regex: &Regex, content: &str) -> Option<String> {
    regex
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
