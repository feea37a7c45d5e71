//! Settings and registry source types for publish-nuget
//!
//! `Settings` is built once by the config loader and only read afterwards.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};

/// Host of the public NuGet gallery API
pub const NUGET_ORG_HOST: &str = "api.nuget.org";

/// Source name the dotnet CLI uses for the public gallery
pub const NUGET_ORG_SOURCE_NAME: &str = "nuget.org";

/// Host of the GitHub Packages NuGet registry
pub const GPR_HOST: &str = "nuget.pkg.github.com";

pub const DEFAULT_NUGET_SOURCE: &str = "https://api.nuget.org";
pub const DEFAULT_VERSION_REGEX: &str = r"^\s*<Version>(.*)<\/Version>\s*$";
pub const DEFAULT_TAG_FORMAT: &str = "v*";

/// URL shape family of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    /// Standard NuGet v3 feed (`<url>/v3/index.json`)
    NuGet,
    /// GitHub Packages feed (`<url>/index.json`, credentials on the source)
    Gpr,
}

impl RegistryKind {
    /// Whether pushing needs an API key on the push command line
    pub fn requires_push_key(&self) -> bool {
        matches!(self, RegistryKind::NuGet)
    }
}

/// Registry classification derived from the configured URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySource {
    /// Registry base URL without trailing slash
    pub url: String,
    /// Name the source is registered under in the dotnet configuration
    pub name: String,
    pub kind: RegistryKind,
}

impl RegistrySource {
    /// Classify a registry base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use publish_nuget::core::{RegistryKind, RegistrySource};
    ///
    /// let source = RegistrySource::from_url("https://api.nuget.org/");
    /// assert_eq!(source.name, "nuget.org");
    /// assert_eq!(source.kind, RegistryKind::NuGet);
    ///
    /// let gpr = RegistrySource::from_url("https://nuget.pkg.github.com/octo");
    /// assert_eq!(gpr.name, "https://nuget.pkg.github.com/octo");
    /// assert_eq!(gpr.kind, RegistryKind::Gpr);
    /// ```
    pub fn from_url(url: &str) -> Self {
        let url = url.trim().trim_end_matches('/').to_string();
        let host = reqwest::Url::parse(&url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h.to_ascii_lowercase()));

        let name = match host.as_deref() {
            Some(NUGET_ORG_HOST) => NUGET_ORG_SOURCE_NAME.to_string(),
            _ => url.clone(),
        };
        let kind = match host.as_deref() {
            Some(GPR_HOST) => RegistryKind::Gpr,
            _ => RegistryKind::NuGet,
        };

        Self { url, name, kind }
    }

    /// URL of the service index the source is registered with
    pub fn index_url(&self) -> String {
        match self.kind {
            RegistryKind::NuGet => format!("{}/v3/index.json", self.url),
            RegistryKind::Gpr => format!("{}/index.json", self.url),
        }
    }

    /// URL of the version listing for a package (lower-cased)
    pub fn lookup_url(&self, package_name: &str) -> String {
        match self.kind {
            RegistryKind::NuGet => {
                format!("{}/v3-flatcontainer/{}/index.json", self.url, package_name)
            }
            RegistryKind::Gpr => format!("{}/download/{}/index.json", self.url, package_name),
        }
        .to_lowercase()
    }
}

/// Immutable run settings
#[derive(Debug)]
pub struct Settings {
    pub project_file: PathBuf,
    pub package_name: Option<String>,
    pub version_file: PathBuf,
    pub version_regex: Regex,
    pub version_static: Option<String>,
    pub tag_commit: bool,
    pub tag_format: String,
    pub source: RegistrySource,
    pub nuget_key: Option<SecretString>,
    pub include_symbols: bool,
    pub continue_on_error: bool,
    pub skip_build: bool,
    pub signing_cert: Option<PathBuf>,
    pub actor: Option<String>,
    /// Directory where dotnet/git run and artifacts are produced
    pub working_dir: PathBuf,
}

impl Settings {
    /// Package id, falling back to the project file name without its extension
    pub fn resolved_package_name(&self) -> String {
        self.package_name
            .clone()
            .unwrap_or_else(|| default_package_name(&self.project_file))
    }

    /// Whether the version is read from a file other than the project file
    pub fn has_separate_version_file(&self) -> bool {
        self.version_file != self.project_file
    }

    pub fn nuget_key(&self) -> Option<&str> {
        self.nuget_key.as_ref().map(|key| key.expose_secret())
    }

    /// Tag name for a published version
    pub fn tag_for(&self, version: &str) -> String {
        render_tag(&self.tag_format, version)
    }
}

/// Strip the final extension from the last path segment
///
/// ```
/// use publish_nuget::core::default_package_name;
/// use std::path::Path;
///
/// assert_eq!(default_package_name(Path::new("src/MyLib.csproj")), "MyLib");
/// ```
pub fn default_package_name(project_file: &Path) -> String {
    project_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Replace the first `*` in a tag format with the version
pub fn render_tag(format: &str, version: &str) -> String {
    format.replacen('*', version, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nuget_org_is_named_source() {
        let source = RegistrySource::from_url("https://api.nuget.org");
        assert_eq!(source.name, "nuget.org");
        assert_eq!(source.kind, RegistryKind::NuGet);
        assert_eq!(source.index_url(), "https://api.nuget.org/v3/index.json");
    }

    #[test]
    fn test_custom_feed_uses_url_as_name() {
        let source = RegistrySource::from_url("https://pkgs.example.com/nuget/");
        assert_eq!(source.url, "https://pkgs.example.com/nuget");
        assert_eq!(source.name, "https://pkgs.example.com/nuget");
        assert_eq!(source.kind, RegistryKind::NuGet);
    }

    #[test]
    fn test_gpr_classification() {
        let source = RegistrySource::from_url("https://nuget.pkg.github.com/Octo-Org");
        assert_eq!(source.kind, RegistryKind::Gpr);
        assert!(!source.kind.requires_push_key());
        assert_eq!(
            source.index_url(),
            "https://nuget.pkg.github.com/Octo-Org/index.json"
        );
    }

    #[test]
    fn test_lookup_urls_are_lowercased() {
        let nuget = RegistrySource::from_url("https://api.nuget.org");
        assert_eq!(
            nuget.lookup_url("Newtonsoft.Json"),
            "https://api.nuget.org/v3-flatcontainer/newtonsoft.json/index.json"
        );

        let gpr = RegistrySource::from_url("https://nuget.pkg.github.com/Octo-Org");
        assert_eq!(
            gpr.lookup_url("MyLib"),
            "https://nuget.pkg.github.com/octo-org/download/mylib/index.json"
        );
    }

    #[test]
    fn test_unparseable_url_falls_back_to_nuget_kind() {
        let source = RegistrySource::from_url("not a url");
        assert_eq!(source.kind, RegistryKind::NuGet);
        assert_eq!(source.name, "not a url");
    }

    #[test]
    fn test_default_package_name_strips_final_extension() {
        assert_eq!(default_package_name(Path::new("src/MyLib.csproj")), "MyLib");
        assert_eq!(
            default_package_name(Path::new("src/Company.Tools.fsproj")),
            "Company.Tools"
        );
    }

    #[test]
    fn test_render_tag_replaces_first_wildcard_only() {
        assert_eq!(render_tag("v*", "1.2.3"), "v1.2.3");
        assert_eq!(render_tag("release-*-*", "2.0.0"), "release-2.0.0-*");
        assert_eq!(render_tag("latest", "2.0.0"), "latest");
    }
}
