//! Version Validator - Classifies package version strings
//!
//! NuGet accepts SemVer 2.0.0 versions as well as legacy four-part
//! `major.minor.build.revision` versions. Neither check ever blocks a
//! publish; the result only drives an advisory warning.
//!
//! # Example
//!
//! ```
//! use publish_nuget::validation::version_validator::VersionValidator;
//!
//! let validator = VersionValidator::new();
//! let result = validator.validate("1.2.3");
//!
//! assert!(result.is_semver);
//! assert_eq!(result.major, Some(1));
//! assert_eq!(result.minor, Some(2));
//! assert_eq!(result.patch, Some(3));
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// `1.2.3.4` with an optional prerelease label
    static ref LEGACY_VERSION: Regex =
        Regex::new(r"^\d+\.\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?$").unwrap();
}

/// Result of version validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionValidationResult {
    /// Whether the version is valid SemVer 2.0.0
    pub is_semver: bool,
    /// Whether the version is a legacy four-part NuGet version
    pub is_legacy: bool,
    /// SemVer parse error (if any)
    pub error: Option<String>,
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    /// Pre-release label (e.g., "alpha.1")
    pub prerelease: Option<String>,
}

impl VersionValidationResult {
    /// Whether NuGet will accept the version at all
    pub fn is_publishable(&self) -> bool {
        self.is_semver || self.is_legacy
    }
}

/// Validator for package versions
pub struct VersionValidator;

impl Default for VersionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a version string
    pub fn validate(&self, version_str: &str) -> VersionValidationResult {
        match Version::parse(version_str) {
            Ok(version) => VersionValidationResult {
                is_semver: true,
                is_legacy: false,
                error: None,
                major: Some(version.major),
                minor: Some(version.minor),
                patch: Some(version.patch),
                prerelease: if version.pre.is_empty() {
                    None
                } else {
                    Some(version.pre.to_string())
                },
            },
            Err(e) => VersionValidationResult {
                is_semver: false,
                is_legacy: LEGACY_VERSION.is_match(version_str),
                error: Some(e.to_string()),
                major: None,
                minor: None,
                patch: None,
                prerelease: None,
            },
        }
    }

    /// Advisory message for versions that are not plain SemVer
    ///
    /// # Examples
    ///
    /// ```
    /// use publish_nuget::validation::VersionValidator;
    ///
    /// let validator = VersionValidator::new();
    /// assert!(validator.advisory("1.0.0").is_none());
    /// assert!(validator.advisory("1.0.0.1").is_some());
    /// ```
    pub fn advisory(&self, version_str: &str) -> Option<String> {
        let result = self.validate(version_str);
        if result.is_semver {
            None
        } else if result.is_legacy {
            Some(format!(
                "version {} is a legacy four-part version, not SemVer 2.0",
                version_str
            ))
        } else {
            Some(format!(
                "version {} does not look like a NuGet version ({})",
                version_str,
                result.error.unwrap_or_default()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("1.2.3");

        assert!(result.is_semver);
        assert!(result.is_publishable());
        assert_eq!(result.major, Some(1));
        assert_eq!(result.minor, Some(2));
        assert_eq!(result.patch, Some(3));
        assert!(result.prerelease.is_none());
    }

    #[test]
    fn test_validate_prerelease_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("1.0.0-alpha.1");

        assert!(result.is_semver);
        assert_eq!(result.prerelease, Some("alpha.1".to_string()));
    }

    #[test]
    fn test_validate_legacy_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("1.2.3.4");

        assert!(!result.is_semver);
        assert!(result.is_legacy);
        assert!(result.is_publishable());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_validate_invalid_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("invalid");

        assert!(!result.is_semver);
        assert!(!result.is_legacy);
        assert!(!result.is_publishable());
        assert!(result.major.is_none());
    }

    #[test]
    fn test_advisory() {
        let validator = VersionValidator::new();

        assert!(validator.advisory("2.0.0").is_none());
        assert!(validator.advisory("1.0.0.1").unwrap().contains("legacy"));
        assert!(validator.advisory("1.0").unwrap().contains("does not look like"));
    }
}
