//! Input loader for publish-nuget
//!
//! Inputs come from the GitHub Actions environment (`INPUT_<NAME>`, falling
//! back to a bare `<NAME>` variable) and from command-line flags. Priority
//! (high to low): CLI arguments, `INPUT_*`, bare variables, defaults.

use super::config::*;
use crate::core::error::PublishError;
use regex::{Regex, RegexBuilder};
use secrecy::SecretString;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix the Actions runner puts in front of every step input
const INPUT_PREFIX: &str = "INPUT_";

/// Fallback for the registry user when `GITHUB_USER` is not given
const ACTOR_ENV: &str = "GITHUB_ACTOR";

/// Unparsed inputs, one optional string per input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub project_file_path: Option<String>,
    pub package_name: Option<String>,
    pub version_file_path: Option<String>,
    pub version_regex: Option<String>,
    pub version_static: Option<String>,
    pub tag_commit: Option<String>,
    pub tag_format: Option<String>,
    pub nuget_source: Option<String>,
    pub nuget_key: Option<String>,
    pub include_symbols: Option<String>,
    pub continue_on_error: Option<String>,
    pub skip_build: Option<String>,
    pub signing_cert_file_name: Option<String>,
    pub github_user: Option<String>,
    pub working_directory: Option<String>,
}

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// CLI arguments (highest priority)
    pub cli_args: Option<RawInputs>,

    /// Environment variables
    pub env: HashMap<String, String>,

    /// Directory relative paths are resolved against
    pub current_dir: PathBuf,
}

impl ConfigLoadOptions {
    /// Options reading the real process environment
    pub fn from_process(cli_args: Option<RawInputs>) -> std::io::Result<Self> {
        Ok(Self {
            cli_args,
            env: std::env::vars().collect(),
            current_dir: std::env::current_dir()?,
        })
    }
}

/// Input loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from all input sources
    ///
    /// Fails on malformed boolean inputs and on an unusable version regex.
    /// A missing project file is not checked here.
    pub fn load(options: ConfigLoadOptions) -> Result<Settings, PublishError> {
        let mut inputs = Self::load_env_inputs(&options.env);

        if let Some(cli_inputs) = options.cli_args {
            Self::merge_into(&mut inputs, cli_inputs);
        }

        Self::build_settings(inputs, &options.current_dir)
    }

    /// Read inputs from `INPUT_<NAME>`, falling back to `<NAME>`
    fn load_env_inputs(env: &HashMap<String, String>) -> RawInputs {
        let get = |name: &str| {
            non_empty(env.get(&format!("{}{}", INPUT_PREFIX, name)).cloned())
                .or_else(|| non_empty(env.get(name).cloned()))
        };

        RawInputs {
            project_file_path: get("PROJECT_FILE_PATH"),
            package_name: get("PACKAGE_NAME"),
            version_file_path: get("VERSION_FILE_PATH"),
            version_regex: get("VERSION_REGEX"),
            version_static: get("VERSION_STATIC"),
            tag_commit: get("TAG_COMMIT"),
            tag_format: get("TAG_FORMAT"),
            nuget_source: get("NUGET_SOURCE"),
            nuget_key: get("NUGET_KEY"),
            include_symbols: get("INCLUDE_SYMBOLS"),
            continue_on_error: get("CONTINUE_ON_ERROR"),
            skip_build: get("SKIP_BUILD"),
            signing_cert_file_name: get("SIGNING_CERT_FILE_NAME"),
            github_user: get("GITHUB_USER").or_else(|| non_empty(env.get(ACTOR_ENV).cloned())),
            working_directory: get("WORKING_DIRECTORY"),
        }
    }

    /// Merge source inputs into target; present source values win
    fn merge_into(target: &mut RawInputs, source: RawInputs) {
        fn take(target: &mut Option<String>, source: Option<String>) {
            if let Some(value) = non_empty(source) {
                *target = Some(value);
            }
        }

        take(&mut target.project_file_path, source.project_file_path);
        take(&mut target.package_name, source.package_name);
        take(&mut target.version_file_path, source.version_file_path);
        take(&mut target.version_regex, source.version_regex);
        take(&mut target.version_static, source.version_static);
        take(&mut target.tag_commit, source.tag_commit);
        take(&mut target.tag_format, source.tag_format);
        take(&mut target.nuget_source, source.nuget_source);
        take(&mut target.nuget_key, source.nuget_key);
        take(&mut target.include_symbols, source.include_symbols);
        take(&mut target.continue_on_error, source.continue_on_error);
        take(&mut target.skip_build, source.skip_build);
        take(&mut target.signing_cert_file_name, source.signing_cert_file_name);
        take(&mut target.github_user, source.github_user);
        take(&mut target.working_directory, source.working_directory);
    }

    fn build_settings(inputs: RawInputs, current_dir: &Path) -> Result<Settings, PublishError> {
        let working_dir = inputs
            .working_directory
            .map(|dir| current_dir.join(dir))
            .unwrap_or_else(|| current_dir.to_path_buf());

        let project_file = working_dir.join(inputs.project_file_path.unwrap_or_default());
        let version_file = inputs
            .version_file_path
            .map(|path| working_dir.join(path))
            .unwrap_or_else(|| project_file.clone());

        let pattern = inputs
            .version_regex
            .unwrap_or_else(|| DEFAULT_VERSION_REGEX.to_string());
        let version_regex = Self::compile_version_regex(&pattern)?;

        let source = RegistrySource::from_url(
            inputs
                .nuget_source
                .as_deref()
                .unwrap_or(DEFAULT_NUGET_SOURCE),
        );

        Ok(Settings {
            project_file,
            package_name: inputs.package_name,
            version_file,
            version_regex,
            version_static: inputs.version_static,
            tag_commit: Self::parse_bool("TAG_COMMIT", inputs.tag_commit.as_deref(), true)?,
            tag_format: inputs
                .tag_format
                .unwrap_or_else(|| DEFAULT_TAG_FORMAT.to_string()),
            source,
            nuget_key: inputs.nuget_key.map(SecretString::from),
            include_symbols: Self::parse_bool(
                "INCLUDE_SYMBOLS",
                inputs.include_symbols.as_deref(),
                false,
            )?,
            continue_on_error: Self::parse_bool(
                "CONTINUE_ON_ERROR",
                inputs.continue_on_error.as_deref(),
                false,
            )?,
            skip_build: Self::parse_bool("SKIP_BUILD", inputs.skip_build.as_deref(), false)?,
            signing_cert: inputs
                .signing_cert_file_name
                .map(|path| working_dir.join(path)),
            actor: inputs.github_user,
            working_dir,
        })
    }

    /// Parse a boolean input strictly as a JSON boolean
    ///
    /// ```
    /// use publish_nuget::core::ConfigLoader;
    ///
    /// assert!(ConfigLoader::parse_bool("TAG_COMMIT", Some("true"), false).unwrap());
    /// assert!(ConfigLoader::parse_bool("TAG_COMMIT", Some("yes"), false).is_err());
    /// ```
    pub fn parse_bool(
        input: &str,
        value: Option<&str>,
        default: bool,
    ) -> Result<bool, PublishError> {
        match value {
            None => Ok(default),
            Some(raw) => serde_json::from_str::<bool>(raw.trim()).map_err(|_| {
                PublishError::InvalidBooleanInput {
                    input: input.to_string(),
                    value: raw.to_string(),
                }
            }),
        }
    }

    /// Compile the version pattern in multiline mode
    ///
    /// The pattern must contain a capture group; group 1 is the version.
    pub fn compile_version_regex(pattern: &str) -> Result<Regex, PublishError> {
        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|e| PublishError::InvalidVersionRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        if regex.captures_len() < 2 {
            return Err(PublishError::InvalidVersionRegex {
                pattern: pattern.to_string(),
                message: "pattern has no capture group".to_string(),
            });
        }

        Ok(regex)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn load(env: &[(&str, &str)], cli_args: Option<RawInputs>) -> Result<Settings, PublishError> {
        ConfigLoader::load(ConfigLoadOptions {
            cli_args,
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            current_dir: PathBuf::from("/repo"),
        })
    }

    #[test]
    fn test_defaults() {
        let settings = load(&[("INPUT_PROJECT_FILE_PATH", "src/MyLib.csproj")], None).unwrap();

        assert_eq!(settings.project_file, PathBuf::from("/repo/src/MyLib.csproj"));
        assert_eq!(settings.version_file, settings.project_file);
        assert!(!settings.has_separate_version_file());
        assert!(settings.tag_commit);
        assert!(!settings.include_symbols);
        assert!(!settings.continue_on_error);
        assert!(!settings.skip_build);
        assert_eq!(settings.tag_format, "v*");
        assert_eq!(settings.source.name, "nuget.org");
        assert_eq!(settings.resolved_package_name(), "MyLib");
        assert!(settings.nuget_key.is_none());
        assert_eq!(settings.working_dir, PathBuf::from("/repo"));
    }

    #[test]
    fn test_prefixed_input_wins_over_bare_variable() {
        let settings = load(
            &[
                ("INPUT_PACKAGE_NAME", "Prefixed"),
                ("PACKAGE_NAME", "Bare"),
                ("VERSION_STATIC", "1.2.3"),
            ],
            None,
        )
        .unwrap();

        assert_eq!(settings.package_name.as_deref(), Some("Prefixed"));
        assert_eq!(settings.version_static.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_empty_input_counts_as_absent() {
        let settings = load(
            &[("INPUT_VERSION_STATIC", ""), ("INPUT_TAG_COMMIT", "  ")],
            None,
        )
        .unwrap();

        assert!(settings.version_static.is_none());
        assert!(settings.tag_commit);
    }

    #[test]
    fn test_cli_args_override_env() {
        let cli = RawInputs {
            nuget_source: Some("https://nuget.pkg.github.com/octo".to_string()),
            tag_commit: Some("false".to_string()),
            ..Default::default()
        };
        let settings = load(
            &[
                ("INPUT_NUGET_SOURCE", "https://api.nuget.org"),
                ("INPUT_TAG_COMMIT", "true"),
            ],
            Some(cli),
        )
        .unwrap();

        assert_eq!(settings.source.kind, RegistryKind::Gpr);
        assert!(!settings.tag_commit);
    }

    #[test]
    fn test_malformed_boolean_fails() {
        let result = load(&[("INPUT_INCLUDE_SYMBOLS", "True")], None);

        match result {
            Err(PublishError::InvalidBooleanInput { input, value }) => {
                assert_eq!(input, "INCLUDE_SYMBOLS");
                assert_eq!(value, "True");
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_actor_falls_back_to_github_actor() {
        let settings = load(&[("GITHUB_ACTOR", "octocat")], None).unwrap();
        assert_eq!(settings.actor.as_deref(), Some("octocat"));

        let settings = load(
            &[("GITHUB_ACTOR", "octocat"), ("INPUT_GITHUB_USER", "deploy-bot")],
            None,
        )
        .unwrap();
        assert_eq!(settings.actor.as_deref(), Some("deploy-bot"));
    }

    #[test]
    fn test_key_is_kept_secret() {
        let settings = load(&[("INPUT_NUGET_KEY", "oy2abcdefghijklmnop")], None).unwrap();

        assert_eq!(settings.nuget_key(), Some("oy2abcdefghijklmnop"));
        assert_eq!(
            settings.nuget_key.as_ref().unwrap().expose_secret(),
            "oy2abcdefghijklmnop"
        );
        assert!(!format!("{:?}", settings).contains("oy2abcdefghijklmnop"));
    }

    #[test]
    fn test_working_directory_resolves_paths() {
        let settings = load(
            &[
                ("INPUT_WORKING_DIRECTORY", "pkg"),
                ("INPUT_PROJECT_FILE_PATH", "MyLib.csproj"),
                ("INPUT_VERSION_FILE_PATH", "Directory.Build.props"),
                ("INPUT_SIGNING_CERT_FILE_NAME", "cert.pfx"),
            ],
            None,
        )
        .unwrap();

        assert_eq!(settings.working_dir, PathBuf::from("/repo/pkg"));
        assert_eq!(settings.project_file, PathBuf::from("/repo/pkg/MyLib.csproj"));
        assert_eq!(
            settings.version_file,
            PathBuf::from("/repo/pkg/Directory.Build.props")
        );
        assert!(settings.has_separate_version_file());
        assert_eq!(settings.signing_cert, Some(PathBuf::from("/repo/pkg/cert.pfx")));
    }

    #[test]
    fn test_parse_bool_accepts_whitespace() {
        assert!(ConfigLoader::parse_bool("SKIP_BUILD", Some(" true\n"), false).unwrap());
        assert!(!ConfigLoader::parse_bool("SKIP_BUILD", Some("false"), true).unwrap());
        assert!(ConfigLoader::parse_bool("SKIP_BUILD", None, true).unwrap());
        assert!(ConfigLoader::parse_bool("SKIP_BUILD", Some("1"), false).is_err());
    }

    #[test]
    fn test_version_regex_is_multiline() {
        let regex = ConfigLoader::compile_version_regex(DEFAULT_VERSION_REGEX).unwrap();
        let content = "<Project>\n  <PropertyGroup>\n    <Version>1.4.0</Version>\n  </PropertyGroup>\n</Project>\n";

        let captures = regex.captures(content).unwrap();
        assert_eq!(&captures[1], "1.4.0");
    }

    #[test]
    fn test_version_regex_requires_capture_group() {
        let result = ConfigLoader::compile_version_regex(r"<Version>.*</Version>");
        assert!(matches!(result, Err(PublishError::InvalidVersionRegex { .. })));

        let result = ConfigLoader::compile_version_regex(r"<Version>(.*");
        assert!(matches!(result, Err(PublishError::InvalidVersionRegex { .. })));
    }
}
