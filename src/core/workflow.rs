//! GitHub Actions workflow-command reporter
//!
//! Progress goes to stdout as plain lines; warnings and errors become
//! `::warning::`/`::error::` annotations. Step outputs are appended to the
//! file named by `GITHUB_OUTPUT`, or printed as the legacy `::set-output`
//! command when that variable is absent.

use crate::core::traits::Reporter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Reporter writing GitHub Actions workflow commands
#[derive(Debug, Default)]
pub struct GithubReporter {
    output_file: Option<PathBuf>,
}

impl GithubReporter {
    /// Create a reporter bound to the runner's `GITHUB_OUTPUT` file, if any
    pub fn from_env() -> Self {
        let output_file = std::env::var(GITHUB_OUTPUT_ENV)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        Self { output_file }
    }

    pub fn with_output_file(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    /// Ask the runner to redact `secret` from all later log lines
    pub fn mask(&self, secret: &str) {
        println!("::add-mask::{}", escape_data(secret));
    }

    fn append_output(&self, path: &PathBuf, name: &str, value: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}={}", name, value)
    }
}

/// Escape message data the way the Actions runner expects
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property (`name=` and friends)
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Workflow command line for an annotation of `kind` (`warning`, `error`)
pub fn annotation(kind: &str, message: &str) -> String {
    format!("::{}::{}", kind, escape_data(message))
}

/// Legacy `set-output` workflow command
pub fn set_output_command(name: &str, value: &str) -> String {
    format!(
        "::set-output name={}::{}",
        escape_property(name),
        escape_data(value)
    )
}

impl GithubReporter {
    /// Record an output; returns the command to print when no file took it
    fn write_output(&self, name: &str, value: &str) -> Option<String> {
        if let Some(ref path) = self.output_file {
            match self.append_output(path, name, value) {
                Ok(()) => return None,
                Err(e) => eprintln!("⚠️  Failed to write {}: {}", path.display(), e),
            }
        }
        Some(set_output_command(name, value))
    }
}

impl Reporter for GithubReporter {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        println!("{}", annotation("warning", message));
    }

    fn error(&self, message: &str) {
        println!("{}", annotation("error", message));
    }

    fn set_output(&self, name: &str, value: &str) {
        if let Some(command) = self.write_output(name, value) {
            println!("{}", command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("100% done\nnext"), "100%25 done%0Anext");
        assert_eq!(escape_data("plain"), "plain");
    }

    #[test]
    fn test_escape_property() {
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }

    #[test]
    fn test_set_output_appends_to_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_file = temp_dir.path().join("github_output");
        let reporter = GithubReporter::with_output_file(Some(output_file.clone()));

        reporter.set_output("PACKAGE_NAME", "MyLib.1.0.0.nupkg");
        reporter.set_output("VERSION", "v1.0.0");

        let content = std::fs::read_to_string(&output_file).unwrap();
        assert_eq!(content, "PACKAGE_NAME=MyLib.1.0.0.nupkg\nVERSION=v1.0.0\n");
    }

    #[test]
    fn test_annotations_escape_message() {
        assert_eq!(
            annotation("warning", "😢 NUGET_KEY not given"),
            "::warning::😢 NUGET_KEY not given"
        );
        assert_eq!(
            annotation("error", "push failed: 50% done\r\nretry"),
            "::error::push failed: 50%25 done%0D%0Aretry"
        );
    }

    #[test]
    fn test_set_output_falls_back_without_output_file() {
        let reporter = GithubReporter::with_output_file(None);

        assert_eq!(
            reporter.write_output("PACKAGE_PATH", "/work/MyLib.1.0.0.nupkg"),
            Some("::set-output name=PACKAGE_PATH::/work/MyLib.1.0.0.nupkg".to_string())
        );
    }

    #[test]
    fn test_set_output_falls_back_when_file_unwritable() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-dir").join("github_output");
        let reporter = GithubReporter::with_output_file(Some(missing.clone()));

        assert_eq!(
            reporter.write_output("VERSION", "v1.0.0"),
            Some("::set-output name=VERSION::v1.0.0".to_string())
        );
        assert!(!missing.exists());
    }

    #[test]
    fn test_set_output_file_suppresses_command() {
        let temp_dir = TempDir::new().unwrap();
        let output_file = temp_dir.path().join("github_output");
        let reporter = GithubReporter::with_output_file(Some(output_file.clone()));

        assert_eq!(reporter.write_output("VERSION", "v1.0.0"), None);
        assert_eq!(
            std::fs::read_to_string(&output_file).unwrap(),
            "VERSION=v1.0.0\n"
        );
    }
}
