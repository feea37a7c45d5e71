//! Publish NuGet CLI
//!
//! GitHub Actions step that publishes a NuGet package when its version is
//! not on the registry yet. Inputs come from flags, `INPUT_*` variables or
//! the bare variable names, in that order.

use anyhow::{Context, Result};
use clap::Parser;
use publish_nuget::{
    ConfigLoadOptions, ConfigLoader, GithubReporter, PackagePublisher, RawInputs,
    SafeCommandExecutor, SecureTokenManager, conclude,
};
use secrecy::SecretString;
use std::process;

/// Publish a NuGet package when its version is new
#[derive(Parser)]
#[command(name = "publish-nuget")]
#[command(version = "0.1.0")]
#[command(about = "Publish a NuGet package when its version is new", long_about = None)]
struct Cli {
    /// Project file to build and pack
    #[arg(long)]
    project_file_path: Option<String>,

    /// Package id (defaults to the project file name)
    #[arg(long)]
    package_name: Option<String>,

    /// File holding the version (defaults to the project file)
    #[arg(long)]
    version_file_path: Option<String>,

    /// Regex with one capture group around the version
    #[arg(long)]
    version_regex: Option<String>,

    /// Explicit version, skips extraction
    #[arg(long)]
    version_static: Option<String>,

    /// Tag the commit after publishing (true|false)
    #[arg(long)]
    tag_commit: Option<String>,

    /// Tag template, `*` is replaced by the version
    #[arg(long)]
    tag_format: Option<String>,

    /// Registry base URL
    #[arg(long)]
    nuget_source: Option<String>,

    /// API key for pushing
    #[arg(long)]
    nuget_key: Option<String>,

    /// Also produce and push a symbols package (true|false)
    #[arg(long)]
    include_symbols: Option<String>,

    /// Downgrade recoverable failures to warnings (true|false)
    #[arg(long)]
    continue_on_error: Option<String>,

    /// Pack existing build output (true|false)
    #[arg(long)]
    skip_build: Option<String>,

    /// Certificate used to sign packages
    #[arg(long)]
    signing_cert_file_name: Option<String>,

    /// Account for GitHub Packages
    #[arg(long)]
    github_user: Option<String>,

    /// Directory commands run in and paths resolve against
    #[arg(long)]
    working_directory: Option<String>,
}

impl From<Cli> for RawInputs {
    fn from(cli: Cli) -> Self {
        RawInputs {
            project_file_path: cli.project_file_path,
            package_name: cli.package_name,
            version_file_path: cli.version_file_path,
            version_regex: cli.version_regex,
            version_static: cli.version_static,
            tag_commit: cli.tag_commit,
            tag_format: cli.tag_format,
            nuget_source: cli.nuget_source,
            nuget_key: cli.nuget_key,
            include_symbols: cli.include_symbols,
            continue_on_error: cli.continue_on_error,
            skip_build: cli.skip_build,
            signing_cert_file_name: cli.signing_cert_file_name,
            github_user: cli.github_user,
            working_directory: cli.working_directory,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let reporter = GithubReporter::from_env();

    let options = ConfigLoadOptions::from_process(Some(cli.into()))
        .context("failed to read the current directory")?;
    let settings = match ConfigLoader::load(options) {
        Ok(settings) => settings,
        Err(e) => return Ok(conclude(&Err(e), &reporter)),
    };

    if let Some(key) = settings.nuget_key() {
        reporter.mask(key);
    }
    let tokens = settings
        .nuget_key()
        .map(|key| vec![SecretString::from(key.to_string())])
        .unwrap_or_default();
    let executor = SafeCommandExecutor::new(&settings.working_dir)
        .context("invalid WORKING_DIRECTORY")?
        .with_echo(SecureTokenManager::new(tokens));

    println!("\n📦 publish-nuget\n");

    let result = PackagePublisher::new(&settings, &executor, &reporter)
        .run()
        .await;
    Ok(conclude(&result, &reporter))
}
