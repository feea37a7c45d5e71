//! Existence Checker - Asks the registry whether a version is already published
//!
//! Standard feeds are queried through the flat-container package index;
//! GitHub Packages through its download index with basic authentication.

use crate::core::config::{RegistryKind, Settings};
use crate::core::error::PublishError;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::Deserialize;

/// nuget.org rejects some requests without a browser-like agent
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of a version lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Published,
    NotPublished,
}

/// Package version index document
#[derive(Debug, Deserialize)]
struct PackageVersionIndex {
    versions: Vec<String>,
}

/// Registry version lookup over HTTP
#[derive(Debug, Clone, Default)]
pub struct ExistenceChecker {
    client: reqwest::Client,
}

impl ExistenceChecker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Look `version` of `package_name` up in the configured registry
    ///
    /// Issues exactly one request, without timeout or retry.
    pub async fn check(
        &self,
        settings: &Settings,
        package_name: &str,
        version: &str,
    ) -> Result<Existence, PublishError> {
        let url = settings.source.lookup_url(package_name);

        let request = match settings.source.kind {
            RegistryKind::Gpr => self.client.get(&url).basic_auth(
                settings.actor.clone().unwrap_or_default(),
                settings.nuget_key().map(str::to_string),
            ),
            RegistryKind::NuGet => self.client.get(&url).header(USER_AGENT, BROWSER_USER_AGENT),
        };

        let response = request
            .send()
            .await
            .map_err(|e| PublishError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = if status == StatusCode::OK {
            response
                .text()
                .await
                .map_err(|e| PublishError::NetworkError {
                    message: e.to_string(),
                })?
        } else {
            String::new()
        };

        interpret_response(status, &body, version)
    }
}

/// Map a lookup response to an existence decision
///
/// 200 lists published versions, 404 means the package was never
/// published, anything else is an error.
pub fn interpret_response(
    status: StatusCode,
    body: &str,
    version: &str,
) -> Result<Existence, PublishError> {
    match status {
        StatusCode::OK => {
            let index: PackageVersionIndex =
                serde_json::from_str(body).map_err(|e| PublishError::InvalidRegistryResponse {
                    message: e.to_string(),
                })?;

            // flat-container versions are normalized to lower case
            if index
                .versions
                .iter()
                .any(|published| published.eq_ignore_ascii_case(version))
            {
                Ok(Existence::Published)
            } else {
                Ok(Existence::NotPublished)
            }
        }
        StatusCode::NOT_FOUND => Ok(Existence::NotPublished),
        other => Err(PublishError::UnexpectedStatus {
            status: other.as_u16(),
            reason: other.canonical_reason().unwrap_or("").to_string(),
        }),
    }
}
