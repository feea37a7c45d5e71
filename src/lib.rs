pub mod core;
pub mod orchestration;
pub mod registry;
pub mod security;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use self::core::*;
pub use orchestration::{ArtifactPublisher, PackagePublisher, PublishReport, RunOutcome, conclude};
pub use registry::{Existence, ExistenceChecker, SourceManager};
pub use security::{CommandError, SafeCommandExecutor, SecureTokenManager};
pub use validation::{VersionResolver, VersionValidator};
