pub mod version_resolver;
pub mod version_validator;

pub use version_resolver::{VersionResolver, extract_version};
pub use version_validator::{VersionValidationResult, VersionValidator};
