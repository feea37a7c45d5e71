//! Orchestration layer for the publish step
//!
//! `PackagePublisher` drives one run end to end; `ArtifactPublisher`
//! handles the build/pack/push/tag half once a version is known to be new.

pub mod artifact_publisher;
pub mod package_publisher;

pub use artifact_publisher::{ArtifactPublisher, PublishReport, PublishedArtifact};
pub use package_publisher::{PackagePublisher, RunOutcome, conclude};
