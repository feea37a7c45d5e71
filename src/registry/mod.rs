//! Registry integration: source registration and version lookup

pub mod existence_checker;
pub mod source_manager;

pub use existence_checker::{Existence, ExistenceChecker, interpret_response};
pub use source_manager::SourceManager;
