// packbuild-common/src/lib.rs
pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod variables;

// Re-export key types
pub use cache::CacheLayout;
pub use config::Config;
pub use error::{PackbuildError, Result};
pub use manifest::Manifest;
pub use model::{ConfiguredDependency, DeploymentMode, Identity, PackKind, SourceParams};
pub use variables::{LayeredVariables, VariableProvider};
