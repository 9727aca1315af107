pub mod dependency;
pub mod identity;

pub use dependency::{ConfiguredDependency, DeploymentMode, PackKind, SourceParams};
pub use identity::Identity;
