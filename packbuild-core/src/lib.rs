// packbuild-core/src/lib.rs
pub mod acquire;
pub mod compat;
pub mod formats;
pub mod index;
pub mod orchestrate;

pub use acquire::{AcquireContext, ProjectContext, PACK_METADATA_FILE};
pub use formats::{FormatDataset, FormatEntry, FormatResolver};
pub use index::DependencyIndex;
pub use orchestrate::{resolve_dependencies, ReadyDependency, ResolveOutcome};
