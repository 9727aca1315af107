// packbuild-net/src/lib.rs
pub mod http;
pub mod registry;
pub mod validation;

pub use http::{build_http_client, download_to, fetch_json};
pub use registry::{list_versions, select_version, RegistryFile, RegistryVersion};
pub use validation::{validate_url, verify_checksum};
