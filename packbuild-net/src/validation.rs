// packbuild-net/src/validation.rs
use std::fs::File;
use std::io;
use std::path::Path;

use packbuild_common::error::{PackbuildError, Result};
use sha2::{Digest, Sha256};
use url::Url;

/// Verifies the SHA256 checksum of a file. Fails closed: a mismatch is an
/// error, never a warning.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    tracing::debug!("Verifying checksum for: {}", path.display());
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let bytes_copied = io::copy(&mut file, &mut hasher)?;
    let actual = hex::encode(hasher.finalize());
    tracing::debug!("Calculated SHA256: {} ({} bytes read)", actual, bytes_copied);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(PackbuildError::ChecksumMismatch(format!(
            "Checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            actual
        )))
    }
}

/// Validates a download URL, accepting only http and https schemes.
pub fn validate_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| PackbuildError::Generic(format!("Failed to parse URL '{url_str}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PackbuildError::ValidationError(format!(
            "Invalid URL scheme for '{url_str}': Must be http or https, but got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn checksum_accepts_matching_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"pack contents").unwrap();
        // sha256 of "pack contents"
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"pack contents");
            hex::encode(hasher.finalize())
        };
        verify_checksum(file.path(), &expected).unwrap();
        verify_checksum(file.path(), &expected.to_uppercase()).unwrap();
    }

    #[test]
    fn checksum_mismatch_fails_closed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"pack contents").unwrap();
        let err = verify_checksum(file.path(), &"0".repeat(64)).unwrap_err();
        assert!(matches!(err, PackbuildError::ChecksumMismatch(_)));
    }

    #[test]
    fn url_scheme_is_restricted() {
        validate_url("https://example.com/pack.zip").unwrap();
        validate_url("http://127.0.0.1:8080/pack.zip").unwrap();
        assert!(validate_url("ftp://example.com/pack.zip").is_err());
        assert!(validate_url("not a url").is_err());
    }
}
