// packbuild-core/src/acquire/git.rs
use std::fs;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::Repository;
use packbuild_common::error::{PackbuildError, Result};
use tracing::debug;

use super::files::copy_tree;

/// Materialize a version-control dependency: clone the repository, check
/// out the pinned reference if one is given (default branch tip
/// otherwise), and copy out the optional subdirectory as the dependency
/// root. Blocking; callers run this on a blocking task under a time
/// bound (`Config::git_timeout`).
pub fn acquire(
    name: &str,
    url: &str,
    root: Option<&str>,
    checkout: Option<&str>,
    work: &Path,
) -> Result<PathBuf> {
    let clone_dir = work.join("repo");
    debug!("Cloning {} into {} for '{}'", url, clone_dir.display(), name);

    let repo = Repository::clone_recurse(url, &clone_dir)
        .map_err(|e| PackbuildError::Git(format!("Unable to clone '{url}': {e}")))?;

    if let Some(rev) = checkout {
        checkout_rev(&repo, rev)
            .map_err(|e| PackbuildError::Git(format!(
                "Unable to check out '{rev}' from '{url}': {e}"
            )))?;
    }
    drop(repo);

    let copy_source = match root {
        Some(subdir) => clone_dir.join(subdir),
        None => clone_dir.clone(),
    };
    if !copy_source.is_dir() {
        return Err(PackbuildError::Git(format!(
            "No such directory '{}' in repository '{url}'",
            root.unwrap_or("")
        )));
    }

    // The repository metadata is not part of the dependency.
    let git_dir = copy_source.join(".git");
    if git_dir.exists() {
        fs::remove_dir_all(&git_dir)?;
    }

    let files = work.join("files");
    fs::create_dir_all(&files)?;
    copy_tree(&copy_source, &files)?;
    Ok(files)
}

fn checkout_rev(repo: &Repository, rev: &str) -> std::result::Result<(), git2::Error> {
    let (object, reference) = repo.revparse_ext(rev)?;
    repo.checkout_tree(&object, Some(CheckoutBuilder::new().force()))?;
    match reference.and_then(|r| r.name().map(String::from)) {
        Some(refname) => repo.set_head(&refname),
        None => repo.set_head_detached(object.id()),
    }
}

#[cfg(test)]
mod tests {
    use git2::Signature;

    use super::*;

    // Build a local repository fixture; cloning from a filesystem path
    // exercises the same code path as a remote URL.
    fn init_repo(dir: &Path) -> (Repository, git2::Oid) {
        let repo = Repository::init(dir).unwrap();
        fs::write(dir.join("pack.mcmeta"), "{}").unwrap();
        fs::create_dir_all(dir.join("pack")).unwrap();
        fs::write(dir.join("pack/pack.mcmeta"), "{\"nested\":true}").unwrap();

        let oid = {
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("pack.mcmeta")).unwrap();
            index.add_path(Path::new("pack/pack.mcmeta")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("test", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap()
        };
        (repo, oid)
    }

    #[test]
    fn clones_default_branch_tip() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = dir.path().join("upstream");
        fs::create_dir_all(&upstream).unwrap();
        init_repo(&upstream);

        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let files = acquire("lib", upstream.to_str().unwrap(), None, None, &work).unwrap();
        assert!(files.join("pack.mcmeta").is_file());
        assert!(!files.join(".git").exists());
    }

    #[test]
    fn copies_out_the_configured_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = dir.path().join("upstream");
        fs::create_dir_all(&upstream).unwrap();
        init_repo(&upstream);

        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let files = acquire(
            "lib",
            upstream.to_str().unwrap(),
            Some("pack"),
            None,
            &work,
        )
        .unwrap();
        assert_eq!(
            fs::read_to_string(files.join("pack.mcmeta")).unwrap(),
            "{\"nested\":true}"
        );
    }

    #[test]
    fn unresolved_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = dir.path().join("upstream");
        fs::create_dir_all(&upstream).unwrap();
        init_repo(&upstream);

        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let err = acquire(
            "lib",
            upstream.to_str().unwrap(),
            None,
            Some("no-such-ref"),
            &work,
        )
        .unwrap_err();
        assert!(matches!(err, PackbuildError::Git(_)));
    }
}
