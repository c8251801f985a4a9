//! Workspace provisioning

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::errors::SkiffError;
use crate::filesys::dir::Dir;

/// Process-wide sequence to disambiguate same-millisecond allocations
static ALLOC_SEQ: AtomicU64 = AtomicU64::new(0);

/// Ephemeral directory holding one deployment attempt's source tree
#[derive(Debug, Clone)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Allocate a fresh workspace directory under the given root.
///
/// The name combines a millisecond timestamp, a per-process sequence
/// number, and the sanitized repo name, so two requests never share a
/// path even when issued at the same instant.
pub async fn allocate(root: &Path, repo_name: &str) -> Result<Workspace, SkiffError> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let seq = ALLOC_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = format!("deploy_{}_{}_{}", timestamp, seq, sanitize(repo_name));
    let path = root.join(name);

    let dir = Dir::new(&path);
    dir.create()
        .await
        .map_err(|e| SkiffError::FilesystemError(format!("{}: {}", path.display(), e)))?;

    debug!("Allocated workspace: {}", path.display());
    Ok(Workspace { path })
}

/// Strip path separators and other unsafe characters from a repo name
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_distinct_names_never_collide() {
        let root = tempfile::tempdir().unwrap();
        let (a, b) = tokio::join!(allocate(root.path(), "repo-a"), allocate(root.path(), "repo-b"));
        assert_ne!(a.unwrap().path(), b.unwrap().path());
    }

    #[tokio::test]
    async fn test_same_name_same_instant() {
        let root = tempfile::tempdir().unwrap();
        let (a, b) = tokio::join!(allocate(root.path(), "repo"), allocate(root.path(), "repo"));
        assert_ne!(a.unwrap().path(), b.unwrap().path());
    }

    #[test]
    fn test_sanitize_strips_separators() {
        assert_eq!(sanitize("org/repo"), "org_repo");
        assert_eq!(sanitize("../evil"), ".._evil");
    }
}
