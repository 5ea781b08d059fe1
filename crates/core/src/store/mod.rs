//! Request-scoped temporary storage for generated artifacts.
//!
//! Layout on disk:
//!
//! ```text
//! <artifact_dir>/
//!   web2pdf-XXXXXX/        one per process, removed on shutdown
//!     req-XXXXXX/          one per request, removed when its scope drops
//!       artifact-XXXXXX.pdf
//! ```
//!
//! Every name is created with `O_EXCL` semantics by `tempfile`, so two
//! allocations never share a path, within a request or across concurrent ones.
//! Request directories that outlive their scope (crash, aborted transport) are
//! removed by [`ArtifactStore::sweep`]. Scopes that are still open are never
//! swept, however old they are.

mod sweep;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tempfile::{Builder, NamedTempFile, TempDir, TempPath};

use crate::Error;

pub use sweep::sweep_dir;

const PROCESS_PREFIX: &str = "web2pdf-";
const REQUEST_PREFIX: &str = "req-";
const ARTIFACT_PREFIX: &str = "artifact-";

/// Process-wide artifact store.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    process_dir: TempDir,
    live: LiveScopes,
}

/// Paths of request scopes that have not been dropped yet.
#[derive(Debug, Default, Clone)]
struct LiveScopes(Arc<Mutex<HashSet<PathBuf>>>);

impl LiveScopes {
    fn insert(&self, path: PathBuf) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).insert(path);
    }

    fn remove(&self, path: &Path) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).remove(path);
    }

    fn snapshot(&self) -> Vec<PathBuf> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).iter().cloned().collect()
    }
}

/// Unregisters a scope path when its owner drops.
#[derive(Debug)]
struct LiveGuard {
    live: LiveScopes,
    path: PathBuf,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.live.remove(&self.path);
    }
}

impl ArtifactStore {
    /// Create the process-scoped directory under `root`, creating `root` if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| Error::storage(&root, e))?;

        let process_dir = Builder::new()
            .prefix(PROCESS_PREFIX)
            .tempdir_in(&root)
            .map_err(|e| Error::storage(&root, e))?;

        tracing::info!(path = %process_dir.path().display(), "artifact store opened");

        Ok(Self { root, process_dir, live: LiveScopes::default() })
    }

    /// Directory holding this process's request scopes.
    pub fn path(&self) -> &Path {
        self.process_dir.path()
    }

    /// Open an isolated namespace for one request.
    pub fn scope(&self) -> Result<RequestScope, Error> {
        let dir = Builder::new()
            .prefix(REQUEST_PREFIX)
            .tempdir_in(self.path())
            .map_err(|e| Error::storage(self.path(), e))?;

        tracing::debug!(path = %dir.path().display(), "request scope opened");
        let path = dir.path().to_path_buf();
        self.live.insert(path.clone());
        Ok(RequestScope { dir, _live: LiveGuard { live: self.live.clone(), path } })
    }

    /// Remove request directories in this process's store untouched for
    /// `older_than` and no longer owned by a [`RequestScope`].
    ///
    /// Returns the number of directories removed.
    pub fn sweep(&self, older_than: Duration) -> usize {
        sweep_dir(self.path(), REQUEST_PREFIX, older_than, &self.live.snapshot())
    }

    /// Remove process directories left behind by earlier runs under the same root.
    pub fn sweep_stale_processes(&self, older_than: Duration) -> usize {
        sweep_dir(&self.root, PROCESS_PREFIX, older_than, &[self.path().to_path_buf()])
    }
}

/// A request's private directory. Dropping the scope removes it and every
/// artifact that was not claimed by the packager.
#[derive(Debug)]
pub struct RequestScope {
    dir: TempDir,
    _live: LiveGuard,
}

impl RequestScope {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Allocate a uniquely named, writable file in this scope.
    pub fn allocate(&self, suffix: &str) -> Result<NamedTempFile, Error> {
        allocate_in(self.path(), suffix)
    }

    /// Write `bytes` to a fresh file in this scope and hand back its owning path.
    ///
    /// The write runs on the blocking pool. Dropping the returned [`TempPath`]
    /// deletes the file.
    pub async fn persist(&self, suffix: &str, bytes: Vec<u8>) -> Result<TempPath, Error> {
        let dir = self.path().to_path_buf();
        let suffix = suffix.to_string();

        tokio::task::spawn_blocking(move || {
            use std::io::Write;

            let mut file = allocate_in(&dir, &suffix)?;
            file.write_all(&bytes).map_err(|e| Error::storage(file.path(), e))?;
            file.as_file().sync_all().map_err(|e| Error::storage(file.path(), e))?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| Error::StorageFailed(format!("write task failed: {e}")))?
    }

    /// Remove the scope directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<(), Error> {
        let path = self.path().to_path_buf();
        self.dir.close().map_err(|e| Error::storage(&path, e))
    }
}

fn allocate_in(dir: &Path, suffix: &str) -> Result<NamedTempFile, Error> {
    Builder::new()
        .prefix(ARTIFACT_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| Error::storage(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_open_creates_process_dir() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path().join("nested")).unwrap();
        assert!(store.path().is_dir());
        assert!(store.path().starts_with(root.path().join("nested")));
    }

    #[test]
    fn test_allocate_uses_suffix() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();

        let file = scope.allocate(".pdf").unwrap();
        assert!(file.path().starts_with(scope.path()));
        assert!(file.path().to_string_lossy().ends_with(".pdf"));
    }

    #[test]
    fn test_concurrent_allocations_never_collide() {
        let root = tempfile::tempdir().unwrap();
        let store = Arc::new(ArtifactStore::open(root.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let scope = store.scope().unwrap();
                    let paths: Vec<PathBuf> = (0..25)
                        .map(|_| scope.allocate(".pdf").unwrap().into_temp_path().keep().unwrap())
                        .collect();
                    (scope, paths)
                })
            })
            .collect();

        let mut all = Vec::new();
        let mut scopes = Vec::new();
        for handle in handles {
            let (scope, paths) = handle.join().unwrap();
            scopes.push(scope);
            all.extend(paths);
        }

        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 200);
        assert_eq!(unique.len(), all.len());

        let scope_dirs: HashSet<_> = scopes.iter().map(|s| s.path().to_path_buf()).collect();
        assert_eq!(scope_dirs.len(), 8);
    }

    #[tokio::test]
    async fn test_persist_writes_bytes() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();

        let path = scope.persist(".pdf", b"%PDF-1.5 test".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");

        let owned = path.to_path_buf();
        drop(path);
        assert!(!owned.exists());
    }

    #[tokio::test]
    async fn test_persist_unwritable_scope_is_storage_error() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();
        std::fs::remove_dir_all(scope.path()).unwrap();

        let err = scope.persist(".pdf", vec![1, 2, 3]).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Storage);
    }

    #[test]
    fn test_scope_drop_removes_unclaimed_files() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();
        let kept = scope.allocate(".pdf").unwrap().into_temp_path().keep().unwrap();
        let dir = scope.path().to_path_buf();

        drop(scope);
        assert!(!kept.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_close_removes_scope() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();
        let dir = scope.path().to_path_buf();

        scope.close().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_sweep_removes_abandoned_scopes() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();

        let abandoned = store.scope().unwrap().into_path_for_test();
        assert!(abandoned.exists());

        assert_eq!(store.sweep(Duration::from_secs(3600)), 0);
        assert!(abandoned.exists());

        assert_eq!(store.sweep(Duration::ZERO), 1);
        assert!(!abandoned.exists());
    }

    #[tokio::test]
    async fn test_sweep_never_removes_open_scope() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();
        let first = scope.persist(".pdf", b"first".to_vec()).await.unwrap();

        assert_eq!(store.sweep(Duration::ZERO), 0);
        assert!(scope.path().exists());
        assert!(first.exists());

        let second = scope.persist(".pdf", b"second".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&second).unwrap(), b"second");

        let dir = scope.path().to_path_buf();
        drop((first, second));
        let abandoned = scope.into_path_for_test();
        assert_eq!(abandoned, dir);
        assert_eq!(store.sweep(Duration::ZERO), 1);
        assert!(!dir.exists());
    }

    #[test]
    fn test_sweep_stale_processes_skips_current() {
        let root = tempfile::tempdir().unwrap();
        let leftover = root.path().join("web2pdf-old");
        std::fs::create_dir_all(leftover.join("req-1")).unwrap();

        let store = ArtifactStore::open(root.path()).unwrap();
        assert_eq!(store.sweep_stale_processes(Duration::ZERO), 1);
        assert!(!leftover.exists());
        assert!(store.path().exists());
    }

    impl RequestScope {
        fn into_path_for_test(self) -> PathBuf {
            self.dir.keep()
        }
    }
}
