//! Temporary working directory for a patch run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use tracing::{debug, warn};

/// Name prefix of every workspace directory.
pub const WORKSPACE_PREFIX: &str = "paratool_";

/// Workspaces untouched for this long are treated as left over from an
/// interrupted run.
pub const STALE_AFTER: Duration = Duration::from_secs(6 * 60 * 60);

/// A uniquely named directory owned by one patch run.
///
/// Removed (best-effort) when dropped.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    /// Create a workspace under the system temp directory.
    pub fn create() -> io::Result<Self> {
        Self::create_in(std::env::temp_dir(), STALE_AFTER)
    }

    /// Create a workspace under `root`.
    ///
    /// Workspaces under the same root that were last modified more than
    /// `stale_after` ago are removed first.
    pub fn create_in<P: AsRef<Path>>(root: P, stale_after: Duration) -> io::Result<Self> {
        let root = root.as_ref();
        remove_stale(root, stale_after);

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)?;
        debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create (if needed) and return a subdirectory.
    pub fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

fn remove_stale(root: &Path, stale_after: Duration) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    let now = SystemTime::now();

    for entry in entries.flatten() {
        let is_workspace = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(WORKSPACE_PREFIX));
        if !is_workspace || !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }

        // Unknown or future timestamps count as fresh
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if !age.is_some_and(|age| age >= stale_after) {
            continue;
        }

        let path = entry.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => debug!("Removed stale workspace {}", path.display()),
            Err(e) => warn!("Could not remove stale workspace {}: {}", path.display(), e),
        }
    }
}
