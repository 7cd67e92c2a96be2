//! On-disk storage for the index snapshot.
//!
//! The engine never touches the filesystem; the host keeps the snapshot
//! string it receives after every add and hands it back on startup.

use anyhow::Context;
use margin_core::IndexSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Snapshot file inside a data directory.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    base_dir: PathBuf,
}

impl SnapshotFile {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        SnapshotFile {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Path to the main snapshot file.
    pub fn path(&self) -> PathBuf {
        self.base_dir.join("margin.snapshot")
    }

    fn backup_path(&self) -> PathBuf {
        self.base_dir.join("margin.snapshot.bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.base_dir.join("margin.snapshot.tmp")
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Read the stored snapshot, if any.
    ///
    /// The contents are not validated here; the worker rejects snapshots it
    /// cannot decode.
    pub fn read(&self) -> anyhow::Result<Option<IndexSnapshot>> {
        let path = self.path();
        if !path.exists() {
            debug!(path = %path.display(), "No stored snapshot");
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        debug!(path = %path.display(), bytes = contents.len(), "Read stored snapshot");
        Ok(Some(IndexSnapshot::from(contents)))
    }

    /// Store a snapshot, replacing the previous one.
    ///
    /// Writes to a temp file first, keeps the previous snapshot as a backup
    /// and renames the temp file into place.
    pub fn write(&self, snapshot: &IndexSnapshot) -> anyhow::Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create {}", self.base_dir.display()))?;

        let path = self.path();
        let temp_path = self.temp_path();
        fs::write(&temp_path, snapshot.as_str())?;

        let backup_path = self.backup_path();
        if path.exists() {
            let _ = fs::remove_file(&backup_path);
            if let Err(e) = fs::rename(&path, &backup_path) {
                warn!(error = %e, "Could not keep snapshot backup");
            }
        }

        fs::rename(&temp_path, &path)?;
        info!(path = %path.display(), bytes = snapshot.len(), "Snapshot saved");
        Ok(())
    }

    /// Restore the previous snapshot from the backup, if there is one.
    pub fn read_backup(&self) -> anyhow::Result<Option<IndexSnapshot>> {
        let backup_path = self.backup_path();
        if !backup_path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&backup_path)?;
        Ok(Some(IndexSnapshot::from(contents)))
    }

    /// Delete the snapshot and its backup.
    pub fn clear(&self) -> anyhow::Result<()> {
        for path in [self.path(), self.backup_path(), self.temp_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
