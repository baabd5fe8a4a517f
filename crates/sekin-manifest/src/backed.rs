use std::path::{Path, PathBuf};

use sekin_config::SupervisorError;
use tracing::error;

/// Wraps the backup/restore lifecycle around a manifest edit. Every
/// upgrade path must go through this: open it before touching the file,
/// then call exactly one of `commit` (delete the backup, edit kept) or
/// `rollback` (atomically restore the original, edit discarded).
pub struct BackedManifest {
    path: PathBuf,
    backup_path: PathBuf,
    resolved: bool,
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_os_string();
    backup.push(".bak");
    PathBuf::from(backup)
}

impl BackedManifest {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SupervisorError> {
        let path = path.into();
        let backup_path = backup_path_for(&path);
        tokio::fs::copy(&path, &backup_path)
            .await
            .map_err(|e| SupervisorError::ManifestIo(format!("backing up {}: {e}", path.display())))?;
        Ok(BackedManifest {
            path,
            backup_path,
            resolved: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keeps the edit, deletes the backup.
    pub async fn commit(mut self) -> Result<(), SupervisorError> {
        tokio::fs::remove_file(&self.backup_path)
            .await
            .map_err(|e| SupervisorError::ManifestIo(format!("removing backup {}: {e}", self.backup_path.display())))?;
        self.resolved = true;
        Ok(())
    }

    /// Discards the edit, atomically restoring the pre-edit file.
    pub async fn rollback(mut self) -> Result<(), SupervisorError> {
        tokio::fs::rename(&self.backup_path, &self.path)
            .await
            .map_err(|e| SupervisorError::ManifestIo(format!("restoring {}: {e}", self.path.display())))?;
        self.resolved = true;
        Ok(())
    }
}

impl Drop for BackedManifest {
    fn drop(&mut self) {
        if !self.resolved {
            error!(
                path = %self.path.display(),
                backup = %self.backup_path.display(),
                "BackedManifest dropped without commit or rollback"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_deletes_backup_and_keeps_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.yml");
        tokio::fs::write(&path, "original").await.unwrap();

        let backed = BackedManifest::open(&path).await.unwrap();
        tokio::fs::write(&path, "edited").await.unwrap();
        backed.commit().await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "edited");
        assert!(!backup_path_for(&path).exists());
    }

    #[tokio::test]
    async fn rollback_restores_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.yml");
        tokio::fs::write(&path, "original").await.unwrap();

        let backed = BackedManifest::open(&path).await.unwrap();
        tokio::fs::write(&path, "edited").await.unwrap();
        backed.rollback().await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "original");
        assert!(!backup_path_for(&path).exists());
    }
}
