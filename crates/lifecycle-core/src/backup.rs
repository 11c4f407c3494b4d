//! Remote state snapshots
//!
//! Before a bucket's lifecycle configuration is overwritten, the current
//! remote document is written to a timestamped JSON file so an operator can
//! restore it by hand. Snapshots are best-effort: the engine logs a warning
//! and proceeds when one cannot be written.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use lifecycle_policy::PolicyDocument;

use crate::error::Result;

/// Writes pre-update snapshots of remote configurations.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Manager writing into the OS temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot `policy` as `lifecycle-backup-{bucket}-{YYYYmmdd-HHMMSS}.json`
    /// under the manager's directory, creating it if needed. Returns the
    /// path of the written file.
    pub fn write_snapshot(&self, bucket: &str, policy: &PolicyDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let path = self
            .dir
            .join(format!("lifecycle-backup-{bucket}-{stamp}.json"));
        let content = serde_json::to_string_pretty(policy.as_value())?;
        fs::write(&path, content)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> PolicyDocument {
        PolicyDocument::from_value(json!({
            "Rules": [{"ID": "expire", "Status": "Enabled", "Expiration": {"Days": 30}}]
        }))
        .unwrap()
    }

    #[test]
    fn snapshot_lands_in_the_backup_dir_with_bucket_in_the_name() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path());

        let path = manager.write_snapshot("my-bucket", &sample()).unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lifecycle-backup-my-bucket-"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn snapshot_content_parses_back_to_the_policy() {
        let dir = tempdir().unwrap();
        let manager = BackupManager::new(dir.path());
        let policy = sample();

        let path = manager.write_snapshot("b", &policy).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(&written, policy.as_value());
    }

    #[test]
    fn missing_backup_dir_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("backups/lifecycle");
        let manager = BackupManager::new(&nested);

        manager.write_snapshot("b", &sample()).unwrap();
        assert!(nested.is_dir());
    }
}
