//! Backup artifact discovery

use crate::store::ArtifactStore;
use crate::CoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filename suffixes that identify backup artifacts
pub const BACKUP_SUFFIXES: [&str; 3] = [".db", ".backup", ".sql"];

/// A discovered backup file, snapshotted once per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// Whether a filename follows the backup naming convention
pub fn is_backup_name(name: &str) -> bool {
    BACKUP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Enumerate backup artifacts under a root directory, newest first.
///
/// Entries that disappear between listing and stat are skipped rather
/// than failing the whole enumeration.
pub async fn discover(store: &dyn ArtifactStore, root: &Path) -> CoreResult<Vec<BackupArtifact>> {
    let entries = store.list_dir(root).await?;
    let mut artifacts = Vec::new();

    for path in entries {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if !is_backup_name(&name) {
            continue;
        }
        let stat = match store.stat(&path).await {
            Ok(stat) => stat,
            Err(e) => {
                tracing::warn!("skipping unreadable entry {}: {}", path.display(), e);
                continue;
            }
        };
        if stat.is_dir {
            continue;
        }
        artifacts.push(BackupArtifact {
            path,
            name,
            size_bytes: stat.size_bytes,
            modified_at: stat.modified_at,
        });
    }

    sort_newest_first(&mut artifacts);
    Ok(artifacts)
}

/// Stable ordering: modification time descending, filename as tie-break.
/// The 5-artifact and 10-sample caps depend on this being deterministic.
pub fn sort_newest_first(artifacts: &mut [BackupArtifact]) {
    artifacts.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn artifact(name: &str, modified_at: DateTime<Utc>) -> BackupArtifact {
        BackupArtifact {
            path: PathBuf::from(name),
            name: name.to_string(),
            size_bytes: 0,
            modified_at,
        }
    }

    #[test]
    fn test_suffix_convention() {
        assert!(is_backup_name("tasks.db"));
        assert!(is_backup_name("weekly.backup"));
        assert!(is_backup_name("dump.sql"));
        assert!(!is_backup_name("tasks.db.sha256"));
        assert!(!is_backup_name("notes.txt"));
    }

    #[test]
    fn test_newest_first_with_tiebreak() {
        let older = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap();

        let mut artifacts = vec![
            artifact("b.db", older),
            artifact("z.sql", newer),
            artifact("a.db", newer),
        ];
        sort_newest_first(&mut artifacts);

        let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.db", "z.sql", "b.db"]);
    }
}
