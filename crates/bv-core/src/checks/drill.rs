//! Restoration drill: copy a backup to scratch space and compare sizes
//!
//! The scratch file's lifetime is exactly the drill's execution; cleanup
//! runs on every exit path and deletion errors are swallowed so that
//! best-effort cleanup never masks the drill's actual result.

use crate::artifact::BackupArtifact;
use crate::checks::{ArtifactCheck, CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
use crate::store::ArtifactStore;
use crate::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Size-gated restore rehearsal
pub struct RestoreDrill {
    pub scratch_dir: PathBuf,
    pub max_test_file_size: u64,
    pub timeout: Duration,
}

#[async_trait]
impl ArtifactCheck for RestoreDrill {
    fn kind(&self) -> &'static str {
        "restore_test"
    }

    async fn run(&self, store: &dyn ArtifactStore, artifact: &BackupArtifact) -> CheckItem {
        let started = Instant::now();
        let name = format!("{}_{}", self.kind(), artifact.name);

        if artifact.size_bytes > self.max_test_file_size {
            return CheckItem {
                name,
                category: CheckCategory::Integrity,
                status: CheckStatus::Skip,
                severity: Severity::Low,
                message: "file too large for restore test".to_string(),
                details: Some(CheckDetails::SizeGate {
                    size_bytes: artifact.size_bytes,
                    limit_bytes: self.max_test_file_size,
                }),
                duration_ms: started.elapsed().as_millis() as u64,
            };
        }

        let scratch_name = format!(
            "test_restore_{}_{}",
            artifact.name,
            Utc::now().timestamp_millis()
        );
        let scratch_path = self.scratch_dir.join(scratch_name);

        tracing::debug!(
            "restore drill for {} via {}",
            artifact.name,
            scratch_path.display()
        );

        let outcome = tokio::time::timeout(
            self.timeout,
            restore_copy(store, artifact, &self.scratch_dir, &scratch_path),
        )
        .await;

        // Best-effort cleanup on every exit path.
        let _ = store.remove_file(&scratch_path).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Err(_) => {
                let e = CoreError::Timeout(self.timeout.as_secs());
                CheckItem {
                    name,
                    category: CheckCategory::Integrity,
                    status: CheckStatus::Fail,
                    severity: Severity::High,
                    message: format!("restore test {}", e),
                    details: Some(CheckDetails::Failure {
                        error: e.to_string(),
                    }),
                    duration_ms,
                }
            }
            Ok(Err(e)) => CheckItem {
                name,
                category: CheckCategory::Integrity,
                status: CheckStatus::Fail,
                severity: Severity::High,
                message: format!("restore test failed: {}", e),
                details: Some(CheckDetails::Failure {
                    error: e.to_string(),
                }),
                duration_ms,
            },
            Ok(Ok(restored_bytes)) => {
                if restored_bytes == artifact.size_bytes {
                    CheckItem {
                        name,
                        category: CheckCategory::Integrity,
                        status: CheckStatus::Pass,
                        severity: Severity::Low,
                        message: format!("restore test passed in {} ms", duration_ms),
                        details: Some(CheckDetails::Drill {
                            original_bytes: artifact.size_bytes,
                            restored_bytes,
                        }),
                        duration_ms,
                    }
                } else {
                    tracing::warn!(
                        "restore size mismatch for {}: original {}, restored {}",
                        artifact.name,
                        artifact.size_bytes,
                        restored_bytes
                    );
                    CheckItem {
                        name,
                        category: CheckCategory::Integrity,
                        status: CheckStatus::Fail,
                        severity: Severity::High,
                        message: "restored file size mismatch".to_string(),
                        details: Some(CheckDetails::Drill {
                            original_bytes: artifact.size_bytes,
                            restored_bytes,
                        }),
                        duration_ms,
                    }
                }
            }
        }
    }
}

async fn restore_copy(
    store: &dyn ArtifactStore,
    artifact: &BackupArtifact,
    scratch_dir: &Path,
    scratch_path: &Path,
) -> CoreResult<u64> {
    store.create_dir_all(scratch_dir).await?;
    let data = store.read(&artifact.path).await?;
    store.write(scratch_path, &data).await?;
    let stat = store.stat(scratch_path).await?;
    Ok(stat.size_bytes)
}
