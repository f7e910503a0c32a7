//! Checksum verification against sidecar digest files

use crate::artifact::BackupArtifact;
use crate::checks::{ArtifactCheck, CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
use crate::store::ArtifactStore;
use crate::{CoreError, CoreResult, DigestAlgorithm};
use async_trait::async_trait;
use sha2::{Digest, Sha256, Sha512};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Per-artifact checksum verifier
pub struct ChecksumCheck {
    pub algorithm: DigestAlgorithm,
}

/// Sidecar digest file path: `<artifact-path>.<algorithm>`
pub fn sidecar_path(artifact_path: &Path, algorithm: DigestAlgorithm) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}",
        artifact_path.to_string_lossy(),
        algorithm.extension()
    ))
}

/// Compute the streamed digest of an artifact's full contents
pub async fn digest_artifact(
    store: &dyn ArtifactStore,
    path: &Path,
    algorithm: DigestAlgorithm,
) -> CoreResult<String> {
    let reader = store.open_reader(path).await?;
    match algorithm {
        DigestAlgorithm::Sha256 => hash_reader::<Sha256, _>(reader).await,
        DigestAlgorithm::Sha512 => hash_reader::<Sha512, _>(reader).await,
    }
}

async fn hash_reader<D, R>(mut reader: R) -> CoreResult<String>
where
    D: Digest,
    R: AsyncRead + Unpin,
{
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[async_trait]
impl ArtifactCheck for ChecksumCheck {
    fn kind(&self) -> &'static str {
        "backup_integrity"
    }

    async fn run(&self, store: &dyn ArtifactStore, artifact: &BackupArtifact) -> CheckItem {
        let started = Instant::now();
        let name = format!("{}_{}", self.kind(), artifact.name);

        let computed = match digest_artifact(store, &artifact.path, self.algorithm).await {
            Ok(digest) => digest,
            Err(e) => {
                tracing::warn!("checksum read failed for {}: {}", artifact.name, e);
                return CheckItem {
                    name,
                    category: CheckCategory::Integrity,
                    status: CheckStatus::Fail,
                    severity: Severity::High,
                    message: format!("backup file could not be read: {}", e),
                    details: Some(CheckDetails::Failure {
                        error: e.to_string(),
                    }),
                    duration_ms: started.elapsed().as_millis() as u64,
                };
            }
        };

        match store.read(&sidecar_path(&artifact.path, self.algorithm)).await {
            Ok(sidecar) => {
                let stored = String::from_utf8_lossy(&sidecar).trim().to_string();
                if stored.eq_ignore_ascii_case(&computed) {
                    CheckItem {
                        name,
                        category: CheckCategory::Integrity,
                        status: CheckStatus::Pass,
                        severity: Severity::Low,
                        message: "checksum verified against stored digest".to_string(),
                        details: Some(CheckDetails::Checksum {
                            algorithm: self.algorithm.to_string(),
                            computed,
                            stored: Some(stored),
                        }),
                        duration_ms: started.elapsed().as_millis() as u64,
                    }
                } else {
                    tracing::warn!(
                        "checksum mismatch for {}: stored {}, computed {}",
                        artifact.name,
                        stored,
                        computed
                    );
                    CheckItem {
                        name,
                        category: CheckCategory::Integrity,
                        status: CheckStatus::Fail,
                        severity: Severity::High,
                        message: "checksum mismatch - potential corruption".to_string(),
                        details: Some(CheckDetails::Checksum {
                            algorithm: self.algorithm.to_string(),
                            computed,
                            stored: Some(stored),
                        }),
                        duration_ms: started.elapsed().as_millis() as u64,
                    }
                }
            }
            // Absence of a baseline is not itself a failure.
            Err(e) if sidecar_missing(&e) => CheckItem {
                name,
                category: CheckCategory::Integrity,
                status: CheckStatus::Pass,
                severity: Severity::Low,
                message: "file readable, no stored checksum".to_string(),
                details: Some(CheckDetails::Checksum {
                    algorithm: self.algorithm.to_string(),
                    computed,
                    stored: None,
                }),
                duration_ms: started.elapsed().as_millis() as u64,
            },
            // A sidecar that exists but cannot be read is a storage fault,
            // not a missing baseline.
            Err(e) => {
                tracing::warn!("sidecar read failed for {}: {}", artifact.name, e);
                CheckItem {
                    name,
                    category: CheckCategory::Integrity,
                    status: CheckStatus::Fail,
                    severity: Severity::Medium,
                    message: format!("stored checksum could not be read: {}", e),
                    details: Some(CheckDetails::Failure {
                        error: e.to_string(),
                    }),
                    duration_ms: started.elapsed().as_millis() as u64,
                }
            }
        }
    }
}

fn sidecar_missing(e: &CoreError) -> bool {
    matches!(e, CoreError::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
}
