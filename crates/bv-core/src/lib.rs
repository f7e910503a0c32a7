//! Backup Integrity & Restoration-Verification Engine
//!
//! This crate verifies a directory of backup artifacts: checksum
//! verification against sidecar digests, structural validation of
//! encryption envelopes, restore-and-compare drills, compliance
//! evaluation (frequency, retention, encryption coverage), and a
//! timed performance probe, aggregated into a scored health report.

pub mod artifact;
pub mod checks;
pub mod report;
pub mod store;

use chrono::{DateTime, Utc};
use futures::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use uuid::Uuid;

pub use artifact::BackupArtifact;
pub use checks::{ArtifactCheck, CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
pub use report::{HealthReport, HealthSummary, OverallStatus, QuickStatus, ServiceHealth};
pub use store::{ArtifactStore, LocalArtifactStore};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Per-artifact checks run for at most this many of the newest artifacts.
pub const RECENT_CHECK_CAP: usize = 5;
/// Encryption coverage samples at most this many of the newest artifacts.
pub const ENCRYPTION_SAMPLE_CAP: usize = 10;
/// An artifact counts as "recent" when modified inside this window.
pub const RECENT_WINDOW_HOURS: i64 = 24;
/// Quick status reports degraded when the newest artifact is older than this.
pub const STALE_WINDOW_HOURS: i64 = 48;
/// Retention evaluation counts artifacts older than this.
pub const RETENTION_AGE_DAYS: i64 = 30;
/// Retention warns when more than this many aged artifacts exist.
pub const RETENTION_WARN_COUNT: usize = 10;
/// Performance probe warns when a full read takes longer than this.
pub const SLOW_READ_MS: u64 = 5000;

/// Digest algorithm for checksum verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Sidecar file extension, e.g. `backup.db.sha256`
    pub fn extension(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            other => Err(CoreError::Config(format!(
                "unsupported digest algorithm: {}",
                other
            ))),
        }
    }
}

/// Verifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Directory holding backup artifacts
    pub backup_dir: PathBuf,
    /// Scratch directory for restore drills
    pub scratch_dir: PathBuf,
    /// Artifacts above this size are skipped by the drill and the probe (bytes)
    pub max_test_file_size: u64,
    /// Digest algorithm for checksum verification
    pub algorithm: DigestAlgorithm,
    /// Timeout applied to the drill and the performance probe (seconds)
    pub check_timeout_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from("./backups"),
            scratch_dir: PathBuf::from("./backup-tests"),
            max_test_file_size: 100 * 1024 * 1024, // 100 MiB
            algorithm: DigestAlgorithm::Sha256,
            check_timeout_secs: 60,
        }
    }
}

/// Main verifier interface
pub struct BackupVerifier {
    config: VerifyConfig,
    store: Arc<dyn ArtifactStore>,
    artifact_checks: Vec<Arc<dyn ArtifactCheck>>,
}

impl BackupVerifier {
    /// Create a verifier over the local filesystem with default configuration
    pub fn new(config: VerifyConfig) -> Self {
        Self::with_store(config, Arc::new(LocalArtifactStore::new()))
    }

    /// Create a verifier over a custom artifact store
    pub fn with_store(config: VerifyConfig, store: Arc<dyn ArtifactStore>) -> Self {
        let timeout = Duration::from_secs(config.check_timeout_secs);
        let artifact_checks: Vec<Arc<dyn ArtifactCheck>> = vec![
            Arc::new(checks::checksum::ChecksumCheck {
                algorithm: config.algorithm,
            }),
            Arc::new(checks::envelope::EnvelopeCheck),
            Arc::new(checks::drill::RestoreDrill {
                scratch_dir: config.scratch_dir.clone(),
                max_test_file_size: config.max_test_file_size,
                timeout,
            }),
        ];

        Self {
            config,
            store,
            artifact_checks,
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Enumerate backup artifacts, newest first
    pub async fn list_artifacts(&self) -> CoreResult<Vec<BackupArtifact>> {
        artifact::discover(self.store.as_ref(), &self.config.backup_dir).await
    }

    /// Run the full health check. Never returns an error: faults inside
    /// individual checks become fail items, and a fault in the orchestration
    /// itself degrades into a single-item critical report.
    pub async fn run_health_check(&self) -> HealthReport {
        let check_id = Uuid::new_v4();
        let timestamp = Utc::now();
        let started = Instant::now();

        tracing::info!("starting backup health check {}", check_id);

        match self.execute(check_id, timestamp, started).await {
            Ok(report) => {
                tracing::info!(
                    "health check {} completed: {} ({} checks, {} ms)",
                    check_id,
                    report.overall_status,
                    report.summary.total,
                    report.duration_ms
                );
                report
            }
            Err(e) => {
                tracing::error!("health check {} execution failed: {}", check_id, e);
                HealthReport::degraded(
                    check_id,
                    timestamp,
                    started.elapsed().as_millis() as u64,
                    &e.to_string(),
                )
            }
        }
    }

    async fn execute(
        &self,
        check_id: Uuid,
        timestamp: DateTime<Utc>,
        started: Instant,
    ) -> CoreResult<HealthReport> {
        let mut items: Vec<CheckItem> = Vec::new();

        // Accessibility gate: report the failure but keep going, so the
        // availability check can still describe what enumeration sees.
        match self.store.stat(&self.config.backup_dir).await {
            Ok(stat) if stat.is_dir => {}
            Ok(_) => items.push(accessibility_failure(
                &self.config.backup_dir,
                "backup path exists but is not a directory",
            )),
            Err(e) => items.push(accessibility_failure(
                &self.config.backup_dir,
                &format!("backup directory is not accessible: {}", e),
            )),
        }

        let artifacts =
            match artifact::discover(self.store.as_ref(), &self.config.backup_dir).await {
                Ok(artifacts) => artifacts,
                Err(e) => {
                    items.push(availability_failure(&format!(
                        "backup directory could not be enumerated: {}",
                        e
                    )));
                    return Ok(self.finalize(check_id, timestamp, started, items));
                }
            };

        if artifacts.is_empty() {
            items.push(availability_failure("no backup files found"));
            return Ok(self.finalize(check_id, timestamp, started, items));
        }

        tracing::debug!("found {} backup artifacts", artifacts.len());

        // Per-artifact fan-out over the newest artifacts, bounded by a
        // semaphore; joined in spawn order so report ordering is stable.
        let semaphore = Arc::new(Semaphore::new(RECENT_CHECK_CAP));
        let mut per_artifact = FuturesOrdered::new();

        for artifact in artifacts.iter().take(RECENT_CHECK_CAP).cloned() {
            for check in &self.artifact_checks {
                let check = Arc::clone(check);
                let store = Arc::clone(&self.store);
                let artifact = artifact.clone();
                let semaphore = Arc::clone(&semaphore);

                per_artifact.push_back(tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    check.run(store.as_ref(), &artifact).await
                }));
            }
        }

        // System-wide evaluators run concurrently with the fan-out.
        let frequency = tokio::spawn({
            let artifacts = artifacts.clone();
            async move { checks::compliance::frequency_check(&artifacts, Utc::now()) }
        });
        let retention = tokio::spawn({
            let artifacts = artifacts.clone();
            async move { checks::compliance::retention_check(&artifacts, Utc::now()) }
        });
        let coverage = tokio::spawn({
            let artifacts = artifacts.clone();
            let store = Arc::clone(&self.store);
            async move { checks::compliance::coverage_check(store.as_ref(), &artifacts).await }
        });
        let performance = tokio::spawn({
            let newest = artifacts[0].clone();
            let store = Arc::clone(&self.store);
            let max_size = self.config.max_test_file_size;
            let timeout = Duration::from_secs(self.config.check_timeout_secs);
            async move {
                checks::performance::probe_read(store.as_ref(), &newest, max_size, timeout).await
            }
        });

        while let Some(joined) = per_artifact.next().await {
            items.push(joined.map_err(|e| CoreError::Execution(e.to_string()))?);
        }
        for handle in [frequency, retention, coverage, performance] {
            items.push(
                handle
                    .await
                    .map_err(|e| CoreError::Execution(e.to_string()))?,
            );
        }

        Ok(self.finalize(check_id, timestamp, started, items))
    }

    fn finalize(
        &self,
        check_id: Uuid,
        timestamp: DateTime<Utc>,
        started: Instant,
        items: Vec<CheckItem>,
    ) -> HealthReport {
        HealthReport::assemble(
            check_id,
            timestamp,
            started.elapsed().as_millis() as u64,
            items,
        )
    }

    /// Cheap liveness probe: root accessibility and artifact recency only,
    /// no digest or drill work. Never returns an error.
    pub async fn quick_status(&self) -> QuickStatus {
        let root_ok = matches!(
            self.store.stat(&self.config.backup_dir).await,
            Ok(stat) if stat.is_dir
        );
        if !root_ok {
            return QuickStatus {
                status: ServiceHealth::Unhealthy,
                last_check: None,
            };
        }

        match artifact::discover(self.store.as_ref(), &self.config.backup_dir).await {
            Ok(artifacts) => match artifacts.first() {
                None => QuickStatus {
                    status: ServiceHealth::Unhealthy,
                    last_check: None,
                },
                Some(newest) => {
                    let age = Utc::now() - newest.modified_at;
                    let status = if age > chrono::Duration::hours(STALE_WINDOW_HOURS) {
                        ServiceHealth::Degraded
                    } else {
                        ServiceHealth::Healthy
                    };
                    QuickStatus {
                        status,
                        last_check: Some(newest.modified_at),
                    }
                }
            },
            Err(e) => {
                tracing::warn!("quick status enumeration failed: {}", e);
                QuickStatus {
                    status: ServiceHealth::Unhealthy,
                    last_check: None,
                }
            }
        }
    }
}

fn accessibility_failure(path: &std::path::Path, message: &str) -> CheckItem {
    CheckItem {
        name: "storage_accessibility".to_string(),
        category: CheckCategory::Accessibility,
        status: CheckStatus::Fail,
        severity: Severity::Critical,
        message: format!("{}: {}", message, path.display()),
        details: None,
        duration_ms: 0,
    }
}

fn availability_failure(message: &str) -> CheckItem {
    CheckItem {
        name: "backup_availability".to_string(),
        category: CheckCategory::Accessibility,
        status: CheckStatus::Fail,
        severity: Severity::Critical,
        message: message.to_string(),
        details: None,
        duration_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VerifyConfig::default();
        assert_eq!(config.backup_dir, PathBuf::from("./backups"));
        assert_eq!(config.max_test_file_size, 100 * 1024 * 1024);
        assert_eq!(config.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(config.check_timeout_secs, 60);
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(
            "sha256".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha256
        );
        assert_eq!(
            "SHA-512".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha512
        );
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn test_sidecar_extension() {
        assert_eq!(DigestAlgorithm::Sha256.extension(), "sha256");
        assert_eq!(DigestAlgorithm::Sha512.to_string(), "sha512");
    }
}
