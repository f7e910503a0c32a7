//! Performance probe: timed full read of the newest artifact

use crate::artifact::BackupArtifact;
use crate::checks::{CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
use crate::store::ArtifactStore;
use crate::{CoreError, CoreResult, SLOW_READ_MS};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Time a full streamed read of the newest artifact against the latency budget
pub async fn probe_read(
    store: &dyn ArtifactStore,
    artifact: &BackupArtifact,
    max_test_file_size: u64,
    timeout: Duration,
) -> CheckItem {
    let started = Instant::now();
    let name = "backup_performance".to_string();

    if artifact.size_bytes > max_test_file_size {
        return CheckItem {
            name,
            category: CheckCategory::Performance,
            status: CheckStatus::Skip,
            severity: Severity::Low,
            message: "newest backup too large for performance probe".to_string(),
            details: Some(CheckDetails::SizeGate {
                size_bytes: artifact.size_bytes,
                limit_bytes: max_test_file_size,
            }),
            duration_ms: started.elapsed().as_millis() as u64,
        };
    }

    let outcome = tokio::time::timeout(timeout, read_all(store, artifact)).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let size_bytes = match outcome {
        Err(_) => {
            let e = CoreError::Timeout(timeout.as_secs());
            return probe_failure(name, duration_ms, &e);
        }
        Ok(Err(e)) => return probe_failure(name, duration_ms, &e),
        Ok(Ok(size_bytes)) => size_bytes,
    };

    let (status, severity, message) = if duration_ms > SLOW_READ_MS {
        (
            CheckStatus::Warning,
            Severity::Medium,
            format!("slow backup read: {} ms for {} bytes", duration_ms, size_bytes),
        )
    } else {
        (
            CheckStatus::Pass,
            Severity::Low,
            format!("read {} bytes in {} ms", size_bytes, duration_ms),
        )
    };

    CheckItem {
        name,
        category: CheckCategory::Performance,
        status,
        severity,
        message,
        details: Some(CheckDetails::Probe {
            size_bytes,
            duration_ms,
        }),
        duration_ms,
    }
}

fn probe_failure(name: String, duration_ms: u64, e: &CoreError) -> CheckItem {
    tracing::warn!("performance probe failed: {}", e);
    CheckItem {
        name,
        category: CheckCategory::Performance,
        status: CheckStatus::Fail,
        severity: Severity::High,
        message: format!("backup read failed: {}", e),
        details: Some(CheckDetails::Failure {
            error: e.to_string(),
        }),
        duration_ms,
    }
}

async fn read_all(store: &dyn ArtifactStore, artifact: &BackupArtifact) -> CoreResult<u64> {
    let mut reader = store.open_reader(&artifact.path).await?;
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    let mut total: u64 = 0;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    Ok(total)
}
