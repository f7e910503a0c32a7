//! System-wide compliance evaluators: frequency, retention, coverage
//!
//! Each evaluator runs once per health check over the full artifact
//! list and produces exactly one item.

use crate::artifact::BackupArtifact;
use crate::checks::envelope::{classify_envelope, EnvelopeShape};
use crate::checks::{CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
use crate::store::ArtifactStore;
use crate::{ENCRYPTION_SAMPLE_CAP, RECENT_WINDOW_HOURS, RETENTION_AGE_DAYS, RETENTION_WARN_COUNT};
use chrono::{DateTime, Duration, Utc};
use std::time::Instant;

/// Backup recency: how many artifacts fall inside the 24 hour window
pub fn frequency_check(artifacts: &[BackupArtifact], now: DateTime<Utc>) -> CheckItem {
    let started = Instant::now();
    let window = Duration::hours(RECENT_WINDOW_HOURS);
    let recent = artifacts
        .iter()
        .filter(|a| now - a.modified_at < window)
        .count();

    let (status, severity, message) = match recent {
        0 => (
            CheckStatus::Fail,
            Severity::High,
            format!("no backups created within the last {} hours", RECENT_WINDOW_HOURS),
        ),
        1 => (
            CheckStatus::Warning,
            Severity::Medium,
            "low backup frequency: only one recent backup".to_string(),
        ),
        n => (
            CheckStatus::Pass,
            Severity::Low,
            format!("{} backups within the last {} hours", n, RECENT_WINDOW_HOURS),
        ),
    };

    CheckItem {
        name: "backup_frequency".to_string(),
        category: CheckCategory::Compliance,
        status,
        severity,
        message,
        details: Some(CheckDetails::Frequency {
            recent,
            total: artifacts.len(),
        }),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

/// Age distribution: warn when too many artifacts exceed the retention age
pub fn retention_check(artifacts: &[BackupArtifact], now: DateTime<Utc>) -> CheckItem {
    let started = Instant::now();
    let cutoff = Duration::days(RETENTION_AGE_DAYS);
    let aged = artifacts
        .iter()
        .filter(|a| now - a.modified_at > cutoff)
        .count();

    let (status, severity, message) = if aged > RETENTION_WARN_COUNT {
        (
            CheckStatus::Warning,
            Severity::Medium,
            format!(
                "many old backups - {} older than {} days, consider cleanup",
                aged, RETENTION_AGE_DAYS
            ),
        )
    } else {
        (
            CheckStatus::Pass,
            Severity::Low,
            format!("{} backups older than {} days", aged, RETENTION_AGE_DAYS),
        )
    };

    CheckItem {
        name: "backup_retention".to_string(),
        category: CheckCategory::Compliance,
        status,
        severity,
        message,
        details: Some(CheckDetails::Retention {
            aged,
            total: artifacts.len(),
        }),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

/// Sampled encryption coverage over the newest artifacts.
///
/// Best-effort by design: unreadable or unparseable artifacts count as
/// "not encrypted" here; only the dedicated envelope validator separates
/// malformed envelopes from plain unencrypted files.
pub async fn coverage_check(store: &dyn ArtifactStore, artifacts: &[BackupArtifact]) -> CheckItem {
    let started = Instant::now();
    let sample = &artifacts[..artifacts.len().min(ENCRYPTION_SAMPLE_CAP)];

    let mut encrypted = 0usize;
    for artifact in sample {
        match store.read(&artifact.path).await {
            Ok(data) => {
                if classify_envelope(&data) == EnvelopeShape::Valid {
                    encrypted += 1;
                }
            }
            Err(e) => {
                tracing::debug!("coverage sample skipped {}: {}", artifact.name, e);
            }
        }
    }

    let sampled = sample.len();
    let rate_percent = if sampled == 0 {
        0.0
    } else {
        encrypted as f64 / sampled as f64 * 100.0
    };

    let (status, severity, message) = if rate_percent < 50.0 {
        (
            CheckStatus::Warning,
            Severity::Medium,
            format!("encryption coverage is low: {:.0}% of sampled backups", rate_percent),
        )
    } else {
        (
            CheckStatus::Pass,
            Severity::Low,
            format!("{:.0}% of sampled backups are encrypted", rate_percent),
        )
    };

    CheckItem {
        name: "encryption_coverage".to_string(),
        category: CheckCategory::Compliance,
        status,
        severity,
        message,
        details: Some(CheckDetails::Coverage {
            encrypted,
            sampled,
            rate_percent,
        }),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}
