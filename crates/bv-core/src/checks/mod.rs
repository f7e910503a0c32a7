//! Check result model shared by every verifier component

pub mod checksum;
pub mod compliance;
pub mod drill;
pub mod envelope;
pub mod performance;

use crate::artifact::BackupArtifact;
use crate::store::ArtifactStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
    Skip,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "pass"),
            CheckStatus::Warning => write!(f, "warning"),
            CheckStatus::Fail => write!(f, "fail"),
            CheckStatus::Skip => write!(f, "skip"),
        }
    }
}

/// Reporting category for a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    Integrity,
    Performance,
    Compliance,
    Accessibility,
    Security,
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckCategory::Integrity => write!(f, "integrity"),
            CheckCategory::Performance => write!(f, "performance"),
            CheckCategory::Compliance => write!(f, "compliance"),
            CheckCategory::Accessibility => write!(f, "accessibility"),
            CheckCategory::Security => write!(f, "security"),
        }
    }
}

/// Severity, used only for reporting and sorting, never for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Structured payload attached to a check item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDetails {
    Checksum {
        algorithm: String,
        computed: String,
        stored: Option<String>,
    },
    Envelope {
        missing_fields: Vec<String>,
    },
    Drill {
        original_bytes: u64,
        restored_bytes: u64,
    },
    SizeGate {
        size_bytes: u64,
        limit_bytes: u64,
    },
    Frequency {
        recent: usize,
        total: usize,
    },
    Retention {
        aged: usize,
        total: usize,
    },
    Coverage {
        encrypted: usize,
        sampled: usize,
        rate_percent: f64,
    },
    Probe {
        size_bytes: u64,
        duration_ms: u64,
    },
    Failure {
        error: String,
    },
}

/// One executed check's outcome. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckItem {
    pub name: String,
    pub category: CheckCategory,
    pub status: CheckStatus,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CheckDetails>,
    pub duration_ms: u64,
}

/// A check executed once per artifact. Implementations catch their own
/// faults and fold them into fail items; `run` never errors.
#[async_trait]
pub trait ArtifactCheck: Send + Sync {
    /// Check name prefix, e.g. `restore_test`
    fn kind(&self) -> &'static str;

    async fn run(&self, store: &dyn ArtifactStore, artifact: &BackupArtifact) -> CheckItem;
}
