//! Health report aggregation, scoring, and recommendations

pub mod json;
pub mod markdown;

use crate::checks::{CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
use crate::CoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Derived overall status of a health check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pass,
    Warning,
    Fail,
}

impl OverallStatus {
    /// Strict precedence: a single fail dominates any number of passes
    /// or warnings; skips are neutral.
    pub fn from_summary(summary: &HealthSummary) -> Self {
        if summary.failed > 0 {
            OverallStatus::Fail
        } else if summary.warnings > 0 {
            OverallStatus::Warning
        } else {
            OverallStatus::Pass
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Pass => write!(f, "pass"),
            OverallStatus::Warning => write!(f, "warning"),
            OverallStatus::Fail => write!(f, "fail"),
        }
    }
}

/// Check counts for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl HealthSummary {
    pub fn from_checks(checks: &[CheckItem]) -> Self {
        let mut summary = Self {
            total: checks.len(),
            ..Default::default()
        };
        for check in checks {
            match check.status {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Warning => summary.warnings += 1,
                CheckStatus::Fail => summary.failed += 1,
                CheckStatus::Skip => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Aggregate result of one health check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub check_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub overall_status: OverallStatus,
    pub duration_ms: u64,
    pub checks: Vec<CheckItem>,
    pub summary: HealthSummary,
    pub recommendations: Vec<String>,
}

impl HealthReport {
    /// Build a report from executed checks: summary, scoring, and
    /// recommendations all derive from the item list.
    pub fn assemble(
        check_id: Uuid,
        timestamp: DateTime<Utc>,
        duration_ms: u64,
        checks: Vec<CheckItem>,
    ) -> Self {
        let summary = HealthSummary::from_checks(&checks);
        let overall_status = OverallStatus::from_summary(&summary);
        let recommendations = derive_recommendations(&checks);

        Self {
            check_id,
            timestamp,
            overall_status,
            duration_ms,
            checks,
            summary,
            recommendations,
        }
    }

    /// Single-item critical report for a fault in the orchestration itself
    pub fn degraded(
        check_id: Uuid,
        timestamp: DateTime<Utc>,
        duration_ms: u64,
        error: &str,
    ) -> Self {
        let item = CheckItem {
            name: "health_check_execution".to_string(),
            category: CheckCategory::Integrity,
            status: CheckStatus::Fail,
            severity: Severity::Critical,
            message: format!("health check execution failed: {}", error),
            details: Some(CheckDetails::Failure {
                error: error.to_string(),
            }),
            duration_ms,
        };
        let summary = HealthSummary::from_checks(std::slice::from_ref(&item));

        Self {
            check_id,
            timestamp,
            overall_status: OverallStatus::Fail,
            duration_ms,
            checks: vec![item],
            summary,
            recommendations: vec![
                "Investigate health check system failure and re-run verification".to_string(),
            ],
        }
    }
}

/// Remediation advice derived from which categories contain fail or
/// warning items, plus three standing entries, de-duplicated in order.
pub fn derive_recommendations(checks: &[CheckItem]) -> Vec<String> {
    let has = |category: CheckCategory, status: CheckStatus| {
        checks
            .iter()
            .any(|c| c.category == category && c.status == status)
    };

    let mut recommendations: Vec<String> = Vec::new();
    if has(CheckCategory::Integrity, CheckStatus::Fail) {
        recommendations.push("Investigate backup integrity failures immediately".to_string());
    }
    if has(CheckCategory::Accessibility, CheckStatus::Fail) {
        recommendations.push("Check backup storage configuration and permissions".to_string());
    }
    if has(CheckCategory::Security, CheckStatus::Warning) {
        recommendations.push("Enable encryption for all backups".to_string());
    }
    if has(CheckCategory::Performance, CheckStatus::Warning) {
        recommendations.push("Monitor and optimize backup storage performance".to_string());
    }
    if has(CheckCategory::Compliance, CheckStatus::Warning) {
        recommendations.push("Review backup retention and frequency policy".to_string());
    }

    recommendations.push("Schedule regular automated backup health checks".to_string());
    recommendations.push("Automate backup verification and alerting".to_string());
    recommendations.push("Document and test recovery procedures".to_string());

    let mut seen = HashSet::new();
    recommendations.retain(|r| seen.insert(r.clone()));
    recommendations
}

/// Service health for the quick status probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceHealth::Healthy => write!(f, "healthy"),
            ServiceHealth::Degraded => write!(f, "degraded"),
            ServiceHealth::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Cheap liveness answer: no digest or drill work behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickStatus {
    pub status: ServiceHealth,
    pub last_check: Option<DateTime<Utc>>,
}

/// Report output format
pub enum ReportFormat {
    Json,
    Markdown,
}

/// Render a report in the requested format
pub fn render(report: &HealthReport, format: ReportFormat) -> CoreResult<String> {
    match format {
        ReportFormat::Json => json::generate(report),
        ReportFormat::Markdown => markdown::generate(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: CheckCategory, status: CheckStatus) -> CheckItem {
        CheckItem {
            name: format!("{}_{}", category, status),
            category,
            status,
            severity: Severity::Low,
            message: String::new(),
            details: None,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_fail_dominates_scoring() {
        let checks = vec![
            item(CheckCategory::Integrity, CheckStatus::Pass),
            item(CheckCategory::Compliance, CheckStatus::Warning),
            item(CheckCategory::Integrity, CheckStatus::Fail),
        ];
        let summary = HealthSummary::from_checks(&checks);
        assert_eq!(OverallStatus::from_summary(&summary), OverallStatus::Fail);
    }

    #[test]
    fn test_warning_beats_pass() {
        let checks = vec![
            item(CheckCategory::Integrity, CheckStatus::Pass),
            item(CheckCategory::Security, CheckStatus::Warning),
        ];
        let summary = HealthSummary::from_checks(&checks);
        assert_eq!(
            OverallStatus::from_summary(&summary),
            OverallStatus::Warning
        );
    }

    #[test]
    fn test_all_skip_scores_pass() {
        let checks = vec![
            item(CheckCategory::Integrity, CheckStatus::Skip),
            item(CheckCategory::Performance, CheckStatus::Skip),
        ];
        let summary = HealthSummary::from_checks(&checks);
        assert_eq!(summary.skipped, 2);
        assert_eq!(OverallStatus::from_summary(&summary), OverallStatus::Pass);
    }

    #[test]
    fn test_summary_arithmetic() {
        let checks = vec![
            item(CheckCategory::Integrity, CheckStatus::Pass),
            item(CheckCategory::Integrity, CheckStatus::Fail),
            item(CheckCategory::Compliance, CheckStatus::Warning),
            item(CheckCategory::Performance, CheckStatus::Skip),
        ];
        let summary = HealthSummary::from_checks(&checks);
        assert_eq!(summary.total, 4);
        assert_eq!(
            summary.passed + summary.warnings + summary.failed + summary.skipped,
            summary.total
        );
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let checks = vec![
            item(CheckCategory::Security, CheckStatus::Warning),
            item(CheckCategory::Security, CheckStatus::Warning),
            item(CheckCategory::Integrity, CheckStatus::Fail),
            item(CheckCategory::Integrity, CheckStatus::Fail),
        ];
        let recommendations = derive_recommendations(&checks);
        let unique: HashSet<&String> = recommendations.iter().collect();
        assert_eq!(unique.len(), recommendations.len());
        assert!(recommendations
            .iter()
            .any(|r| r.contains("Enable encryption")));
    }

    #[test]
    fn test_standing_recommendations_always_present() {
        let recommendations = derive_recommendations(&[]);
        assert_eq!(recommendations.len(), 3);
    }

    #[test]
    fn test_degraded_report_shape() {
        let report = HealthReport::degraded(Uuid::new_v4(), Utc::now(), 12, "task panicked");
        assert_eq!(report.overall_status, OverallStatus::Fail);
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.checks[0].name, "health_check_execution");
        assert_eq!(report.checks[0].severity, Severity::Critical);
    }
}
