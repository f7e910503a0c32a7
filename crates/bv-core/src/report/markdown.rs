//! Markdown report rendering

use crate::report::HealthReport;
use crate::CoreResult;

pub fn generate(report: &HealthReport) -> CoreResult<String> {
    let mut s = String::new();

    s.push_str("# Backup Health Report\n\n");
    s.push_str(&format!("**Check ID:** {}\n", report.check_id));
    s.push_str(&format!("**Timestamp:** {}\n", report.timestamp));
    s.push_str(&format!(
        "**Overall status:** {}\n",
        report.overall_status.to_string().to_uppercase()
    ));
    s.push_str(&format!("**Duration:** {} ms\n\n", report.duration_ms));

    s.push_str("## Summary\n\n");
    s.push_str("| Total | Passed | Warnings | Failed | Skipped |\n");
    s.push_str("|-------|--------|----------|--------|----------|\n");
    s.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        report.summary.total,
        report.summary.passed,
        report.summary.warnings,
        report.summary.failed,
        report.summary.skipped
    ));

    s.push_str("## Checks\n\n");
    s.push_str("| Check | Category | Status | Severity | Duration | Message |\n");
    s.push_str("|-------|----------|--------|----------|----------|---------|\n");
    for check in &report.checks {
        s.push_str(&format!(
            "| `{}` | {} | {} | {} | {} ms | {} |\n",
            check.name,
            check.category,
            check.status,
            check.severity,
            check.duration_ms,
            check.message
        ));
    }
    s.push('\n');

    s.push_str("## Recommendations\n\n");
    for recommendation in &report.recommendations {
        s.push_str(&format!("- {}\n", recommendation));
    }

    Ok(s)
}
