//! JSON report rendering

use crate::report::HealthReport;
use crate::CoreResult;

pub fn generate(report: &HealthReport) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
