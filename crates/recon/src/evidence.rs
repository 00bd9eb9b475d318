use crate::model::{ComparisonRecord, ComplianceStatus, ReportSummary};

/// Compute summary counts from comparison records.
pub fn compute_summary(records: &[ComparisonRecord]) -> ReportSummary {
    let mut compliant = 0;
    let mut non_compliant = 0;
    let mut unconfigured = 0;
    let mut not_scanned = 0;

    for r in records {
        match r.status {
            ComplianceStatus::Compliant => compliant += 1,
            ComplianceStatus::NonCompliant => non_compliant += 1,
            ComplianceStatus::Unconfigured => unconfigured += 1,
        }
        if r.observed_value.is_none() {
            not_scanned += 1;
        }
    }

    ReportSummary {
        total: records.len(),
        compliant,
        non_compliant,
        unconfigured,
        not_scanned,
    }
}
