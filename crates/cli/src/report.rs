// Rendering for `posture compare`.
// Pure functions: a ComparisonReport in, text or CSV out. No IO, no clap.

use std::fmt::Write as _;
use std::io;

use posture_recon::model::{ComparisonRecord, ComparisonReport, ComplianceStatus, FieldStatus};
use posture_recon::Value;

const NOT_CONFIGURED: &str = "Not configured";
const NO_SETTINGS: &str = "No settings configured";

// ---------------------------------------------------------------------------
// Side-by-side text
// ---------------------------------------------------------------------------

/// Lines describing the template's side of a record.
pub fn desired_lines(record: &ComparisonRecord) -> Vec<String> {
    match &record.desired_value {
        None => vec![NO_SETTINGS.to_string()],
        Some(v) if v.is_empty_settings() => vec![NO_SETTINGS.to_string()],
        Some(Value::Structured(fields)) => fields
            .iter()
            .map(|(k, v)| format!("{k}: {}", v.display_text()))
            .collect(),
        Some(v) => vec![v.display_text()],
    }
}

/// Lines describing the tenant's side of a record. Fields that differ from
/// the template carry the expected value.
pub fn observed_lines(record: &ComparisonRecord) -> Vec<String> {
    let compliant = record.status == ComplianceStatus::Compliant;
    match &record.observed_value {
        None => vec![NOT_CONFIGURED.to_string()],
        Some(Value::Bool(true)) if compliant => vec!["Compliant".to_string()],
        Some(Value::Structured(fields)) => {
            let desired = record.desired_value.as_ref().and_then(Value::as_structured);
            fields
                .iter()
                .map(|(k, v)| {
                    let status = record.field_differences.as_ref().and_then(|d| d.get(k));
                    let expected = desired.and_then(|d| d.get(k));
                    match (status, expected) {
                        (Some(FieldStatus::Differs), Some(want)) => {
                            format!("{k}: {} (expected {})", v.display_text(), want.display_text())
                        }
                        _ => format!("{k}: {}", v.display_text()),
                    }
                })
                .collect()
        }
        Some(v) => vec![v.display_text()],
    }
}

pub fn render_text(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let meta = &report.meta;

    let template = meta.template_name.as_deref().unwrap_or("(template not found)");
    let _ = writeln!(out, "Template: {template} [{}]", meta.template_id);
    let _ = writeln!(
        out,
        "Tenant:   {}{}",
        meta.tenant,
        if meta.tenant_scanned { "" } else { " (no scan data)" }
    );

    if report.records.is_empty() {
        let _ = writeln!(out, "\nNo comparison data is available.");
        return out;
    }

    for record in &report.records {
        let _ = writeln!(
            out,
            "\n[{}] {} ({}) - {}",
            record.status, record.display_name, record.standard_id, record.impact_label
        );
        write_side(&mut out, "template", &desired_lines(record));
        write_side(&mut out, "tenant", &observed_lines(record));
        if !record.compliance_details.is_empty() {
            let _ = writeln!(out, "  info:     {}", record.compliance_details);
        }
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "\n{} standards: {} compliant, {} non-compliant, {} unconfigured ({} not scanned)",
        s.total, s.compliant, s.non_compliant, s.unconfigured, s.not_scanned
    );
    out
}

fn write_side(out: &mut String, label: &str, lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            let _ = writeln!(out, "  {:<9} {line}", format!("{label}:"));
        } else {
            let _ = writeln!(out, "  {:<9} {line}", "");
        }
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

const CSV_HEADERS: [&str; 9] = [
    "standard_id",
    "display_name",
    "status",
    "impact",
    "desired",
    "observed",
    "observed_source",
    "differing_fields",
    "template_name",
];

/// One row per record. Values are written in canonical JSON so the file can
/// be diffed between runs.
pub fn render_csv(report: &ComparisonReport) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADERS)?;

    for r in &report.records {
        let differing: Vec<&str> = r
            .field_differences
            .iter()
            .flatten()
            .filter(|(_, status)| **status == FieldStatus::Differs)
            .map(|(k, _)| k.as_str())
            .collect();
        let source = match r.observed_source {
            Some(s) => serde_json::to_value(s)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            None => String::new(),
        };

        let status = status_code(r.status);
        let desired = r.desired_value.as_ref().map(Value::canonical_json).unwrap_or_default();
        let observed = r.observed_value.as_ref().map(Value::canonical_json).unwrap_or_default();
        let differing = differing.join(";");

        wtr.write_record([
            r.standard_id.as_str(),
            r.display_name.as_str(),
            status.as_str(),
            r.impact_label.as_str(),
            desired.as_str(),
            observed.as_str(),
            source.as_str(),
            differing.as_str(),
            r.template_name.as_str(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

fn status_code(status: ComplianceStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_recon::catalog::{ImpactSeverity, ImpactTier};
    use posture_recon::model::{ObservedSource, ReportMeta, ReportSummary, StandardId};
    use posture_recon::reconcile::field_differences;
    use serde_json::json;

    fn record(desired: Option<serde_json::Value>, observed: Option<serde_json::Value>, status: ComplianceStatus) -> ComparisonRecord {
        let desired = desired.map(Value::from);
        let observed = observed.map(Value::from);
        let diffs = match (&desired, &observed) {
            (Some(Value::Structured(d)), Some(Value::Structured(o))) => Some(field_differences(d, o)),
            _ => None,
        };
        ComparisonRecord {
            standard_id: StandardId::from_key("standards.", "PasswordPolicy"),
            display_name: "Set password policy".into(),
            description: String::new(),
            compliance_details: String::new(),
            impact: ImpactTier::High,
            impact_label: "High Impact".into(),
            impact_severity: ImpactSeverity::Error,
            observed_source: observed.as_ref().map(|_| ObservedSource::ResultsList),
            desired_value: desired,
            observed_value: observed,
            status,
            field_differences: diffs,
            template_name: "Baseline".into(),
            actions: vec![],
        }
    }

    fn report(records: Vec<ComparisonRecord>) -> ComparisonReport {
        ComparisonReport {
            meta: ReportMeta {
                template_id: "t1".into(),
                template_name: Some("Baseline".into()),
                tenant: "contoso".into(),
                tenant_scanned: true,
                engine_version: "0.0.0".into(),
            },
            summary: posture_recon::evidence::compute_summary(&records),
            records,
        }
    }

    #[test]
    fn desired_lines_per_field() {
        let r = record(Some(json!({"minLength": 14, "mfa": true})), None, ComplianceStatus::NonCompliant);
        assert_eq!(desired_lines(&r), ["mfa: Enabled", "minLength: 14"]);
    }

    #[test]
    fn desired_lines_unconfigured() {
        let r = record(Some(json!({})), None, ComplianceStatus::Unconfigured);
        assert_eq!(desired_lines(&r), [NO_SETTINGS]);
        let r = record(None, None, ComplianceStatus::Unconfigured);
        assert_eq!(desired_lines(&r), [NO_SETTINGS]);
    }

    #[test]
    fn observed_lines_mark_differences() {
        let r = record(
            Some(json!({"minLength": 14, "mfa": true})),
            Some(json!({"minLength": 8, "mfa": true})),
            ComplianceStatus::NonCompliant,
        );
        assert_eq!(observed_lines(&r), ["mfa: Enabled", "minLength: 8 (expected 14)"]);
    }

    #[test]
    fn observed_true_and_compliant_reads_compliant() {
        let r = record(Some(json!(true)), Some(json!(true)), ComplianceStatus::Compliant);
        assert_eq!(observed_lines(&r), ["Compliant"]);
        let r = record(Some(json!(true)), Some(json!(false)), ComplianceStatus::NonCompliant);
        assert_eq!(observed_lines(&r), ["Disabled"]);
    }

    #[test]
    fn observed_absent_reads_not_configured() {
        let r = record(Some(json!(true)), None, ComplianceStatus::NonCompliant);
        assert_eq!(observed_lines(&r), [NOT_CONFIGURED]);
    }

    #[test]
    fn text_report_has_header_records_and_summary() {
        let text = render_text(&report(vec![record(
            Some(json!({"minLength": 14})),
            Some(json!({"minLength": 8})),
            ComplianceStatus::NonCompliant,
        )]));
        assert!(text.starts_with("Template: Baseline [t1]\n"));
        assert!(text.contains("[Non-Compliant] Set password policy (standards.PasswordPolicy) - High Impact"));
        assert!(text.contains("  template: minLength: 14\n"));
        assert!(text.contains("  tenant:   minLength: 8 (expected 14)\n"));
        assert!(text.contains("1 standards: 0 compliant, 1 non-compliant, 0 unconfigured (0 not scanned)"));
    }

    #[test]
    fn text_report_without_records() {
        let mut r = report(vec![]);
        r.meta.template_name = None;
        let text = render_text(&r);
        assert!(text.contains("(template not found)"));
        assert!(text.contains("No comparison data is available."));
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let csv = render_csv(&report(vec![
            record(Some(json!({"minLength": 14, "mfa": true})), Some(json!({"mfa": true, "minLength": 8})), ComplianceStatus::NonCompliant),
            record(Some(json!(true)), None, ComplianceStatus::NonCompliant),
        ]))
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert!(lines[1].starts_with("standards.PasswordPolicy,Set password policy,non_compliant,High Impact,"));
        assert!(lines[1].contains(r#""{""mfa"":true,""minLength"":14}""#));
        assert!(lines[1].ends_with(",results_list,minLength,Baseline"));
        assert!(lines[2].ends_with(",true,,,,Baseline"));
    }
}
