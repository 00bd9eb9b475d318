use serde::de::DeserializeOwned;

use crate::catalog::Catalog;
use crate::config::CompareConfig;
use crate::desired::{extract_desired, template_name};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::model::{
    ComparisonRecord, ComparisonReport, DesiredStandard, ReportMeta, TemplateDefinition,
    TenantSnapshot,
};
use crate::observed::{NoSnapshot, ObservedResolver, ResolverChain};
use crate::reconcile::reconcile;

/// Build one comparison record per desired standard, in input order.
///
/// Missing catalog entries and missing observed values are carried on the
/// records; this never fails.
pub fn build(
    template_name: &str,
    catalog: &Catalog,
    desired: &[DesiredStandard],
    observed: &dyn ObservedResolver,
) -> Vec<ComparisonRecord> {
    desired
        .iter()
        .map(|standard| {
            let hit = observed.resolve(&standard.id);
            let verdict = reconcile(standard.desired.as_ref(), hit.as_ref());
            let meta = catalog.lookup(&standard.id);

            log::debug!(
                "{}: desired={} observed={} -> {}",
                standard.id,
                standard.desired.as_ref().map_or("absent", |v| v.kind()),
                hit.as_ref().map_or("absent", |o| o.value.kind()),
                verdict.status,
            );

            let (observed_value, observed_source) = match hit {
                Some(o) => (Some(o.value), Some(o.source)),
                None => (None, None),
            };

            ComparisonRecord {
                standard_id: standard.id.clone(),
                display_name: meta.display_name,
                description: meta.description,
                compliance_details: meta.compliance_details,
                impact: meta.impact,
                impact_label: meta.impact_label,
                impact_severity: meta.impact_severity,
                desired_value: standard.desired.clone(),
                observed_value,
                observed_source,
                status: verdict.status,
                field_differences: verdict.field_differences,
                template_name: template_name.to_string(),
                actions: standard.actions.clone(),
            }
        })
        .collect()
}

/// Compare one template against one tenant.
///
/// An unknown template id yields a report with no records. A tenant with no
/// snapshot is evaluated with nothing observed.
pub fn compare(
    config: &CompareConfig,
    catalog: &Catalog,
    templates: &[TemplateDefinition],
    template_id: &str,
    snapshots: &[TenantSnapshot],
    tenant: &str,
) -> ComparisonReport {
    let template = templates
        .iter()
        .find(|t| t.guid.as_deref() == Some(template_id));
    let snapshot = snapshots.iter().find(|s| s.tenant_filter == tenant);

    let (resolved_name, records) = match template {
        Some(template) => {
            let desired = extract_desired(template, config);
            let name = template_name(template, config);
            let records = match snapshot {
                Some(snapshot) => build(&name, catalog, &desired, &ResolverChain::for_snapshot(snapshot)),
                None => {
                    log::warn!("no snapshot for tenant '{tenant}', nothing observed");
                    build(&name, catalog, &desired, &NoSnapshot)
                }
            };
            (Some(name), records)
        }
        None => {
            log::warn!("template '{template_id}' not found among {} template(s)", templates.len());
            (None, Vec::new())
        }
    };

    ComparisonReport {
        meta: ReportMeta {
            template_id: template_id.to_string(),
            template_name: resolved_name,
            tenant: tenant.to_string(),
            tenant_scanned: snapshot.is_some(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary: compute_summary(&records),
        records,
    }
}

/// Parse a template list. A single template object is accepted as a list of one.
pub fn parse_templates(json: &str) -> Result<Vec<TemplateDefinition>, ReconError> {
    parse_list("templates", json)
}

/// Parse a tenant snapshot list. A single snapshot object is accepted as a list of one.
pub fn parse_snapshots(json: &str) -> Result<Vec<TenantSnapshot>, ReconError> {
    parse_list("snapshots", json)
}

fn parse_list<T: DeserializeOwned>(input: &str, json: &str) -> Result<Vec<T>, ReconError> {
    let parse_err = |e: serde_json::Error| ReconError::InputParse {
        input: input.to_string(),
        message: e.to_string(),
    };

    let raw: serde_json::Value = serde_json::from_str(json).map_err(parse_err)?;
    match raw {
        serde_json::Value::Array(_) => serde_json::from_value(raw).map_err(parse_err),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(raw).map_err(parse_err)?]),
        other => Err(ReconError::InputParse {
            input: input.to_string(),
            message: format!("expected an array or object, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
