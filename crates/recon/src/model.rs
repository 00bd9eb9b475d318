use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::{ImpactSeverity, ImpactTier};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Namespaced standard identifier (`standards.AuditLog`), paired with the
/// bare key the template uses (`AuditLog`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardId {
    id: String,
    key: String,
}

impl StandardId {
    pub fn from_key(prefix: &str, key: &str) -> Self {
        Self {
            id: format!("{prefix}{key}"),
            key: key.to_string(),
        }
    }

    /// Parse a full id. Ids without the prefix keep the whole string as key.
    pub fn parse(prefix: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            key: id.strip_prefix(prefix).unwrap_or(id).to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for StandardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl Serialize for StandardId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A compliance template as listed by the template endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDefinition {
    #[serde(rename = "GUID", default)]
    pub guid: Option<String>,
    #[serde(rename = "templateName", default)]
    pub template_name: Option<String>,
    /// Standard key -> `{ standards: { <key>: settings }, action: [...] }`.
    /// Kept as raw JSON so one malformed entry cannot reject the template;
    /// key order is the report order.
    #[serde(default)]
    pub standards: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Remediation action attached to a template standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionRef {
    Labeled { label: String, value: String },
    Plain(String),
}

/// A tenant's most recent scan, as returned by the compare endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSnapshot {
    pub tenant_filter: String,
    #[serde(default, deserialize_with = "lenient_results")]
    pub standards_results: Option<Vec<StandardResult>>,
    /// Flattened `"<standardId>": value` properties.
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardResult {
    pub standard_id: String,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Keep the well-formed `standardsResults` entries and skip the rest, so one
/// bad entry cannot reject the snapshot list.
fn lenient_results<'de, D>(deserializer: D) -> Result<Option<Vec<StandardResult>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(serde_json::Value::Array(entries)) => entries,
        Some(other) => {
            log::warn!("ignoring standardsResults: expected an array, got {other}");
            return Ok(None);
        }
    };

    let results = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<StandardResult>(entry) {
            Ok(result) => Some(result),
            Err(e) => {
                log::warn!("skipping standardsResults[{i}]: {e}");
                None
            }
        })
        .collect();
    Ok(Some(results))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// One standard declared by a template.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredStandard {
    pub id: StandardId,
    /// `None` when the template declares the standard without settings.
    pub desired: Option<Value>,
    pub template_name: String,
    pub actions: Vec<ActionRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedSource {
    /// Flattened property keyed by the standard id.
    Direct,
    /// Entry in the snapshot's `standardsResults` list.
    ResultsList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub value: Value,
    pub source: ObservedSource,
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    /// Declared by the template with no settings; no verdict asserted.
    Unconfigured,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "Compliant"),
            Self::NonCompliant => write!(f, "Non-Compliant"),
            Self::Unconfigured => write!(f, "Unconfigured"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Matches,
    Differs,
    /// The desired mapping has no such key, so there is nothing to compare.
    NoBaseline,
}

/// Per-key comparison of an observed mapping against the desired mapping,
/// keyed by the observed keys.
pub type FieldDifferences = BTreeMap<String, FieldStatus>;

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: ComplianceStatus,
    pub field_differences: Option<FieldDifferences>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub standard_id: StandardId,
    pub display_name: String,
    pub description: String,
    pub compliance_details: String,
    pub impact: ImpactTier,
    pub impact_label: String,
    pub impact_severity: ImpactSeverity,
    pub desired_value: Option<Value>,
    pub observed_value: Option<Value>,
    pub observed_source: Option<ObservedSource>,
    pub status: ComplianceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_differences: Option<FieldDifferences>,
    pub template_name: String,
    pub actions: Vec<ActionRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub unconfigured: usize,
    /// Records with no observed value at all.
    pub not_scanned: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub template_id: String,
    /// `None` when the template id was not found.
    pub template_name: Option<String>,
    pub tenant: String,
    /// Whether a snapshot existed for the tenant.
    pub tenant_scanned: bool,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub meta: ReportMeta,
    pub summary: ReportSummary,
    pub records: Vec<ComparisonRecord>,
}
