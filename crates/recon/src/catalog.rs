//! Read-only lookup of static standard metadata.
//!
//! Catalog coverage can lag template authorship, so lookups never fail:
//! unknown standards get fallback metadata built from the raw key and the
//! configured default impact.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::CatalogConfig;
use crate::error::ReconError;
use crate::model::StandardId;

/// One entry of the standards catalog document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub docs_description: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub impact_colour: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTier {
    Low,
    Medium,
    High,
    /// Label present but not one of the known tiers.
    Unrated,
}

impl ImpactTier {
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.starts_with("low") {
            Self::Low
        } else if lower.starts_with("medium") {
            Self::Medium
        } else if lower.starts_with("high") {
            Self::High
        } else {
            Self::Unrated
        }
    }
}

/// Severity hint for colouring the impact badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactSeverity {
    Info,
    Warning,
    Error,
}

impl ImpactSeverity {
    /// `info` and `warning` map to themselves; any other colour is an error.
    pub fn from_colour(colour: &str) -> Self {
        match colour {
            "info" => Self::Info,
            "warning" => Self::Warning,
            _ => Self::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardMetadata {
    pub display_name: String,
    pub description: String,
    pub compliance_details: String,
    pub impact: ImpactTier,
    pub impact_label: String,
    pub impact_severity: ImpactSeverity,
    /// False when the metadata is a fallback for an unknown standard.
    pub known: bool,
}

#[derive(Debug)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    defaults: CatalogConfig,
}

impl Catalog {
    /// Build from entries. When a name repeats, the first entry wins.
    pub fn new(entries: Vec<CatalogEntry>, defaults: CatalogConfig) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for entry in entries {
            by_name.entry(entry.name.clone()).or_insert(entry);
        }
        Self {
            entries: by_name,
            defaults,
        }
    }

    pub fn empty(defaults: CatalogConfig) -> Self {
        Self::new(Vec::new(), defaults)
    }

    pub fn from_json(input: &str, defaults: CatalogConfig) -> Result<Self, ReconError> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(input).map_err(|e| ReconError::InputParse {
                input: "catalog".into(),
                message: e.to_string(),
            })?;
        Ok(Self::new(entries, defaults))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &StandardId) -> Option<&CatalogEntry> {
        self.entries.get(id.as_str())
    }

    pub fn lookup(&self, id: &StandardId) -> StandardMetadata {
        match self.get(id) {
            Some(entry) => self.metadata_for(id, entry),
            None => {
                log::debug!("standard '{id}' not in catalog, using fallback metadata");
                self.fallback(id)
            }
        }
    }

    fn metadata_for(&self, id: &StandardId, entry: &CatalogEntry) -> StandardMetadata {
        let help_text = non_empty(&entry.help_text);
        let impact_label = non_empty(&entry.impact)
            .unwrap_or(&self.defaults.default_impact)
            .to_string();
        let colour = non_empty(&entry.impact_colour).unwrap_or(&self.defaults.default_impact_colour);

        StandardMetadata {
            display_name: non_empty(&entry.label).unwrap_or(id.key()).to_string(),
            description: help_text.unwrap_or_default().to_string(),
            compliance_details: non_empty(&entry.docs_description)
                .or(help_text)
                .unwrap_or_default()
                .to_string(),
            impact: ImpactTier::from_label(&impact_label),
            impact_label,
            impact_severity: ImpactSeverity::from_colour(colour),
            known: true,
        }
    }

    fn fallback(&self, id: &StandardId) -> StandardMetadata {
        StandardMetadata {
            display_name: id.key().to_string(),
            description: String::new(),
            compliance_details: String::new(),
            impact: ImpactTier::from_label(&self.defaults.default_impact),
            impact_label: self.defaults.default_impact.clone(),
            impact_severity: ImpactSeverity::from_colour(&self.defaults.default_impact_colour),
            known: false,
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
