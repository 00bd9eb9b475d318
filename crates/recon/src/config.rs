use serde::Deserialize;

use crate::error::ReconError;

pub const DEFAULT_STANDARD_PREFIX: &str = "standards.";
pub const DEFAULT_TEMPLATE_NAME: &str = "Standard Template";
pub const DEFAULT_IMPACT: &str = "Medium Impact";
pub const DEFAULT_IMPACT_COLOUR: &str = "warning";

const IMPACT_COLOURS: [&str; 3] = ["info", "warning", "error"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    /// Prefix joining a template key to its standard id
    /// (`AuditLog` -> `standards.AuditLog`).
    #[serde(default = "default_standard_prefix")]
    pub standard_prefix: String,
    /// Used when a template carries no `templateName`.
    #[serde(default = "default_template_name")]
    pub default_template_name: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            standard_prefix: default_standard_prefix(),
            default_template_name: default_template_name(),
            catalog: CatalogConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog fallbacks
// ---------------------------------------------------------------------------

/// Metadata applied to standards the catalog does not know about, and to
/// catalog entries that omit impact fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_impact")]
    pub default_impact: String,
    #[serde(default = "default_impact_colour")]
    pub default_impact_colour: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_impact: default_impact(),
            default_impact_colour: default_impact_colour(),
        }
    }
}

fn default_standard_prefix() -> String {
    DEFAULT_STANDARD_PREFIX.into()
}

fn default_template_name() -> String {
    DEFAULT_TEMPLATE_NAME.into()
}

fn default_impact() -> String {
    DEFAULT_IMPACT.into()
}

fn default_impact_colour() -> String {
    DEFAULT_IMPACT_COLOUR.into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.standard_prefix.is_empty() {
            return Err(ReconError::ConfigValidation(
                "standard_prefix must not be empty".into(),
            ));
        }
        if !self.standard_prefix.ends_with('.') {
            return Err(ReconError::ConfigValidation(format!(
                "standard_prefix must end with '.', got '{}'",
                self.standard_prefix
            )));
        }

        if self.default_template_name.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "default_template_name must not be blank".into(),
            ));
        }

        if self.catalog.default_impact.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "catalog.default_impact must not be blank".into(),
            ));
        }
        if !IMPACT_COLOURS.contains(&self.catalog.default_impact_colour.as_str()) {
            return Err(ReconError::ConfigValidation(format!(
                "catalog.default_impact_colour must be one of {}, got '{}'",
                IMPACT_COLOURS.join("/"),
                self.catalog.default_impact_colour
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = CompareConfig::from_toml("").unwrap();
        assert_eq!(config.standard_prefix, "standards.");
        assert_eq!(config.default_template_name, "Standard Template");
        assert_eq!(config.catalog.default_impact, "Medium Impact");
        assert_eq!(config.catalog.default_impact_colour, "warning");
    }

    #[test]
    fn overrides_are_applied() {
        let toml = r#"
standard_prefix = "policies."
default_template_name = "Baseline"

[catalog]
default_impact = "High Impact"
default_impact_colour = "error"
"#;
        let config = CompareConfig::from_toml(toml).unwrap();
        assert_eq!(config.standard_prefix, "policies.");
        assert_eq!(config.default_template_name, "Baseline");
        assert_eq!(config.catalog.default_impact, "High Impact");
        assert_eq!(config.catalog.default_impact_colour, "error");
    }

    #[test]
    fn prefix_without_dot_rejected() {
        let err = CompareConfig::from_toml(r#"standard_prefix = "standards""#).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("must end with '.'"));
    }

    #[test]
    fn unknown_impact_colour_rejected() {
        let toml = r#"
[catalog]
default_impact_colour = "purple"
"#;
        let err = CompareConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("purple"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = CompareConfig::from_toml("standard_prefix = ").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
