use crate::config::CompareConfig;
use crate::model::{ActionRef, DesiredStandard, StandardId, TemplateDefinition};
use crate::value::Value;

/// Yield one [`DesiredStandard`] per standard the template declares, in
/// declaration order.
///
/// Each template entry nests its settings under its own key
/// (`standards.<Key>.standards.<Key>`). Entries whose shape does not match
/// produce `desired: None` rather than an error.
pub fn extract_desired(template: &TemplateDefinition, config: &CompareConfig) -> Vec<DesiredStandard> {
    let template_name = template_name(template, config);

    let Some(standards) = &template.standards else {
        return Vec::new();
    };

    standards
        .iter()
        .map(|(key, entry)| DesiredStandard {
            id: StandardId::from_key(&config.standard_prefix, key),
            desired: desired_settings(key, entry),
            template_name: template_name.clone(),
            actions: actions(key, entry),
        })
        .collect()
}

/// The template's name, or the configured default when it has none.
pub fn template_name(template: &TemplateDefinition, config: &CompareConfig) -> String {
    template
        .template_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&config.default_template_name)
        .to_string()
}

fn desired_settings(key: &str, entry: &serde_json::Value) -> Option<Value> {
    entry
        .get("standards")
        .and_then(|settings| settings.get(key))
        .filter(|settings| !settings.is_null())
        .cloned()
        .map(Value::from)
}

fn actions(key: &str, entry: &serde_json::Value) -> Vec<ActionRef> {
    match entry.get("action") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            log::warn!("standard '{key}': ignoring malformed action list: {e}");
            Vec::new()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(json: serde_json::Value) -> TemplateDefinition {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn extracts_settings_and_actions_in_declared_order() {
        let t = template(json!({
            "GUID": "t1",
            "templateName": "T1",
            "standards": {
                "PasswordPolicy": {
                    "standards": {"PasswordPolicy": {"minLength": 14, "mfa": true}},
                    "action": [{"label": "Remediate", "value": "Remediate"}]
                },
                "AuditLog": {
                    "standards": {"AuditLog": true},
                    "action": []
                }
            }
        }));
        let desired = extract_desired(&t, &CompareConfig::default());

        assert_eq!(desired.len(), 2);
        assert_eq!(desired[0].id.as_str(), "standards.PasswordPolicy");
        assert_eq!(desired[1].id.as_str(), "standards.AuditLog");
        assert_eq!(desired[1].desired, Some(Value::Bool(true)));
        assert_eq!(desired[0].template_name, "T1");
        assert_eq!(desired[0].actions.len(), 1);
        assert!(desired[1].actions.is_empty());
    }

    #[test]
    fn ordering_is_stable_across_calls() {
        let t = template(json!({
            "standards": {
                "Zeta": {"standards": {"Zeta": true}},
                "Alpha": {"standards": {"Alpha": true}},
                "Mid": {"standards": {"Mid": true}}
            }
        }));
        let config = CompareConfig::default();
        let first: Vec<_> = extract_desired(&t, &config).into_iter().map(|d| d.id).collect();
        for _ in 0..5 {
            let again: Vec<_> = extract_desired(&t, &config).into_iter().map(|d| d.id).collect();
            assert_eq!(first, again);
        }
        let keys: Vec<_> = first.iter().map(|id| id.key().to_string()).collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn missing_settings_are_none() {
        let t = template(json!({
            "standards": {
                "NoInner": {"action": []},
                "WrongKey": {"standards": {"Other": true}},
                "NullInner": {"standards": {"NullInner": null}},
                "NotAnObject": [1, 2]
            }
        }));
        let desired = extract_desired(&t, &CompareConfig::default());
        assert_eq!(desired.len(), 4);
        assert!(desired.iter().all(|d| d.desired.is_none()));
    }

    #[test]
    fn malformed_actions_are_dropped() {
        let t = template(json!({
            "standards": {"A": {"standards": {"A": true}, "action": {"oops": 1}}}
        }));
        let desired = extract_desired(&t, &CompareConfig::default());
        assert_eq!(desired[0].desired, Some(Value::Bool(true)));
        assert!(desired[0].actions.is_empty());
    }

    #[test]
    fn template_name_defaults() {
        let t = template(json!({"standards": {"A": {"standards": {"A": true}}}}));
        let desired = extract_desired(&t, &CompareConfig::default());
        assert_eq!(desired[0].template_name, "Standard Template");
    }

    #[test]
    fn template_without_standards_yields_nothing() {
        let t = template(json!({"GUID": "x", "standards": null}));
        assert!(extract_desired(&t, &CompareConfig::default()).is_empty());
    }

    #[test]
    fn custom_prefix_is_applied() {
        let t = template(json!({"standards": {"A": {"standards": {"A": 1}}}}));
        let config = CompareConfig {
            standard_prefix: "policies.".into(),
            ..CompareConfig::default()
        };
        assert_eq!(extract_desired(&t, &config)[0].id.as_str(), "policies.A");
    }
}
