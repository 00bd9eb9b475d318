use std::collections::BTreeMap;

use crate::model::{ComplianceStatus, FieldDifferences, FieldStatus, Observed, ObservedSource, Verdict};
use crate::value::Value;

/// Compare a standard's desired value against what was observed.
///
/// Decision order:
/// 1. No desired settings (absent, or an empty mapping) -> `Unconfigured`.
/// 2. Desired `true` and a direct observed `true` -> `Compliant`.
/// 3. Observed present -> structural equality decides.
/// 4. Observed absent -> `NonCompliant`.
///
/// Field differences are filled in only when both sides are mappings, and
/// never change the status.
pub fn reconcile(desired: Option<&Value>, observed: Option<&Observed>) -> Verdict {
    let desired = match desired {
        Some(d) if !d.is_empty_settings() => d,
        _ => {
            return Verdict {
                status: ComplianceStatus::Unconfigured,
                field_differences: None,
            }
        }
    };

    let Some(observed) = observed else {
        return Verdict {
            status: ComplianceStatus::NonCompliant,
            field_differences: None,
        };
    };

    let status = if is_boolean_shorthand(desired, observed) || *desired == observed.value {
        ComplianceStatus::Compliant
    } else {
        ComplianceStatus::NonCompliant
    };

    let field_differences = match (desired, &observed.value) {
        (Value::Structured(want), Value::Structured(have)) => Some(field_differences(want, have)),
        _ => None,
    };

    Verdict {
        status,
        field_differences,
    }
}

fn is_boolean_shorthand(desired: &Value, observed: &Observed) -> bool {
    observed.source == ObservedSource::Direct
        && matches!(desired, Value::Bool(true))
        && matches!(observed.value, Value::Bool(true))
}

/// Classify every observed key against the desired mapping. Keys only the
/// desired side has are not reported.
pub fn field_differences(
    desired: &BTreeMap<String, Value>,
    observed: &BTreeMap<String, Value>,
) -> FieldDifferences {
    observed
        .iter()
        .map(|(key, have)| {
            let status = match desired.get(key) {
                None => FieldStatus::NoBaseline,
                Some(want) if want.canonical_json() == have.canonical_json() => FieldStatus::Matches,
                Some(_) => FieldStatus::Differs,
            };
            (key.clone(), status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn direct(v: serde_json::Value) -> Observed {
        Observed {
            value: Value::from(v),
            source: ObservedSource::Direct,
        }
    }

    fn listed(v: serde_json::Value) -> Observed {
        Observed {
            value: Value::from(v),
            source: ObservedSource::ResultsList,
        }
    }

    fn desired(v: serde_json::Value) -> Value {
        Value::from(v)
    }

    #[test]
    fn boolean_shorthand_compliant() {
        let v = reconcile(Some(&desired(json!(true))), Some(&direct(json!(true))));
        assert_eq!(v.status, ComplianceStatus::Compliant);
        assert!(v.field_differences.is_none());
    }

    #[test]
    fn boolean_shorthand_negative() {
        let v = reconcile(Some(&desired(json!(true))), Some(&direct(json!(false))));
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn listed_true_matches_desired_true() {
        let v = reconcile(Some(&desired(json!(true))), Some(&listed(json!(true))));
        assert_eq!(v.status, ComplianceStatus::Compliant);
    }

    #[test]
    fn direct_true_does_not_satisfy_structured_settings() {
        let v = reconcile(Some(&desired(json!({"mode": "strict"}))), Some(&direct(json!(true))));
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        assert!(v.field_differences.is_none());
    }

    #[test]
    fn structural_equality_ignores_key_order() {
        let v = reconcile(
            Some(&desired(json!({"a": 1, "b": 2}))),
            Some(&listed(json!({"b": 2, "a": 1}))),
        );
        assert_eq!(v.status, ComplianceStatus::Compliant);
        let diffs = v.field_differences.unwrap();
        assert_eq!(diffs["a"], FieldStatus::Matches);
        assert_eq!(diffs["b"], FieldStatus::Matches);
    }

    #[test]
    fn absence_is_never_compliant() {
        let v = reconcile(Some(&desired(json!({"minLength": 14}))), None);
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        assert!(v.field_differences.is_none());

        let v = reconcile(Some(&desired(json!(true))), None);
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn scalar_vs_structured_has_no_field_differences() {
        let v = reconcile(Some(&desired(json!("on"))), Some(&listed(json!({"x": 1}))));
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        assert!(v.field_differences.is_none());
    }

    #[test]
    fn structured_mismatch_flags_offending_field() {
        let v = reconcile(
            Some(&desired(json!({"minLength": 14, "mfa": true}))),
            Some(&listed(json!({"minLength": 8, "mfa": true}))),
        );
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        let diffs = v.field_differences.unwrap();
        assert_eq!(diffs["minLength"], FieldStatus::Differs);
        assert_eq!(diffs["mfa"], FieldStatus::Matches);
    }

    #[test]
    fn observed_only_keys_have_no_baseline() {
        let v = reconcile(
            Some(&desired(json!({"a": 1}))),
            Some(&listed(json!({"a": 1, "extra": "x"}))),
        );
        // The extra key makes the values unequal even though no field differs.
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        let diffs = v.field_differences.unwrap();
        assert_eq!(diffs["a"], FieldStatus::Matches);
        assert_eq!(diffs["extra"], FieldStatus::NoBaseline);
    }

    #[test]
    fn desired_only_keys_are_not_reported() {
        let v = reconcile(
            Some(&desired(json!({"a": 1, "b": 2}))),
            Some(&listed(json!({"a": 1}))),
        );
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        let diffs = v.field_differences.unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(!diffs.contains_key("b"));
    }

    #[test]
    fn labeled_values_compare_on_value_and_label() {
        let want = desired(json!({"action": {"label": "Block", "value": "block"}}));
        let same = listed(json!({"action": {"value": "block", "label": "Block"}}));
        let relabeled = listed(json!({"action": {"value": "block", "label": "Block access"}}));

        assert_eq!(reconcile(Some(&want), Some(&same)).status, ComplianceStatus::Compliant);
        let v = reconcile(Some(&want), Some(&relabeled));
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        assert_eq!(v.field_differences.unwrap()["action"], FieldStatus::Differs);
    }

    #[test]
    fn type_mismatch_is_non_compliant() {
        let v = reconcile(Some(&desired(json!(14))), Some(&listed(json!("14"))));
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
        let v = reconcile(Some(&desired(json!([1]))), Some(&listed(json!(null))));
        assert_eq!(v.status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn empty_settings_are_unconfigured_regardless_of_observed() {
        for observed in [None, Some(direct(json!(true))), Some(listed(json!({"a": 1})))] {
            let v = reconcile(Some(&desired(json!({}))), observed.as_ref());
            assert_eq!(v.status, ComplianceStatus::Unconfigured);
            assert!(v.field_differences.is_none());
        }
        assert_eq!(reconcile(None, None).status, ComplianceStatus::Unconfigured);
    }

    #[test]
    fn desired_false_matches_observed_false() {
        let v = reconcile(Some(&desired(json!(false))), Some(&direct(json!(false))));
        assert_eq!(v.status, ComplianceStatus::Compliant);
    }
}
