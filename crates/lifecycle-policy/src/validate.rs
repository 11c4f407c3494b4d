//! Structural validation for policy documents
//!
//! Validation is deliberately shallow: it checks the shape a document needs
//! for the merge algorithm to be meaningful (a `Rules` array of objects,
//! each with an `ID` and a valid `Status`) and nothing more. Filter shapes,
//! action payloads, and date ranges are the provider's concern.

use serde_json::Value;

use crate::document::{ID_KEY, RULES_KEY, STATUS_KEY, json_type_name};

/// Status values a rule may carry
const VALID_STATUSES: [&str; 2] = ["Enabled", "Disabled"];

/// Check the structural well-formedness of a policy document
///
/// A missing or `null` policy is valid ("no rules desired"). For each
/// violated constraint one diagnostic is emitted naming the failing rule
/// index, and `false` is returned. This never panics on parseable input;
/// malformed JSON text is the loader's concern.
pub fn validate(policy: Option<&Value>) -> bool {
    let Some(policy) = policy else {
        return true;
    };
    if policy.is_null() {
        return true;
    }

    let Some(object) = policy.as_object() else {
        tracing::error!(
            "Lifecycle configuration must be an object, got {}",
            json_type_name(policy)
        );
        return false;
    };

    let Some(rules) = object.get(RULES_KEY) else {
        tracing::error!("Lifecycle configuration must have a '{}' array", RULES_KEY);
        return false;
    };

    let Some(rules) = rules.as_array() else {
        tracing::error!("'{}' must be an array, got {}", RULES_KEY, json_type_name(rules));
        return false;
    };

    for (index, rule) in rules.iter().enumerate() {
        if !rule.is_object() {
            tracing::error!(
                "Rule at index {} must be an object, got {}",
                index,
                json_type_name(rule)
            );
            return false;
        }

        if rule.get(ID_KEY).is_none() {
            tracing::error!("Rule at index {} missing required '{}' field", index, ID_KEY);
            return false;
        }

        let Some(status) = rule.get(STATUS_KEY) else {
            tracing::error!(
                "Rule at index {} missing required '{}' field",
                index,
                STATUS_KEY
            );
            return false;
        };

        let valid = status
            .as_str()
            .is_some_and(|s| VALID_STATUSES.contains(&s));
        if !valid {
            tracing::error!(
                "Rule at index {} has invalid {} {} (must be 'Enabled' or 'Disabled')",
                index,
                STATUS_KEY,
                status
            );
            return false;
        }
    }

    true
}
