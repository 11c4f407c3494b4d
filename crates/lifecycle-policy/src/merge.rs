//! Local-precedence rule merging
//!
//! The merge treats a rule's `ID` as the sole join key. Local rules always
//! win whole: a remote rule whose ID matches a local rule is dropped
//! entirely, never blended field-by-field.

use std::collections::HashSet;

use serde_json::Value;

use crate::document::{PolicyDocument, rule_id};

/// Merge a local and a remote policy document
///
/// - Remote absent, or with an empty/absent `Rules` array: the local
///   document is returned unchanged.
/// - Otherwise the result carries every local rule in local order, followed
///   by every remote rule whose ID does not appear among the local IDs, in
///   remote order. All non-`Rules` top-level fields come from the local
///   document.
///
/// ID matching is exact string equality with no normalization. Remote rules
/// without a string `ID` can never match a local rule and are carried
/// through. This is a pure function.
pub fn merge(local: &PolicyDocument, remote: Option<&PolicyDocument>) -> PolicyDocument {
    let Some(remote) = remote else {
        tracing::debug!("No remote configuration, using local configuration");
        return local.clone();
    };
    if !remote.has_rules() {
        tracing::debug!("Remote configuration has no rules, using local configuration");
        return local.clone();
    }

    let local_ids: HashSet<&str> = local.rules().iter().filter_map(rule_id).collect();

    let mut merged: Vec<Value> = local.rules().to_vec();
    for rule in remote.rules() {
        match rule_id(rule) {
            Some(id) if local_ids.contains(id) => {
                tracing::debug!(id, "Dropping remote rule overridden by local configuration");
            }
            _ => merged.push(rule.clone()),
        }
    }

    tracing::debug!(
        local = local.rules().len(),
        remote = remote.rules().len(),
        merged = merged.len(),
        "Merged lifecycle configurations"
    );

    local.with_rules(merged)
}
