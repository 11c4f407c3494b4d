//! Embedded self-test suite
//!
//! Exercises the merge, comparison, and validation logic against known
//! inputs without touching any bucket. Run from the CLI as a quick sanity
//! check of a deployed binary.

use lifecycle_policy::{PolicyDocument, documents_equal, merge, validate};
use lifecycle_store::{MemoryPolicyStore, PolicyStore};
use serde_json::json;

fn doc(value: serde_json::Value) -> PolicyDocument {
    PolicyDocument::from_value(value).expect("self-test fixtures are objects")
}

fn merge_without_remote() -> bool {
    let local = doc(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));
    let merged = merge(&local, None);
    documents_equal(Some(&merged), Some(&local))
}

fn merge_without_conflicts() -> bool {
    let local = doc(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));
    let remote = doc(json!({"Rules": [{"ID": "b", "Status": "Disabled"}]}));
    let merged = merge(&local, Some(&remote));
    let rules = merged.rules();

    rules.len() == 2
        && lifecycle_policy::rule_id(&rules[0]) == Some("a")
        && lifecycle_policy::rule_id(&rules[1]) == Some("b")
}

fn merge_with_conflicts() -> bool {
    let local = doc(json!({"Rules": [
        {"ID": "shared", "Status": "Enabled", "Expiration": {"Days": 30}}
    ]}));
    let remote = doc(json!({"Rules": [
        {"ID": "shared", "Status": "Disabled", "Expiration": {"Days": 90}},
        {"ID": "remote-only", "Status": "Enabled"}
    ]}));
    let merged = merge(&local, Some(&remote));
    let rules = merged.rules();

    rules.len() == 2
        && rules[0] == local.rules()[0]
        && lifecycle_policy::rule_id(&rules[1]) == Some("remote-only")
}

fn validation_matrix() -> bool {
    let accepted = [
        json!({"Rules": []}),
        json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}),
        json!({"Rules": [{"ID": "a", "Status": "Disabled"}]}),
    ];
    let rejected = [
        json!({"Rules": "nope"}),
        json!({"Rules": [{"Status": "Enabled"}]}),
        json!({"Rules": [{"ID": "a"}]}),
        json!({"Rules": [{"ID": "a", "Status": "Archived"}]}),
        json!({"Rules": [[]]}),
    ];

    accepted.iter().all(|v| validate(Some(v))) && !rejected.iter().any(|v| validate(Some(v)))
}

fn convergence_detection() -> bool {
    let local = doc(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));
    let remote = doc(json!({"Rules": [{"ID": "b", "Status": "Enabled"}]}));

    // A second merge against the merged result must be a no-op.
    let merged = merge(&local, Some(&remote));
    let again = merge(&local, Some(&merged));
    documents_equal(Some(&again), Some(&merged)) && !documents_equal(Some(&remote), Some(&merged))
}

fn converged_store_is_not_republished() -> bool {
    let local = doc(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));
    let store = MemoryPolicyStore::with_policy(local.clone());

    let Ok(remote) = store.fetch_policy("selftest-bucket") else {
        return false;
    };
    let merged = merge(&local, remote.as_ref());
    if !documents_equal(remote.as_ref(), Some(&merged)) {
        return false;
    }
    store.publish_calls() == 0
}

/// Run every self-test case, logging each result. Returns `true` when all
/// cases pass.
pub fn run() -> bool {
    let cases: &[(&str, fn() -> bool)] = &[
        ("merge without remote config", merge_without_remote),
        ("merge without conflicts", merge_without_conflicts),
        ("merge with conflicts", merge_with_conflicts),
        ("validation matrix", validation_matrix),
        ("convergence detection", convergence_detection),
        ("converged store not republished", converged_store_is_not_republished),
    ];

    let mut passed = 0usize;
    for (name, case) in cases {
        if case() {
            tracing::info!(case = name, "PASS");
            passed += 1;
        } else {
            tracing::error!(case = name, "FAIL");
        }
    }

    tracing::info!(passed, total = cases.len(), "Self-test complete");
    passed == cases.len()
}
