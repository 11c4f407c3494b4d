//! End-to-end workflow tests against in-process stores
//!
//! Each test drives [`ReconcileEngine::apply`] with a real config file on
//! disk and a store fake, then inspects the calls the store saw.

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use lifecycle_core::{ApplyStatus, BackupManager, Error, ReconcileEngine};
use lifecycle_policy::PolicyDocument;
use lifecycle_store::{MemoryPolicyStore, PolicyStore, StoreError};

struct Fixture {
    dir: TempDir,
    config_path: PathBuf,
}

fn fixture(local: serde_json::Value) -> Fixture {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("lifecycle.json");
    fs::write(&config_path, serde_json::to_string(&local).unwrap()).unwrap();
    Fixture { dir, config_path }
}

fn doc(value: serde_json::Value) -> PolicyDocument {
    PolicyDocument::from_value(value).unwrap()
}

fn backup_manager(fx: &Fixture) -> BackupManager {
    BackupManager::new(fx.dir.path().join("backups"))
}

fn engine_for(fx: &Fixture, store: Box<dyn PolicyStore>) -> ReconcileEngine {
    ReconcileEngine::new(store, backup_manager(fx))
}

fn backup_files(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path().join("backups"))
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn empty_bucket_gets_the_local_configuration() {
    let local = json!({"Rules": [{"ID": "expire", "Status": "Enabled", "Expiration": {"Days": 30}}]});
    let fx = fixture(local.clone());
    let store = MemoryPolicyStore::new();

    let engine = engine_for(&fx, Box::new(store.clone()));
    let outcome = engine.apply("my-bucket", &fx.config_path).unwrap();

    assert_eq!(outcome.status, ApplyStatus::Verified);
    assert!(outcome.updated);
    assert_eq!(outcome.bucket, "my-bucket");
    assert_eq!(store.stored().unwrap().as_value(), &local);
    // No remote state existed, so nothing was snapshotted.
    assert!(backup_files(&fx.dir).is_empty());
}

#[test]
fn converged_bucket_is_left_untouched() {
    let rules = json!({"Rules": [{"ID": "a", "Status": "Enabled"}]});
    let fx = fixture(rules.clone());
    let store = MemoryPolicyStore::with_policy(doc(rules));

    let engine = engine_for(&fx, Box::new(store.clone()));
    let outcome = engine.apply("my-bucket", &fx.config_path).unwrap();

    assert_eq!(outcome.status, ApplyStatus::UpToDate);
    assert!(!outcome.updated);
    assert_eq!(store.publish_calls(), 0);
    assert_eq!(store.fetch_calls(), 1);
    assert!(backup_files(&fx.dir).is_empty());
}

#[test]
fn key_order_differences_do_not_trigger_an_update() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Enabled", "Expiration": {"Days": 7}}]}));
    let remote = doc(json!({"Rules": [{"Expiration": {"Days": 7}, "Status": "Enabled", "ID": "a"}]}));
    let store = MemoryPolicyStore::with_policy(remote);

    let engine = engine_for(&fx, Box::new(store.clone()));
    let outcome = engine.apply("bucket", &fx.config_path).unwrap();

    assert_eq!(outcome.status, ApplyStatus::UpToDate);
    assert_eq!(store.publish_calls(), 0);
}

#[test]
fn diverged_bucket_is_backed_up_then_updated() {
    let fx = fixture(json!({"Rules": [
        {"ID": "shared", "Status": "Enabled", "Expiration": {"Days": 30}}
    ]}));
    let remote_state = json!({"Rules": [
        {"ID": "shared", "Status": "Disabled", "Expiration": {"Days": 90}},
        {"ID": "keep-me", "Status": "Enabled"}
    ]});
    let store = MemoryPolicyStore::with_policy(doc(remote_state.clone()));

    let engine = engine_for(&fx, Box::new(store.clone()));
    let outcome = engine.apply("my-bucket", &fx.config_path).unwrap();

    assert_eq!(outcome.status, ApplyStatus::Verified);
    assert_eq!(store.publish_calls(), 1);
    // publish, then a verification re-fetch
    assert_eq!(store.fetch_calls(), 2);

    // The snapshot holds the pre-update remote state.
    let backups = backup_files(&fx.dir);
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("lifecycle-backup-my-bucket-"));
    let snapshot: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(fx.dir.path().join("backups").join(&backups[0])).unwrap(),
    )
    .unwrap();
    assert_eq!(snapshot, remote_state);

    // Local record wins; the remote-only rule survives after it.
    let stored = store.stored().unwrap();
    let rules = stored.rules();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["ID"], "shared");
    assert_eq!(rules[0]["Expiration"]["Days"], 30);
    assert_eq!(rules[1]["ID"], "keep-me");
}

#[test]
fn second_apply_after_an_update_is_a_no_op() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));
    let store = MemoryPolicyStore::with_policy(doc(
        json!({"Rules": [{"ID": "b", "Status": "Enabled"}]}),
    ));

    let engine = engine_for(&fx, Box::new(store.clone()));

    let first = engine.apply("bucket", &fx.config_path).unwrap();
    assert_eq!(first.status, ApplyStatus::Verified);

    let second = engine.apply("bucket", &fx.config_path).unwrap();
    assert_eq!(second.status, ApplyStatus::UpToDate);
    assert_eq!(store.publish_calls(), 1);
}

#[test]
fn unwritable_backup_dir_does_not_stop_the_update() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));
    let store = MemoryPolicyStore::with_policy(doc(
        json!({"Rules": [{"ID": "b", "Status": "Enabled"}]}),
    ));

    // A regular file where the backup directory should be.
    let blocked = fx.dir.path().join("blocked");
    fs::write(&blocked, "not a directory").unwrap();

    let engine = ReconcileEngine::new(Box::new(store.clone()), BackupManager::new(&blocked));
    let outcome = engine.apply("bucket", &fx.config_path).unwrap();

    assert_eq!(outcome.status, ApplyStatus::Verified);
    assert_eq!(store.publish_calls(), 1);
}

#[test]
fn verification_mismatch_is_its_own_error() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));

    let engine = engine_for(&fx, Box::new(ManglingStore::default()));
    let err = engine.apply("bucket", &fx.config_path).unwrap_err();

    assert!(matches!(err, Error::VerificationMismatch { bucket } if bucket == "bucket"));
}

#[test]
fn fetch_failure_surfaces_as_a_store_error() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));

    let engine = engine_for(&fx, Box::new(FailingStore { on_publish: false }));
    let err = engine.apply("bucket", &fx.config_path).unwrap_err();

    assert!(matches!(err, Error::Store(_)));
}

#[test]
fn publish_failure_surfaces_as_a_store_error() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Enabled"}]}));

    let engine = engine_for(&fx, Box::new(FailingStore { on_publish: true }));
    let err = engine.apply("bucket", &fx.config_path).unwrap_err();

    assert!(matches!(err, Error::Store(_)));
}

#[test]
fn invalid_local_config_stops_before_any_fetch() {
    let fx = fixture(json!({"Rules": [{"ID": "a", "Status": "Nope"}]}));
    let store = MemoryPolicyStore::new();

    let engine = engine_for(&fx, Box::new(store.clone()));
    let err = engine.apply("bucket", &fx.config_path).unwrap_err();

    assert!(matches!(err, Error::InvalidPolicy { .. }));
    assert_eq!(store.fetch_calls(), 0);
}

#[test]
fn missing_config_file_stops_before_any_fetch() {
    let fx = fixture(json!({"Rules": []}));
    let store = MemoryPolicyStore::new();

    let engine = engine_for(&fx, Box::new(store.clone()));
    let err = engine
        .apply("bucket", &fx.dir.path().join("absent.json"))
        .unwrap_err();

    assert!(matches!(err, Error::ConfigNotFound { .. }));
    assert_eq!(store.fetch_calls(), 0);
}

#[test]
fn invalid_bucket_name_stops_before_loading() {
    let fx = fixture(json!({"Rules": []}));
    let engine = engine_for(&fx, Box::new(MemoryPolicyStore::new()));

    let err = engine.apply("../etc", &fx.config_path).unwrap_err();
    assert!(matches!(err, Error::InvalidBucket { .. }));
}

/// Accepts publishes but hands back a different document, the way a
/// provider that rewrites configurations would.
#[derive(Default)]
struct ManglingStore {
    published: Cell<bool>,
}

impl PolicyStore for ManglingStore {
    fn fetch_policy(&self, _bucket: &str) -> lifecycle_store::Result<Option<PolicyDocument>> {
        if self.published.get() {
            Ok(Some(doc(json!({"Rules": [
                {"ID": "a", "Status": "Enabled", "Expiration": {"Days": 999}}
            ]}))))
        } else {
            Ok(None)
        }
    }

    fn publish_policy(
        &self,
        _bucket: &str,
        _policy: &PolicyDocument,
    ) -> lifecycle_store::Result<()> {
        self.published.set(true);
        Ok(())
    }
}

/// Fails the fetch or the publish with a service-shaped error.
struct FailingStore {
    on_publish: bool,
}

impl PolicyStore for FailingStore {
    fn fetch_policy(&self, bucket: &str) -> lifecycle_store::Result<Option<PolicyDocument>> {
        if self.on_publish {
            Ok(None)
        } else {
            Err(StoreError::Api {
                operation: "get bucket lifecycle",
                bucket: bucket.to_string(),
                status: 403,
                code: "AccessDenied".to_string(),
            })
        }
    }

    fn publish_policy(
        &self,
        bucket: &str,
        _policy: &PolicyDocument,
    ) -> lifecycle_store::Result<()> {
        Err(StoreError::Api {
            operation: "put bucket lifecycle",
            bucket: bucket.to_string(),
            status: 500,
            code: "InternalError".to_string(),
        })
    }
}
