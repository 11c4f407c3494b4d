//! In-memory policy store
//!
//! Holds a single bucket state in memory and counts calls. Clones share
//! state, so a test can hand one clone to the workflow and inspect the
//! other afterwards. No network involved.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lifecycle_policy::PolicyDocument;

use crate::error::Result;
use crate::store::PolicyStore;

/// A [`PolicyStore`] over in-process state
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyStore {
    inner: Rc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: RefCell<Option<PolicyDocument>>,
    fetch_calls: Cell<usize>,
    publish_calls: Cell<usize>,
}

impl MemoryPolicyStore {
    /// An empty store: fetches report no configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with an existing configuration
    pub fn with_policy(policy: PolicyDocument) -> Self {
        let store = Self::default();
        *store.inner.state.borrow_mut() = Some(policy);
        store
    }

    /// Number of fetches performed so far
    pub fn fetch_calls(&self) -> usize {
        self.inner.fetch_calls.get()
    }

    /// Number of publishes performed so far
    pub fn publish_calls(&self) -> usize {
        self.inner.publish_calls.get()
    }

    /// The currently stored configuration, if any
    pub fn stored(&self) -> Option<PolicyDocument> {
        self.inner.state.borrow().clone()
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn fetch_policy(&self, _bucket: &str) -> Result<Option<PolicyDocument>> {
        self.inner.fetch_calls.set(self.inner.fetch_calls.get() + 1);
        Ok(self.inner.state.borrow().clone())
    }

    fn publish_policy(&self, _bucket: &str, policy: &PolicyDocument) -> Result<()> {
        self.inner
            .publish_calls
            .set(self.inner.publish_calls.get() + 1);
        *self.inner.state.borrow_mut() = Some(policy.clone());
        Ok(())
    }
}
