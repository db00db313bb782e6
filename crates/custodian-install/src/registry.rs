//! Shared runtime state of the manager
//!
//! One registry is created by the host and passed to every
//! [`ComponentManager`](crate::ComponentManager) and recovery flow. It holds
//! the attached repository entries with their component lists and the last
//! install outcome per component. Detaching the last entry drops every
//! outcome and tells the caller to unregister its services.

use crate::error::RegistryError;
use crate::outcome::InstallOutcomeRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    /// Entry id -> component ids listed by its repository
    entries: HashMap<String, Vec<String>>,

    /// Component id -> last install outcome
    outcomes: HashMap<String, InstallOutcomeRecord>,

    /// Component id -> install serialization lock
    install_locks: HashMap<String, Arc<Mutex<()>>>,
}

/// Cloneable handle to the shared state
#[derive(Clone, Default)]
pub struct ManagerRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a repository entry with the components it lists
    pub async fn attach_entry(
        &self,
        entry_id: &str,
        components: Vec<String>,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;
        if state.entries.contains_key(entry_id) {
            return Err(RegistryError::AlreadyAttached {
                entry_id: entry_id.to_string(),
            });
        }

        debug!("Attached entry {} ({} components)", entry_id, components.len());
        state.entries.insert(entry_id.to_string(), components);
        Ok(())
    }

    /// Detach an entry; returns true when it was the last one
    pub async fn detach_entry(&self, entry_id: &str) -> bool {
        let mut state = self.state.write().await;
        if state.entries.remove(entry_id).is_none() {
            return false;
        }

        debug!("Detached entry {}", entry_id);
        if state.entries.is_empty() {
            state.outcomes.clear();
            state.install_locks.clear();
            return true;
        }
        false
    }

    pub async fn is_attached(&self, entry_id: &str) -> bool {
        self.state.read().await.entries.contains_key(entry_id)
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Components listed for an attached entry
    pub async fn components(&self, entry_id: &str) -> Option<Vec<String>> {
        self.state.read().await.entries.get(entry_id).cloned()
    }

    /// Replace the component list of an attached entry
    pub async fn update_components(&self, entry_id: &str, components: Vec<String>) {
        if let Some(existing) = self.state.write().await.entries.get_mut(entry_id) {
            *existing = components;
        }
    }

    /// Store an install outcome, replacing the previous one for the component
    pub async fn record_outcome(&self, record: InstallOutcomeRecord) {
        self.state
            .write()
            .await
            .outcomes
            .insert(record.component_id.clone(), record);
    }

    /// Outcome behind an issue id
    pub async fn outcome(&self, issue_id: &str) -> Option<InstallOutcomeRecord> {
        self.state.read().await.outcomes.get(issue_id).cloned()
    }

    pub async fn clear_outcome(&self, issue_id: &str) -> Option<InstallOutcomeRecord> {
        self.state.write().await.outcomes.remove(issue_id)
    }

    /// Lock serializing installs of one component
    pub async fn install_lock(&self, component_id: &str) -> Arc<Mutex<()>> {
        self.state
            .write()
            .await
            .install_locks
            .entry(component_id.to_string())
            .or_default()
            .clone()
    }
}
