//! Reconciliation of repository entry option changes

use super::types::RepositoryEntryConfig;
use std::collections::BTreeSet;

/// What has to be redone after a repository entry changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Components whose supported versions must be resolved again
    pub affected: BTreeSet<String>,

    /// The update check has to be rescheduled
    pub reschedule: bool,
}

impl Reconciliation {
    /// Nothing changed
    pub fn is_noop(&self) -> bool {
        self.affected.is_empty() && !self.reschedule
    }
}

/// Compare two versions of the same entry
///
/// A new base URL or a different unstable policy changes what every
/// component resolves to. A new polling interval only moves the schedule.
pub fn reconcile(
    old: &RepositoryEntryConfig,
    new: &RepositoryEntryConfig,
    known_components: &[String],
) -> Reconciliation {
    let source_changed = old.normalized_base_url() != new.normalized_base_url()
        || old.show_unstable != new.show_unstable;

    let affected = if source_changed {
        known_components.iter().cloned().collect()
    } else {
        BTreeSet::new()
    };

    Reconciliation {
        affected,
        reschedule: source_changed || old.polling_hours != new.polling_hours,
    }
}
