//! Doubles for host collaborators

use async_trait::async_trait;
use custodian_install::{HostControl, Issue, IssueReporter, ServiceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Keeps every registered issue
#[derive(Default)]
pub struct RecordingReporter {
    issues: Mutex<Vec<Issue>>,
}

impl RecordingReporter {
    pub fn issues(&self) -> Vec<Issue> {
        self.issues.lock().unwrap().clone()
    }
}

impl IssueReporter for RecordingReporter {
    fn register(&self, issue: Issue) {
        self.issues.lock().unwrap().push(issue);
    }
}

/// Counts restart requests
#[derive(Default)]
pub struct CountingHost {
    restarts: AtomicUsize,
}

impl CountingHost {
    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostControl for CountingHost {
    async fn restart(&self) -> Result<(), ServiceError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
