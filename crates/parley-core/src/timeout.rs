//! Per-request timers that fail a pending request when it goes unanswered.

use crate::pending::PendingRequestTable;
use log::{debug, info};
use parking_lot::Mutex;
use parley_protocol::{AskError, RequestId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Schedules `fail(id, Timeout)` on the pending table and cancels it again
/// when the request settles some other way.
#[derive(Debug)]
pub struct TimeoutGuard {
    table: Arc<PendingRequestTable>,
    timers: Arc<Mutex<HashMap<RequestId, AbortHandle>>>,
}

impl TimeoutGuard {
    pub fn new(table: Arc<PendingRequestTable>) -> Self {
        Self {
            table,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start the timer for a request. Must be called inside a tokio runtime.
    pub fn arm(&self, request_id: RequestId, duration: Duration) {
        let table = Arc::clone(&self.table);
        let timers = Arc::clone(&self.timers);
        // Held across spawn so the task cannot remove its entry before it exists.
        let mut armed = self.timers.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if table.fail(request_id, AskError::Timeout(duration)) {
                info!(
                    "question request timed out (request_id={}, after_ms={})",
                    request_id,
                    duration.as_millis()
                );
            }
            timers.lock().remove(&request_id);
        });
        if let Some(previous) = armed.insert(request_id, task.abort_handle()) {
            previous.abort();
        }
    }

    /// Cancel the timer if it has not fired. Returns true if one was armed.
    pub fn disarm(&self, request_id: RequestId) -> bool {
        match self.timers.lock().remove(&request_id) {
            Some(handle) => {
                handle.abort();
                debug!("question timer disarmed (request_id={})", request_id);
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, request_id: RequestId) -> bool {
        self.timers.lock().contains_key(&request_id)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.lock().len()
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        for (_, handle) in self.timers.lock().drain() {
            handle.abort();
        }
    }
}
