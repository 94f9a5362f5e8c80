//! Per-session registry of notification channels.

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;
use parley_protocol::{AskError, NotificationChannel, QuestionRequest, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Notification hooks keyed by session, so concurrent sessions never see
/// each other's questions.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<SessionId, Arc<dyn NotificationChannel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the channel for a session, returning the one it replaces.
    pub fn register(
        &self,
        session_id: SessionId,
        channel: Arc<dyn NotificationChannel>,
    ) -> Option<Arc<dyn NotificationChannel>> {
        let previous = self.channels.write().insert(session_id, channel);
        if previous.is_some() {
            info!("question channel replaced (session_id={})", session_id);
        } else {
            debug!("question channel registered (session_id={})", session_id);
        }
        previous
    }

    /// Remove the channel for a session.
    pub fn unregister(&self, session_id: SessionId) -> Option<Arc<dyn NotificationChannel>> {
        let removed = self.channels.write().remove(&session_id);
        if removed.is_some() {
            debug!("question channel unregistered (session_id={})", session_id);
        }
        removed
    }

    pub fn get(&self, session_id: SessionId) -> Option<Arc<dyn NotificationChannel>> {
        self.channels.read().get(&session_id).cloned()
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.channels.read().contains_key(&session_id)
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

/// Channel that forwards requests into an unbounded queue.
#[derive(Debug, Clone)]
pub struct QueueChannel {
    session_id: SessionId,
    sender: mpsc::UnboundedSender<QuestionRequest>,
}

impl QueueChannel {
    /// Create a channel for a session plus the receiving end a front-end reads.
    pub fn new(session_id: SessionId) -> (Self, mpsc::UnboundedReceiver<QuestionRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { session_id, sender }, receiver)
    }
}

#[async_trait]
impl NotificationChannel for QueueChannel {
    async fn notify(&self, request: QuestionRequest) -> Result<(), AskError> {
        self.sender
            .send(request)
            .map_err(|_| AskError::ChannelUnavailable(self.session_id))
    }
}
