use async_trait::async_trait;
use parking_lot::Mutex;
use parley_protocol::{AskError, NotificationChannel, QuestionRequest};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Channel that records every request and forwards it to a receiver.
#[derive(Clone)]
pub struct RecordingChannel {
    requests: Arc<Mutex<Vec<QuestionRequest>>>,
    sender: mpsc::UnboundedSender<QuestionRequest>,
}

impl RecordingChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QuestionRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                sender,
            },
            receiver,
        )
    }

    pub fn requests(&self) -> Vec<QuestionRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn notify(&self, request: QuestionRequest) -> Result<(), AskError> {
        self.requests.lock().push(request.clone());
        // Tests that ignore the receiver still get the recorded copy.
        let _ = self.sender.send(request);
        Ok(())
    }
}

/// Channel whose delivery always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingChannel;

#[async_trait]
impl NotificationChannel for FailingChannel {
    async fn notify(&self, request: QuestionRequest) -> Result<(), AskError> {
        Err(AskError::ChannelUnavailable(request.session_id))
    }
}
