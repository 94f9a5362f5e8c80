use parking_lot::Mutex;
use parley_protocol::{AnswerSet, AnswerSubmitter, RequestId};

/// Submitter that records answers and cancellations.
pub struct RecordingSubmitter {
    answers: Mutex<Vec<(RequestId, AnswerSet)>>,
    cancels: Mutex<Vec<RequestId>>,
    accept: bool,
}

impl Default for RecordingSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
            accept: true,
        }
    }

    /// Submitter that reports every request as already settled.
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::new()
        }
    }

    pub fn answers(&self) -> Vec<(RequestId, AnswerSet)> {
        self.answers.lock().clone()
    }

    pub fn cancels(&self) -> Vec<RequestId> {
        self.cancels.lock().clone()
    }
}

impl AnswerSubmitter for RecordingSubmitter {
    fn answer(&self, request_id: RequestId, answers: AnswerSet) -> bool {
        self.answers.lock().push((request_id, answers));
        self.accept
    }

    fn cancel(&self, request_id: RequestId) -> bool {
        self.cancels.lock().push(request_id);
        self.accept
    }
}
