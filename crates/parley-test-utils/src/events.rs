use parking_lot::Mutex;
use parley_protocol::{EventMsg, EventPayload, EventSink, QuestionOutcome};

/// Event sink that keeps everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EventMsg>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventMsg> {
        self.events.lock().clone()
    }

    /// Outcomes of all `QuestionResolved` events, in order.
    pub fn outcomes(&self) -> Vec<QuestionOutcome> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event.payload {
                EventPayload::QuestionResolved { outcome, .. } => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EventMsg) {
        self.events.lock().push(event);
    }
}
