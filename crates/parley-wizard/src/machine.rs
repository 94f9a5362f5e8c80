//! Step-by-step answer collection with validation-gated progression.

use log::debug;
use parley_protocol::{
    AnswerSet, AnswerSubmitter, DEFAULT_ANSWER_DELIMITER, Question, QuestionBatch,
    QuestionRequest, RequestId,
};
use std::collections::HashMap;
use std::sync::Arc;

/// One entry in a step's selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A predefined option, by label.
    Option(String),
    /// The free-text "other" answer.
    Other,
}

/// Selections and free text entered on one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepState {
    selected: Vec<Selection>,
    other_text: String,
}

impl StepState {
    /// Selections in the order they were made.
    pub fn selected(&self) -> &[Selection] {
        &self.selected
    }

    pub fn other_text(&self) -> &str {
        &self.other_text
    }

    pub fn is_selected(&self, label: &str) -> bool {
        self.selected
            .iter()
            .any(|selection| matches!(selection, Selection::Option(l) if l == label))
    }

    pub fn has_other(&self) -> bool {
        self.selected.contains(&Selection::Other)
    }

    /// Non-empty selection, and "other" carries non-blank text.
    pub fn is_complete(&self) -> bool {
        !self.selected.is_empty() && (!self.has_other() || !self.other_text.trim().is_empty())
    }

    /// Regular labels in selection order, then the trimmed other text.
    fn aggregate(&self, delimiter: &str) -> String {
        let mut parts: Vec<&str> = self
            .selected
            .iter()
            .filter_map(|selection| match selection {
                Selection::Option(label) => Some(label.as_str()),
                Selection::Other => None,
            })
            .collect();
        if self.has_other() {
            parts.push(self.other_text.trim());
        }
        parts.retain(|part| !part.is_empty());
        parts.join(delimiter)
    }
}

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Showing the question at this index.
    Step(usize),
    /// Answers were handed to the submitter.
    Submitted,
    /// The user dismissed the wizard.
    Cancelled,
}

/// Drives one question batch from the first step to submission.
///
/// Every operation returns whether it took effect. Rejected operations leave
/// the machine untouched.
pub struct AnswerStateMachine {
    request_id: RequestId,
    batch: QuestionBatch,
    state: WizardState,
    steps: HashMap<usize, StepState>,
    delimiter: String,
    submitter: Arc<dyn AnswerSubmitter>,
}

impl AnswerStateMachine {
    pub fn new(
        request_id: RequestId,
        batch: QuestionBatch,
        submitter: Arc<dyn AnswerSubmitter>,
    ) -> Self {
        Self {
            request_id,
            batch,
            state: WizardState::Step(0),
            steps: HashMap::new(),
            delimiter: DEFAULT_ANSWER_DELIMITER.to_string(),
            submitter,
        }
    }

    /// Start a wizard for a delivered request.
    pub fn from_request(request: QuestionRequest, submitter: Arc<dyn AnswerSubmitter>) -> Self {
        Self::new(request.request_id, request.batch, submitter)
    }

    /// Override the separator used to join multi-select answers.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn batch(&self) -> &QuestionBatch {
        &self.batch
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, WizardState::Step(_))
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            WizardState::Step(index) => Some(index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|index| self.batch.get(index))
    }

    /// State of a step, if the user has interacted with it.
    pub fn step(&self, index: usize) -> Option<&StepState> {
        self.steps.get(&index)
    }

    pub fn current_step(&self) -> Option<&StepState> {
        self.current_index().and_then(|index| self.step(index))
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index()
            .is_some_and(|index| index + 1 == self.batch.len())
    }

    /// Pick a predefined option on the current step.
    pub fn select_option(&mut self, label: &str) -> bool {
        let Some((index, question)) = self.active() else {
            return false;
        };
        if question.option(label).is_none() {
            debug!(
                "ignoring unknown option (request_id={}, label={})",
                self.request_id, label
            );
            return false;
        }
        let multi_select = question.multi_select;
        let step = self.steps.entry(index).or_default();
        let selection = Selection::Option(label.to_string());
        if multi_select {
            step.selected.retain(|s| *s != Selection::Other);
            match step.selected.iter().position(|s| *s == selection) {
                Some(position) => {
                    step.selected.remove(position);
                }
                None => step.selected.push(selection),
            }
        } else {
            step.selected = vec![selection];
            step.other_text.clear();
        }
        true
    }

    /// Pick (or in multi-select, toggle) the free-text answer.
    pub fn select_other(&mut self) -> bool {
        let Some((index, question)) = self.active() else {
            return false;
        };
        let multi_select = question.multi_select;
        let step = self.steps.entry(index).or_default();
        if multi_select {
            match step.selected.iter().position(|s| *s == Selection::Other) {
                Some(position) => {
                    step.selected.remove(position);
                }
                None => step.selected.push(Selection::Other),
            }
        } else {
            step.selected = vec![Selection::Other];
        }
        true
    }

    /// Replace the free text for the current step.
    pub fn set_other_text(&mut self, value: impl Into<String>) -> bool {
        let Some((index, _)) = self.active() else {
            return false;
        };
        self.steps.entry(index).or_default().other_text = value.into();
        true
    }

    /// Whether the current step is complete enough to move on.
    pub fn can_advance(&self) -> bool {
        self.current_step().is_some_and(StepState::is_complete)
    }

    pub fn next(&mut self) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        if !self.can_advance() || self.is_last_step() {
            return false;
        }
        self.state = WizardState::Step(index + 1);
        true
    }

    pub fn back(&mut self) -> bool {
        match self.state {
            WizardState::Step(index) if index > 0 => {
                self.state = WizardState::Step(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Aggregate answers on the last step and hand them to the submitter.
    pub fn submit(&mut self) -> Option<AnswerSet> {
        if !self.is_last_step() || !self.can_advance() {
            return None;
        }
        let answers = self.collect_answers();
        self.state = WizardState::Submitted;
        self.steps.clear();
        if !self.submitter.answer(self.request_id, answers.clone()) {
            debug!(
                "answers arrived after the request settled (request_id={})",
                self.request_id
            );
        }
        Some(answers)
    }

    /// Dismiss the wizard from any step.
    pub fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = WizardState::Cancelled;
        self.steps.clear();
        if !self.submitter.cancel(self.request_id) {
            debug!(
                "cancel arrived after the request settled (request_id={})",
                self.request_id
            );
        }
        true
    }

    fn active(&self) -> Option<(usize, &Question)> {
        let index = self.current_index()?;
        self.batch.get(index).map(|question| (index, question))
    }

    fn collect_answers(&self) -> AnswerSet {
        self.batch
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let value = self
                    .steps
                    .get(&index)
                    .map(|step| step.aggregate(&self.delimiter))
                    .unwrap_or_default();
                (question.header.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_protocol::QuestionOption;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    struct NullSubmitter;

    impl AnswerSubmitter for NullSubmitter {
        fn answer(&self, _request_id: RequestId, _answers: AnswerSet) -> bool {
            true
        }

        fn cancel(&self, _request_id: RequestId) -> bool {
            true
        }
    }

    fn question(header: &str, labels: &[&str], multi_select: bool) -> Question {
        Question {
            prompt: format!("{header}?"),
            header: header.to_string(),
            options: labels
                .iter()
                .map(|label| QuestionOption::new(*label, ""))
                .collect(),
            multi_select,
        }
    }

    fn machine(questions: Vec<Question>) -> AnswerStateMachine {
        let batch = QuestionBatch::new(questions).expect("batch");
        AnswerStateMachine::new(Uuid::nil(), batch, Arc::new(NullSubmitter))
    }

    #[test]
    fn steps_are_created_lazily() {
        let mut wizard = machine(vec![question("Lang", &["A", "B"], false)]);
        assert_eq!(wizard.state(), WizardState::Step(0));
        assert!(wizard.current_step().is_none());
        assert!(!wizard.can_advance());
        assert!(wizard.set_other_text("draft"));
        assert_eq!(wizard.current_step().map(StepState::other_text), Some("draft"));
        assert!(!wizard.can_advance());
    }

    #[test]
    fn single_select_replaces_selection_and_clears_other_text() {
        let mut wizard = machine(vec![question("Lang", &["A", "B"], false)]);
        assert!(wizard.select_other());
        assert!(wizard.set_other_text("Zig"));
        assert!(wizard.select_option("A"));
        assert!(wizard.select_option("B"));

        let step = wizard.current_step().expect("step");
        assert_eq!(step.selected(), &[Selection::Option("B".to_string())]);
        assert_eq!(step.other_text(), "");
    }

    #[test]
    fn single_select_other_replaces_option() {
        let mut wizard = machine(vec![question("Lang", &["A", "B"], false)]);
        wizard.select_option("A");
        wizard.select_other();
        assert_eq!(
            wizard.current_step().map(StepState::selected),
            Some(&[Selection::Other][..])
        );
    }

    #[test]
    fn multi_select_toggles_and_option_removes_other() {
        let mut wizard = machine(vec![question("Tools", &["X", "Y", "W"], true)]);
        wizard.select_option("X");
        wizard.select_other();
        wizard.set_other_text("Z");
        assert!(wizard.current_step().is_some_and(StepState::has_other));
        assert!(wizard.current_step().is_some_and(|s| s.is_selected("X")));

        wizard.select_option("Y");
        let step = wizard.current_step().expect("step");
        assert!(!step.has_other());
        assert_eq!(step.other_text(), "Z");

        wizard.select_option("X");
        assert_eq!(
            wizard.current_step().map(StepState::selected),
            Some(&[Selection::Option("Y".to_string())][..])
        );
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let mut wizard = machine(vec![question("Lang", &["A", "B"], false)]);
        assert!(!wizard.select_option("C"));
        assert!(wizard.current_step().is_none());
    }

    #[test]
    fn navigation_is_gated_and_back_keeps_data() {
        let mut wizard = machine(vec![
            question("Lang", &["A", "B"], false),
            question("Tools", &["X", "Y"], true),
        ]);
        assert!(!wizard.back());
        assert!(!wizard.next());
        assert!(wizard.submit().is_none());

        wizard.select_option("B");
        assert!(wizard.submit().is_none());
        assert!(wizard.next());
        assert!(wizard.is_last_step());
        assert!(!wizard.next());

        wizard.select_option("Y");
        assert!(wizard.back());
        assert_eq!(wizard.current_index(), Some(0));
        assert!(wizard.step(1).is_some_and(|s| s.is_selected("Y")));
        assert!(wizard.current_step().is_some_and(|s| s.is_selected("B")));
    }

    #[test]
    fn terminal_states_reject_everything() {
        let mut wizard = machine(vec![question("Lang", &["A", "B"], false)]);
        assert!(wizard.cancel());
        assert_eq!(wizard.state(), WizardState::Cancelled);
        assert!(!wizard.cancel());
        assert!(!wizard.select_option("A"));
        assert!(!wizard.select_other());
        assert!(!wizard.set_other_text("x"));
        assert!(!wizard.back());
        assert!(wizard.submit().is_none());
        assert!(wizard.step(0).is_none());
    }

    #[test]
    fn custom_delimiter_joins_answers() {
        let mut wizard = machine(vec![question("Tools", &["X", "Y"], true)]).with_delimiter(" | ");
        wizard.select_option("X");
        wizard.select_option("Y");
        let answers = wizard.submit().expect("answers");
        assert_eq!(answers.get("Tools"), Some("X | Y"));
        assert_eq!(wizard.state(), WizardState::Submitted);
    }
}
