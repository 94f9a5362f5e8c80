//! Tests for answer aggregation and forwarding.

use parley_protocol::{AnswerSet, QuestionBatch};
use parley_test_utils::{RecordingSubmitter, batch, multi_select, single_select};
use parley_wizard::{AnswerStateMachine, WizardCommand, WizardState};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

fn lang_and_tools() -> QuestionBatch {
    batch(vec![
        single_select("Lang", &["A", "B"]),
        multi_select("Tools", &["X", "Y"]),
    ])
}

/// Regular selections keep their order and "other" text is appended last.
#[test]
fn submit_aggregates_by_header() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let request_id = Uuid::new_v4();
    let mut wizard = AnswerStateMachine::new(request_id, lang_and_tools(), submitter.clone());

    assert!(wizard.select_option("A"));
    assert!(wizard.next());
    assert!(wizard.select_option("X"));
    assert!(wizard.select_option("Y"));
    assert!(wizard.select_other());
    assert!(wizard.set_other_text("Z"));

    let answers = wizard.submit().expect("answers");
    let expected: AnswerSet = [("Lang", "A"), ("Tools", "X, Y, Z")].into_iter().collect();
    assert_eq!(answers, expected);
    assert_eq!(wizard.state(), WizardState::Submitted);
    assert_eq!(submitter.answers(), vec![(request_id, expected)]);
    assert!(submitter.cancels().is_empty());
}

/// "Other" is appended last even when it was picked first.
#[test]
fn other_value_goes_last_regardless_of_order() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let mut wizard = AnswerStateMachine::new(
        Uuid::new_v4(),
        batch(vec![multi_select("Tools", &["X", "Y"])]),
        submitter,
    );
    wizard.select_other();
    wizard.set_other_text("Z");
    wizard.select_option("X");
    wizard.select_other();

    let answers = wizard.submit().expect("answers");
    assert_eq!(answers.get("Tools"), Some("X, Z"));
}

/// Whitespace-only other text blocks progress; padded text is trimmed.
#[test]
fn other_text_trim_policy() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let mut wizard = AnswerStateMachine::new(
        Uuid::new_v4(),
        batch(vec![multi_select("Tools", &["X", "Y"])]),
        submitter.clone(),
    );
    wizard.select_other();
    wizard.set_other_text("  ");
    assert!(!wizard.can_advance());
    assert!(wizard.submit().is_none());
    assert!(submitter.answers().is_empty());

    wizard.set_other_text(" x ");
    assert!(wizard.can_advance());
    let answers = wizard.submit().expect("answers");
    assert_eq!(answers.get("Tools"), Some("x"));
}

/// Empty selection never advances.
#[test]
fn empty_selection_blocks_progress() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let mut wizard = AnswerStateMachine::new(Uuid::new_v4(), lang_and_tools(), submitter);
    wizard.select_option("A");
    wizard.select_other();
    wizard.select_option("A");
    assert!(wizard.can_advance());
    wizard.next();
    wizard.select_option("X");
    wizard.select_option("X");
    assert!(!wizard.can_advance());
    assert!(wizard.submit().is_none());
    assert_eq!(wizard.state(), WizardState::Step(1));
}

/// Cancel forwards to the submitter and discards step data.
#[test]
fn cancel_forwards_and_discards() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let request_id = Uuid::new_v4();
    let mut wizard = AnswerStateMachine::new(request_id, lang_and_tools(), submitter.clone());
    wizard.select_option("B");
    wizard.next();

    assert!(wizard.cancel());
    assert_eq!(wizard.state(), WizardState::Cancelled);
    assert!(wizard.step(0).is_none());
    assert_eq!(submitter.cancels(), vec![request_id]);
}

/// A late submit still finishes the wizard locally.
#[test]
fn late_submit_still_terminates() {
    let submitter = Arc::new(RecordingSubmitter::rejecting());
    let mut wizard = AnswerStateMachine::new(
        Uuid::new_v4(),
        batch(vec![single_select("Lang", &["A", "B"])]),
        submitter.clone(),
    );
    wizard.select_option("A");
    assert!(wizard.submit().is_some());
    assert!(wizard.is_terminal());
    assert_eq!(submitter.answers().len(), 1);
}

/// Typed commands drive the same transitions.
#[test]
fn commands_drive_the_machine() {
    let submitter = Arc::new(RecordingSubmitter::new());
    let mut wizard = AnswerStateMachine::new(Uuid::new_v4(), lang_and_tools(), submitter.clone());

    let results: Vec<bool> = ["n", "2", "n", "1", "o", "t  Z ", "9"]
        .into_iter()
        .map(|line| {
            WizardCommand::parse(line)
                .expect("command")
                .apply(&mut wizard)
        })
        .collect();
    assert_eq!(results, vec![false, true, true, true, true, true, false]);
    assert_eq!(wizard.current_index(), Some(1));
    assert!(WizardCommand::Submit.apply(&mut wizard));

    let (_, answers) = submitter.answers().pop().expect("answers");
    assert_eq!(answers.get("Lang"), Some("B"));
    assert_eq!(answers.get("Tools"), Some("X, Z"));
}
