//! Line-oriented commands for driving the wizard from a terminal.

use crate::machine::AnswerStateMachine;

/// A single user action typed at the wizard prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    /// Pick the option at this 1-based position.
    Select(usize),
    /// Pick or toggle "other".
    Other,
    /// Set the "other" free text.
    Text(String),
    Next,
    Back,
    Submit,
    Cancel,
}

impl WizardCommand {
    /// Parse a typed line. Returns `None` for anything unrecognised.
    ///
    /// `3` selects option three, `o` toggles other, `t some text` sets the
    /// other text, and `n`/`b`/`s`/`q` move next, back, submit, or cancel.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_start();
        if let Some(text) = line.strip_prefix("t ") {
            return Some(WizardCommand::Text(text.trim_end_matches(['\r', '\n']).to_string()));
        }
        match line.trim_end() {
            "o" | "other" => Some(WizardCommand::Other),
            "n" | "next" => Some(WizardCommand::Next),
            "b" | "back" => Some(WizardCommand::Back),
            "s" | "submit" => Some(WizardCommand::Submit),
            "q" | "cancel" => Some(WizardCommand::Cancel),
            "t" => Some(WizardCommand::Text(String::new())),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|position| *position > 0)
                .map(WizardCommand::Select),
        }
    }

    /// Apply the command. Returns whether the machine accepted it.
    pub fn apply(self, machine: &mut AnswerStateMachine) -> bool {
        match self {
            WizardCommand::Select(position) => {
                let Some(label) = machine
                    .current_question()
                    .zip(position.checked_sub(1))
                    .and_then(|(question, index)| question.options.get(index))
                    .map(|option| option.label.clone())
                else {
                    return false;
                };
                machine.select_option(&label)
            }
            WizardCommand::Other => machine.select_other(),
            WizardCommand::Text(text) => machine.set_other_text(text),
            WizardCommand::Next => machine.next(),
            WizardCommand::Back => machine.back(),
            WizardCommand::Submit => machine.submit().is_some(),
            WizardCommand::Cancel => machine.cancel(),
        }
    }
}
