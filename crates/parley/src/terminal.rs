//! Line-based front-end that answers delivered questions from typed commands.

use log::{debug, info};
use parley_protocol::{AnswerSubmitter, OTHER_LABEL, QuestionRequest};
use parley_wizard::{AnswerStateMachine, WizardCommand};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

const HELP: &str =
    "commands: <n> pick option, o other, t <text> other text, n next, b back, s submit, q cancel";

/// Render the current step of a wizard. Empty once the wizard has finished.
pub fn render(machine: &AnswerStateMachine) -> String {
    let (Some(index), Some(question)) = (machine.current_index(), machine.current_question())
    else {
        return String::new();
    };
    let step = machine.current_step();
    let (open, close) = if question.multi_select {
        ('[', ']')
    } else {
        ('(', ')')
    };
    let mark = |picked: bool| if picked { 'x' } else { ' ' };

    let mut out = format!(
        "[{}/{}] {}{}\n{}\n",
        index + 1,
        machine.batch().len(),
        question.header,
        if question.multi_select {
            " (pick any)"
        } else {
            ""
        },
        question.prompt
    );
    for (position, option) in question.options.iter().enumerate() {
        let picked = step.is_some_and(|step| step.is_selected(&option.label));
        out.push_str(&format!(
            "  {}. {open}{}{close} {}",
            position + 1,
            mark(picked),
            option.label
        ));
        if !option.description.is_empty() {
            out.push_str(&format!(" - {}", option.description));
        }
        out.push('\n');
    }
    let other = step.is_some_and(|step| step.has_other());
    out.push_str(&format!("  o. {open}{}{close} {OTHER_LABEL}", mark(other)));
    if let Some(text) = step.map(|step| step.other_text()).filter(|text| !text.is_empty()) {
        out.push_str(&format!(": {text}"));
    }
    out.push('\n');
    out.push_str(HELP);
    out.push('\n');
    out
}

/// Drive one wizard per delivered request until `requests` closes.
///
/// Running out of input cancels the wizard that is open at the time.
pub async fn answer_requests<W: Write>(
    mut requests: UnboundedReceiver<QuestionRequest>,
    mut lines: UnboundedReceiver<String>,
    submitter: Arc<dyn AnswerSubmitter>,
    delimiter: &str,
    out: &mut W,
) -> io::Result<()> {
    while let Some(request) = requests.recv().await {
        info!(
            "presenting questions (request_id={}, questions={})",
            request.request_id,
            request.batch.len()
        );
        let mut wizard = AnswerStateMachine::from_request(request, Arc::clone(&submitter))
            .with_delimiter(delimiter);
        write!(out, "{}", render(&wizard))?;
        out.flush()?;

        while !wizard.is_terminal() {
            let Some(line) = lines.recv().await else {
                debug!("input closed, cancelling (request_id={})", wizard.request_id());
                wizard.cancel();
                break;
            };
            match WizardCommand::parse(&line) {
                Some(command) => {
                    if !command.apply(&mut wizard) {
                        writeln!(out, "not allowed: {}", line.trim())?;
                    }
                }
                None => writeln!(out, "unknown command: {}", line.trim())?,
            }
            write!(out, "{}", render(&wizard))?;
            out.flush()?;
        }
    }
    Ok(())
}
