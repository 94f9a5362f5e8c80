use parley_protocol::{Question, QuestionBatch, QuestionOption};

pub fn single_select(header: &str, labels: &[&str]) -> Question {
    question(header, labels, false)
}

pub fn multi_select(header: &str, labels: &[&str]) -> Question {
    question(header, labels, true)
}

/// Build a batch that passes default validation.
pub fn batch(questions: Vec<Question>) -> QuestionBatch {
    QuestionBatch::new(questions).expect("test batch should be valid")
}

fn question(header: &str, labels: &[&str], multi_select: bool) -> Question {
    Question {
        prompt: format!("Which {header}?"),
        header: header.to_string(),
        options: labels
            .iter()
            .map(|label| QuestionOption::new(*label, format!("Use {label}")))
            .collect(),
        multi_select,
    }
}
