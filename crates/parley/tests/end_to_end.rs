use parley::core::{AskUserQuestionTool, QueueChannel, QuestionCoordinator, Tool, ToolContext};
use parley::protocol::{AnswerSet, AnswerSubmitter, AskError};
use parley::terminal;
use parley_test_utils::{batch, multi_select, single_select};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

fn typed(lines: &[&str]) -> mpsc::UnboundedReceiver<String> {
    let (sender, receiver) = mpsc::unbounded_channel();
    for line in lines {
        sender.send(line.to_string()).expect("send line");
    }
    receiver
}

#[tokio::test]
async fn typed_commands_answer_the_asking_agent() {
    let coordinator = Arc::new(QuestionCoordinator::new());
    let session = Uuid::new_v4();
    let (channel, requests) = QueueChannel::new(session);
    coordinator.register_channel(session, Arc::new(channel));

    let submitter: Arc<dyn AnswerSubmitter> = coordinator.clone();
    let frontend = tokio::spawn(async move {
        let mut out = Vec::new();
        let lines = typed(&["1", "s", "n", "1", "2", "o", "t Z", "s"]);
        terminal::answer_requests(requests, lines, submitter, ", ", &mut out)
            .await
            .expect("write");
        String::from_utf8(out).expect("utf8")
    });

    let answers = coordinator
        .ask(
            batch(vec![
                single_select("Lang", &["A", "B"]),
                multi_select("Tools", &["X", "Y"]),
            ]),
            session,
        )
        .await
        .expect("answers");
    let expected: AnswerSet = [("Lang", "A"), ("Tools", "X, Y, Z")].into_iter().collect();
    assert_eq!(answers, expected);
    assert_eq!(coordinator.pending_count(), 0);

    coordinator.unregister_channel(session);
    drop(coordinator);
    let transcript = frontend.await.expect("join");
    assert!(transcript.contains("[1/2] Lang"));
    assert!(transcript.contains("not allowed: s"));
    assert!(transcript.contains("[2/2] Tools (pick any)"));
}

#[tokio::test]
async fn closed_input_cancels_the_request() {
    let coordinator = Arc::new(QuestionCoordinator::new());
    let session = Uuid::new_v4();
    let (channel, requests) = QueueChannel::new(session);
    coordinator.register_channel(session, Arc::new(channel));

    let submitter: Arc<dyn AnswerSubmitter> = coordinator.clone();
    tokio::spawn(async move {
        let mut out = Vec::new();
        terminal::answer_requests(requests, typed(&["2"]), submitter, ", ", &mut out).await
    });

    let err = coordinator
        .ask(batch(vec![single_select("Lang", &["A", "B"])]), session)
        .await
        .expect_err("cancelled");
    assert_eq!(err, AskError::Cancelled);
    assert_eq!(coordinator.pending_count(), 0);
}

#[tokio::test]
async fn tool_call_round_trips_through_the_terminal() {
    let coordinator = Arc::new(QuestionCoordinator::new());
    let session = Uuid::new_v4();
    let (channel, requests) = QueueChannel::new(session);
    coordinator.register_channel(session, Arc::new(channel));

    let submitter: Arc<dyn AnswerSubmitter> = coordinator.clone();
    tokio::spawn(async move {
        let mut out = Vec::new();
        terminal::answer_requests(requests, typed(&["o", "t  Zig ", "s"]), submitter, ", ", &mut out)
            .await
    });

    let ctx = ToolContext {
        session_id: session,
        agent_id: "agent".to_string(),
        questions: Arc::clone(&coordinator),
    };
    let result = AskUserQuestionTool
        .call(
            &ctx,
            json!({
                "questions": [{
                    "question": "Which language?",
                    "header": "Lang",
                    "options": [
                        { "label": "Rust", "description": "Systems" },
                        { "label": "Go", "description": "Services" }
                    ]
                }]
            }),
        )
        .await
        .expect("result");
    assert_eq!(result["answers"], json!({ "Lang": "Zig" }));
    assert_eq!(result["summary"], "Lang: Zig");
}
