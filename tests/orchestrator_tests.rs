mod common;

use common::{sql_tools, FailingConnector, MockClient, MockConnector, MockSession};
use sqlbridge::orchestrator::{BridgeError, Orchestrator};

#[tokio::test]
async fn answers_directly_when_no_tools_are_available() {
    let client = MockClient::new(vec!["Paris is the capital of France."]);
    let prompts = client.prompts.clone();
    let session = MockSession::new(vec![], Ok(String::new()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("capital of France?").await.unwrap();

    assert_eq!(answer, "Paris is the capital of France.");
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], "capital of France?");
}

#[tokio::test]
async fn text_decision_becomes_the_answer() {
    let client = MockClient::new(vec![r#"{"type":"text","text":"Just ask me directly."}"#]);
    let prompts = client.prompts.clone();
    let session = MockSession::new(sql_tools(), Ok(String::new()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("hello").await.unwrap();

    assert_eq!(answer, "Just ask me directly.");
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("User request: \"hello\""));
    assert!(prompts[0].contains("1. \"execute-sql\""));
}

#[tokio::test]
async fn tool_decision_executes_and_narrates() {
    let client = MockClient::new(vec![
        r#"{"type":"tool_use","name":"execute-sql","id":"tool-1","input":{"query":"SELECT count(*) FROM users"}}"#,
        "There are 42 users.",
    ]);
    let prompts = client.prompts.clone();
    let session = MockSession::new(sql_tools(), Ok("1 rows:\ncount\n42".to_string()));
    let calls = session.calls.clone();
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("how many users?").await.unwrap();

    assert_eq!(answer, "There are 42 users.");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "execute-sql");
    assert_eq!(calls[0].1["query"], "SELECT count(*) FROM users");

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Tool \"execute-sql\" (ID: tool-1)"));
    assert!(prompts[1].contains("Tool result:\n1 rows:"));
}

#[tokio::test]
async fn fenced_decision_behaves_like_unfenced() {
    let client = MockClient::new(vec![
        "```json\n{\"type\":\"tool_use\",\"name\":\"list-tables\",\"id\":\"tool-2\",\"input\":{}}\n```",
        "The database has two tables.",
    ]);
    let session = MockSession::new(sql_tools(), Ok("Available tables (2):\n- a\n- b".to_string()));
    let calls = session.calls.clone();
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("list the tables").await.unwrap();

    assert_eq!(answer, "The database has two tables.");
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_decision_id_gets_a_generated_one() {
    let client = MockClient::new(vec![
        r#"{"type":"tool_use","name":"list-tables"}"#,
        "Done.",
    ]);
    let prompts = client.prompts.clone();
    let session = MockSession::new(sql_tools(), Ok("Available tables (0):\n".to_string()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    orchestrator.chat("list the tables").await.unwrap();

    let prompts = prompts.lock().unwrap();
    assert!(prompts[1].contains("(ID: tool-"));
}

#[tokio::test]
async fn unknown_tool_falls_back_to_general_conversation() {
    let client = MockClient::new(vec![
        r#"{"type":"tool_use","name":"drop-database","input":{}}"#,
        "I cannot do that, but here is what I know.",
    ]);
    let prompts = client.prompts.clone();
    let session = MockSession::new(sql_tools(), Ok(String::new()));
    let calls = session.calls.clone();
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("drop everything").await.unwrap();

    assert_eq!(answer, "I cannot do that, but here is what I know.");
    assert!(calls.lock().unwrap().is_empty());

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].starts_with("drop everything\n\nAvailable tools if needed:"));
}

#[tokio::test]
async fn non_json_reply_falls_back_to_general_conversation() {
    let client = MockClient::new(vec![
        "I think the SQL tool would help here.",
        "Here is a direct answer instead.",
    ]);
    let prompts = client.prompts.clone();
    let session = MockSession::new(sql_tools(), Ok(String::new()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("hello").await.unwrap();

    assert_eq!(answer, "Here is a direct answer instead.");
    let prompts = prompts.lock().unwrap();
    assert!(prompts[1].contains("Available tools if needed:\n- execute-sql:"));
}

#[tokio::test]
async fn unrecognized_json_shape_is_returned_verbatim() {
    let client = MockClient::new(vec![r#"{"verdict":"unsure"}"#]);
    let session = MockSession::new(sql_tools(), Ok(String::new()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let answer = orchestrator.chat("hello").await.unwrap();

    assert_eq!(answer, r#"{"verdict":"unsure"}"#);
}

#[tokio::test]
async fn connector_failure_surfaces_as_transport_error() {
    let client = MockClient::new(vec![]);
    let orchestrator = Orchestrator::new(client, Box::new(FailingConnector));

    let error = orchestrator.chat("hello").await.unwrap_err();

    match error {
        BridgeError::Transport(message) => assert!(message.contains("connection refused")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn tool_call_failure_surfaces_as_transport_error() {
    let client = MockClient::new(vec![
        r#"{"type":"tool_use","name":"execute-sql","id":"tool-3","input":{"query":"SELECT 1"}}"#,
    ]);
    let session = MockSession::new(sql_tools(), Err("broken pipe".to_string()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let error = orchestrator.chat("run it").await.unwrap_err();

    match error {
        BridgeError::Transport(message) => assert!(message.contains("broken pipe")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn tools_snapshot_matches_the_session() {
    let client = MockClient::new(vec![]);
    let session = MockSession::new(sql_tools(), Ok(String::new()));
    let orchestrator = Orchestrator::new(client, Box::new(MockConnector::new(session)));

    let tools = orchestrator.tools().await.unwrap();

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "execute-sql");
    assert_eq!(tools[1].name, "list-tables");
}
