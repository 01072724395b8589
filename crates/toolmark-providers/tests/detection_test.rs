use serde_json::{Value, json};
use toolmark_providers::{Error, ImporterRegistry};
use toolmark_types::{MessageRole, RawDocument, SourceFormat, ToolCall};

fn doc(value: Value) -> RawDocument {
    value.as_object().cloned().expect("test document must be an object")
}

#[test]
fn test_openai_shape_scores_full_confidence() {
    let registry = ImporterRegistry::new();
    let doc = doc(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o",
        "messages": [
            {"role": "user", "content": "hello"},
            {"role": "assistant", "content": "hi"}
        ]
    }));

    let detection = registry.detect_format(&doc).unwrap();
    assert_eq!(detection.format(), SourceFormat::OpenAi);
    assert_eq!(detection.confidence, 1.0);
}

#[test]
fn test_custom_trace_shape_scores_full_confidence() {
    let registry = ImporterRegistry::new();
    let doc = doc(json!({
        "trace_id": "t-1",
        "conversation_turns": [],
        "agent_config": {"model_name": "m"}
    }));

    let detection = registry.detect_format(&doc).unwrap();
    assert_eq!(detection.format(), SourceFormat::Custom);
    assert_eq!(detection.confidence, 1.0);
}

#[test]
fn test_empty_document_is_unrecognized() {
    let registry = ImporterRegistry::new();
    let err = registry.detect_format(&RawDocument::new()).unwrap_err();

    match err {
        Error::UnrecognizedFormat { supported } => {
            assert_eq!(supported, SourceFormat::ALL.to_vec());
        }
        other => panic!("expected UnrecognizedFormat, got {other:?}"),
    }
}

#[test]
fn test_below_threshold_is_unrecognized() {
    let registry = ImporterRegistry::new();
    // Anthropic 0.3, custom 0.4
    let doc = doc(json!({"model": "claude-3-haiku", "trace_id": "t"}));
    assert!(matches!(
        registry.detect_format(&doc),
        Err(Error::UnrecognizedFormat { .. })
    ));
}

#[test]
fn test_tie_resolves_to_openai() {
    let registry = ImporterRegistry::new();
    let doc = doc(json!({
        "created_at": "2024-06-01T00:00:00Z",
        "model": "claude-3-opus",
        "messages": [{"role": "user", "content": "hi"}]
    }));

    let scores = registry.probe_all(&doc);
    assert_eq!(
        scores,
        vec![
            (SourceFormat::OpenAi, 1.0),
            (SourceFormat::Anthropic, 1.0),
            (SourceFormat::Custom, 0.0),
        ]
    );
    assert_eq!(
        registry.detect_format(&doc).unwrap().format(),
        SourceFormat::OpenAi
    );
}

#[test]
fn test_anthropic_wins_when_messages_empty() {
    let registry = ImporterRegistry::new();
    let doc = doc(json!({
        "id": "sess",
        "created_at": "2024-06-01T00:00:00Z",
        "model": "claude-3-opus",
        "messages": []
    }));

    let detection = registry.detect_format(&doc).unwrap();
    assert_eq!(detection.format(), SourceFormat::Anthropic);

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.source_format(), Some("anthropic"));
    assert_eq!(session.created_at, "2024-06-01T00:00:00Z");
}

#[test]
fn test_custom_trace_example_conversion() {
    let registry = ImporterRegistry::new();
    let doc = doc(json!({
        "trace_id": "t-5",
        "conversation_turns": [
            {"speaker_type": "user", "text": "hi"},
            {
                "speaker_type": "assistant",
                "text": "ok",
                "actions": [{"action_id": "a1", "tool_name": "search", "tool_input": {"q": "x"}}]
            }
        ]
    }));

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].role, MessageRole::User);
    assert_eq!(session.messages[0].content, "hi");
    assert!(session.messages[0].tool_calls.is_none());
    assert_eq!(session.messages[1].role, MessageRole::Assistant);
    assert_eq!(session.messages[1].content, "ok");
    assert_eq!(
        session.messages[1].tool_calls.as_deref(),
        Some(&[ToolCall::function("a1", "search", "{\"q\": \"x\"}")][..])
    );
}

#[test]
fn test_unknown_speaker_types_are_dropped() {
    let registry = ImporterRegistry::new();
    let doc = doc(json!({
        "trace_id": "t-6",
        "conversation_turns": [
            {"speaker_type": "narrator", "text": "meanwhile"},
            {"speaker_type": "user", "text": "go"},
            {"speaker_type": "SYSTEM", "text": "ignored"}
        ]
    }));

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].content, "go");
}

#[test]
fn test_transform_is_deterministic() {
    let registry = ImporterRegistry::new();
    let docs = [
        doc(json!({"messages": [{"role": "user", "content": "a"}]})),
        doc(json!({"trace_id": "t", "conversation_turns": [{"speaker_type": "user", "text": "b"}]})),
    ];

    for doc in &docs {
        let first = registry.import_document(doc).unwrap();
        let second = registry.import_document(doc).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.created_at, "");
    }
}

#[test]
fn test_mismatched_shape_fails_without_partial_result() {
    let registry = ImporterRegistry::new();
    // Scores 0.5 for OpenAI on the key alone, but messages is not an array
    let doc = doc(json!({"messages": {"role": "user"}}));

    let err = registry.import_document(&doc).unwrap_err();
    assert!(matches!(
        err,
        Error::StructuralMismatch {
            format: SourceFormat::OpenAi,
            ..
        }
    ));
}

#[test]
fn test_import_bytes_rejects_invalid_json() {
    let registry = ImporterRegistry::new();
    let err = registry.import_bytes(b"not json", 1024).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

fn trace_with_turns(turns: Value) -> RawDocument {
    doc(json!({
        "trace_id": "t-7",
        "agent_config": {"model_name": "m"},
        "conversation_turns": turns
    }))
}

#[test]
fn test_non_string_speaker_type_is_dropped() {
    let registry = ImporterRegistry::new();
    let doc = trace_with_turns(json!([
        {"speaker_type": 7},
        {"speaker_type": "user", "text": "hi"}
    ]));

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].content, "hi");
}

#[test]
fn test_unknown_speaker_with_non_string_text_is_dropped() {
    let registry = ImporterRegistry::new();
    let doc = trace_with_turns(json!([
        {"speaker_type": "narrator", "text": {"a": 1}},
        {"speaker_type": "user", "text": "hi"}
    ]));

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.messages.len(), 1);
}

#[test]
fn test_unknown_speaker_with_partial_action_is_dropped() {
    let registry = ImporterRegistry::new();
    let doc = trace_with_turns(json!([
        {
            "speaker_type": "planner",
            "text": "thinking",
            "actions": [{"action_id": "a1", "tool_input": {}}]
        },
        {"speaker_type": "user", "text": "hi"}
    ]));

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].role, MessageRole::User);
}

#[test]
fn test_user_turn_with_malformed_actions_imports() {
    let registry = ImporterRegistry::new();
    let doc = trace_with_turns(json!([
        {"speaker_type": "user", "text": "hi", "actions": "not a list"}
    ]));

    let session = registry.import_document(&doc).unwrap();
    assert_eq!(session.messages.len(), 1);
    assert!(session.messages[0].tool_calls.is_none());
}

#[test]
fn test_import_bytes_reports_detection() {
    let registry = ImporterRegistry::new();
    let body = br#"{"trace_id": "t", "conversation_turns": [{"speaker_type": "user", "text": "hi"}]}"#;

    let (session, detection) = registry.import_bytes(body, 1024).unwrap();
    assert_eq!(detection.format(), SourceFormat::Custom);
    assert_eq!(detection.confidence, 0.8);
    assert_eq!(session.session_id, "t");
}
