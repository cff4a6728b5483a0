//! Data model unit tests

use magic_client::models::*;
use serde_json::{json, Map};

#[test]
fn test_generate_request_full_serialization() {
    let mut parameters = Map::new();
    parameters.insert("temperature".to_string(), json!(0.5));

    let mut specs = Specs::with_returns("title");
    specs.extra.insert("tone".to_string(), json!("formal"));

    let request = GenerateRequest {
        returns: Returns::from(vec!["title", "tags"]),
        input: json!({"article": "..."}),
        openai_key: Some("sk-test".to_string()),
        specs: Some(specs),
        examples: Some(vec![json!({"article": "a", "title": "b", "tags": ["c"]})]),
        parameters,
        optional_returns: Some(OptionalReturns::Fields(vec!["tags".to_string()])),
        retries: 0,
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "returns": ["title", "tags"],
            "input": {"article": "..."},
            "openaiKey": "sk-test",
            "specs": {"returns": "title", "tone": "formal"},
            "examples": [{"article": "a", "title": "b", "tags": ["c"]}],
            "parameters": {"temperature": 0.5},
            "optionalReturns": ["tags"],
            "retries": 0
        })
    );
}

#[test]
fn test_generate_request_deserialization() {
    let request: GenerateRequest = serde_json::from_value(json!({
        "returns": {"title": "Headline", "tags": {"description": "Keywords", "optional": true}},
        "input": {},
        "optionalReturns": true,
        "retries": 2
    }))
    .unwrap();

    assert_eq!(request.returns.field_names(), vec!["tags", "title"]);
    assert!(request.returns.single_field().is_none());
    assert_eq!(request.optional_returns, Some(OptionalReturns::All));
    assert!(request.parameters.is_empty());
    assert!(request.openai_key.is_none());
}

#[test]
fn test_described_return_variants() {
    let text: ReturnDescription = serde_json::from_value(json!("Headline")).unwrap();
    assert_eq!(text.description(), "Headline");
    assert!(!text.is_optional());

    let detailed: ReturnDescription = serde_json::from_value(json!({"description": "Keywords"})).unwrap();
    assert_eq!(detailed.description(), "Keywords");
    assert!(!detailed.is_optional());
}

#[test]
fn test_run_request_serialization() {
    let request = RunRequest {
        database_id: Some("templates".to_string()),
        slug: "tweet".to_string(),
        openai_key: None,
        variables: json!({"topic": "rust"}),
        parameters: Map::new(),
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "databaseId": "templates",
            "slug": "tweet",
            "variables": {"topic": "rust"},
            "parameters": {}
        })
    );
}

#[test]
fn test_upvote_request_serialization() {
    let request = UpvoteRequest {
        database_id: None,
        generation_id: "gen-1".to_string(),
    };

    assert_eq!(serde_json::to_value(&request).unwrap(), json!({"generationId": "gen-1"}));
}

#[test]
fn test_meta_deserialization() {
    let meta: Meta = serde_json::from_value(json!({"approximateCost": 0.002, "tokenCount": 17})).unwrap();
    assert_eq!(meta.approximate_cost, 0.002);
    assert_eq!(meta.token_count, 17);

    let meta: Meta = serde_json::from_value(json!({})).unwrap();
    assert_eq!(meta, Meta::default());
}

#[test]
fn test_meta_from_object_ignores_malformed_numbers() {
    let object = json!({"approximateCost": "free", "tokenCount": -1});
    let meta = Meta::from_object(object.as_object().unwrap());
    assert_eq!(meta, Meta::default());
}
