//! Endpoint tests against a local mock of the generation service.

use httpmock::prelude::*;
use serde_json::json;
use touie_api::{Client, Error, StoryRequest, Tone, VoiceRequest};

fn client_for(server: &MockServer) -> Client {
    Client::new(server.base_url()).expect("mock server URL should be valid")
}

#[tokio::test]
async fn text_story_is_parsed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/text/generate")
                .header("content-type", "application/json")
                .json_body_partial(r#"{"prompt": "un perro", "tone": "calmo", "sensory_friendly": true}"#);
            then.status(200).json_body(json!({
                "text": "Había una vez un perro tranquilo.",
                "metadata": { "tone": "calmo", "complexity": "simple" }
            }));
        })
        .await;

    let story = client_for(&server)
        .generate_text(&StoryRequest::new("un perro"))
        .await
        .expect("text generation should succeed");

    mock.assert_async().await;
    assert_eq!(story.text, "Había una vez un perro tranquilo.");
    assert_eq!(story.metadata["complexity"], "simple");
}

#[tokio::test]
async fn voice_clip_is_parsed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/voice/generate")
                .json_body(json!({ "text": "hola", "language": "es", "voice_speed": 1.0 }));
            then.status(200).json_body(json!({
                "audio_path": "resources/audio/output/story_1.wav",
                "duration": 3.25,
                "voice_used": "ana.wav"
            }));
        })
        .await;

    let clip = client_for(&server)
        .generate_voice(&VoiceRequest::new("hola"))
        .await
        .expect("voice generation should succeed");

    mock.assert_async().await;
    assert_eq!(clip.audio_path, "resources/audio/output/story_1.wav");
    assert_eq!(clip.duration, Some(3.25));
    assert_eq!(clip.voice_used.as_deref(), Some("ana.wav"));
}

#[tokio::test]
async fn pictogram_story_is_parsed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/pictogram/from_prompt")
                .json_body_partial(r#"{"tone": "neutral"}"#);
            then.status(200).json_body(json!({
                "story": "Luna juega. Luna duerme.",
                "pictograms": {
                    "paragraph": "Luna juega. Luna duerme.",
                    "items": [
                        { "id": 1, "sentence": "Luna juega", "keywords": ["Luna", "juega"], "image": "data:image/png;base64,AAAA" },
                        { "id": 2, "sentence": "Luna duerme", "label": "dormir", "image": "data:image/png;base64,AAAA" }
                    ]
                }
            }));
        })
        .await;

    let story = client_for(&server)
        .generate_pictograms(&StoryRequest::new("Luna").with_tone(Tone::Neutral))
        .await
        .expect("pictogram generation should succeed");

    assert_eq!(story.story, "Luna juega. Luna duerme.");
    assert_eq!(story.pictograms.items.len(), 2);
    assert_eq!(story.pictograms.items[0].keywords, vec!["Luna", "juega"]);
    assert_eq!(story.pictograms.items[1].caption(), Some("dormir"));
}

#[tokio::test]
async fn pictograms_from_text_unwraps_payload() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/pictogram/generate")
                .json_body(json!({ "text": "El sol sale." }));
            then.status(200).json_body(json!({
                "pictogram_data": {
                    "paragraph": "El sol sale.",
                    "items": [{ "id": 1, "sentence": "El sol sale", "concept": "sol", "image": "AAAA" }]
                }
            }));
        })
        .await;

    let set = client_for(&server)
        .pictograms_from_text("El sol sale.")
        .await
        .expect("pictograms should be returned");

    assert_eq!(set.paragraph, "El sol sale.");
    assert_eq!(set.items[0].caption(), Some("sol"));
}

#[tokio::test]
async fn service_info_is_parsed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).json_body(json!({
                "message": "Cuentista para Autistas API",
                "version": "0.1.0",
                "endpoints": { "text": "/text/generate" }
            }));
        })
        .await;

    let info = client_for(&server).service_info().await.unwrap();
    assert_eq!(info.version, "0.1.0");
    assert_eq!(info.endpoints["text"], "/text/generate");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/text/generate");
            then.status(500).body("model not loaded");
        })
        .await;

    let err = client_for(&server)
        .generate_text(&StoryRequest::new("un perro"))
        .await
        .expect_err("a 500 must fail");

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("model not loaded"));
}

#[tokio::test]
async fn missing_required_field_fails_closed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/voice/generate");
            then.status(200).json_body(json!({ "duration": 1.0 }));
        })
        .await;

    let err = client_for(&server)
        .generate_voice(&VoiceRequest::new("hola"))
        .await
        .expect_err("a response without audio_path must fail");

    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_pictogram_items_fail_closed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/pictogram/from_prompt");
            then.status(200)
                .json_body(json!({ "story": "Una historia", "pictograms": {} }));
        })
        .await;

    let err = client_for(&server)
        .generate_pictograms(&StoryRequest::new("algo"))
        .await
        .expect_err("pictograms without items must fail");

    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn invalid_requests_never_reach_the_service() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({ "text": "unused" }));
        })
        .await;

    let client = client_for(&server);
    let err = client
        .generate_text(&StoryRequest::new("un perro").with_max_tokens(5000))
        .await
        .expect_err("max_tokens out of range must be rejected");
    assert!(matches!(err, Error::InvalidRequest(_)));

    let err = client
        .generate_voice(&VoiceRequest::new("  "))
        .await
        .expect_err("blank narration text must be rejected");
    assert!(matches!(err, Error::InvalidRequest(_)));

    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Port 9 (discard) is not expected to have an HTTP listener.
    let client = Client::new("http://127.0.0.1:9").unwrap();
    let err = client
        .generate_text(&StoryRequest::new("un perro"))
        .await
        .expect_err("nothing listens there");

    assert!(matches!(err, Error::Network(_)));
}
