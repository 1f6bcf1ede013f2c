//! Integration tests that call a running generation service.
//!
//! The service address comes from TOUIE_API_URL (via .env file or
//! environment), falling back to the local default.
//! Run with: `cargo test -p touie-core --test live_service -- --ignored`
//!
//! These are marked #[ignore] by default because the service runs local
//! models and takes seconds to minutes per request.

use touie_core::{
    Category, GenerationResult, HistoryLog, HttpBackend, LoadPolicy, MemoryStore, Studio,
    StudioConfig,
};

fn setup() -> StudioConfig {
    let _ = dotenvy::dotenv();
    StudioConfig::from_env().expect("Invalid TOUIE_* configuration")
}

async fn service_is_up(config: &StudioConfig) -> bool {
    match config.client() {
        Ok(client) => client.service_info().await.is_ok(),
        Err(_) => false,
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -p touie-core --test live_service -- --ignored
async fn test_live_text_story() {
    let config = setup();
    if !service_is_up(&config).await {
        eprintln!("Skipping test: no service at {}", config.api_url);
        return;
    }

    let backend = HttpBackend::new(config.client().unwrap());
    let history = HistoryLog::load(MemoryStore::new(), LoadPolicy::Strict).unwrap();
    let mut studio = Studio::new(backend, history).with_story_options(config.story.clone());

    let generation = studio
        .generate(Category::Text, "Un niño va al parque con su perro")
        .await
        .expect("Service should write a story");

    match generation.result {
        GenerationResult::Text(story) => assert!(!story.text.trim().is_empty()),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(studio.history().len(Category::Text), 1);
}

#[tokio::test]
#[ignore]
async fn test_live_pictograms_decode() {
    let config = setup();
    if !service_is_up(&config).await {
        eprintln!("Skipping test: no service at {}", config.api_url);
        return;
    }

    let backend = HttpBackend::new(config.client().unwrap());
    let history = HistoryLog::load(MemoryStore::new(), LoadPolicy::Strict).unwrap();
    let mut studio = Studio::new(backend, history);

    let generation = studio
        .generate(Category::Pictogram, "Una niña come una manzana")
        .await
        .expect("Service should illustrate a story");

    let GenerationResult::Pictograms(story) = generation.result else {
        panic!("expected pictograms");
    };
    for item in &story.pictograms.items {
        let image = item.decode_image().expect("Pictogram image should decode");
        assert!(!image.bytes.is_empty());
    }
}
