//! Where stories come from.
//!
//! [`HttpBackend`] talks to the generation service. [`SimulatedBackend`]
//! answers locally with canned content, for demos and for working without
//! the service running.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use touie_api::{
    Client, PictogramItem, PictogramSet, PictogramStory, StoryRequest, TextStory, VoiceClip,
    VoiceRequest,
};
use tracing::debug;

/// A source of generated stories, narrations and pictograms.
#[async_trait]
pub trait StoryBackend: Send + Sync {
    /// Write a story.
    async fn story(&self, request: &StoryRequest) -> Result<TextStory, touie_api::Error>;

    /// Narrate text.
    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceClip, touie_api::Error>;

    /// Write a story and illustrate it.
    async fn pictograms(&self, request: &StoryRequest)
        -> Result<PictogramStory, touie_api::Error>;

    /// Short name for logs and status lines.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: StoryBackend + ?Sized> StoryBackend for Box<T> {
    async fn story(&self, request: &StoryRequest) -> Result<TextStory, touie_api::Error> {
        (**self).story(request).await
    }

    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceClip, touie_api::Error> {
        (**self).voice(request).await
    }

    async fn pictograms(
        &self,
        request: &StoryRequest,
    ) -> Result<PictogramStory, touie_api::Error> {
        (**self).pictograms(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: StoryBackend + ?Sized> StoryBackend for Arc<T> {
    async fn story(&self, request: &StoryRequest) -> Result<TextStory, touie_api::Error> {
        (**self).story(request).await
    }

    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceClip, touie_api::Error> {
        (**self).voice(request).await
    }

    async fn pictograms(
        &self,
        request: &StoryRequest,
    ) -> Result<PictogramStory, touie_api::Error> {
        (**self).pictograms(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Backend that calls the generation service over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl StoryBackend for HttpBackend {
    async fn story(&self, request: &StoryRequest) -> Result<TextStory, touie_api::Error> {
        self.client.generate_text(request).await
    }

    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceClip, touie_api::Error> {
        self.client.generate_voice(request).await
    }

    async fn pictograms(
        &self,
        request: &StoryRequest,
    ) -> Result<PictogramStory, touie_api::Error> {
        self.client.generate_pictograms(request).await
    }

    fn name(&self) -> &str {
        self.client.base_url()
    }
}

/// Voices the simulated narrator pretends to use.
const SIMULATED_VOICES: &[&str] = &["ana.wav", "lucia.wav", "mateo.wav", "sofia.wav"];

const SIMULATED_STRIP: &str = "👦 ➡️ 🏠 🐶 ➡️ 🌳 🌙";

/// A plain blue circle, the pictogram the service falls back to.
const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIxOTIiIGhlaWdodD0iMTkyIj48cmVjdCB3aWR0aD0iMTkyIiBoZWlnaHQ9IjE5MiIgZmlsbD0iI2ZmZiIvPjxjaXJjbGUgY3g9Ijk2IiBjeT0iOTYiIHI9Ijc4IiBmaWxsPSIjNjRiNGZmIiBzdHJva2U9IiMyODY0YzgiIHN0cm9rZS13aWR0aD0iNCIvPjwvc3ZnPg==";

/// Offline backend returning canned content after a short pause.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    /// Pause for `delay` before every answer, like a real service would.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Answer immediately.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn once_upon_a_time(prompt: &str) -> String {
        let idea = prompt.trim().trim_end_matches('.');
        format!("Había una vez, en un lugar muy lejano, {idea}. Y todos vivieron felices para siempre.")
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl StoryBackend for SimulatedBackend {
    async fn story(&self, request: &StoryRequest) -> Result<TextStory, touie_api::Error> {
        request.validate()?;
        self.pause().await;
        debug!(prompt = %request.prompt, "simulated story");

        let metadata = [
            ("tone", request.tone.as_str()),
            ("complexity", request.complexity.as_str()),
            ("story_type", request.story_type.as_str()),
            ("simulated", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect();

        Ok(TextStory {
            text: Self::once_upon_a_time(&request.prompt),
            metadata,
        })
    }

    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceClip, touie_api::Error> {
        request.validate()?;
        self.pause().await;

        let voice = request.speaker_wav.clone().unwrap_or_else(|| {
            SIMULATED_VOICES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("ana.wav")
                .to_string()
        });
        debug!(%voice, "simulated narration");

        Ok(VoiceClip {
            audio_path: String::new(),
            duration: None,
            voice_used: Some(voice),
        })
    }

    async fn pictograms(
        &self,
        request: &StoryRequest,
    ) -> Result<PictogramStory, touie_api::Error> {
        request.validate()?;
        self.pause().await;

        let story = Self::once_upon_a_time(&request.prompt);
        let item = PictogramItem {
            id: Some(1),
            image: PLACEHOLDER_IMAGE.to_string(),
            alt: Some(format!(
                "Simulación de pictogramas basada en: \"{}\"",
                request.prompt.trim()
            )),
            label: Some(SIMULATED_STRIP.to_string()),
            concept: None,
            sentence: Some(story.clone()),
            keywords: Vec::new(),
        };

        Ok(PictogramStory {
            pictograms: PictogramSet {
                paragraph: story.clone(),
                items: vec![item],
            },
            story,
        })
    }

    fn name(&self) -> &str {
        "simulación"
    }
}
