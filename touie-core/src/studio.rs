//! Studio - the primary public API for creating stories.
//!
//! A [`Studio`] takes an idea typed by the user, asks its backend for a
//! story in the chosen format and, when that succeeds, records the idea in
//! the persistent history.

use crate::backend::StoryBackend;
use crate::history::{Category, HistoryError, HistoryLog, HistoryRecord};
use crate::store::KeyValueStore;
use chrono::{DateTime, Local};
use thiserror::Error;
use touie_api::{
    Complexity, PictogramStory, StoryRequest, StoryType, TextStory, Tone, VoiceClip,
    VoiceRequest, DEFAULT_MAX_TOKENS,
};
use tracing::{info, warn};

/// Day/month/year, the way history entries show their date.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Errors from studio operations.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("{category} generation failed: {source}")]
    Generation {
        category: Category,
        #[source]
        source: touie_api::Error,
    },

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Settings applied to every story request.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryOptions {
    pub max_tokens: u32,
    pub tone: Tone,
    pub complexity: Complexity,
    pub sensory_friendly: bool,
    pub story_type: StoryType,
    pub protagonist_name: String,
}

impl Default for StoryOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            tone: Tone::default(),
            complexity: Complexity::default(),
            sensory_friendly: true,
            story_type: StoryType::default(),
            protagonist_name: String::new(),
        }
    }
}

impl StoryOptions {
    /// Build the request for one prompt.
    pub fn request(&self, prompt: &str) -> StoryRequest {
        StoryRequest::new(prompt)
            .with_max_tokens(self.max_tokens)
            .with_tone(self.tone)
            .with_complexity(self.complexity)
            .with_sensory_friendly(self.sensory_friendly)
            .with_story_type(self.story_type)
            .with_protagonist(self.protagonist_name.clone())
    }
}

/// Settings applied to every narration request.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceOptions {
    pub language: String,
    pub speed: f32,
    pub speaker_wav: Option<String>,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            speed: 1.0,
            speaker_wav: None,
        }
    }
}

impl VoiceOptions {
    pub fn request(&self, text: &str) -> VoiceRequest {
        let request = VoiceRequest::new(text)
            .with_language(self.language.clone())
            .with_speed(self.speed);
        match &self.speaker_wav {
            Some(speaker) => request.with_speaker(speaker.clone()),
            None => request,
        }
    }
}

/// What the backend produced.
#[derive(Debug, Clone)]
pub enum GenerationResult {
    Text(TextStory),
    Audio(VoiceClip),
    Pictograms(PictogramStory),
}

/// A finished generation.
#[derive(Debug, Clone)]
pub struct Generation {
    pub category: Category,
    /// The history entry created for this generation.
    pub record: HistoryRecord,
    pub result: GenerationResult,
    /// False when the history could not be written. The result is still
    /// good; the failure has been logged.
    pub saved: bool,
}

/// Creates stories and remembers the ideas behind them.
pub struct Studio<B, S> {
    backend: B,
    history: HistoryLog<S>,
    story: StoryOptions,
    voice: VoiceOptions,
    last_id: Option<i64>,
}

impl<B: StoryBackend, S: KeyValueStore> Studio<B, S> {
    /// Create a studio over an already loaded history.
    pub fn new(backend: B, history: HistoryLog<S>) -> Self {
        let last_id = history.latest_id();
        Self {
            backend,
            history,
            story: StoryOptions::default(),
            voice: VoiceOptions::default(),
            last_id,
        }
    }

    pub fn with_story_options(mut self, options: StoryOptions) -> Self {
        self.story = options;
        self
    }

    pub fn with_voice_options(mut self, options: VoiceOptions) -> Self {
        self.voice = options;
        self
    }

    /// Generate `category` content for `prompt`, stamped with the current
    /// local time.
    pub async fn generate(
        &mut self,
        category: Category,
        prompt: &str,
    ) -> Result<Generation, StudioError> {
        self.generate_at(category, prompt, Local::now()).await
    }

    /// Generate `category` content for `prompt` as if it were `now`.
    ///
    /// Nothing is sent and nothing is recorded for a blank prompt. A failed
    /// generation is not recorded either. The service receives the trimmed
    /// prompt; the record keeps it as typed.
    pub async fn generate_at(
        &mut self,
        category: Category,
        prompt: &str,
        now: DateTime<Local>,
    ) -> Result<Generation, StudioError> {
        let idea = prompt.trim();
        if idea.is_empty() {
            return Err(StudioError::EmptyPrompt);
        }

        info!(%category, backend = self.backend.name(), "generating");
        let result = match category {
            Category::Text => self
                .backend
                .story(&self.story.request(idea))
                .await
                .map(GenerationResult::Text),
            Category::Audio => self
                .backend
                .voice(&self.voice.request(idea))
                .await
                .map(GenerationResult::Audio),
            Category::Pictogram => self
                .backend
                .pictograms(&self.story.request(idea))
                .await
                .map(GenerationResult::Pictograms),
        }
        .map_err(|source| {
            warn!(%category, error = %source, "generation failed");
            StudioError::Generation { category, source }
        })?;

        let id = self.next_id(now.timestamp_millis());
        let record = HistoryRecord::new(id, now.format(DATE_FORMAT).to_string(), prompt);
        self.last_id = Some(id);

        let saved = match self.history.append(category, record.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!(%category, error = %e, "could not save history");
                false
            }
        };

        Ok(Generation {
            category,
            record,
            result,
            saved,
        })
    }

    /// Ids follow the clock but never repeat or go backwards, unless the
    /// last id is already `i64::MAX`; then they restart from the clock.
    fn next_id(&self, now_ms: i64) -> i64 {
        match self.last_id {
            Some(last) if last >= now_ms => last.checked_add(1).unwrap_or_else(|| {
                warn!(last, "record ids exhausted, restarting from the clock");
                now_ms
            }),
            _ => now_ms,
        }
    }

    pub fn history(&self) -> &HistoryLog<S> {
        &self.history
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn story_options(&self) -> &StoryOptions {
        &self.story
    }

    pub fn voice_options(&self) -> &VoiceOptions {
        &self.voice
    }
}
