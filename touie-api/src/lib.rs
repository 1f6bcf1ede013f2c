//! Client for the Touie generation service.
//!
//! The service turns a child's idea into calm, sensory-friendly content:
//! - `/text/generate` writes a short story from a prompt
//! - `/voice/generate` narrates text into an audio file
//! - `/pictogram/from_prompt` writes a story and illustrates it with pictograms
//!
//! Every response is decoded into an explicit schema. A response missing a
//! field the client relies on is a [`Error::Parse`], never a silently empty
//! value.

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Where the service listens when run locally.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Local model inference is slow; the default request timeout is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds the service enforces on `max_tokens`.
pub const MIN_MAX_TOKENS: u32 = 50;
pub const MAX_MAX_TOKENS: u32 = 800;
pub const DEFAULT_MAX_TOKENS: u32 = 120;

/// Bounds the service enforces on `voice_speed`.
pub const MIN_VOICE_SPEED: f32 = 0.5;
pub const MAX_VOICE_SPEED: f32 = 2.0;

/// Errors that can occur when talking to the generation service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an API error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Generation service client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a client for the service at `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let base_url = base_url.into();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Unsupported URL scheme '{}' in '{base_url}'",
                parsed.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .default_headers(default_headers())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Write a story from a prompt.
    pub async fn generate_text(&self, request: &StoryRequest) -> Result<TextStory, Error> {
        request.validate()?;
        self.post("/text/generate", request).await
    }

    /// Narrate text into an audio file on the service host.
    pub async fn generate_voice(&self, request: &VoiceRequest) -> Result<VoiceClip, Error> {
        request.validate()?;
        self.post("/voice/generate", request).await
    }

    /// Write a story from a prompt and illustrate it with pictograms.
    pub async fn generate_pictograms(
        &self,
        request: &StoryRequest,
    ) -> Result<PictogramStory, Error> {
        request.validate()?;
        self.post("/pictogram/from_prompt", request).await
    }

    /// Illustrate an existing text with pictograms.
    pub async fn pictograms_from_text(
        &self,
        text: impl Into<String>,
    ) -> Result<PictogramSet, Error> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidRequest("text must not be empty".to_string()));
        }

        let response: ApiPictogramResponse = self
            .post("/pictogram/generate", &ApiPictogramRequest { text })
            .await?;
        Ok(response.pictogram_data)
    }

    /// Fetch the service banner: name, version and advertised endpoints.
    pub async fn service_info(&self) -> Result<ServiceInfo, Error> {
        let url = self.url("/");
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        read_json(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, Error> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
}

// ============================================================================
// Request types
// ============================================================================

/// Narrative tone of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    #[serde(rename = "calmo")]
    Calm,
    #[serde(rename = "energico")]
    Energetic,
    #[serde(rename = "neutral")]
    Neutral,
}

/// Language complexity of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Complexity {
    #[default]
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "intermedio")]
    Intermediate,
    #[serde(rename = "avanzado")]
    Advanced,
}

/// Kind of story to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoryType {
    #[serde(rename = "aventura")]
    Adventure,
    #[default]
    #[serde(rename = "cotidiana")]
    Everyday,
    #[serde(rename = "educativa")]
    Educational,
    #[serde(rename = "fantasia")]
    Fantasy,
}

impl Tone {
    /// The value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Calm => "calmo",
            Tone::Energetic => "energico",
            Tone::Neutral => "neutral",
        }
    }
}

impl Complexity {
    /// The value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Intermediate => "intermedio",
            Complexity::Advanced => "avanzado",
        }
    }
}

impl StoryType {
    /// The value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryType::Adventure => "aventura",
            StoryType::Everyday => "cotidiana",
            StoryType::Educational => "educativa",
            StoryType::Fantasy => "fantasia",
        }
    }
}

// Both the wire spelling and the English name are accepted so configuration
// files can use either.
impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calmo" | "calm" => Ok(Tone::Calm),
            "energico" | "enérgico" | "energetic" => Ok(Tone::Energetic),
            "neutral" => Ok(Tone::Neutral),
            other => Err(Error::InvalidRequest(format!("unknown tone '{other}'"))),
        }
    }
}

impl FromStr for Complexity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "intermedio" | "intermediate" => Ok(Complexity::Intermediate),
            "avanzado" | "advanced" => Ok(Complexity::Advanced),
            other => Err(Error::InvalidRequest(format!(
                "unknown complexity '{other}'"
            ))),
        }
    }
}

impl FromStr for StoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aventura" | "adventure" => Ok(StoryType::Adventure),
            "cotidiana" | "everyday" => Ok(StoryType::Everyday),
            "educativa" | "educational" => Ok(StoryType::Educational),
            "fantasia" | "fantasía" | "fantasy" => Ok(StoryType::Fantasy),
            other => Err(Error::InvalidRequest(format!(
                "unknown story type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A story request, shared by the text and pictogram endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub tone: Tone,
    pub complexity: Complexity,
    pub sensory_friendly: bool,
    pub story_type: StoryType,
    pub protagonist_name: String,
}

impl StoryRequest {
    /// Create a request with the service defaults: a calm, simple,
    /// sensory-friendly everyday story.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            tone: Tone::default(),
            complexity: Complexity::default(),
            sensory_friendly: true,
            story_type: StoryType::default(),
            protagonist_name: String::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_sensory_friendly(mut self, sensory_friendly: bool) -> Self {
        self.sensory_friendly = sensory_friendly;
        self
    }

    pub fn with_story_type(mut self, story_type: StoryType) -> Self {
        self.story_type = story_type;
        self
    }

    pub fn with_protagonist(mut self, name: impl Into<String>) -> Self {
        self.protagonist_name = name.into();
        self
    }

    /// Check the request against the constraints the service enforces.
    pub fn validate(&self) -> Result<(), Error> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidRequest("prompt must not be empty".to_string()));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(Error::InvalidRequest(format!(
                "max_tokens must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}, got {}",
                self.max_tokens
            )));
        }
        Ok(())
    }
}

/// A narration request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceRequest {
    pub text: String,
    pub language: String,
    pub voice_speed: f32,
    /// Reference voice on the service host. The service picks one when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_wav: Option<String>,
}

impl VoiceRequest {
    /// Create a Spanish narration request at normal speed.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: "es".to_string(),
            voice_speed: 1.0,
            speaker_wav: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.voice_speed = speed;
        self
    }

    pub fn with_speaker(mut self, speaker_wav: impl Into<String>) -> Self {
        self.speaker_wav = Some(speaker_wav.into());
        self
    }

    /// Check the request against the constraints the service enforces.
    pub fn validate(&self) -> Result<(), Error> {
        if self.text.trim().is_empty() {
            return Err(Error::InvalidRequest("text must not be empty".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "language must not be empty".to_string(),
            ));
        }
        if !(MIN_VOICE_SPEED..=MAX_VOICE_SPEED).contains(&self.voice_speed) {
            return Err(Error::InvalidRequest(format!(
                "voice_speed must be between {MIN_VOICE_SPEED} and {MAX_VOICE_SPEED}, got {}",
                self.voice_speed
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Response types
// ============================================================================

/// A written story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStory {
    pub text: String,
    /// Generation details reported by the service (tone, token usage...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A narrated story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceClip {
    /// Path of the audio file on the service host.
    pub audio_path: String,
    /// Length in seconds, when the service could measure it.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub voice_used: Option<String>,
}

/// A story together with its pictograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictogramStory {
    pub story: String,
    pub pictograms: PictogramSet,
}

/// Pictograms generated for a text, one per illustrated sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictogramSet {
    /// The full text that was analyzed.
    #[serde(default)]
    pub paragraph: String,
    pub items: Vec<PictogramItem>,
}

/// A single pictogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictogramItem {
    #[serde(default)]
    pub id: Option<u32>,
    /// Inline image, usually a `data:image/png;base64,...` URL.
    pub image: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl PictogramItem {
    /// Text to show next to the image: alt text, label, concept or the
    /// illustrated sentence, whichever is present first.
    pub fn caption(&self) -> Option<&str> {
        [&self.alt, &self.label, &self.concept, &self.sentence]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|text| !text.trim().is_empty())
    }

    /// Decode the inline image.
    ///
    /// Accepts a `data:<media type>;base64,<payload>` URL or a bare base64
    /// payload, which is assumed to be PNG.
    pub fn decode_image(&self) -> Result<DecodedImage, Error> {
        let (media_type, payload) = match self.image.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| Error::Parse("data URL without payload".to_string()))?;
                let media_type = header.strip_suffix(";base64").ok_or_else(|| {
                    Error::Parse(format!("data URL is not base64 encoded: '{header}'"))
                })?;
                (media_type.to_string(), payload)
            }
            None => ("image/png".to_string(), self.image.as_str()),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::Parse(format!("invalid pictogram image: {e}")))?;

        Ok(DecodedImage { media_type, bytes })
    }
}

/// Raw bytes of a pictogram image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension matching the media type.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            _ => "bin",
        }
    }
}

/// The service banner returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiPictogramRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiPictogramResponse {
    pictogram_data: PictogramSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = Client::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/text/generate"), "http://localhost:8000/text/generate");
    }

    #[test]
    fn test_client_rejects_bad_urls() {
        assert!(matches!(Client::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(
            Client::new("ftp://example.com"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_story_request_wire_format() {
        let request = StoryRequest::new("un perro en el parque")
            .with_tone(Tone::Neutral)
            .with_story_type(StoryType::Fantasy)
            .with_protagonist("Luna");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "prompt": "un perro en el parque",
                "max_tokens": 120,
                "tone": "neutral",
                "complexity": "simple",
                "sensory_friendly": true,
                "story_type": "fantasia",
                "protagonist_name": "Luna"
            })
        );
    }

    #[test]
    fn test_voice_request_omits_unset_speaker() {
        let value = serde_json::to_value(VoiceRequest::new("hola")).unwrap();
        assert_eq!(value["language"], "es");
        assert_eq!(value["voice_speed"], 1.0);
        assert!(value.get("speaker_wav").is_none());

        let value = serde_json::to_value(VoiceRequest::new("hola").with_speaker("ana.wav")).unwrap();
        assert_eq!(value["speaker_wav"], "ana.wav");
    }

    #[test]
    fn test_story_request_validation() {
        assert!(StoryRequest::new("a dog").validate().is_ok());
        assert!(StoryRequest::new("   ").validate().is_err());
        assert!(StoryRequest::new("a dog").with_max_tokens(49).validate().is_err());
        assert!(StoryRequest::new("a dog").with_max_tokens(800).validate().is_ok());
        assert!(StoryRequest::new("a dog").with_max_tokens(801).validate().is_err());
    }

    #[test]
    fn test_voice_request_validation() {
        assert!(VoiceRequest::new("hola").validate().is_ok());
        assert!(VoiceRequest::new("hola").with_speed(0.4).validate().is_err());
        assert!(VoiceRequest::new("hola").with_speed(2.0).validate().is_ok());
        assert!(VoiceRequest::new("hola").with_speed(f32::NAN).validate().is_err());
        assert!(VoiceRequest::new("hola").with_language("").validate().is_err());
    }

    #[test]
    fn test_enum_parsing_accepts_both_spellings() {
        assert_eq!("calmo".parse::<Tone>().unwrap(), Tone::Calm);
        assert_eq!("Energetic".parse::<Tone>().unwrap(), Tone::Energetic);
        assert_eq!("avanzado".parse::<Complexity>().unwrap(), Complexity::Advanced);
        assert_eq!("adventure".parse::<StoryType>().unwrap(), StoryType::Adventure);
        assert!("loud".parse::<Tone>().is_err());
    }

    #[test]
    fn test_pictogram_caption_priority() {
        let mut item: PictogramItem = serde_json::from_value(json!({
            "id": 1,
            "sentence": "El perro corre",
            "image": "data:image/png;base64,AAAA"
        }))
        .unwrap();
        assert_eq!(item.caption(), Some("El perro corre"));

        item.label = Some("perro".to_string());
        assert_eq!(item.caption(), Some("perro"));

        item.alt = Some("un perro corriendo".to_string());
        assert_eq!(item.caption(), Some("un perro corriendo"));
    }

    #[test]
    fn test_pictogram_requires_image() {
        let result: Result<PictogramItem, _> =
            serde_json::from_value(json!({ "id": 1, "label": "perro" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_data_url() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG fake");
        let item: PictogramItem = serde_json::from_value(json!({
            "image": format!("data:image/png;base64,{encoded}")
        }))
        .unwrap();

        let image = item.decode_image().unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.extension(), "png");
        assert_eq!(image.bytes, b"\x89PNG fake");
    }

    #[test]
    fn test_decode_rejects_malformed_images() {
        let item: PictogramItem =
            serde_json::from_value(json!({ "image": "data:image/png,plain" })).unwrap();
        assert!(matches!(item.decode_image(), Err(Error::Parse(_))));

        let item: PictogramItem =
            serde_json::from_value(json!({ "image": "data:image/png;base64,@@@" })).unwrap();
        assert!(matches!(item.decode_image(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_error_status() {
        let err = Error::Api {
            status: 503,
            message: "busy".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "API error (status 503): busy");
        assert_eq!(Error::Network("down".to_string()).status(), None);
    }
}
