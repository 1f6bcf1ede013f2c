//! Testing utilities for the studio.
//!
//! - `MockBackend` returns scripted responses without touching the network
//!   and records every request it receives
//! - `MockResponse` builds those scripted responses

use crate::backend::StoryBackend;
use crate::history::Category;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use touie_api::{
    PictogramItem, PictogramSet, PictogramStory, StoryRequest, TextStory, VoiceClip,
    VoiceRequest,
};

/// A scripted response from the mock backend.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Story(TextStory),
    Voice(VoiceClip),
    Pictograms(PictogramStory),
    /// The service answered with a non-success status.
    Status { status: u16, message: String },
    /// The service could not be reached.
    Unreachable(String),
}

impl MockResponse {
    pub fn story(text: impl Into<String>) -> Self {
        MockResponse::Story(TextStory {
            text: text.into(),
            metadata: Default::default(),
        })
    }

    pub fn voice(audio_path: impl Into<String>) -> Self {
        MockResponse::Voice(VoiceClip {
            audio_path: audio_path.into(),
            duration: Some(1.5),
            voice_used: Some("mock.wav".to_string()),
        })
    }

    /// A story illustrated with one pictogram per caption.
    pub fn pictograms(story: impl Into<String>, captions: &[&str]) -> Self {
        let story = story.into();
        let items = captions
            .iter()
            .enumerate()
            .map(|(i, caption)| PictogramItem {
                id: Some(i as u32 + 1),
                image: "data:image/png;base64,AAAA".to_string(),
                alt: None,
                label: Some(caption.to_string()),
                concept: None,
                sentence: None,
                keywords: Vec::new(),
            })
            .collect();

        MockResponse::Pictograms(PictogramStory {
            pictograms: PictogramSet {
                paragraph: story.clone(),
                items,
            },
            story,
        })
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        MockResponse::Status {
            status,
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        MockResponse::Unreachable(message.into())
    }

    fn into_error(self, expected: Category) -> touie_api::Error {
        match self {
            MockResponse::Status { status, message } => touie_api::Error::Api { status, message },
            MockResponse::Unreachable(message) => touie_api::Error::Network(message),
            other => touie_api::Error::Parse(format!(
                "mock scripted {other:?} for a {expected} request"
            )),
        }
    }
}

/// A request the mock backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Story(StoryRequest),
    Voice(VoiceRequest),
    Pictograms(StoryRequest),
}

impl MockCall {
    pub fn category(&self) -> Category {
        match self {
            MockCall::Story(_) => Category::Text,
            MockCall::Voice(_) => Category::Audio,
            MockCall::Pictograms(_) => Category::Pictogram,
        }
    }
}

/// A backend that returns scripted responses in order.
///
/// When the script runs out it answers every request successfully with a
/// generic response.
#[derive(Debug, Default)]
pub struct MockBackend {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a response to the end of the script.
    pub fn queue_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, call: MockCall) -> Option<MockResponse> {
        lock(&self.calls).push(call);
        lock(&self.responses).pop_front()
    }
}

// A poisoned lock only means another test thread panicked; the data is
// still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl StoryBackend for MockBackend {
    async fn story(&self, request: &StoryRequest) -> Result<TextStory, touie_api::Error> {
        match self.record(MockCall::Story(request.clone())) {
            Some(MockResponse::Story(story)) => Ok(story),
            Some(other) => Err(other.into_error(Category::Text)),
            None => Ok(TextStory {
                text: format!("Mock story about {}", request.prompt),
                metadata: Default::default(),
            }),
        }
    }

    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceClip, touie_api::Error> {
        match self.record(MockCall::Voice(request.clone())) {
            Some(MockResponse::Voice(clip)) => Ok(clip),
            Some(other) => Err(other.into_error(Category::Audio)),
            None => Ok(VoiceClip {
                audio_path: "mock.wav".to_string(),
                duration: None,
                voice_used: None,
            }),
        }
    }

    async fn pictograms(
        &self,
        request: &StoryRequest,
    ) -> Result<PictogramStory, touie_api::Error> {
        match self.record(MockCall::Pictograms(request.clone())) {
            Some(MockResponse::Pictograms(story)) => Ok(story),
            Some(other) => Err(other.into_error(Category::Pictogram)),
            None => Ok(PictogramStory {
                story: format!("Mock story about {}", request.prompt),
                pictograms: PictogramSet {
                    paragraph: String::new(),
                    items: Vec::new(),
                },
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
