//! Story studio engine for Touie.
//!
//! This crate provides:
//! - A bounded, categorized history of generated stories that survives
//!   restarts
//! - The generation flow that turns an idea into a story and records it
//! - Pluggable backends: the HTTP service, an offline simulation and a
//!   scripted mock for tests
//! - The Spanish text every frontend shows
//!
//! # Quick Start
//!
//! ```ignore
//! use touie_core::{Category, FileStore, HistoryLog, HttpBackend, LoadPolicy, Studio, StudioConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StudioConfig::from_env()?;
//!     let store = FileStore::open(config.history_path())?;
//!     let history = HistoryLog::load(store, config.history_policy)?;
//!
//!     let mut studio = Studio::new(HttpBackend::new(config.client()?), history);
//!     let generation = studio.generate(Category::Text, "un gato que aprende a nadar").await?;
//!
//!     for line in touie_core::render::result_lines(&generation) {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod export;
pub mod history;
pub mod render;
pub mod store;
pub mod studio;
pub mod testing;

// Primary public API
pub use backend::{HttpBackend, SimulatedBackend, StoryBackend};
pub use config::{ConfigError, StudioConfig};
pub use export::{save_pictograms, ExportError};
pub use history::{
    Category, HistoryError, HistoryLog, HistoryRecord, HistorySnapshot, LoadPolicy, HISTORY_CAP,
    HISTORY_KEY,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use studio::{
    Generation, GenerationResult, StoryOptions, Studio, StudioError, VoiceOptions,
};
pub use testing::{MockBackend, MockCall, MockResponse};
