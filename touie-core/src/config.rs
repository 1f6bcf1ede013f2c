//! Studio configuration from the environment.

use crate::history::LoadPolicy;
use crate::studio::{StoryOptions, VoiceOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use touie_api::{
    Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MAX_MAX_TOKENS, MAX_VOICE_SPEED, MIN_MAX_TOKENS,
    MIN_VOICE_SPEED,
};

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything needed to open a studio.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Base URL of the generation service.
    pub api_url: String,
    /// Where the history and the log file live.
    pub data_dir: PathBuf,
    pub history_policy: LoadPolicy,
    pub request_timeout: Duration,
    pub story: StoryOptions,
    pub voice: VoiceOptions,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            history_policy: LoadPolicy::default(),
            request_timeout: DEFAULT_TIMEOUT,
            story: StoryOptions::default(),
            voice: VoiceOptions::default(),
        }
    }
}

/// `<platform data dir>/touie`, or `.touie` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("touie"))
        .unwrap_or_else(|| PathBuf::from(".touie"))
}

impl StudioConfig {
    /// Read `TOUIE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset and blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("TOUIE_API_URL") {
            config.api_url = url.trim().to_string();
        }
        if let Some(dir) = get("TOUIE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(value) = get("TOUIE_HISTORY_POLICY") {
            config.history_policy = parse("TOUIE_HISTORY_POLICY", &value)?;
        }
        if let Some(value) = get("TOUIE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse("TOUIE_REQUEST_TIMEOUT_SECS", &value)?;
            if secs == 0 {
                return Err(invalid("TOUIE_REQUEST_TIMEOUT_SECS", &value, "must be positive"));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = get("TOUIE_MAX_TOKENS") {
            let tokens: u32 = parse("TOUIE_MAX_TOKENS", &value)?;
            if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&tokens) {
                return Err(invalid(
                    "TOUIE_MAX_TOKENS",
                    &value,
                    &format!("must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}"),
                ));
            }
            config.story.max_tokens = tokens;
        }
        if let Some(value) = get("TOUIE_TONE") {
            config.story.tone = parse("TOUIE_TONE", &value)?;
        }
        if let Some(value) = get("TOUIE_COMPLEXITY") {
            config.story.complexity = parse("TOUIE_COMPLEXITY", &value)?;
        }
        if let Some(value) = get("TOUIE_STORY_TYPE") {
            config.story.story_type = parse("TOUIE_STORY_TYPE", &value)?;
        }
        if let Some(name) = get("TOUIE_PROTAGONIST") {
            config.story.protagonist_name = name.trim().to_string();
        }

        if let Some(language) = get("TOUIE_LANGUAGE") {
            config.voice.language = language.trim().to_string();
        }
        if let Some(value) = get("TOUIE_VOICE_SPEED") {
            let speed: f32 = parse("TOUIE_VOICE_SPEED", &value)?;
            if !(MIN_VOICE_SPEED..=MAX_VOICE_SPEED).contains(&speed) {
                return Err(invalid(
                    "TOUIE_VOICE_SPEED",
                    &value,
                    &format!("must be between {MIN_VOICE_SPEED} and {MAX_VOICE_SPEED}"),
                ));
            }
            config.voice.speed = speed;
        }
        if let Some(speaker) = get("TOUIE_SPEAKER_WAV") {
            config.voice.speaker_wav = Some(speaker.trim().to_string());
        }

        Ok(config)
    }

    /// The file holding the persisted history.
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }

    /// The file the terminal UI logs to.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("touie.log")
    }

    /// A client for the configured service.
    pub fn client(&self) -> Result<Client, touie_api::Error> {
        Client::with_timeout(&self.api_url, self.request_timeout)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, &e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use touie_api::{StoryType, Tone};

    fn config_from(vars: &[(&str, &str)]) -> Result<StudioConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.history_policy, LoadPolicy::Strict);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert_eq!(config.story, StoryOptions::default());
        assert_eq!(config.voice.language, "es");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TOUIE_API_URL", "http://stories.local:9000"),
            ("TOUIE_DATA_DIR", "/tmp/touie-test"),
            ("TOUIE_HISTORY_POLICY", "reset"),
            ("TOUIE_REQUEST_TIMEOUT_SECS", "30"),
            ("TOUIE_MAX_TOKENS", "400"),
            ("TOUIE_TONE", "energico"),
            ("TOUIE_STORY_TYPE", "fantasy"),
            ("TOUIE_PROTAGONIST", " Leo "),
            ("TOUIE_VOICE_SPEED", "1.25"),
            ("TOUIE_SPEAKER_WAV", "leo.wav"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://stories.local:9000");
        assert_eq!(config.history_path(), PathBuf::from("/tmp/touie-test/history.json"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/touie-test/touie.log"));
        assert_eq!(config.history_policy, LoadPolicy::Reset);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.story.max_tokens, 400);
        assert_eq!(config.story.tone, Tone::Energetic);
        assert_eq!(config.story.story_type, StoryType::Fantasy);
        assert_eq!(config.story.protagonist_name, "Leo");
        assert_eq!(config.voice.speed, 1.25);
        assert_eq!(config.voice.speaker_wav.as_deref(), Some("leo.wav"));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = config_from(&[("TOUIE_TONE", "  "), ("TOUIE_API_URL", "")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_BASE_URL);
        assert_eq!(config.story.tone, Tone::default());
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        for (key, value) in [
            ("TOUIE_HISTORY_POLICY", "sometimes"),
            ("TOUIE_REQUEST_TIMEOUT_SECS", "0"),
            ("TOUIE_MAX_TOKENS", "5000"),
            ("TOUIE_MAX_TOKENS", "many"),
            ("TOUIE_COMPLEXITY", "rocket science"),
            ("TOUIE_VOICE_SPEED", "3"),
        ] {
            match config_from(&[(key, value)]) {
                Err(ConfigError::Invalid { key: k, value: v, .. }) => {
                    assert_eq!(k, key);
                    assert_eq!(v, value);
                }
                Ok(_) => panic!("{key}={value} should be rejected"),
            }
        }
    }

    #[test]
    fn test_client_uses_configured_url() {
        let config = config_from(&[("TOUIE_API_URL", "http://localhost:8123/")]).unwrap();
        assert_eq!(config.client().unwrap().base_url(), "http://localhost:8123");
    }
}
