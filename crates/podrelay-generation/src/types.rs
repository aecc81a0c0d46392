use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// What the podcast is generated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Ordered, non-empty list of source URLs
    Urls(Vec<String>),
    /// Single news topic
    Topic(String),
}

impl Source {
    /// Build a URL source, trimming entries and dropping blanks
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidRequest`] if no URL remains
    pub fn urls<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.as_ref().trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        if urls.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "at least one source URL is required".to_string(),
            ));
        }

        Ok(Self::Urls(urls))
    }

    /// Build a URL source from a comma-separated list
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidRequest`] if the list holds no URL
    pub fn parse_url_list(raw: &str) -> Result<Self> {
        Self::urls(raw.split(','))
    }

    /// Build a topic source
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidRequest`] if the topic is blank
    pub fn topic(topic: impl Into<String>) -> Result<Self> {
        let topic = topic.into();
        let trimmed = topic.trim();

        if trimmed.is_empty() {
            return Err(GenerationError::InvalidRequest("a news topic is required".to_string()));
        }

        Ok(Self::Topic(trimmed.to_string()))
    }

    /// Short label for logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Urls(_) => "urls",
            Self::Topic(_) => "topic",
        }
    }
}

/// Speech synthesis backend used by the generation service
///
/// Unknown identifiers are carried through unchanged; the generation
/// service decides whether it supports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TtsModel {
    #[default]
    Gemini,
    Edge,
    Openai,
    Elevenlabs,
    Other(String),
}

impl TtsModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini => "gemini",
            Self::Edge => "edge",
            Self::Openai => "openai",
            Self::Elevenlabs => "elevenlabs",
            Self::Other(name) => name,
        }
    }

    /// Whether this is one of the identifiers known to work
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for TtsModel {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Self::Gemini,
            "edge" => Self::Edge,
            "openai" => Self::Openai,
            "elevenlabs" => Self::Elevenlabs,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for TtsModel {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<TtsModel> for String {
    fn from(value: TtsModel) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TtsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the generated conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub word_count: u32,
    /// Sampling temperature handed to the language model
    pub creativity: f64,
    pub conversation_style: Vec<String>,
    pub roles_person1: String,
    pub roles_person2: String,
    pub dialogue_structure: Vec<String>,
    pub podcast_name: Option<String>,
    pub podcast_tagline: Option<String>,
    pub output_language: String,
    pub user_instructions: Option<String>,
    pub engagement_techniques: Vec<String>,
    pub text_to_speech: TextToSpeechOptions,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            word_count: 4000,
            creativity: 0.7,
            conversation_style: Vec::new(),
            roles_person1: "Interviewer".to_string(),
            roles_person2: "Subject matter expert".to_string(),
            dialogue_structure: Vec::new(),
            podcast_name: None,
            podcast_tagline: None,
            output_language: "English".to_string(),
            user_instructions: None,
            engagement_techniques: Vec::new(),
            text_to_speech: TextToSpeechOptions::default(),
        }
    }
}

/// Speech options nested in [`ConversationConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextToSpeechOptions {
    /// Scratch directory for intermediate audio
    pub temp_audio_dir: Option<PathBuf>,
    pub ending_message: String,
    pub default_tts_model: TtsModel,
    pub audio_format: String,
}

impl Default for TextToSpeechOptions {
    fn default() -> Self {
        Self {
            temp_audio_dir: None,
            ending_message: "Thank you for listening to this episode.".to_string(),
            default_tts_model: TtsModel::default(),
            audio_format: "mp3".to_string(),
        }
    }
}

/// Provider API keys scoped to one generation call
///
/// Provider names are normalized to lowercase; blank keys are ignored.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    keys: BTreeMap<String, SecretString>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, replacing any existing key for the provider
    pub fn insert(&mut self, provider: &str, key: SecretString) {
        let provider = provider.trim().to_ascii_lowercase();
        if provider.is_empty() || key.expose_secret().trim().is_empty() {
            return;
        }
        self.keys.insert(provider, key);
    }

    #[must_use]
    pub fn with(mut self, provider: &str, key: impl Into<String>) -> Self {
        self.insert(provider, SecretString::from(key.into()));
        self
    }

    pub fn get(&self, provider: &str) -> Option<&SecretString> {
        self.keys.get(&provider.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Fill in providers this set has no key for
    pub fn merge_defaults(&mut self, defaults: &Self) {
        for (provider, key) in &defaults.keys {
            self.keys.entry(provider.clone()).or_insert_with(|| key.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SecretString)> {
        self.keys.iter().map(|(provider, key)| (provider.as_str(), key))
    }

    /// Environment variable name and key for each provider (`GEMINI_API_KEY`)
    pub fn env_vars(&self) -> impl Iterator<Item = (String, &SecretString)> {
        self.keys
            .iter()
            .map(|(provider, key)| (format!("{}_API_KEY", provider.to_ascii_uppercase()), key))
    }

    /// Provider names only, for logging
    pub fn providers(&self) -> Vec<&str> {
        self.keys.keys().map(String::as_str).collect()
    }
}

impl Credentials {
    /// Collect keys from configuration-style `(provider, key)` pairs
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a SecretString)>,
    {
        let mut credentials = Self::new();
        for (provider, key) in entries {
            credentials.insert(provider, key.clone());
        }
        credentials
    }
}

/// Input to one podcast generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source: Source,
    pub tts_model: TtsModel,
    pub conversation_config: Option<ConversationConfig>,
    pub credentials: Credentials,
}

impl GenerationRequest {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            tts_model: TtsModel::default(),
            conversation_config: None,
            credentials: Credentials::default(),
        }
    }

    #[must_use]
    pub fn with_tts_model(mut self, tts_model: TtsModel) -> Self {
        self.tts_model = tts_model;
        self
    }

    #[must_use]
    pub fn with_conversation_config(mut self, config: ConversationConfig) -> Self {
        self.conversation_config = Some(config);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }
}

/// JSON body sent to a generation backend
#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    urls: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    tts_model: &'a TtsModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_config: Option<&'a ConversationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_keys: Option<BTreeMap<&'a str, &'a str>>,
}

impl<'a> WireRequest<'a> {
    /// Borrow a request for serialization
    ///
    /// Keys are embedded only when `include_keys` is set; bindings that can
    /// scope credentials another way leave them out of the body.
    pub(crate) fn new(request: &'a GenerationRequest, include_keys: bool) -> Self {
        let (urls, topic) = match &request.source {
            Source::Urls(urls) => (Some(urls.as_slice()), None),
            Source::Topic(topic) => (None, Some(topic.as_str())),
        };

        let api_keys = include_keys.then(|| {
            request
                .credentials
                .iter()
                .map(|(provider, key)| (provider, key.expose_secret()))
                .collect()
        });

        Self {
            urls,
            topic,
            tts_model: &request.tts_model,
            conversation_config: request.conversation_config.as_ref(),
            api_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_is_trimmed_and_blanks_dropped() {
        let source = Source::parse_url_list(" http://a , ,http://b,").unwrap();
        assert_eq!(source, Source::Urls(vec!["http://a".to_string(), "http://b".to_string()]));
    }

    #[test]
    fn empty_url_list_rejected() {
        let err = Source::parse_url_list(" , ").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
    }

    #[test]
    fn blank_topic_rejected() {
        assert!(Source::topic("   ").is_err());
        assert_eq!(Source::topic(" climate change ").unwrap(), Source::Topic("climate change".to_string()));
    }

    #[test]
    fn tts_model_passes_unknown_identifiers_through() {
        assert_eq!(TtsModel::from("OpenAI"), TtsModel::Openai);
        let other = TtsModel::from("bark");
        assert_eq!(other, TtsModel::Other("bark".to_string()));
        assert!(!other.is_supported());
        assert_eq!(other.to_string(), "bark");
    }

    #[test]
    fn conversation_config_defaults_fill_missing_fields() {
        let config: ConversationConfig = serde_json::from_str(r#"{"word_count": 800}"#).unwrap();
        assert_eq!(config.word_count, 800);
        assert_eq!(config.roles_person1, "Interviewer");
        assert_eq!(config.text_to_speech.audio_format, "mp3");
        assert_eq!(config.text_to_speech.default_tts_model, TtsModel::Gemini);
    }

    #[test]
    fn credentials_skip_blank_keys_and_normalize_names() {
        let credentials = Credentials::new().with("Gemini", "g-key").with("openai", "  ");
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials.get("gemini").unwrap().expose_secret(), "g-key");

        let vars: Vec<_> = credentials.env_vars().map(|(name, _)| name).collect();
        assert_eq!(vars, ["GEMINI_API_KEY"]);
    }

    #[test]
    fn request_keys_win_over_defaults() {
        let mut credentials = Credentials::new().with("gemini", "from-request");
        let defaults = Credentials::new().with("gemini", "from-config").with("openai", "o-key");

        credentials.merge_defaults(&defaults);

        assert_eq!(credentials.get("gemini").unwrap().expose_secret(), "from-request");
        assert_eq!(credentials.get("openai").unwrap().expose_secret(), "o-key");
    }

    #[test]
    fn credentials_debug_does_not_leak() {
        let credentials = Credentials::new().with("gemini", "super-secret");
        assert!(!format!("{credentials:?}").contains("super-secret"));
    }

    #[test]
    fn wire_request_for_topic() {
        let request = GenerationRequest::new(Source::topic("climate change").unwrap())
            .with_credentials(Credentials::new().with("gemini", "g-key"));

        let without_keys = serde_json::to_value(WireRequest::new(&request, false)).unwrap();
        assert_eq!(
            without_keys,
            serde_json::json!({ "topic": "climate change", "tts_model": "gemini" })
        );

        let with_keys = serde_json::to_value(WireRequest::new(&request, true)).unwrap();
        assert_eq!(with_keys["api_keys"]["gemini"], "g-key");
    }

    #[test]
    fn wire_request_for_urls_carries_config() {
        let request = GenerationRequest::new(Source::parse_url_list("http://a,http://b").unwrap())
            .with_tts_model(TtsModel::Edge)
            .with_conversation_config(ConversationConfig::default());

        let json = serde_json::to_value(WireRequest::new(&request, false)).unwrap();
        assert_eq!(json["urls"], serde_json::json!(["http://a", "http://b"]));
        assert_eq!(json["tts_model"], "edge");
        assert_eq!(json["conversation_config"]["word_count"], 4000);
        assert!(json.get("api_keys").is_none());
    }
}
