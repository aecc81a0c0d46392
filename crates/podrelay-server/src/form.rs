use std::path::Path;

use axum::body::Body;
use podrelay_generation::{ConversationConfig, Credentials, GenerationRequest, Source, TtsModel};

use crate::error::{PodcastError, Result};

/// Body limit for form submissions (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form fields holding provider keys, and the provider each one belongs to
const CREDENTIAL_FIELDS: [(&str, &str); 3] = [
    ("gemini_key", "gemini"),
    ("openai_key", "openai"),
    ("elevenlabs_key", "elevenlabs"),
];

/// Which kind of podcast the form asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Discussion of a news topic
    News,
    /// Discussion of user-supplied URLs
    Urls,
}

impl Mode {
    /// Details reported when the generation service supplies none
    pub const fn default_details(self) -> &'static str {
        match self {
            Self::News => "News podcast generated successfully",
            Self::Urls => "Podcast generated successfully",
        }
    }
}

/// A decoded `application/x-www-form-urlencoded` submission
///
/// Keeps every pair in order so repeated keys (`conversation_style[]`)
/// survive decoding.
#[derive(Debug, Clone, Default)]
pub struct PodcastForm {
    fields: Vec<(String, String)>,
}

impl PodcastForm {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            fields: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value for `name`, trimmed, if present and non-blank
    fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Tags selected for a list field
    ///
    /// Accepts repeated `<name>[]=<tag>` values and `<name>_<tag>=true`
    /// checkbox fields. Order of first appearance is kept, duplicates dropped.
    fn list(&self, name: &str) -> Vec<String> {
        let repeated = format!("{name}[]");
        let checkbox = format!("{name}_");
        let mut tags: Vec<String> = Vec::new();

        for (key, value) in &self.fields {
            let tag = if *key == repeated {
                value.trim()
            } else if let Some(tag) = key.strip_prefix(&checkbox)
                && value.trim() == "true"
            {
                tag.trim()
            } else {
                continue;
            };

            if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }

        tags
    }

    fn number<T: std::str::FromStr>(&self, name: &str, kind: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| PodcastError::Input(format!("{name} must be {kind}, got '{raw}'")))
            })
            .transpose()
    }

    pub fn mode(&self) -> Mode {
        if self.get("mode") == Some("news") {
            Mode::News
        } else {
            Mode::Urls
        }
    }

    pub fn tts_model(&self) -> TtsModel {
        self.get("tts_model").map(TtsModel::from).unwrap_or_default()
    }

    pub fn credentials(&self) -> Credentials {
        let mut credentials = Credentials::new();
        for (field, provider) in CREDENTIAL_FIELDS {
            if let Some(key) = self.get(field) {
                credentials = credentials.with(provider, key);
            }
        }
        credentials
    }

    /// Conversation settings for URL mode, on top of the defaults
    ///
    /// `temp_dir` is the scratch directory the generation service may use.
    ///
    /// # Errors
    ///
    /// Returns [`PodcastError::Input`] if `word_count` or `creativity` is
    /// not a valid number
    pub fn conversation_config(&self, tts_model: &TtsModel, temp_dir: &Path) -> Result<ConversationConfig> {
        let mut config = ConversationConfig::default();

        if let Some(word_count) = self.number::<u32>("word_count", "a whole number")? {
            config.word_count = word_count;
        }

        if let Some(creativity) = self.number::<f64>("creativity", "a number")? {
            if !(0.0..=1.0).contains(&creativity) {
                return Err(PodcastError::Input(format!(
                    "creativity must be between 0 and 1, got {creativity}"
                )));
            }
            config.creativity = creativity;
        }

        if let Some(role) = self.get("roles_person1") {
            config.roles_person1 = role.to_string();
        }
        if let Some(role) = self.get("roles_person2") {
            config.roles_person2 = role.to_string();
        }

        config.conversation_style = self.list("conversation_style");
        config.dialogue_structure = self.list("dialogue_structure");
        config.engagement_techniques = self.list("engagement_techniques");

        config.podcast_name = self.get("podcast_name").map(str::to_string);
        config.podcast_tagline = self.get("podcast_tagline").map(str::to_string);
        config.user_instructions = self.get("user_instructions").map(str::to_string);

        config.text_to_speech.temp_audio_dir = Some(temp_dir.to_path_buf());
        config.text_to_speech.default_tts_model = tts_model.clone();

        Ok(config)
    }

    /// Build the generation request this form describes
    ///
    /// News mode carries only the topic; URL mode always carries a
    /// conversation config.
    ///
    /// # Errors
    ///
    /// Returns an input error if the source is missing or a numeric field
    /// is malformed
    pub fn to_request(&self, temp_dir: &Path) -> Result<GenerationRequest> {
        let tts_model = self.tts_model();

        let request = match self.mode() {
            Mode::News => GenerationRequest::new(Source::topic(self.get("news_topic").unwrap_or_default())?),
            Mode::Urls => {
                let source = Source::parse_url_list(self.get("urls").unwrap_or_default())?;
                let config = self.conversation_config(&tts_model, temp_dir)?;
                GenerationRequest::new(source).with_conversation_config(config)
            }
        };

        Ok(request.with_tts_model(tts_model).with_credentials(self.credentials()))
    }
}

/// Extractor for form-encoded submissions
pub struct ExtractForm(pub PodcastForm);

impl<S> axum::extract::FromRequest<S> for ExtractForm
where
    S: Send + Sync,
{
    type Rejection = PodcastError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self> {
        let (parts, body) = request.into_parts();

        let is_form = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE));

        if !is_form {
            return Err(PodcastError::UnsupportedMediaType);
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                PodcastError::PayloadTooLarge(BODY_LIMIT_BYTES)
            } else {
                PodcastError::Input(format!("failed to read request body: {err}"))
            }
        })?;

        Ok(Self(PodcastForm::parse(&bytes)))
    }
}
