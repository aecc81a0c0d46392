use std::path::PathBuf;
use std::sync::Arc;

use podrelay_config::Config;
use podrelay_generation::{ConversationConfig, GenerationRequest, Source, TtsModel};
use podrelay_materializer::Materializer;

use crate::args::GenerateArgs;

const CONVERSATION_STYLE: [&str; 4] = ["Engaging", "Fast-paced", "Enthusiastic", "Educational"];

const DIALOGUE_STRUCTURE: [&str; 5] = [
    "Topic Introduction",
    "Summary of Key Points",
    "Discussions",
    "Q&A Session",
    "Farewell Messages",
];

const ENGAGEMENT_TECHNIQUES: [&str; 6] = [
    "Rhetorical Questions",
    "Personal Testimonials",
    "Quotes",
    "Anecdotes",
    "Analogies",
    "Humor",
];

const ENDING_MESSAGE: &str =
    "Thank you for listening to this episode. Don't forget to subscribe to our podcast for more interesting conversations.";

/// Build the request for a command-line run
///
/// URL runs carry a full conversation config; topic runs carry none.
pub fn build_request(args: &GenerateArgs, temp_dir: PathBuf) -> anyhow::Result<GenerationRequest> {
    let tts_model = TtsModel::from(args.tts_model.as_str());

    let request = if let Some(ref topic) = args.topic {
        GenerationRequest::new(Source::topic(topic.as_str())?)
    } else {
        let source = Source::parse_url_list(args.urls.as_deref().unwrap_or_default())?;

        let mut config = ConversationConfig {
            word_count: args.word_count,
            conversation_style: to_strings(&CONVERSATION_STYLE),
            dialogue_structure: to_strings(&DIALOGUE_STRUCTURE),
            engagement_techniques: to_strings(&ENGAGEMENT_TECHNIQUES),
            podcast_name: args.podcast_name.clone(),
            podcast_tagline: args.podcast_tagline.clone(),
            user_instructions: args.user_instructions.clone(),
            ..ConversationConfig::default()
        };
        config.text_to_speech.temp_audio_dir = Some(temp_dir);
        config.text_to_speech.ending_message = ENDING_MESSAGE.to_string();
        config.text_to_speech.default_tts_model = tts_model.clone();

        GenerationRequest::new(source).with_conversation_config(config)
    };

    Ok(request.with_tts_model(tts_model))
}

/// Generate one podcast and return the path its audio was published to
pub async fn run(config: &Config, args: &GenerateArgs) -> anyhow::Result<PathBuf> {
    let generator = podrelay_generation::build_generator(config)?;
    let materializer = Arc::new(Materializer::from_config(&config.storage)?);

    std::fs::create_dir_all(&config.storage.temp_dir)?;

    let request = build_request(args, config.storage.temp_dir.clone())?;
    let raw = generator.generate(request).await?;

    let artifact = materializer
        .materialize_async(raw, "Podcast generated successfully".to_string())
        .await?;

    tracing::info!(details = %artifact.details, url = %artifact.public_url, "podcast generated");

    Ok(artifact.servable_path)
}

fn to_strings(tags: &[&str]) -> Vec<String> {
    tags.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn args(urls: Option<&str>, topic: Option<&str>) -> GenerateArgs {
        GenerateArgs {
            urls: urls.map(str::to_string),
            topic: topic.map(str::to_string),
            podcast_name: Some("Debug Podcast".to_string()),
            podcast_tagline: None,
            user_instructions: None,
            tts_model: "openai".to_string(),
            word_count: 800,
        }
    }

    #[test]
    fn url_run_carries_full_config() {
        let request = build_request(&args(Some("https://a, https://b"), None), PathBuf::from("/scratch")).unwrap();

        assert_eq!(
            request.source,
            Source::Urls(vec!["https://a".to_string(), "https://b".to_string()])
        );
        assert_eq!(request.tts_model, TtsModel::Openai);

        let config = request.conversation_config.unwrap();
        assert_eq!(config.word_count, 800);
        assert_eq!(config.conversation_style.len(), 4);
        assert_eq!(config.dialogue_structure.len(), 5);
        assert_eq!(config.engagement_techniques.len(), 6);
        assert_eq!(config.podcast_name.as_deref(), Some("Debug Podcast"));
        assert_eq!(config.text_to_speech.temp_audio_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(config.text_to_speech.default_tts_model, TtsModel::Openai);
    }

    #[test]
    fn topic_run_has_no_config() {
        let request = build_request(&args(None, Some("elections")), PathBuf::from("/scratch")).unwrap();
        assert_eq!(request.source, Source::Topic("elections".to_string()));
        assert!(request.conversation_config.is_none());
    }

    #[test]
    fn blank_urls_are_rejected() {
        assert!(build_request(&args(Some(" , "), None), PathBuf::from("/scratch")).is_err());
    }

    fn shell_config(root: &Path, script: &str) -> Config {
        let raw = format!(
            r#"
            [storage]
            audio_dir = "{audio}"
            temp_dir = "{scratch}"

            [generator.command]
            program = "sh"
            args = ["-c", "{script}"]
            "#,
            audio = root.join("audio").display(),
            scratch = root.join("tmp").display(),
        );
        Config::from_toml(&raw).unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_publishes_generated_audio() {
        let root = tempfile::tempdir().unwrap();
        let generated = root.path().join("generated.mp3");
        let script = format!(
            "cat > /dev/null; printf 'ID3 cli' > '{path}'; echo '{path}'",
            path = generated.display()
        );
        let config = shell_config(root.path(), &script);

        let path = run(&config, &args(Some("https://a.example"), None)).await.unwrap();

        assert_eq!(path.parent(), Some(root.path().join("audio").as_path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3 cli");
        assert!(generated.is_file());
        assert!(root.path().join("tmp").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_reports_generation_failure() {
        let root = tempfile::tempdir().unwrap();
        let config = shell_config(root.path(), "cat > /dev/null; echo 'no content found'");

        let err = run(&config, &args(None, Some("elections"))).await.unwrap_err();

        assert!(err.to_string().contains("no content found"), "{err}");
        assert!(std::fs::read_dir(root.path().join("audio")).unwrap().next().is_none());
    }
}
