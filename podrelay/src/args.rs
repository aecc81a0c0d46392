use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Podcast generation front end
#[derive(Debug, Parser)]
#[command(name = "podrelay", about = "Web and command-line front end for podcast generation")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "podrelay.toml", env = "PODRELAY_CONFIG", global = true)]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PODRELAY_LISTEN", global = true)]
    pub listen: Option<SocketAddr>,

    /// Override the listen port
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Generate one podcast and print where its audio was written
    Generate(GenerateArgs),
}

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Comma-separated source URLs
    #[arg(short, long, required_unless_present = "topic", conflicts_with = "topic")]
    pub urls: Option<String>,

    /// News topic to discuss instead of URLs
    #[arg(long)]
    pub topic: Option<String>,

    /// Name of the podcast
    #[arg(short = 'n', long, default_value = "Debug Podcast")]
    pub podcast_name: Option<String>,

    /// Podcast tagline
    #[arg(short = 't', long, default_value = "Debug Tagline")]
    pub podcast_tagline: Option<String>,

    /// Additional instructions for the script writer
    #[arg(short = 'i', long)]
    pub user_instructions: Option<String>,

    /// Text-to-speech model (gemini, edge, openai, or elevenlabs)
    #[arg(short = 'm', long, default_value = "gemini")]
    pub tts_model: String,

    /// Target length of the conversation
    #[arg(long, default_value_t = 800)]
    pub word_count: u32,
}
