#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod generate;

use args::{Args, Command, GenerateArgs};
use clap::Parser;
use podrelay_config::Config;
use podrelay_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Generate(ref generate_args)) => run_generate(&args, generate_args).await,
        Some(Command::Serve) | None => serve(&args).await,
    }
}

async fn serve(args: &Args) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;

    podrelay_telemetry::init(&config.telemetry)?;

    let mut listen_address = args.listen.unwrap_or_else(|| config.server.listen_address());
    if let Some(port) = args.port {
        listen_address.set_port(port);
    }

    tracing::info!(
        config_path = %args.config.display(),
        audio_dir = %config.storage.audio_dir.display(),
        "starting podrelay"
    );

    let server = Server::new(&config)?.with_listen_address(listen_address);

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("podrelay stopped");
    Ok(())
}

async fn run_generate(args: &Args, generate_args: &GenerateArgs) -> anyhow::Result<()> {
    let outcome = async {
        let config = Config::load(&args.config)?;
        podrelay_telemetry::init_with_writer(&config.telemetry, std::io::stderr)?;
        generate::run(&config, generate_args).await
    }
    .await;

    match outcome {
        Ok(path) => {
            eprintln!("Podcast generated successfully!");
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error generating podcast: {e}");
            std::process::exit(1);
        }
    }
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
