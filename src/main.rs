//! Deepfake detector - main entry point

use clap::Parser;
use deepfake_detector::cli::{cmd_predict, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Verbose by default for this crate; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deepfake_detector=debug,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => {
            cmd_serve(args).await?;
        }
        Some(Commands::Predict { images, model }) => {
            tokio::task::spawn_blocking(move || cmd_predict(&images, &model)).await??;
        }
        None => {
            cmd_serve(Default::default()).await?;
        }
    }

    Ok(())
}
