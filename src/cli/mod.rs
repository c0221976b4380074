//! Command-line interface
//!
//! `serve` (the default) runs the HTTP service; `predict` classifies local
//! image files with the same pipeline and prints the verdicts as JSON lines.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::inference::InferenceEngine;
use crate::preprocessing::{ImagePreprocessor, TensorLayout};
use crate::server::{run_server, ServerConfig};

#[derive(Parser)]
#[command(name = "deepfake-detector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify uploaded images as authentic or deepfake")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Classify local image files
    Predict {
        /// Image files to classify
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,
    },
}

/// Options shared by every command that loads the model
#[derive(Args, Debug, Default, Clone)]
pub struct ModelArgs {
    /// ONNX model file [env: MODEL_PATH]
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Decision threshold; scores below it are reported as "True" [env: CLASSIFICATION_THRESHOLD]
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Model input layout (nhwc or nchw) [env: TENSOR_LAYOUT]
    #[arg(long)]
    pub layout: Option<TensorLayout>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Address to bind [env: API_HOST]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [env: API_PORT]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for transient upload files [env: STAGING_DIR]
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Maximum request body size in bytes; unlimited when unset [env: MAX_UPLOAD_SIZE]
    #[arg(long)]
    pub max_upload_size: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl ModelArgs {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(ref model) = self.model {
            config.model_path = model.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
    }
}

impl ServeArgs {
    /// Environment-derived defaults overridden by explicit flags
    pub fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.staging_dir {
            config.staging_dir = dir;
        }
        if let Some(size) = self.max_upload_size {
            config.max_upload_size = Some(size);
        }
        self.model.apply(&mut config);
        config
    }
}

pub async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    run_server(args.into_config()).await
}

pub fn cmd_predict(images: &[PathBuf], model: &ModelArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    model.apply(&mut config);

    let preprocessor = ImagePreprocessor::with_config(config.preprocessing_config());
    let engine = InferenceEngine::load(config.inference_config(), preprocessor, &config.model_path)?;

    for image in images {
        let start = Instant::now();
        let result = engine.predict_file(image)?;
        info!(
            image = %image.display(),
            score = result.score,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Classified"
        );
        println!(
            "{}",
            serde_json::json!({
                "image": image.display().to_string(),
                "result": result.label(),
                "score": result.score,
            })
        );
    }

    Ok(())
}
