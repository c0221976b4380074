//! Deepfake detector server module
//!
//! Single-endpoint inference service: `POST /predict` takes a multipart image
//! upload and answers with a JSON verdict.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::{read_upload, PredictResponse, Upload, FILE_FIELD};
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::inference::{InferenceConfig, InferenceEngine, DEFAULT_THRESHOLD};
use crate::preprocessing::{ImagePreprocessor, PreprocessingConfig, TensorLayout};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub staging_dir: PathBuf,
    /// Request body limit in bytes; `None` accepts bodies of any size
    pub max_upload_size: Option<usize>,
    pub threshold: f32,
    pub layout: TensorLayout,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("API_PORT", 5000),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("deepfake_detection_model.onnx")),
            staging_dir: std::env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE").ok().and_then(|v| v.parse().ok()),
            threshold: env_or("CLASSIFICATION_THRESHOLD", DEFAULT_THRESHOLD),
            layout: env_or("TENSOR_LAYOUT", TensorLayout::Nhwc),
        }
    }
}

impl ServerConfig {
    pub fn preprocessing_config(&self) -> PreprocessingConfig {
        PreprocessingConfig::new().with_layout(self.layout)
    }

    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig::new().with_threshold(self.threshold)
    }
}

/// Start the server with the given configuration.
///
/// The model is loaded and warmed up before the listener binds; a model that
/// fails to load aborts startup.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model = %config.model_path.display(),
        staging_dir = %config.staging_dir.display(),
        threshold = config.threshold,
        layout = ?config.layout,
        started_at = %start_time.to_rfc3339(),
        "Initializing deepfake detector"
    );

    let preprocessor = ImagePreprocessor::with_config(config.preprocessing_config());
    let engine = InferenceEngine::load(config.inference_config(), preprocessor, &config.model_path)
        .inspect_err(|e| error!(error = %e, "Failed to load model"))?;

    let state = Arc::new(AppState::new(config.clone(), engine));
    state.staging.ensure_dir()?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        max_upload_size = ?config.max_upload_size,
        "Deepfake detector starting"
    );
    info!(url = %format!("http://{}/predict", addr), "Prediction endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
