use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use clap::Parser;
use serde::Serialize;
use serde_json::json;

use voxscribe_core::transcription::domain::device::{self, Device, DevicePreference};
use voxscribe_core::transcription::domain::engine::{InferenceEngine, TranscribeOptions};
use voxscribe_core::transcription::domain::model::ModelSize;
use voxscribe_core::transcription::infrastructure::device_probe;
use voxscribe_core::transcription::infrastructure::whisper_cli_engine::WhisperCliEngine;
use voxscribe_core::format::domain::output_format::OutputFormat;
use voxscribe_core::format::domain::transcript_writer::TranscriptWriter;
use voxscribe_core::format::infrastructure::writer_factory::create_writer;
use voxscribe_core::shared::model_resolver;

const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// HTTP front end: one multipart transcription endpoint.
#[derive(Parser)]
#[command(name = "voxscribe-server")]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Default whisper model size when the request does not send one.
    #[arg(long, default_value = "base")]
    model: String,

    /// Inference device: auto, cpu, cuda.
    #[arg(long, default_value = "auto")]
    device: String,

    /// Path to the whisper.cpp CLI binary.
    #[arg(long, default_value = "whisper-cli")]
    whisper_binary: PathBuf,
}

/// Builds the engine for a requested model size. Injected so the handler
/// path can be exercised without a real whisper binary.
type EngineFactory = Arc<
    dyn Fn(ModelSize) -> Result<Box<dyn InferenceEngine>, Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync,
>;

struct AppState {
    default_model: ModelSize,
    device: Device,
    engine_factory: EngineFactory,
}

#[derive(Serialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Inference(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Inference(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let preference: DevicePreference = cli.device.parse()?;
    let device = device::resolve(preference, device_probe::accelerated_available())?;
    log::info!("Inference device: {device}");

    let binary = cli.whisper_binary;
    let engine_factory: EngineFactory = Arc::new(move |model| {
        let model_path = model_resolver::resolve(model, None, None)?;
        Ok(Box::new(WhisperCliEngine::new(&binary, &model_path)?) as Box<dyn InferenceEngine>)
    });

    let state = Arc::new(AppState {
        default_model: cli.model.parse::<ModelSize>()?,
        device,
        engine_factory,
    });

    let app = Router::new()
        .route("/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    log::info!("Listening on {}", cli.bind);
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// `POST /transcribe` with multipart fields `file` (required), `model`,
/// `format` and `language`. The upload lives in a scratch file only for the
/// duration of inference.
async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut model = state.default_model;
    let mut format = OutputFormat::Text;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.wav").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;
                audio = Some((file_name, bytes.to_vec()));
            }
            "model" => model = parse_field(field, "model").await?,
            "format" => format = parse_field(field, "format").await?,
            "language" => {
                let value = text_field(field, "language").await?;
                if !value.is_empty() && value != "auto" {
                    language = Some(value);
                }
            }
            other => {
                log::debug!("Ignoring unknown multipart field '{other}'");
            }
        }
    }

    let (file_name, bytes) =
        audio.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    log::info!(
        "Transcribe request: {} bytes, model {model}, format {format}",
        bytes.len()
    );

    let options = TranscribeOptions {
        device: state.device,
        language,
    };
    let factory = state.engine_factory.clone();

    // Inference shells out and blocks; keep it off the async executor.
    let result = tokio::task::spawn_blocking(move || {
        let engine = factory(model).map_err(|e| ApiError::Inference(e.to_string()))?;
        run_inference(engine.as_ref(), format, &file_name, &bytes, &options)
    })
    .await
    .map_err(|e| ApiError::Inference(format!("Worker panicked: {e}")))??;

    Ok(Json(TranscribeResponse { text: result }))
}

/// Stage the upload in a scratch file and run the engine over it.
/// The scratch files are deleted when this returns, success or not.
fn run_inference(
    engine: &dyn InferenceEngine,
    format: OutputFormat,
    file_name: &str,
    bytes: &[u8],
    options: &TranscribeOptions,
) -> Result<String, ApiError> {
    // Keep the original extension so the sidecar picks the right decoder
    let suffix = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| ".wav".to_string());
    let mut scratch = tempfile::Builder::new()
        .prefix("voxscribe-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| ApiError::Inference(format!("Could not stage upload: {e}")))?;
    scratch
        .write_all(bytes)
        .map_err(|e| ApiError::Inference(format!("Could not stage upload: {e}")))?;

    let result = engine
        .transcribe(scratch.path(), options)
        .map_err(|e| ApiError::Inference(e.to_string()))?;

    if format == OutputFormat::Text {
        return Ok(result.text);
    }

    // Other formats are rendered through the regular writers and returned
    // as the response text
    let out_dir = tempfile::tempdir()
        .map_err(|e| ApiError::Inference(format!("Could not stage output: {e}")))?;
    let out_path = out_dir.path().join(format!("transcript.{}", format.extension()));
    create_writer(format)
        .write(&result, &out_path)
        .map_err(|e| ApiError::Inference(e.to_string()))?;
    std::fs::read_to_string(&out_path)
        .map_err(|e| ApiError::Inference(format!("Could not read rendered output: {e}")))
}

async fn text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|value| value.trim().to_string())
        .map_err(|e| ApiError::BadRequest(format!("Could not read field '{name}': {e}")))
}

async fn parse_field<T>(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    text_field(field, name).await?.parse().map_err(ApiError::BadRequest)
}
