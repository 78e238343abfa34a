use clap::Parser;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use ocr_upload::{
    Config, FsFileReader, HttpOcrClient, Outcome, SelectedFile, UploadWidget, View, WidgetState,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ocr-upload")]
#[command(about = "Send an image to an OCR service and print the parsed result")]
#[command(version)]
pub struct Args {
    /// Image to upload; without one nothing is sent
    pub file: Option<PathBuf>,

    /// Base URL of the OCR service
    #[arg(long, env = "OCR_UPLOAD_ENDPOINT", default_value = ocr_upload::config::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request path on the OCR service
    #[arg(long, env = "OCR_UPLOAD_PATH", default_value = ocr_upload::config::DEFAULT_PATH)]
    pub path: String,

    /// Maximum image size in bytes (default: 5MB)
    #[arg(long, env = "OCR_UPLOAD_MAX_FILE_SIZE", default_value = "5242880")]
    pub max_file_size: u64,

    /// Request timeout in seconds (transport default if not set)
    #[arg(long, env = "OCR_UPLOAD_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Override the detected MIME type
    #[arg(long)]
    pub mime: Option<String>,

    /// Print only the parse result as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            endpoint: args.endpoint.clone(),
            path: args.path.clone(),
            max_file_size: args.max_file_size,
            timeout: args.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Mirror the widget's loading state on the terminal spinner
async fn follow_progress(mut updates: watch::Receiver<WidgetState>, spinner: ProgressBar) {
    while updates.changed().await.is_ok() {
        let view = View::render(&updates.borrow_and_update());
        if !view.loading {
            spinner.disable_steady_tick();
            continue;
        }
        match &view.preview {
            Some(preview) => spinner.set_message(format!(
                "Recognizing {} {}...",
                preview.mime,
                HumanBytes(preview.size)
            )),
            None => spinner.set_message("Recognizing..."),
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(&args);
    tracing::info!("ocr-upload v{} -> {}", env!("CARGO_PKG_VERSION"), config.url());

    let selection = match &args.file {
        Some(path) => {
            let mut file = SelectedFile::from_path(path)
                .map_err(|e| anyhow::anyhow!("Cannot open {}: {}", path.display(), e))?;
            if let Some(mime) = &args.mime {
                file.mime = mime.clone();
            }
            Some(file)
        }
        None => None,
    };

    let client = HttpOcrClient::new(&config)?;
    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = results.clone();
    let mut widget = UploadWidget::new(
        config,
        Arc::new(FsFileReader),
        Arc::new(client),
        move |data| {
            if let Ok(mut results) = sink.lock() {
                results.push(data);
            }
        },
    );

    let spinner = if args.json || selection.is_none() {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner
    };

    let follower = tokio::spawn(follow_progress(widget.subscribe(), spinner.clone()));
    let outcome = widget.select(selection).await;
    follower.abort();
    spinner.finish_and_clear();

    if !args.json {
        eprint!("{}", widget.view());
    }

    match outcome {
        Outcome::Delivered => {
            let results = results
                .lock()
                .map_err(|_| anyhow::anyhow!("Result sink poisoned"))?;
            for data in results.iter() {
                if args.json {
                    println!("{}", serde_json::to_string(data)?);
                } else {
                    println!("{}", serde_json::to_string_pretty(data)?);
                }
            }
            Ok(())
        }
        Outcome::Ignored => {
            tracing::info!("No file selected");
            Ok(())
        }
        Outcome::Failed(kind) => {
            let message = widget.error_message().unwrap_or_default();
            anyhow::bail!("{:?}: {}", kind, message)
        }
    }
}
