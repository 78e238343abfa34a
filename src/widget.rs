//! The upload widget: validates a selection, previews it, sends it for
//! recognition and hands the parse result to the caller.

use crate::client::{OcrClient, ParseResult};
use crate::config::Config;
use crate::encode::{encode_file, to_data_url};
use crate::error::{ErrorKind, UploadError};
use crate::file::{FileReader, SelectedFile};
use crate::view::View;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;

/// Receives each successful parse result, unmodified
pub type ResultSink = Box<dyn FnMut(ParseResult) + Send>;

/// Displayable form of the selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub mime: String,
    pub data_url: String,
    pub size: u64,
}

/// Everything the widget renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub uploading: bool,
    pub error: Option<String>,
    pub preview: Option<Preview>,
}

/// The picker control. Holds the last selection until it is reset.
#[derive(Debug, Clone, Default)]
pub struct FileInput {
    value: Option<SelectedFile>,
}

impl FileInput {
    pub fn value(&self) -> Option<&SelectedFile> {
        self.value.as_ref()
    }

    /// Clear the control so the same file can be picked again
    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// How a selection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No file, or the picker was disabled
    Ignored,
    /// The parse result reached the result sink
    Delivered,
    Failed(ErrorKind),
}

/// Shared view of the widget state, usable while an upload is in flight
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    state: Arc<watch::Sender<WidgetState>>,
}

impl WidgetHandle {
    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> View {
        View::render(&self.state.borrow())
    }

    /// Receives every state change
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }

    /// Drop the preview and any error. The uploading flag is left alone.
    pub fn cancel(&self) {
        self.state.send_modify(|state| {
            state.preview = None;
            state.error = None;
        });
    }
}

/// Marks the widget as uploading for as long as it lives
struct UploadingGuard<'a> {
    state: &'a watch::Sender<WidgetState>,
}

impl<'a> UploadingGuard<'a> {
    fn engage(state: &'a watch::Sender<WidgetState>) -> Self {
        state.send_modify(|state| {
            state.error = None;
            state.uploading = true;
        });
        Self { state }
    }
}

impl Drop for UploadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.uploading = false);
    }
}

pub struct UploadWidget {
    config: Config,
    reader: Arc<dyn FileReader>,
    client: Arc<dyn OcrClient>,
    on_result: ResultSink,
    handle: WidgetHandle,
    input: FileInput,
}

impl UploadWidget {
    pub fn new(
        config: Config,
        reader: Arc<dyn FileReader>,
        client: Arc<dyn OcrClient>,
        on_result: impl FnMut(ParseResult) + Send + 'static,
    ) -> Self {
        let (state, _) = watch::channel(WidgetState::default());
        Self {
            config,
            reader,
            client,
            on_result: Box::new(on_result),
            handle: WidgetHandle {
                state: Arc::new(state),
            },
            input: FileInput::default(),
        }
    }

    /// A handle that stays usable while `select` is running
    pub fn handle(&self) -> WidgetHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.handle.subscribe()
    }

    pub fn is_uploading(&self) -> bool {
        self.handle.state.borrow().uploading
    }

    pub fn error_message(&self) -> Option<String> {
        self.handle.state.borrow().error.clone()
    }

    pub fn preview(&self) -> Option<Preview> {
        self.handle.state.borrow().preview.clone()
    }

    pub fn file_input(&self) -> &FileInput {
        &self.input
    }

    pub fn state(&self) -> WidgetState {
        self.handle.state()
    }

    pub fn view(&self) -> View {
        self.handle.view()
    }

    /// Check type and size before anything is read or sent
    pub fn validate(&self, file: &SelectedFile) -> Result<(), UploadError> {
        if !file.is_image() {
            return Err(UploadError::InvalidType {
                mime: file.mime.clone(),
            });
        }
        if file.size > self.config.max_file_size {
            return Err(UploadError::TooLarge {
                size: file.size,
                max: self.config.max_file_size,
            });
        }
        Ok(())
    }

    /// Handle a selection from the picker and run the upload to completion
    pub async fn select(&mut self, file: Option<SelectedFile>) -> Outcome {
        let Some(file) = file else {
            return Outcome::Ignored;
        };
        if self.is_uploading() {
            tracing::warn!("Ignoring {} while an upload is in flight", file.file_name());
            return Outcome::Ignored;
        }

        self.input.value = Some(file.clone());

        if let Err(err) = self.validate(&file) {
            tracing::warn!("Rejected {}: {}", file.file_name(), err);
            let message = err.to_string();
            self.handle
                .state
                .send_modify(|state| state.error = Some(message));
            return Outcome::Failed(err.kind());
        }

        let state = self.handle.state.as_ref();
        let _uploading = UploadingGuard::engage(state);
        tracing::info!(
            "Uploading {} ({}, {} bytes)",
            file.file_name(),
            file.mime,
            file.size
        );

        let reader = self.reader.as_ref();
        let client = self.client.as_ref();
        let preview = async {
            if let Some(preview) = read_preview(reader, &file).await {
                state.send_modify(|state| state.preview = Some(preview));
            }
        };
        let flow = AssertUnwindSafe(async {
            let ((), result) = tokio::join!(preview, submit(reader, client, &file));
            result
        })
        .catch_unwind()
        .await;

        let result = match flow {
            Ok(result) => result,
            Err(panic) => Err(UploadError::UnexpectedFailure(panic_message(panic))),
        };

        match result {
            Ok(data) => {
                tracing::info!("Recognized {}", file.file_name());
                (self.on_result)(data);
                state.send_modify(|state| state.preview = None);
                self.input.reset();
                Outcome::Delivered
            }
            Err(err) => {
                tracing::warn!("Upload of {} failed: {}", file.file_name(), err);
                let kind = err.kind();
                let message = err.to_string();
                state.send_modify(|state| state.error = Some(message));
                Outcome::Failed(kind)
            }
        }
    }

    /// Drop the preview and any error
    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

/// Best-effort read for display; a failure only costs the preview
async fn read_preview(reader: &dyn FileReader, file: &SelectedFile) -> Option<Preview> {
    match reader.read(file).await {
        Ok(bytes) => Some(Preview {
            mime: file.mime.clone(),
            data_url: to_data_url(&file.mime, &bytes),
            size: bytes.len() as u64,
        }),
        Err(e) => {
            tracing::warn!("Preview of {} unavailable: {}", file.file_name(), e);
            None
        }
    }
}

async fn submit(
    reader: &dyn FileReader,
    client: &dyn OcrClient,
    file: &SelectedFile,
) -> Result<ParseResult, UploadError> {
    let payload = encode_file(reader, file).await?;
    client.recognize(&payload).await?.into_result()
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unexpected failure".to_string()
    }
}
