//! Image upload client for an OCR service.
//!
//! An [`UploadWidget`] validates a selected image, previews it, sends its
//! base64 content to the OCR collaborator and passes the parse result to a
//! caller-supplied sink.

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod file;
pub mod view;
pub mod widget;

pub use client::{HttpOcrClient, OcrClient, OcrReply, ParseResult};
pub use config::Config;
pub use error::{ErrorKind, UploadError};
pub use file::{FileReader, FsFileReader, SelectedFile};
pub use view::View;
pub use widget::{Outcome, Preview, UploadWidget, WidgetHandle, WidgetState};
