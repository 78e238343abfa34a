//! Selected files and the capability used to read them.

use async_trait::async_trait;
use image::ImageFormat;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// A file the user picked: where it lives, what it claims to be, how big it is.
///
/// Content is not held here; it is pulled through a [`FileReader`] so the
/// widget can be driven without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub mime: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
            size,
        }
    }

    /// Builds a selection from a file on disk, detecting its MIME type
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let mime = detect_mime(path)?;
        Ok(Self::new(path, mime, size))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Guess a MIME type: extension first, then the leading bytes of the file
fn detect_mime(path: &Path) -> std::io::Result<String> {
    if let Ok(format) = ImageFormat::from_path(path) {
        return Ok(format.to_mime_type().to_string());
    }

    let mut head = [0u8; 64];
    let read = std::fs::File::open(path)?.read(&mut head)?;
    Ok(image::guess_format(&head[..read])
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| OCTET_STREAM.to_string()))
}

/// Reads the binary content of a selected file
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read(&self, file: &SelectedFile) -> std::io::Result<Vec<u8>>;
}

/// Reads files from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

#[async_trait]
impl FileReader for FsFileReader {
    async fn read(&self, file: &SelectedFile) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&file.path).await
    }
}
