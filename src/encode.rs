//! Base64 encoding of selected files.

use crate::error::UploadError;
use crate::file::{FileReader, SelectedFile};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Build a `data:<mime>;base64,<payload>` URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// Strip everything up to and including the first comma of a data URL.
///
/// Input without a data-URI prefix is returned unchanged.
pub fn strip_data_url_prefix(encoded: &str) -> &str {
    if !encoded.starts_with("data:") {
        return encoded;
    }
    encoded
        .split_once(',')
        .map(|(_, payload)| payload)
        .unwrap_or("")
}

/// Read a file and encode it as the base64 payload sent to the OCR service
pub async fn encode_file(
    reader: &dyn FileReader,
    file: &SelectedFile,
) -> Result<String, UploadError> {
    let bytes = reader.read(file).await?;
    let data_url = to_data_url(&file.mime, &bytes);
    tracing::debug!(
        "Encoded {} ({} bytes -> {} chars)",
        file.file_name(),
        bytes.len(),
        data_url.len()
    );
    Ok(strip_data_url_prefix(&data_url).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticReader(Result<Vec<u8>, std::io::ErrorKind>);

    #[async_trait]
    impl FileReader for StaticReader {
        async fn read(&self, _file: &SelectedFile) -> std::io::Result<Vec<u8>> {
            self.0.clone().map_err(std::io::Error::from)
        }
    }

    #[test]
    fn test_data_url_format() {
        assert_eq!(to_data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(
            strip_data_url_prefix("data:image/jpeg;base64,/9j/4AAQ"),
            "/9j/4AAQ"
        );
        assert_eq!(strip_data_url_prefix("YWJj"), "YWJj");
        assert_eq!(strip_data_url_prefix("data:image/png;base64"), "");
    }

    #[tokio::test]
    async fn test_encode_file_has_no_prefix() {
        let reader = StaticReader(Ok(vec![0xFF, 0xD8, 0xFF, 0xE0]));
        let file = SelectedFile::new("receipt.jpg", "image/jpeg", 4);

        let payload = encode_file(&reader, &file).await.unwrap();
        assert_eq!(payload, BASE64_STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!payload.starts_with("data:"));
    }

    #[tokio::test]
    async fn test_encode_file_read_failure() {
        let reader = StaticReader(Err(std::io::ErrorKind::PermissionDenied));
        let file = SelectedFile::new("receipt.jpg", "image/jpeg", 4);

        let err = encode_file(&reader, &file).await.unwrap_err();
        assert!(matches!(err, UploadError::UnexpectedFailure(_)));
    }
}
