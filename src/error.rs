use thiserror::Error;

/// Message shown when the service fails without reporting an error text
pub const SERVICE_FALLBACK_MESSAGE: &str = "Recognition service request failed";

/// Message shown when the service succeeds but returns nothing usable
pub const EMPTY_RESULT_MESSAGE: &str = "Could not recognize the image, please try again";

/// Everything that can go wrong between a file selection and a delivered result.
///
/// The `Display` text of each variant is the message rendered in the widget's
/// error banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please select an image file (got {mime})")]
    InvalidType { mime: String },

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("{0}")]
    ServiceError(String),

    #[error("{}", EMPTY_RESULT_MESSAGE)]
    EmptyResult,

    #[error("{0}")]
    UnexpectedFailure(String),
}

/// Fieldless discriminant of [`UploadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidType,
    TooLarge,
    ServiceError,
    EmptyResult,
    UnexpectedFailure,
}

impl UploadError {
    /// Builds a `ServiceError` from the `error` field of a failed response,
    /// falling back to a generic message when it is missing or empty.
    pub fn service(reported: Option<String>) -> Self {
        match reported {
            Some(message) if !message.is_empty() => Self::ServiceError(message),
            _ => Self::ServiceError(SERVICE_FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidType { .. } => ErrorKind::InvalidType,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::ServiceError(_) => ErrorKind::ServiceError,
            Self::EmptyResult => ErrorKind::EmptyResult,
            Self::UnexpectedFailure(_) => ErrorKind::UnexpectedFailure,
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::UnexpectedFailure(format!("Failed to read file: {}", err))
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        Self::UnexpectedFailure(format!("Request failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_uses_reported_message() {
        let err = UploadError::service(Some("quota exceeded".to_string()));
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.kind(), ErrorKind::ServiceError);
    }

    #[test]
    fn test_service_error_falls_back_when_missing_or_empty() {
        assert_eq!(
            UploadError::service(None).to_string(),
            SERVICE_FALLBACK_MESSAGE
        );
        assert_eq!(
            UploadError::service(Some(String::new())).to_string(),
            SERVICE_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn test_service_error_keeps_whitespace_message() {
        assert_eq!(
            UploadError::service(Some("  ".to_string())),
            UploadError::ServiceError("  ".to_string())
        );
    }

    #[test]
    fn test_validation_errors() {
        let too_large = UploadError::TooLarge {
            size: 6_000_000,
            max: 5_242_880,
        };
        assert_eq!(too_large.kind(), ErrorKind::TooLarge);
        assert_eq!(
            too_large.to_string(),
            "Image too large: 6000000 bytes (max: 5242880 bytes)"
        );
        assert_eq!(UploadError::EmptyResult.to_string(), EMPTY_RESULT_MESSAGE);
    }
}
