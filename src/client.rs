//! HTTP side of the upload: one JSON request to the OCR collaborator.

use crate::config::Config;
use crate::error::UploadError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque structured result returned by the OCR collaborator
pub type ParseResult = Value;

/// Request body sent to the OCR collaborator
#[derive(Debug, Serialize)]
pub struct OcrRequest<'a> {
    /// Base64 payload without a data-URI prefix
    pub image: &'a str,
}

/// Response body, on success or failure
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OcrResponseBody {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl OcrResponseBody {
    /// Parse a raw response body.
    ///
    /// A success body only contributes its `data` field, whatever else it
    /// carries. A failure body is read for its `error` text; anything that is
    /// not JSON of that shape gets the fallback message.
    pub fn parse(success: bool, text: &str) -> Result<Self, UploadError> {
        if !success {
            return Ok(serde_json::from_str(text).unwrap_or_default());
        }
        let value: Value = serde_json::from_str(text).map_err(|e| {
            UploadError::UnexpectedFailure(format!(
                "Invalid response from recognition service: {}",
                e
            ))
        })?;
        Ok(Self {
            data: value.get("data").cloned(),
            error: None,
        })
    }
}

/// What came back from one request
#[derive(Debug, Clone)]
pub struct OcrReply {
    pub success: bool,
    pub body: OcrResponseBody,
}

impl OcrReply {
    /// Turn the reply into the parse result or the error to display
    pub fn into_result(self) -> Result<ParseResult, UploadError> {
        if !self.success {
            return Err(UploadError::service(self.body.error));
        }
        match self.body.data {
            Some(data) if is_truthy(&data) => Ok(data),
            _ => Err(UploadError::EmptyResult),
        }
    }
}

/// Whether a JSON value counts as a usable result
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The external OCR collaborator
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn recognize(&self, image: &str) -> Result<OcrReply, UploadError>;
}

/// Talks to the OCR collaborator over HTTP
#[derive(Debug, Clone)]
pub struct HttpOcrClient {
    http: reqwest::Client,
    url: String,
}

impl HttpOcrClient {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            url: config.url(),
        })
    }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
    async fn recognize(&self, image: &str) -> Result<OcrReply, UploadError> {
        tracing::info!("Sending {} base64 chars to {}", image.len(), self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&OcrRequest { image })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!("OCR service responded with {}", status);
        }
        let body = OcrResponseBody::parse(status.is_success(), &text)?;

        Ok(OcrReply {
            success: status.is_success(),
            body,
        })
    }
}
