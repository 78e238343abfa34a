use std::time::Duration;

/// Largest image the widget will send (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";
pub const DEFAULT_PATH: &str = "/api/ocr";

/// Upload client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub path: String,
    pub max_file_size: u64,
    /// Transport timeout; `None` leaves it to the HTTP client
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            path: DEFAULT_PATH.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            timeout: None,
        }
    }
}

impl Config {
    /// Full URL of the OCR collaborator
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}
