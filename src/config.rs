pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "RETAIL_ANALYTICS_API_URL";

pub const DEFAULT_TOP_N: u32 = 10;
pub const DEFAULT_INPUT_FILE: &str = "./onlineRetail.xlsx";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Normalise a base URL taken from the command line or `RETAIL_ANALYTICS_API_URL`.
    /// A blank value falls back to the local default.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Self::default();
        }
        Self {
            base_url: base_url.to_string(),
        }
    }
}
