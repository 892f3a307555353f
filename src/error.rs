use thiserror::Error;

/// Shown when an error carries no usable message of its own.
pub const FALLBACK_MESSAGE: &str = "集計処理でエラーが発生しました";

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The request never completed (connection refused, DNS failure, reset).
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}{}", detail_suffix(detail))]
    Service { status: u16, detail: Option<String> },

    /// A 2xx body that does not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => format!(": {}", d),
        _ => String::new(),
    }
}

impl AnalyticsError {
    /// Message for the error panel: the service detail when there is one,
    /// otherwise the error's own text, otherwise [`FALLBACK_MESSAGE`].
    pub fn display_message(&self) -> String {
        if let AnalyticsError::Service {
            detail: Some(detail),
            ..
        } = self
            && !detail.trim().is_empty()
        {
            return detail.clone();
        }

        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AnalyticsError::Transport(_))
    }
}

impl From<reqwest::Error> for AnalyticsError {
    fn from(err: reqwest::Error) -> AnalyticsError {
        AnalyticsError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> AnalyticsError {
        AnalyticsError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
