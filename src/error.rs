// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Request(String),
    #[error("Upstream returned status {0}")]
    Upstream(u16),
    #[error("URL did not return HTML")]
    NotHtml,
    #[error("Invalid JSON from upstream: {0}")]
    InvalidJson(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Request(format!("TimeoutError: {}", e))
        } else if e.is_connect() {
            FetchError::Request(format!("ConnectError: {}", e))
        } else if let Some(status) = e.status() {
            FetchError::Upstream(status.as_u16())
        } else {
            FetchError::Request(format!("RequestError: {}", e))
        }
    }
}
