use std::path::PathBuf;

/// Everything that can end a demo run early.
///
/// Role elevation failures are not here: that step only warns.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("{marker} not found in {}", dir.display())]
    MarkerMissing { marker: String, dir: PathBuf },

    #[error("Fleet API is not reachable at {url}: {reason}")]
    ApiUnreachable { url: String, reason: String },

    /// Transport failure on a call after the liveness check.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered a call with a non-2xx status.
    #[error("{method} {path} returned {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("Response from {context} is not valid JSON: {source}")]
    InvalidJson {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {context} has no usable `{field}` field")]
    MissingField { field: &'static str, context: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    /// Guidance printed after a failed precondition.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            DemoError::MarkerMissing { .. } => Some(
                "Run the demo from the RoboFleet project root (the directory with docker-compose.yml).",
            ),
            DemoError::ApiUnreachable { .. } => Some(
                "Start the stack with `docker compose up -d`, wait for the API to come up, then re-run the demo.",
            ),
            _ => None,
        }
    }
}
