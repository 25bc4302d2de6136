//! Error types for the ogc-layer-registry crates.

use thiserror::Error;

/// Result type alias using OgcError.
pub type OgcResult<T> = Result<T, OgcError>;

/// Primary error type for discovery, parsing and reconciliation.
#[derive(Debug, Error)]
pub enum OgcError {
    // === Transport Errors ===
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout")]
    Timeout,

    // === Parse Errors ===
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("No OGC service found at {url}: {attempts}")]
    NoServiceFound { url: String, attempts: String },

    // === Validation Errors ===
    #[error("Unknown service type: {0}")]
    UnknownServiceType(String),

    #[error("Layer resource already exists: {service_url} - {layer_name} ({service_type})")]
    DuplicateResource {
        service_url: String,
        layer_name: String,
        service_type: String,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    // === Storage Errors ===
    #[error("Repository error: {0}")]
    Repository(String),
}

impl OgcError {
    /// Whether the error is recoverable at the per-candidate or
    /// per-protocol-attempt level (transport and parse failures), as
    /// opposed to a rejected operation the caller must handle.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OgcError::Transport { .. }
                | OgcError::HttpStatus { .. }
                | OgcError::Timeout
                | OgcError::XmlParse(_)
                | OgcError::JsonParse(_)
        )
    }
}

impl From<serde_json::Error> for OgcError {
    fn from(err: serde_json::Error) -> Self {
        OgcError::JsonParse(err.to_string())
    }
}
