use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PdbContextError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Malformed upstream data: {message}")]
    MalformedUpstreamData { message: String },

    #[error("PDB entry '{pdb_id}' not found")]
    NotFound { pdb_id: String },

    #[error("PDB API error (status {status}): {detail}")]
    UpstreamApi { status: u16, detail: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl PdbContextError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed_upstream_data(message: impl Into<String>) -> Self {
        Self::MalformedUpstreamData {
            message: message.into(),
        }
    }

    pub fn not_found(pdb_id: impl Into<String>) -> Self {
        Self::NotFound {
            pdb_id: pdb_id.into(),
        }
    }

    pub fn upstream_api(status: u16, detail: impl Into<String>) -> Self {
        Self::UpstreamApi {
            status,
            detail: detail.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for failures reported by the upstream fetch step.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::UpstreamApi { .. } | Self::Network { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::MalformedUpstreamData { .. } => "MALFORMED_UPSTREAM_DATA",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UpstreamApi { .. } => "UPSTREAM_API_ERROR",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 500,
            Self::MalformedUpstreamData { .. } => 502,
            Self::NotFound { .. } => 404,
            // Upstream server errors pass through, anything else is a bad gateway
            Self::UpstreamApi { status, .. } if *status >= 500 => *status,
            Self::UpstreamApi { .. } => 502,
            Self::Network { .. } => 504,
            Self::Validation { .. } => 422,
            Self::Internal { .. } => 500,
        }
    }
}

pub type PdbContextResult<T> = Result<T, PdbContextError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<PdbContextError> for ErrorResponse {
    fn from(error: PdbContextError) -> Self {
        let message = match &error {
            PdbContextError::NotFound { pdb_id } => format!("PDB entry '{}' not found.", pdb_id),
            PdbContextError::UpstreamApi { .. } | PdbContextError::MalformedUpstreamData { .. } => {
                "Error communicating with the PDB API.".to_string()
            }
            PdbContextError::Network { .. } => {
                "A network error occurred while connecting to an external service.".to_string()
            }
            PdbContextError::Validation { .. } => "Data validation error.".to_string(),
            PdbContextError::Configuration { .. } | PdbContextError::Internal { .. } => {
                "An unspecified application error occurred.".to_string()
            }
        };

        let details = match &error {
            PdbContextError::UpstreamApi { status, .. } => {
                Some(serde_json::json!({ "upstream_status": status }))
            }
            PdbContextError::Validation { field, .. } => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        };

        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message,
            details,
        }
    }
}

// Conversion from common error types
impl From<reqwest::Error> for PdbContextError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::malformed_upstream_data(error.to_string())
        } else {
            Self::network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for PdbContextError {
    fn from(error: serde_json::Error) -> Self {
        Self::malformed_upstream_data(error.to_string())
    }
}

impl From<config::ConfigError> for PdbContextError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
