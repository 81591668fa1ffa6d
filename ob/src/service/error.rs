//! Order-service error types

use thiserror::Error;

/// Errors that can occur while talking to the order service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    /// Short operator-facing description of the failure
    pub fn notice(&self) -> String {
        match self {
            ServiceError::ApiError { status, .. } => format!("order service rejected the request ({})", status),
            ServiceError::Network(_) | ServiceError::Unavailable(_) => "order service unreachable".to_string(),
            ServiceError::InvalidResponse(_) | ServiceError::Json(_) => {
                "order service sent an unreadable response".to_string()
            }
            ServiceError::InvalidUrl(_) => "order service URL is misconfigured".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ServiceError::ApiError {
            status: 409,
            message: "conflict".to_string(),
        };
        assert_eq!(err.to_string(), "API error 409: conflict");
        assert!(err.notice().contains("409"));
    }

    #[test]
    fn test_notice_for_unreachable() {
        let err = ServiceError::Unavailable("connection refused".to_string());
        assert_eq!(err.notice(), "order service unreachable");
    }
}
