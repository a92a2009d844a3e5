use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    BadRequest(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A success status whose body still carried an `error` field.
    #[error("Error in response body: {0}")]
    ErrorBody(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
            None => body.to_string(),
            Some((cut, _)) => format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            ),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized(truncated),
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Pull the `error` (or `message`) field out of a JSON body, if there is one.
    pub fn message_in_body(body: &str) -> Option<String> {
        let payload: ErrorPayload = serde_json::from_str(body).ok()?;
        payload
            .error
            .or(payload.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    /// The `error` field of a JSON body, ignoring `message`.
    ///
    /// Used on success responses, where only an explicit error marker counts.
    pub fn error_in_body(body: &str) -> Option<String> {
        let payload: ErrorPayload = serde_json::from_str(body).ok()?;
        payload.error.filter(|m| !m.trim().is_empty())
    }

    /// The human-readable message the server attached to this failure.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::ErrorBody(message) => Some(message.clone()),
            ApiError::AccessDenied(body)
            | ApiError::Unauthorized(body)
            | ApiError::NotFound(body)
            | ApiError::BadRequest(body)
            | ApiError::ServerError(body) => Self::message_in_body(body),
            ApiError::RateLimited | ApiError::NetworkError(_) | ApiError::InvalidResponse(_) => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_codes() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "{}"),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "down"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_server_message_from_error_field() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid credentials"}"#,
        );
        assert_eq!(err.server_message().as_deref(), Some("invalid credentials"));
    }

    #[test]
    fn test_server_message_from_message_field() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"Internal Server Error"}"#,
        );
        assert_eq!(err.server_message().as_deref(), Some("Internal Server Error"));
    }

    #[test]
    fn test_server_message_absent() {
        assert_eq!(ApiError::from_status(StatusCode::NOT_FOUND, "<html>").server_message(), None);
        assert_eq!(ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"  "}"#).server_message(), None);
        assert_eq!(ApiError::RateLimited.server_message(), None);
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"é".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated"));

        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
