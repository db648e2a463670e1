use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
///
/// Every upstream failure is classified into exactly one of these variants
/// before it reaches the caller-facing layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Schema error: {0}")]
    SchemaInvalid(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Transient classes are eligible for retry; every other class must
    /// propagate immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable(_) | AppError::NetworkFailure(_)
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::ColumnNotFound(col) => {
                AppError::SchemaInvalid(format!("Unknown column: {}", col))
            }
            sqlx::Error::TypeNotFound { type_name } => {
                AppError::SchemaInvalid(format!("Unknown type: {}", type_name))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                AppError::SchemaInvalid(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(e) => AppError::SchemaInvalid(format!("Failed to decode row: {}", e)),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AppError::UpstreamUnavailable("Database connection pool unavailable".to_string())
            }
            sqlx::Error::Io(e) => AppError::UpstreamUnavailable(format!("Database I/O error: {}", e)),
            sqlx::Error::Database(e) => {
                let msg = e.message().to_string();
                if msg.contains("locked") || msg.contains("busy") {
                    AppError::UpstreamUnavailable(msg)
                } else if msg.contains("no such table") || msg.contains("no such column") {
                    AppError::SchemaInvalid(msg)
                } else {
                    AppError::Unknown(msg)
                }
            }
            other => AppError::Unknown(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(e.to_string()),
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::TimedOut => AppError::NetworkFailure(e.to_string()),
            _ => AppError::Unknown(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            return AppError::NetworkFailure(e.to_string());
        }
        match e.status() {
            Some(status) => classify_status(status.as_u16(), e.to_string()),
            None => AppError::Unknown(e.to_string()),
        }
    }
}

/// Map an upstream HTTP status onto the error taxonomy.
///
/// A 400 carrying an `invalid_structure` marker is a backing-store schema
/// mismatch, not a bad request from our caller.
pub fn classify_status(status: u16, detail: String) -> AppError {
    match status {
        503 => AppError::UpstreamUnavailable(detail),
        502 | 504 => AppError::NetworkFailure(detail),
        413 => AppError::PayloadTooLarge(detail),
        404 => AppError::NotFound(detail),
        400 if detail.contains("invalid_structure") => AppError::SchemaInvalid(detail),
        400 => AppError::InvalidInput(detail),
        _ => AppError::Unknown(detail),
    }
}

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn success_message(message: &str) -> ApiResponse<()> {
        ApiResponse {
            code: 0,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn error(code: i32, message: &str) -> ApiResponse<()> {
        ApiResponse {
            code,
            message: message.to_string(),
            data: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 401, msg.clone()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, 400, msg.clone()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, 413, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 404, msg.clone()),
            AppError::NetworkFailure(msg) => {
                tracing::error!("Network failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    502,
                    "Network error. Please check your connection and try again.".to_string(),
                )
            }
            AppError::UpstreamUnavailable(msg) => {
                tracing::warn!("Upstream unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    503,
                    "Service temporarily unavailable. Please try again in a few moments."
                        .to_string(),
                )
            }
            AppError::SchemaInvalid(msg) => {
                tracing::error!("Backing store schema error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    500,
                    "Store schema error. Please ensure the backing stores are properly configured."
                        .to_string(),
                )
            }
            AppError::Decode(msg) => {
                tracing::error!("Decode error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 500, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 500, msg.clone())
            }
            AppError::Unknown(msg) => {
                tracing::error!("Unhandled error: {}", msg);
                // Full detail stays server-side; callers get a generic message
                // outside debug builds.
                let message = if cfg!(debug_assertions) {
                    format!("Something went wrong. Please try again later. ({})", msg)
                } else {
                    "Something went wrong. Please try again later.".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, 500, message)
            }
        };

        let body = Json(ApiResponse::<()>::error(code, &message));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn sqlx_schema_errors_are_not_transient() {
        let err = AppError::from(sqlx::Error::ColumnNotFound("uploaded_at".to_string()));
        assert!(matches!(err, AppError::SchemaInvalid(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(AppError::from(io), AppError::NotFound(_)));
    }

    #[test]
    fn io_connection_errors_are_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = AppError::from(io);
        assert!(matches!(err, AppError::NetworkFailure(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(503, "down".into()),
            AppError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            classify_status(413, "big".into()),
            AppError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            classify_status(404, "gone".into()),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(400, "bad".into()),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            classify_status(400, "document_invalid_structure".into()),
            AppError::SchemaInvalid(_)
        ));
        assert!(matches!(
            classify_status(418, "teapot".into()),
            AppError::Unknown(_)
        ));
    }

    #[test]
    fn api_response_omits_absent_data() {
        let value = serde_json::to_value(ApiResponse::<()>::success_message("File deleted")).unwrap();
        assert_eq!(value["code"], 0);
        assert_eq!(value["message"], "File deleted");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn only_network_and_unavailable_are_transient() {
        assert!(AppError::UpstreamUnavailable("x".into()).is_transient());
        assert!(AppError::NetworkFailure("x".into()).is_transient());
        assert!(!AppError::InvalidInput("x".into()).is_transient());
        assert!(!AppError::NotFound("x".into()).is_transient());
        assert!(!AppError::Unknown("x".into()).is_transient());
    }
}
