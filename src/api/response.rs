use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

// ============================================================================
// Response envelope
// ============================================================================

/// The uniform `{success, message, data}` envelope every endpoint returns.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }

    /// An empty result set: a normal outcome reported with `success: false`
    /// and the (empty) payload, not an error status.
    pub fn empty(message: impl Into<String>, data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            success: false,
            message: message.into(),
            data: Some(data),
        })
    }

    /// A success with no payload (deletes).
    pub fn message(message: impl Into<String>) -> Json<Envelope<T>> {
        Json(Envelope {
            success: true,
            message: message.into(),
            data: None,
        })
    }

    pub fn none(message: impl Into<String>) -> Json<Envelope<T>> {
        Json(Envelope {
            success: false,
            message: message.into(),
            data: None,
        })
    }
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// An envelope-compatible error: client failures (4xx) keep their message,
/// server failures (5xx) are logged and reported generically.
#[derive(Debug)]
pub enum ApiError {
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Fail(code, msg) | ApiError::Error(code, msg) => (code, msg),
        };
        let body = Json(Envelope::<()> {
            success: false,
            message,
            data: None,
        });
        (status, body).into_response()
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::UNAUTHORIZED, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::NOT_FOUND, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::CONFLICT, message.into())
    }

    /// Detail goes to the server log only; the caller sees a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::Error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    }
}

// ============================================================================
// Custom extractors (reject with envelope-formatted ApiError)
// ============================================================================

/// Drop-in replacement for `axum::Json` that rejects with envelope errors.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let message = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        format!("Invalid request body: {}", err.body_text())
                    }
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body".into(),
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing Content-Type: application/json header".into()
                    }
                    _ => "Failed to read request body".into(),
                };
                Err(ApiError::bad_request(message))
            }
        }
    }
}
