use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::CoreError;

pub const CODE_OK: u16 = 0;
pub const CODE_JSON_DECODE: u16 = 100;
pub const CODE_BAD_REQUEST: u16 = 101;
pub const CODE_INVALID_PARAM: u16 = 102;
pub const CODE_ENTRY_NOT_FOUND: u16 = 103;
pub const CODE_USER_NOT_FOUND: u16 = 104;
pub const CODE_CONFLICT: u16 = 202;
pub const CODE_UNAUTHENTICATED: u16 = 401;
pub const CODE_INTERNAL: u16 = 500;

/// Response body shared by every endpoint.
///
/// ```json
/// { "code": 0, "message": "", "data": ... }
/// ```
///
/// A non-zero `code` is an error. Errors the caller can act on are sent with
/// HTTP 200; internal failures with HTTP 500 and a generic message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiEnvelope {
    pub code: u16,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

/// Successful response carrying `data`.
#[derive(Debug)]
pub struct ApiOk<T>(pub T);

#[derive(Serialize)]
struct OkBody<T> {
    code: u16,
    message: &'static str,
    data: T,
}

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        Json(OkBody {
            code: CODE_OK,
            message: "",
            data: self.0,
        })
        .into_response()
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiEnvelope,
}

impl ApiError {
    pub fn new(status: StatusCode, code: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiEnvelope {
                code,
                message: message.into(),
                data: None,
            },
        }
    }

    pub fn json_decode(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, CODE_JSON_DECODE, message)
    }

    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, CODE_INVALID_PARAM, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, CODE_UNAUTHENTICATED, message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_INTERNAL,
            "internal error",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> u16 {
        self.body.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if !err.is_recoverable() {
            match &err {
                CoreError::Tree(tree) => {
                    tracing::error!(kind = tree.kind(), error = %err, "request failed")
                }
                _ => tracing::error!(error = %err, "request failed"),
            }
            return Self::internal();
        }
        let code = match &err {
            CoreError::Tree(tree) => {
                tracing::debug!(kind = tree.kind(), error = %err, "request rejected");
                tree.code()
            }
            CoreError::UserNotFound(_) => CODE_USER_NOT_FOUND,
            CoreError::AppNotFound(_) => CODE_ENTRY_NOT_FOUND,
            CoreError::BadRequest(_) => CODE_BAD_REQUEST,
            CoreError::Conflict(_) => {
                tracing::warn!(error = %err, "concurrent tree write rejected");
                CODE_CONFLICT
            }
            CoreError::Storage(_) | CoreError::Internal(_) => CODE_INTERNAL,
        };
        Self::new(StatusCode::OK, code, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::json_decode(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_param(rejection.body_text())
    }
}
