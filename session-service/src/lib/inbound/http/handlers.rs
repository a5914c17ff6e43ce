use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::AuthErrorKind;
use crate::domain::auth::errors::ContextError;

pub mod current_session;
pub mod dummy_login;
pub mod health;
pub mod login;
pub mod refresh_tokens;
pub mod register;
pub mod revoke_tokens;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl ApiError {
    fn internal() -> Self {
        Self::InternalServerError("internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            AuthErrorKind::WrongCredentials => ApiError::BadRequest(err.kind().to_string()),
            AuthErrorKind::InvalidToken | AuthErrorKind::ExpiredToken => {
                ApiError::Unauthorized(err.kind().to_string())
            }
            AuthErrorKind::EmailAlreadyExists => ApiError::Conflict(err.kind().to_string()),
            AuthErrorKind::Unexpected => {
                tracing::error!(op = err.op(), error = ?err, "Unexpected authentication failure");
                ApiError::internal()
            }
        }
    }
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        tracing::error!(error = %err, "Request context misuse");
        ApiError::internal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Access token returned by login, refresh and dummy login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_credentials_is_bad_request() {
        let err = AuthError::new("service.login_user", AuthErrorKind::WrongCredentials);
        let response = ApiError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["status_code"], 400);
        assert_eq!(body["data"]["message"], "invalid credentials");
    }

    #[tokio::test]
    async fn test_unexpected_hides_cause() {
        let err = AuthError::wrap(
            "service.refresh_tokens",
            AuthErrorKind::Unexpected,
            "connection refused by 10.1.2.3",
        );
        let response = ApiError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["data"]["message"], "internal server error");
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        for kind in [AuthErrorKind::InvalidToken, AuthErrorKind::ExpiredToken] {
            let api_error = ApiError::from(AuthError::new("service.token_claims", kind));
            assert!(matches!(api_error, ApiError::Unauthorized(_)));
        }
    }

    #[test]
    fn test_missing_claims_is_internal() {
        assert_eq!(
            ApiError::from(ContextError::ClaimsNotPresent),
            ApiError::internal()
        );
    }
}
