use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("ISBN already exists")]
    DuplicateKey,

    #[error("No fields to update")]
    NothingToUpdate,

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Internal server error")]
    InternalError(#[source] bookshelf_dal::Error),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorDetail {
    pub detail: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::InvalidQuery(_)
            | ApiError::DuplicateKey
            | ApiError::NothingToUpdate => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::InternalError(e) => error!("Internal error: {e}"),
            other => debug!("Request failed with {status}: {other}"),
        }
        let body = ErrorDetail {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<bookshelf_dal::Error> for ApiError {
    fn from(err: bookshelf_dal::Error) -> Self {
        match err {
            bookshelf_dal::Error::RecordNotFound(what) => ApiError::ResourceNotFound(what),
            bookshelf_dal::Error::DuplicateKey(_) => ApiError::DuplicateKey,
            bookshelf_dal::Error::NothingToUpdate => ApiError::NothingToUpdate,
            other => ApiError::InternalError(other),
        }
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        ApiError::InvalidRequest(report.to_string().trim_end().to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}
