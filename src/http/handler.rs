pub mod authors;
pub mod books;

use crate::models::{
    AttachAuthorError, CreateAuthorError, CreateBookError, DeleteAuthorError, DeleteBookError,
    FindAllAuthorsError, FindAllBooksError, FindAuthorBooksError, FindAuthorError, FindBookError,
    UpdateAuthorError, UpdateBookError,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponse<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(ApiResponse::new(status, data)))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    const fn new(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
        }
    }
}

/// Optional `?q=` search text accepted by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref()
    }
}

/// JSON request body. Malformed or mistyped bodies are rejected with a 400
/// in the usual response envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Numeric `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
}

impl ApiError {
    fn internal(cause: &anyhow::Error) -> Self {
        tracing::error!("{cause:?}");
        Self::InternalServerError("Internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(ApiResponse::new(status, msg))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<FindAllAuthorsError> for ApiError {
    fn from(err: FindAllAuthorsError) -> Self {
        Self::internal(&err.0)
    }
}

impl From<FindAuthorError> for ApiError {
    fn from(err: FindAuthorError) -> Self {
        match err {
            FindAuthorError::NotFound { .. } => Self::NotFound(err.to_string()),
            FindAuthorError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<CreateAuthorError> for ApiError {
    fn from(err: CreateAuthorError) -> Self {
        match err {
            CreateAuthorError::InvalidName(_) => Self::BadRequest(err.to_string()),
            CreateAuthorError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<UpdateAuthorError> for ApiError {
    fn from(err: UpdateAuthorError) -> Self {
        match err {
            // A mismatched id is reported as a missing author.
            UpdateAuthorError::IdMismatch { .. } | UpdateAuthorError::NotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            UpdateAuthorError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<DeleteAuthorError> for ApiError {
    fn from(err: DeleteAuthorError) -> Self {
        match err {
            DeleteAuthorError::NotFound { .. } => Self::BadRequest(err.to_string()),
            DeleteAuthorError::Other(cause) => {
                tracing::error!("{cause:?}");
                Self::BadRequest("Author could not be deleted".to_string())
            }
        }
    }
}

impl From<FindAllBooksError> for ApiError {
    fn from(err: FindAllBooksError) -> Self {
        Self::internal(&err.0)
    }
}

impl From<FindBookError> for ApiError {
    fn from(err: FindBookError) -> Self {
        match err {
            FindBookError::NotFound { .. } => Self::NotFound(err.to_string()),
            FindBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<FindAuthorBooksError> for ApiError {
    fn from(err: FindAuthorBooksError) -> Self {
        match err {
            FindAuthorBooksError::AuthorNotFound { .. } => Self::NotFound(err.to_string()),
            FindAuthorBooksError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<CreateBookError> for ApiError {
    fn from(err: CreateBookError) -> Self {
        match err {
            CreateBookError::AuthorNotFound { .. } => Self::NotFound(err.to_string()),
            CreateBookError::Other(cause) => Self::internal(&cause),
            CreateBookError::InvalidLanguage(_)
            | CreateBookError::InvalidTitle(_)
            | CreateBookError::InvalidYear(_)
            | CreateBookError::InvalidIsbn(_)
            | CreateBookError::MissingIsbn
            | CreateBookError::UnknownAuthor { .. } => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<UpdateBookError> for ApiError {
    fn from(err: UpdateBookError) -> Self {
        match err {
            UpdateBookError::IdMismatch { .. } => Self::BadRequest(err.to_string()),
            UpdateBookError::NotFound { .. } => Self::NotFound(err.to_string()),
            UpdateBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<DeleteBookError> for ApiError {
    fn from(err: DeleteBookError) -> Self {
        match err {
            DeleteBookError::NotFound { .. } => Self::BadRequest(err.to_string()),
            DeleteBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<AttachAuthorError> for ApiError {
    fn from(err: AttachAuthorError) -> Self {
        match err {
            AttachAuthorError::BookNotFound { .. } | AttachAuthorError::AuthorNotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            AttachAuthorError::MissingAuthorId => Self::BadRequest(err.to_string()),
            AttachAuthorError::Other(cause) => Self::internal(&cause),
        }
    }
}
