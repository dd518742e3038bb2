use crate::http::AppState;
use crate::http::handler::{ApiError, ApiSuccess, IdPath, JsonBody, SearchParams};
use crate::models::{Author, AuthorPayload, FindAuthorRequest};
use crate::repositories::{AuthorRepository, BookRepository};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorHttpRequest {
    id: Option<i64>,
    full_name: Option<String>,
}

impl From<AuthorHttpRequest> for AuthorPayload {
    fn from(value: AuthorHttpRequest) -> Self {
        Self {
            id: value.id,
            full_name: value.full_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorHttpResponse {
    id: i64,
    full_name: String,
}

impl From<&Author> for AuthorHttpResponse {
    fn from(value: &Author) -> Self {
        Self {
            id: value.id(),
            full_name: value.full_name().to_string(),
        }
    }
}

pub async fn list_authors<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    Query(params): Query<SearchParams>,
) -> Result<ApiSuccess<Vec<AuthorHttpResponse>>, ApiError> {
    let authors = state.author_service().list_authors(params.query()).await?;
    let authors = authors.iter().map(AuthorHttpResponse::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, authors))
}

pub async fn find_author<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(id): IdPath,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    state
        .author_service()
        .find_author(&FindAuthorRequest::new(id))
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::OK, (&author).into()))
}

pub async fn create_author<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    JsonBody(body): JsonBody<AuthorHttpRequest>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    state
        .author_service()
        .create_author(body.into())
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::CREATED, (&author).into()))
}

pub async fn update_author<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody<AuthorHttpRequest>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    state
        .author_service()
        .update_author(id, body.into())
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::OK, (&author).into()))
}

pub async fn delete_author<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state.author_service().delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
