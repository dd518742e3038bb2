use crate::http::AppState;
use crate::http::handler::authors::{AuthorHttpRequest, AuthorHttpResponse};
use crate::http::handler::{ApiError, ApiSuccess, IdPath, JsonBody, SearchParams};
use crate::models::{Book, BookPayload, FindBookRequest};
use crate::repositories::{AuthorRepository, BookRepository};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Book fields accepted on create and update. `authors`, if sent, is
/// ignored; use the attach endpoint to link authors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookHttpRequest {
    id: Option<i64>,
    isbn: Option<i64>,
    title: Option<String>,
    #[serde(default)]
    year: i32,
    publisher: Option<String>,
    language: Option<String>,
}

impl From<BookHttpRequest> for BookPayload {
    fn from(value: BookHttpRequest) -> Self {
        Self {
            id: value.id,
            isbn: value.isbn,
            title: value.title,
            year: value.year,
            publisher: value.publisher,
            language: value.language,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookHttpResponse {
    id: i64,
    isbn: i64,
    title: String,
    year: i32,
    publisher: Option<String>,
    language: Option<String>,
    authors: Vec<AuthorHttpResponse>,
}

impl From<&Book> for BookHttpResponse {
    fn from(value: &Book) -> Self {
        Self {
            id: value.id(),
            isbn: value.isbn().value(),
            title: value.title().to_string(),
            year: value.year().value(),
            publisher: value.publisher().map(Into::into),
            language: value.language().map(|language| language.to_string()),
            authors: value.authors().iter().map(AuthorHttpResponse::from).collect(),
        }
    }
}

fn to_responses(books: &[Book]) -> Vec<BookHttpResponse> {
    books.iter().map(BookHttpResponse::from).collect()
}

pub async fn list_books<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    Query(params): Query<SearchParams>,
) -> Result<ApiSuccess<Vec<BookHttpResponse>>, ApiError> {
    let books = state.book_service().list_books(params.query()).await?;
    Ok(ApiSuccess::new(StatusCode::OK, to_responses(&books)))
}

pub async fn list_author_books<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(author_id): IdPath,
) -> Result<ApiSuccess<Vec<BookHttpResponse>>, ApiError> {
    let books = state.book_service().list_author_books(author_id).await?;
    Ok(ApiSuccess::new(StatusCode::OK, to_responses(&books)))
}

pub async fn find_book<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(id): IdPath,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    state
        .book_service()
        .find_book(&FindBookRequest::new(id))
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, (&book).into()))
}

pub async fn create_book<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(author_id): IdPath,
    JsonBody(body): JsonBody<BookHttpRequest>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    state
        .book_service()
        .create_book(author_id, body.into())
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::CREATED, (&book).into()))
}

pub async fn update_book<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(book_id): IdPath,
    JsonBody(body): JsonBody<BookHttpRequest>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    state
        .book_service()
        .update_book(book_id, body.into())
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, (&book).into()))
}

pub async fn delete_book<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state.book_service().delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn attach_author<AR: AuthorRepository, BR: BookRepository>(
    State(state): State<AppState<AR, BR>>,
    IdPath(book_id): IdPath,
    JsonBody(body): JsonBody<AuthorHttpRequest>,
) -> Result<ApiSuccess<BookHttpResponse>, ApiError> {
    state
        .book_service()
        .attach_author(book_id, body.into())
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, (&book).into()))
}
