use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use library_api::database::{DefaultAuthorRepository, DefaultBookRepository, establish_pool};
use library_api::http::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let pool = establish_pool("sqlite::memory:").await.unwrap();
    router(AppState::new(
        DefaultAuthorRepository::new(pool.clone()),
        DefaultBookRepository::new(pool),
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create_author(app: &Router, full_name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/authors",
        Some(json!({ "fullName": full_name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

async fn create_book(app: &Router, author_id: i64, title: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/v1/authors/{author_id}/books"),
        Some(json!({
            "title": title,
            "isbn": 123_456_789_012_i64,
            "year": 2020,
            "language": "ENGLISH"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn deleting_sole_author_keeps_the_book() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/authors",
        Some(json!({ "fullName": "Jane Doe" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({ "status_code": 201, "data": { "id": 1, "fullName": "Jane Doe" } })
    );

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/authors/1/books",
        Some(json!({
            "title": "Book A",
            "isbn": 123_456_789_012_i64,
            "year": 2020,
            "language": "ENGLISH"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Book A");
    assert_eq!(body["data"]["language"], "ENGLISH");
    assert_eq!(
        body["data"]["authors"],
        json!([{ "id": 1, "fullName": "Jane Doe" }])
    );
    let book_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", "/api/v1/authors/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", &format!("/api/v1/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authors"], json!([]));

    let (status, _) = send(&app, "GET", "/api/v1/authors/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_co_author_deletes_the_shared_book() {
    let app = app().await;
    let jane = create_author(&app, "Jane Doe").await;
    let john = create_author(&app, "John Smith").await;
    let book_id = create_book(&app, jane, "Shared").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/books/{book_id}/authors"),
        Some(json!({ "id": john, "fullName": "John Smith" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authors"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/authors/{jane}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/v1/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", &format!("/api/v1/authors/{john}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "John Smith");
}

#[tokio::test]
async fn short_isbn_is_rejected_without_creating_a_book() {
    let app = app().await;
    let jane = create_author(&app, "Jane Doe").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/authors/{jane}/books"),
        Some(json!({ "title": "Book A", "isbn": 123, "year": 2020 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);

    let (status, body) = send(&app, "GET", "/api/v1/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn create_book_for_missing_author_is_not_found() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/authors/9/books",
        Some(json!({ "title": "Book A", "isbn": 123_456_789_012_i64, "year": 2020 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/authors/9/books",
        Some(json!({ "title": "Book A", "language": "Klingon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_book_with_mismatched_id_is_bad_request() {
    let app = app().await;
    let jane = create_author(&app, "Jane Doe").await;
    let book_id = create_book(&app, jane, "Book A").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/books/{book_id}"),
        Some(json!({
            "id": book_id + 1,
            "title": "Book B",
            "isbn": 123_456_789_012_i64,
            "year": 2021
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", &format!("/api/v1/books/{book_id}"), None).await;
    assert_eq!(body["data"]["title"], "Book A");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/books/{book_id}"),
        Some(json!({ "id": book_id, "title": "Book B", "isbn": 42, "year": 2021 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Book B");
    assert_eq!(body["data"]["isbn"], 42);
    assert_eq!(body["data"]["language"], "ENGLISH");
}

#[tokio::test]
async fn update_author_with_mismatched_id_is_not_found() {
    let app = app().await;
    let jane = create_author(&app, "Jane Doe").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/authors/{jane}"),
        Some(json!({ "id": jane + 1, "fullName": "Jane Smith" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/authors/{jane}"),
        Some(json!({ "id": jane, "fullName": "Jane Smith" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Jane Smith");
}

#[tokio::test]
async fn blank_author_name_is_bad_request() {
    let app = app().await;

    for body in [json!({}), json!({ "fullName": "   " })] {
        let (status, _) = send(&app, "POST", "/api/v1/authors", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, body) = send(&app, "GET", "/api/v1/authors", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn deleting_missing_entities_is_bad_request() {
    let app = app().await;

    let (status, _) = send(&app, "DELETE", "/api/v1/authors/3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/api/v1/books/3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_endpoints_filter_by_query() {
    let app = app().await;
    let jane = create_author(&app, "Jane Doe").await;
    create_author(&app, "John Smith").await;
    create_book(&app, jane, "Dune").await;
    create_book(&app, jane, "Emma").await;

    let (_, body) = send(&app, "GET", "/api/v1/authors?q=smith", None).await;
    assert_eq!(body["data"], json!([{ "id": 2, "fullName": "John Smith" }]));

    let (_, body) = send(&app, "GET", "/api/v1/books?q=dun", None).await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].clone())
        .collect();
    assert_eq!(titles, [json!("Dune")]);

    let (status, body) = send(&app, "GET", &format!("/api/v1/authors/{jane}/books"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let app = app().await;

    for uri in [
        "/api/v1/authors/5",
        "/api/v1/books/5",
        "/api/v1/authors/5/books",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["status_code"], 404);
    }

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/books/5/authors",
        Some(json!({ "id": 1, "fullName": "Jane Doe" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mistyped_body_fields_are_bad_request() {
    let app = app().await;
    let jane = create_author(&app, "Jane Doe").await;
    let book_id = create_book(&app, jane, "Book A").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/books/5",
        Some(json!({ "id": 6, "year": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/books/{book_id}"),
        Some(json!({ "id": book_id, "title": "Book B", "isbn": 1e30 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);

    let (_, body) = send(&app, "GET", &format!("/api/v1/books/{book_id}"), None).await;
    assert_eq!(body["data"]["title"], "Book A");
}

#[tokio::test]
async fn non_numeric_path_id_is_bad_request() {
    let app = app().await;

    for uri in ["/api/v1/authors/abc", "/api/v1/books/abc"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status_code"], 400);
    }
}
