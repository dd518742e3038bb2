pub mod handler;

use crate::http::handler::authors::{
    create_author, delete_author, find_author, list_authors, update_author,
};
use crate::http::handler::books::{
    attach_author, create_book, delete_book, find_book, list_author_books, list_books,
    update_book,
};
use crate::repositories::{AuthorRepository, BookRepository};
use crate::services::{AuthorService, BookService};
use anyhow::Context;
use axum::Router;
use axum::routing::{get, put};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Debug)]
pub struct AppState<AR, BR> {
    author_service: Arc<AuthorService<AR, BR>>,
    book_service: Arc<BookService<AR, BR>>,
}

impl<AR, BR> Clone for AppState<AR, BR> {
    fn clone(&self) -> Self {
        Self {
            author_service: Arc::clone(&self.author_service),
            book_service: Arc::clone(&self.book_service),
        }
    }
}

impl<AR, BR> AppState<AR, BR>
where
    AR: AuthorRepository,
    BR: BookRepository,
{
    pub fn new(author_repo: AR, book_repo: BR) -> Self {
        let book_repo = Arc::new(book_repo);
        let author_service = Arc::new(AuthorService::new(
            Arc::new(author_repo),
            Arc::clone(&book_repo),
        ));
        let book_service = Arc::new(BookService::new(Arc::clone(&author_service), book_repo));

        Self {
            author_service,
            book_service,
        }
    }

    pub fn author_service(&self) -> &AuthorService<AR, BR> {
        &self.author_service
    }

    pub fn book_service(&self) -> &BookService<AR, BR> {
        &self.book_service
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<AR, BR>(
        state: AppState<AR, BR>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self>
    where
        AR: AuthorRepository,
        BR: BookRepository,
    {
        let router = router(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            addr = %self.listener.local_addr()?,
            "Listening for HTTP requests"
        );
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

/// The full application router, with every route nested under `/api/v1`.
pub fn router<AR, BR>(state: AppState<AR, BR>) -> Router
where
    AR: AuthorRepository,
    BR: BookRepository,
{
    Router::new()
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes<AR, BR>() -> Router<AppState<AR, BR>>
where
    AR: AuthorRepository,
    BR: BookRepository,
{
    Router::new()
        .route(
            "/authors",
            get(list_authors::<AR, BR>).post(create_author::<AR, BR>),
        )
        .route(
            "/authors/{id}",
            get(find_author::<AR, BR>)
                .put(update_author::<AR, BR>)
                .delete(delete_author::<AR, BR>),
        )
        .route(
            "/authors/{id}/books",
            get(list_author_books::<AR, BR>).post(create_book::<AR, BR>),
        )
        .route("/books", get(list_books::<AR, BR>))
        .route(
            "/books/{id}",
            get(find_book::<AR, BR>)
                .put(update_book::<AR, BR>)
                .delete(delete_book::<AR, BR>),
        )
        .route("/books/{id}/authors", put(attach_author::<AR, BR>))
}
