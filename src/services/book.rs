use crate::models::{
    AttachAuthorError, AuthorPayload, Book, BookPayload, BookTitle, CreateBookError,
    CreateBookRequest, DeleteBookError, DeleteBookRequest, FindAllBooksError, FindAuthorBooksError,
    FindAuthorError, FindAuthorRequest, FindBookError, FindBookRequest, Isbn, Language,
    PublicationYear, UpdateBookError, UpdateBookRequest,
};
use crate::repositories::{AuthorRepository, BookRepository};
use crate::services::AuthorService;
use std::sync::Arc;

#[derive(Debug)]
pub struct BookService<AR, BR> {
    authors: Arc<AuthorService<AR, BR>>,
    book_repo: Arc<BR>,
}

impl<AR, BR> BookService<AR, BR>
where
    AR: AuthorRepository,
    BR: BookRepository,
{
    pub const fn new(authors: Arc<AuthorService<AR, BR>>, book_repo: Arc<BR>) -> Self {
        Self { authors, book_repo }
    }

    /// Every book, or only those whose title contains `query`.
    pub async fn list_books(&self, query: Option<&str>) -> Result<Vec<Book>, FindAllBooksError> {
        match query {
            Some(title) => self.book_repo.search_books(title).await,
            None => self.book_repo.find_all_books().await,
        }
    }

    pub async fn list_author_books(
        &self,
        author_id: i64,
    ) -> Result<Vec<Book>, FindAuthorBooksError> {
        let author = self
            .authors
            .find_author(&FindAuthorRequest::new(author_id))
            .await
            .map_err(|err| match err {
                FindAuthorError::NotFound { id } => FindAuthorBooksError::AuthorNotFound { id },
                FindAuthorError::Other(err) => FindAuthorBooksError::Other(err),
            })?;

        self.book_repo
            .find_books_by_author(author.id())
            .await
            .map_err(|err| FindAuthorBooksError::Other(err.0))
    }

    pub async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError> {
        tracing::debug!(id = req.id(), "Looking up book");
        self.book_repo.find_book(req).await
    }

    /// Validates `payload` and saves it as a new book written by `author_id`.
    ///
    /// The language is checked before the author is resolved, and the author
    /// before the remaining fields, so a request that is wrong in several
    /// ways reports the first failure in that order.
    pub async fn create_book(
        &self,
        author_id: i64,
        payload: BookPayload,
    ) -> Result<Book, CreateBookError> {
        let language = payload
            .language
            .as_deref()
            .map(str::parse::<Language>)
            .transpose()?;

        let author = self
            .authors
            .find_author(&FindAuthorRequest::new(author_id))
            .await
            .map_err(|err| match err {
                FindAuthorError::NotFound { id } => CreateBookError::AuthorNotFound { id },
                FindAuthorError::Other(err) => CreateBookError::Other(err),
            })?;

        let title = BookTitle::new(payload.title.as_deref().unwrap_or_default())?;
        let year = PublicationYear::new(payload.year)?;
        let isbn = Isbn::new(payload.isbn.ok_or(CreateBookError::MissingIsbn)?)?;

        let req = CreateBookRequest::new(
            author.id(),
            isbn,
            title,
            year,
            payload.publisher,
            language,
        );
        let book = self.book_repo.create_book(&req).await?;

        tracing::info!(id = book.id(), author_id, "Created book");
        Ok(book)
    }

    /// Overwrites isbn, title, year and publisher of book `book_id` with the
    /// payload values as given. None of the creation checks are applied.
    pub async fn update_book(
        &self,
        book_id: i64,
        payload: BookPayload,
    ) -> Result<Book, UpdateBookError> {
        self.apply_update(book_id, payload, None).await
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), DeleteBookError> {
        let book = self
            .book_repo
            .find_book(&FindBookRequest::new(id))
            .await
            .map_err(|err| match err {
                FindBookError::NotFound { id } => DeleteBookError::NotFound { id },
                FindBookError::Other(err) => DeleteBookError::Other(err),
            })?;

        self.book_repo
            .delete_book(&DeleteBookRequest::new(book.id()))
            .await?;

        tracing::info!(id, "Deleted book");
        Ok(())
    }

    /// Adds an existing author to book `book_id`, then saves the book
    /// through the update path.
    pub async fn attach_author(
        &self,
        book_id: i64,
        payload: AuthorPayload,
    ) -> Result<Book, AttachAuthorError> {
        let mut book = self
            .book_repo
            .find_book(&FindBookRequest::new(book_id))
            .await
            .map_err(|err| match err {
                FindBookError::NotFound { id } => AttachAuthorError::BookNotFound { id },
                FindBookError::Other(err) => AttachAuthorError::Other(err),
            })?;

        let author_id = payload.id.ok_or(AttachAuthorError::MissingAuthorId)?;
        let author = self
            .authors
            .find_author(&FindAuthorRequest::new(author_id))
            .await
            .map_err(|err| match err {
                FindAuthorError::NotFound { id } => AttachAuthorError::AuthorNotFound { id },
                FindAuthorError::Other(err) => AttachAuthorError::Other(err),
            })?;
        book.add_author(author);

        let updated = self
            .apply_update(book_id, BookPayload::from(&book), Some(book.author_ids()))
            .await
            .map_err(|err| match err {
                UpdateBookError::NotFound { id } => AttachAuthorError::BookNotFound { id },
                err => AttachAuthorError::Other(err.into()),
            })?;

        tracing::info!(book_id, author_id, "Attached author to book");
        Ok(updated)
    }

    async fn apply_update(
        &self,
        book_id: i64,
        payload: BookPayload,
        author_ids: Option<Vec<i64>>,
    ) -> Result<Book, UpdateBookError> {
        if payload.id != Some(book_id) {
            return Err(UpdateBookError::IdMismatch { id: book_id });
        }

        let existing = self
            .book_repo
            .find_book(&FindBookRequest::new(book_id))
            .await
            .map_err(|err| match err {
                FindBookError::NotFound { id } => UpdateBookError::NotFound { id },
                FindBookError::Other(err) => UpdateBookError::Other(err),
            })?;

        let mut req = UpdateBookRequest::new(
            existing.id(),
            Isbn::new_unchecked(payload.isbn.unwrap_or_default()),
            BookTitle::new_unchecked(payload.title.as_deref().unwrap_or_default()),
            PublicationYear::new_unchecked(payload.year),
            payload.publisher,
        );
        if let Some(author_ids) = author_ids {
            req.set_author_ids(author_ids);
        }
        let book = self.book_repo.update_book(&req).await?;

        tracing::info!(id = book_id, "Updated book");
        Ok(book)
    }
}
