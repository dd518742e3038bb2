use crate::models::{
    Author, Book, CreateAuthorError, CreateAuthorRequest, CreateBookError, CreateBookRequest,
    DeleteAuthorError, DeleteAuthorRequest, DeleteBookError, DeleteBookRequest,
    FindAllAuthorsError, FindAllBooksError, FindAuthorError, FindAuthorRequest, FindBookError,
    FindBookRequest, UpdateAuthorError, UpdateAuthorRequest, UpdateBookError, UpdateBookRequest,
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError>;

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError>;

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError>;

    /// Authors whose name contains `name`, ignoring ASCII case.
    async fn search_authors(&self, name: &str) -> Result<Vec<Author>, FindAllAuthorsError>;

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError>;

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError>;
}

/// Book persistence. Implementations own the book/author association and
/// keep both sides of it consistent.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    /// Fails with [`CreateBookError::UnknownAuthor`] if the author does not
    /// exist when the book is saved.
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError>;

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError>;

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError>;

    /// Books whose title contains `title`, ignoring ASCII case.
    async fn search_books(&self, title: &str) -> Result<Vec<Book>, FindAllBooksError>;

    async fn find_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, FindAllBooksError>;

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError>;

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError>;
}
