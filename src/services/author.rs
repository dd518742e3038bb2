use crate::models::{
    Author, AuthorName, AuthorPayload, CreateAuthorError, CreateAuthorRequest, DeleteAuthorError,
    DeleteAuthorRequest, DeleteBookError, DeleteBookRequest, FindAllAuthorsError, FindAuthorError,
    FindAuthorRequest, UpdateAuthorError, UpdateAuthorRequest,
};
use crate::repositories::{AuthorRepository, BookRepository};
use anyhow::anyhow;
use std::sync::Arc;

#[derive(Debug)]
pub struct AuthorService<AR, BR> {
    author_repo: Arc<AR>,
    book_repo: Arc<BR>,
}

impl<AR, BR> AuthorService<AR, BR>
where
    AR: AuthorRepository,
    BR: BookRepository,
{
    pub const fn new(author_repo: Arc<AR>, book_repo: Arc<BR>) -> Self {
        Self {
            author_repo,
            book_repo,
        }
    }

    /// Every author, or only those whose name contains `query`.
    pub async fn list_authors(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<Author>, FindAllAuthorsError> {
        match query {
            Some(name) => self.author_repo.search_authors(name).await,
            None => self.author_repo.find_all_authors().await,
        }
    }

    pub async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        tracing::debug!(id = req.id(), "Looking up author");
        self.author_repo.find_author(req).await
    }

    pub async fn create_author(&self, payload: AuthorPayload) -> Result<Author, CreateAuthorError> {
        let full_name = AuthorName::new(payload.full_name.as_deref().unwrap_or_default())?;
        let author = self
            .author_repo
            .create_author(&CreateAuthorRequest::new(full_name))
            .await?;

        tracing::info!(id = author.id(), "Created author");
        Ok(author)
    }

    /// Overwrites the name of author `id`. The new name is stored as given,
    /// without the blank check applied at creation.
    pub async fn update_author(
        &self,
        id: i64,
        payload: AuthorPayload,
    ) -> Result<Author, UpdateAuthorError> {
        if payload.id != Some(id) {
            return Err(UpdateAuthorError::IdMismatch { id });
        }

        let existing = self
            .author_repo
            .find_author(&FindAuthorRequest::new(id))
            .await
            .map_err(|err| match err {
                FindAuthorError::NotFound { id } => UpdateAuthorError::NotFound { id },
                FindAuthorError::Other(err) => UpdateAuthorError::Other(err),
            })?;

        let full_name = payload.full_name.unwrap_or_default();
        let full_name = AuthorName::new_unchecked(&full_name);
        let author = self
            .author_repo
            .update_author(&UpdateAuthorRequest::new(existing.id(), full_name))
            .await?;

        tracing::info!(id, "Updated author");
        Ok(author)
    }

    /// Deletes author `id`. Each of the author's books that currently has
    /// more than one author is deleted first. Books whose only author is
    /// this one are kept and lose the link.
    pub async fn delete_author(&self, id: i64) -> Result<(), DeleteAuthorError> {
        let author = self
            .author_repo
            .find_author(&FindAuthorRequest::new(id))
            .await
            .map_err(|err| match err {
                FindAuthorError::NotFound { id } => DeleteAuthorError::NotFound { id },
                FindAuthorError::Other(err) => DeleteAuthorError::Other(err),
            })?;

        let books = self
            .book_repo
            .find_books_by_author(author.id())
            .await
            .map_err(|err| DeleteAuthorError::Other(err.0))?;

        for book in books.iter().filter(|book| book.authors().len() > 1) {
            tracing::info!(
                author_id = author.id(),
                book_id = book.id(),
                "Deleting co-authored book of deleted author"
            );
            self.book_repo
                .delete_book(&DeleteBookRequest::new(book.id()))
                .await
                .map_err(|err| match err {
                    DeleteBookError::NotFound { id } => {
                        anyhow!("Book with id \"{id}\" vanished while deleting its author")
                    }
                    DeleteBookError::Other(err) => err,
                })?;
        }

        self.author_repo
            .delete_author(&DeleteAuthorRequest::new(author.id()))
            .await?;

        tracing::info!(id, "Deleted author");
        Ok(())
    }
}
