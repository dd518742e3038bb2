use crate::models::{
    Author, AuthorName, Book, BookTitle, CreateAuthorError, CreateAuthorRequest, CreateBookError,
    CreateBookRequest, DeleteAuthorError, DeleteAuthorRequest, DeleteBookError, DeleteBookRequest,
    FindAllAuthorsError, FindAllBooksError, FindAuthorError, FindAuthorRequest, FindBookError,
    FindBookRequest, Isbn, Language, PublicationYear, UpdateAuthorError, UpdateAuthorRequest,
    UpdateBookError, UpdateBookRequest,
};
use crate::repositories::{AuthorRepository, BookRepository};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn establish_pool(path: &str) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(path)
        .with_context(|| format!("Invalid database path {path}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    // Each connection to an in-memory database gets a fresh database, so
    // the pool must hold on to a single connection.
    let pool_opts = if path.contains(":memory:") || path.contains("mode=memory") {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };
    let pool = pool_opts
        .connect_with(opts)
        .await
        .with_context(|| format!("Failed to open database at {path}"))?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct DefaultAuthorRepository {
    pool: SqlitePool,
}

impl DefaultAuthorRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let full_name = row.try_get("full_name")?;

        let full_name = AuthorName::new_unchecked(full_name);
        Ok(Self::new(id, full_name))
    }
}

#[async_trait]
impl AuthorRepository for DefaultAuthorRepository {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError> {
        let author = sqlx::query_as("INSERT INTO author (full_name) VALUES (?) RETURNING *")
            .bind(req.full_name().as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to create author with name "{}""#,
                    req.full_name()
                ));
                CreateAuthorError::Other(err)
            })?;

        Ok(author)
    }

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        let author = sqlx::query_as("SELECT id, full_name FROM author WHERE id = ?")
            .bind(req.id())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if matches!(err, sqlx::Error::RowNotFound) {
                    FindAuthorError::NotFound { id: req.id() }
                } else {
                    let err = anyhow!(err).context(format!(
                        r#"Failed to retrieve author with id "{}""#,
                        req.id()
                    ));
                    FindAuthorError::Other(err)
                }
            })?;

        Ok(author)
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        let authors = sqlx::query_as("SELECT id, full_name FROM author ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve all authors");
                FindAllAuthorsError(err)
            })?;

        Ok(authors)
    }

    async fn search_authors(&self, name: &str) -> Result<Vec<Author>, FindAllAuthorsError> {
        let authors = sqlx::query_as(
            r"SELECT id, full_name FROM author WHERE full_name LIKE ? ESCAPE '\' ORDER BY id",
        )
        .bind(like_pattern(name))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            let err =
                anyhow!(err).context(format!(r#"Failed to search authors matching "{name}""#));
            FindAllAuthorsError(err)
        })?;

        Ok(authors)
    }

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError> {
        let author = sqlx::query_as("UPDATE author SET full_name = ? WHERE id = ? RETURNING *")
            .bind(req.full_name().as_str())
            .bind(req.id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to update author with id "{}""#, req.id()));
                UpdateAuthorError::Other(err)
            })?;

        author.ok_or(UpdateAuthorError::NotFound { id: req.id() })
    }

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError> {
        let result = sqlx::query("DELETE FROM author WHERE id = ?")
            .bind(req.id())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to delete author with id "{}""#, req.id()));
                DeleteAuthorError::Other(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(DeleteAuthorError::NotFound { id: req.id() });
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DefaultBookRepository {
    pool: SqlitePool,
}

impl DefaultBookRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_authors(&self, book_id: i64) -> Result<Vec<Author>, sqlx::Error> {
        sqlx::query_as(
            "SELECT a.id, a.full_name FROM author a \
             JOIN book_author ba ON ba.author_id = a.id \
             WHERE ba.book_id = ? ORDER BY a.id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn with_authors(&self, records: Vec<BookRecord>) -> Result<Vec<Book>, sqlx::Error> {
        let mut books = Vec::with_capacity(records.len());
        for record in records {
            let authors = self.load_authors(record.id).await?;
            books.push(record.into_book(authors));
        }

        Ok(books)
    }
}

/// A `book` row without its authors.
struct BookRecord {
    id: i64,
    isbn: i64,
    title: String,
    year: i32,
    publisher: Option<String>,
    language: Option<Language>,
}

impl BookRecord {
    fn into_book(self, authors: Vec<Author>) -> Book {
        Book::new(
            self.id,
            Isbn::new_unchecked(self.isbn),
            BookTitle::new_unchecked(&self.title),
            PublicationYear::new_unchecked(self.year),
            self.publisher,
            self.language,
            authors,
        )
    }
}

impl<'r> FromRow<'r, SqliteRow> for BookRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let language: Option<String> = row.try_get("language")?;
        let language = language
            .as_deref()
            .map(Language::from_str)
            .transpose()
            .map_err(|err| sqlx::Error::ColumnDecode {
                index: "language".into(),
                source: Box::new(err),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            isbn: row.try_get("isbn")?,
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            publisher: row.try_get("publisher")?,
            language,
        })
    }
}

#[async_trait]
impl BookRepository for DefaultBookRepository {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let fail = |err: sqlx::Error| {
            let err = anyhow!(err).context(format!(
                r#"Failed to create book with title "{}""#,
                req.title()
            ));
            CreateBookError::Other(err)
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        let author: Option<i64> = sqlx::query_scalar("SELECT id FROM author WHERE id = ?")
            .bind(req.author_id())
            .fetch_optional(&mut *tx)
            .await
            .map_err(fail)?;
        if author.is_none() {
            return Err(CreateBookError::UnknownAuthor {
                id: req.author_id(),
            });
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO book (isbn, title, year, publisher, language) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(req.isbn().value())
        .bind(req.title().as_str())
        .bind(req.year().value())
        .bind(req.publisher())
        .bind(req.language().map(Language::name))
        .fetch_one(&mut *tx)
        .await
        .map_err(fail)?;

        sqlx::query("INSERT INTO book_author (book_id, author_id) VALUES (?, ?)")
            .bind(id)
            .bind(req.author_id())
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        self.find_book(&FindBookRequest::new(id))
            .await
            .map_err(|err| CreateBookError::Other(err.into()))
    }

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError> {
        let fail = |err: sqlx::Error| {
            if matches!(err, sqlx::Error::RowNotFound) {
                FindBookError::NotFound { id: req.id() }
            } else {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to retrieve book with id "{}""#, req.id()));
                FindBookError::Other(err)
            }
        };

        let record: BookRecord = sqlx::query_as(
            "SELECT id, isbn, title, year, publisher, language FROM book WHERE id = ?",
        )
        .bind(req.id())
        .fetch_one(&self.pool)
        .await
        .map_err(fail)?;
        let authors = self.load_authors(record.id).await.map_err(fail)?;

        Ok(record.into_book(authors))
    }

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
        let fail = |err: sqlx::Error| {
            let err = anyhow!(err).context("Failed to retrieve all books");
            FindAllBooksError(err)
        };

        let records = sqlx::query_as(
            "SELECT id, isbn, title, year, publisher, language FROM book ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(fail)?;

        self.with_authors(records).await.map_err(fail)
    }

    async fn search_books(&self, title: &str) -> Result<Vec<Book>, FindAllBooksError> {
        let fail = |err: sqlx::Error| {
            let err =
                anyhow!(err).context(format!(r#"Failed to search books matching "{title}""#));
            FindAllBooksError(err)
        };

        let records = sqlx::query_as(
            r"SELECT id, isbn, title, year, publisher, language FROM book
              WHERE title LIKE ? ESCAPE '\' ORDER BY id",
        )
        .bind(like_pattern(title))
        .fetch_all(&self.pool)
        .await
        .map_err(fail)?;

        self.with_authors(records).await.map_err(fail)
    }

    async fn find_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, FindAllBooksError> {
        let fail = |err: sqlx::Error| {
            let err = anyhow!(err).context(format!(
                r#"Failed to retrieve books of author with id "{author_id}""#
            ));
            FindAllBooksError(err)
        };

        let records = sqlx::query_as(
            "SELECT b.id, b.isbn, b.title, b.year, b.publisher, b.language FROM book b \
             JOIN book_author ba ON ba.book_id = b.id \
             WHERE ba.author_id = ? ORDER BY b.id",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(fail)?;

        self.with_authors(records).await.map_err(fail)
    }

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError> {
        let id = req.id();
        let fail = move |err: sqlx::Error| {
            let err = anyhow!(err).context(format!(r#"Failed to update book with id "{id}""#));
            UpdateBookError::Other(err)
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        let result =
            sqlx::query("UPDATE book SET isbn = ?, title = ?, year = ?, publisher = ? WHERE id = ?")
                .bind(req.isbn().value())
                .bind(req.title().as_str())
                .bind(req.year().value())
                .bind(req.publisher())
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(fail)?;
        if result.rows_affected() == 0 {
            return Err(UpdateBookError::NotFound { id });
        }

        if let Some(author_ids) = req.author_ids() {
            sqlx::query("DELETE FROM book_author WHERE book_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(fail)?;

            for &author_id in author_ids {
                sqlx::query("INSERT OR IGNORE INTO book_author (book_id, author_id) VALUES (?, ?)")
                    .bind(id)
                    .bind(author_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(fail)?;
            }
        }

        tx.commit().await.map_err(fail)?;

        self.find_book(&FindBookRequest::new(id))
            .await
            .map_err(|err| match err {
                FindBookError::NotFound { id } => UpdateBookError::NotFound { id },
                FindBookError::Other(err) => UpdateBookError::Other(err),
            })
    }

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError> {
        let result = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(req.id())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to delete book with id "{}""#, req.id()));
                DeleteBookError::Other(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(DeleteBookError::NotFound { id: req.id() });
        }

        Ok(())
    }
}

/// Builds a `LIKE` pattern matching any value that contains `raw`.
fn like_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
