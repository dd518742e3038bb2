use crate::models::Author;
use chrono::Datelike;
use std::str::FromStr;
use thiserror::Error;

const MIN_ISBN_DIGITS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Isbn(i64);

impl Isbn {
    /// Accepts positive values with at least twelve decimal digits. This is
    /// a coarse stand-in for a real checksum validation.
    pub fn new(raw: i64) -> Result<Self, InvalidIsbnError> {
        if raw > 0 && raw.to_string().len() >= MIN_ISBN_DIGITS {
            Ok(Self(raw))
        } else {
            Err(InvalidIsbnError(raw))
        }
    }

    pub const fn new_unchecked(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} is not a valid ISBN")]
pub struct InvalidIsbnError(i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(raw: &str) -> Result<Self, BookTitleEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(BookTitleEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Book title cannot be empty")]
pub struct BookTitleEmptyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationYear(i32);

impl PublicationYear {
    /// Accepts years from 0 up to and including the current local year.
    pub fn new(raw: i32) -> Result<Self, PublicationYearError> {
        let current = chrono::Local::now().year();
        if (0..=current).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(PublicationYearError { year: raw, current })
        }
    }

    pub const fn new_unchecked(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Publication year {year} must be between 0 and {current}")]
pub struct PublicationYearError {
    year: i32,
    current: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    French,
    English,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::French, Self::English];

    pub const fn name(self) -> &'static str {
        match self {
            Self::French => "FRENCH",
            Self::English => "ENGLISH",
        }
    }
}

impl FromStr for Language {
    type Err = UnknownLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|language| language.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLanguageError(s.into()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{0}\" is not a supported language")]
pub struct UnknownLanguageError(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: i64,
    isbn: Isbn,
    title: BookTitle,
    year: PublicationYear,
    publisher: Option<String>,
    language: Option<Language>,
    authors: Vec<Author>,
}

impl Book {
    pub const fn new(
        id: i64,
        isbn: Isbn,
        title: BookTitle,
        year: PublicationYear,
        publisher: Option<String>,
        language: Option<Language>,
        authors: Vec<Author>,
    ) -> Self {
        Self {
            id,
            isbn,
            title,
            year,
            publisher,
            language,
            authors,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn isbn(&self) -> Isbn {
        self.isbn
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn year(&self) -> PublicationYear {
        self.year
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub const fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn author_ids(&self) -> Vec<i64> {
        self.authors.iter().map(Author::id).collect()
    }

    /// Adds `author` unless an author with the same id is already attached.
    pub fn add_author(&mut self, author: Author) {
        if !self.authors.iter().any(|a| a.id() == author.id()) {
            self.authors.push(author);
        }
    }
}

/// A book as supplied by a client, before any validation. Fields the client
/// omits take their zero value.
#[derive(Debug, Clone, Default)]
pub struct BookPayload {
    pub id: Option<i64>,
    pub isbn: Option<i64>,
    pub title: Option<String>,
    pub year: i32,
    pub publisher: Option<String>,
    pub language: Option<String>,
}

impl From<&Book> for BookPayload {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id()),
            isbn: Some(book.isbn().value()),
            title: Some(book.title().to_string()),
            year: book.year().value(),
            publisher: book.publisher.clone(),
            language: book.language().map(|language| language.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct CreateBookRequest {
    author_id: i64,
    isbn: Isbn,
    title: BookTitle,
    year: PublicationYear,
    publisher: Option<String>,
    language: Option<Language>,
}

impl CreateBookRequest {
    pub const fn new(
        author_id: i64,
        isbn: Isbn,
        title: BookTitle,
        year: PublicationYear,
        publisher: Option<String>,
        language: Option<Language>,
    ) -> Self {
        Self {
            author_id,
            isbn,
            title,
            year,
            publisher,
            language,
        }
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }

    pub const fn isbn(&self) -> Isbn {
        self.isbn
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn year(&self) -> PublicationYear {
        self.year
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub const fn language(&self) -> Option<Language> {
        self.language
    }
}

#[derive(Error, Debug)]
pub enum CreateBookError {
    #[error(transparent)]
    InvalidLanguage(#[from] UnknownLanguageError),
    #[error(transparent)]
    InvalidTitle(#[from] BookTitleEmptyError),
    #[error(transparent)]
    InvalidYear(#[from] PublicationYearError),
    #[error(transparent)]
    InvalidIsbn(#[from] InvalidIsbnError),
    #[error("ISBN is required")]
    MissingIsbn,
    #[error("Author with id \"{id}\" does not exist")]
    AuthorNotFound { id: i64 },
    /// Raised by the store when the author disappears between lookup and save.
    #[error("Author with id \"{id}\" cannot be linked to a new book")]
    UnknownAuthor { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct FindBookRequest {
    id: i64,
}

impl FindBookRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllBooksError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum FindAuthorBooksError {
    #[error("Author with id \"{id}\" does not exist")]
    AuthorNotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct UpdateBookRequest {
    id: i64,
    isbn: Isbn,
    title: BookTitle,
    year: PublicationYear,
    publisher: Option<String>,
    author_ids: Option<Vec<i64>>,
}

impl UpdateBookRequest {
    pub const fn new(
        id: i64,
        isbn: Isbn,
        title: BookTitle,
        year: PublicationYear,
        publisher: Option<String>,
    ) -> Self {
        Self {
            id,
            isbn,
            title,
            year,
            publisher,
            author_ids: None,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn isbn(&self) -> Isbn {
        self.isbn
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn year(&self) -> PublicationYear {
        self.year
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    /// The replacement author set, if this update rewrites it.
    pub fn author_ids(&self) -> Option<&[i64]> {
        self.author_ids.as_deref()
    }

    pub fn set_author_ids(&mut self, author_ids: Vec<i64>) {
        self.author_ids = Some(author_ids);
    }
}

#[derive(Error, Debug)]
pub enum UpdateBookError {
    #[error("Book id in body does not match book id \"{id}\" in path")]
    IdMismatch { id: i64 },
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: i64,
}

impl DeleteBookRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum DeleteBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum AttachAuthorError {
    #[error("Book with id \"{id}\" does not exist")]
    BookNotFound { id: i64 },
    #[error("Author id is required")]
    MissingAuthorId,
    #[error("Author with id \"{id}\" does not exist")]
    AuthorNotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_requires_twelve_digits() {
        assert!(Isbn::new(123_456_789_012).is_ok());
        assert!(Isbn::new(9_781_234_567_897).is_ok());
        assert_eq!(Isbn::new(12_345_678_901), Err(InvalidIsbnError(12_345_678_901)));
        assert!(Isbn::new(123).is_err());
    }

    #[test]
    fn isbn_must_be_positive() {
        assert!(Isbn::new(0).is_err());
        assert!(Isbn::new(-123_456_789_012).is_err());
    }

    #[test]
    fn publication_year_is_bounded_by_current_year() {
        let current = chrono::Local::now().year();

        assert_eq!(PublicationYear::new(0).map(PublicationYear::value), Ok(0));
        assert_eq!(
            PublicationYear::new(current).map(PublicationYear::value),
            Ok(current)
        );
        assert!(PublicationYear::new(-1).is_err());
        assert!(PublicationYear::new(current + 1).is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(BookTitle::new("   "), Err(BookTitleEmptyError));
        assert_eq!(BookTitle::new(" Dune ").unwrap().as_str(), "Dune");
    }

    #[test]
    fn language_is_matched_ignoring_case() {
        assert_eq!("ENGLISH".parse::<Language>(), Ok(Language::English));
        assert_eq!("french".parse::<Language>(), Ok(Language::French));
        assert_eq!("EnGlIsH".parse::<Language>(), Ok(Language::English));
        assert_eq!(
            "klingon".parse::<Language>(),
            Err(UnknownLanguageError("klingon".into()))
        );
    }

    #[test]
    fn add_author_ignores_duplicates() {
        let author = Author::new(1, crate::models::AuthorName::new_unchecked("A"));
        let mut book = Book::new(
            1,
            Isbn::new_unchecked(123_456_789_012),
            BookTitle::new_unchecked("T"),
            PublicationYear::new_unchecked(2000),
            None,
            None,
            vec![author.clone()],
        );

        book.add_author(author);
        book.add_author(Author::new(2, crate::models::AuthorName::new_unchecked("B")));

        assert_eq!(book.author_ids(), vec![1, 2]);
    }
}
