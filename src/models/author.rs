use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, AuthorNameEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(AuthorNameEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    /// Wraps `raw` as-is. Used for values read back from the store and for
    /// updates, which overwrite the name without re-validating it.
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Author name cannot be empty")]
pub struct AuthorNameEmptyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: i64,
    full_name: AuthorName,
}

impl Author {
    pub const fn new(id: i64, full_name: AuthorName) -> Self {
        Self { id, full_name }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn full_name(&self) -> &AuthorName {
        &self.full_name
    }
}

/// An author as supplied by a client, before any validation.
#[derive(Debug, Clone, Default)]
pub struct AuthorPayload {
    pub id: Option<i64>,
    pub full_name: Option<String>,
}

#[derive(Debug)]
pub struct CreateAuthorRequest {
    full_name: AuthorName,
}

impl CreateAuthorRequest {
    pub const fn new(full_name: AuthorName) -> Self {
        Self { full_name }
    }

    pub const fn full_name(&self) -> &AuthorName {
        &self.full_name
    }
}

#[derive(Error, Debug)]
pub enum CreateAuthorError {
    #[error(transparent)]
    InvalidName(#[from] AuthorNameEmptyError),
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct FindAuthorRequest {
    id: i64,
}

impl FindAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllAuthorsError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct UpdateAuthorRequest {
    id: i64,
    full_name: AuthorName,
}

impl UpdateAuthorRequest {
    pub const fn new(id: i64, full_name: AuthorName) -> Self {
        Self { id, full_name }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn full_name(&self) -> &AuthorName {
        &self.full_name
    }
}

#[derive(Error, Debug)]
pub enum UpdateAuthorError {
    #[error("Author id in body does not match author id \"{id}\" in path")]
    IdMismatch { id: i64 },
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct DeleteAuthorRequest {
    id: i64,
}

impl DeleteAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum DeleteAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_name_is_trimmed() {
        let name = AuthorName::new("  Jane Doe ").unwrap();
        assert_eq!(name.as_str(), "Jane Doe");
    }

    #[test]
    fn blank_author_name_is_rejected() {
        assert_eq!(AuthorName::new(""), Err(AuthorNameEmptyError));
        assert_eq!(AuthorName::new(" \t\n"), Err(AuthorNameEmptyError));
    }

    #[test]
    fn unchecked_author_name_keeps_raw_value() {
        assert_eq!(AuthorName::new_unchecked("").as_str(), "");
        assert_eq!(AuthorName::new_unchecked(" x ").to_string(), " x ");
    }
}
