//! Vocabulary types and parsing of user-submitted word pairs.

use thiserror::Error;

/// Surrogate key of a row in the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// A translation pair from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub id: i64,
    pub english: String,
    pub russian: String,
    /// Author of the word. `None` means a global word.
    pub owner: Option<UserId>,
}

impl Word {
    pub fn is_global(&self) -> bool {
        self.owner.is_none()
    }
}

/// A pair typed by a user in the add-word flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub english: String,
    pub russian: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 'english - russian', got {0:?}")]
    Malformed(String),
}

/// Parse `"apple - яблоко"` into its two halves.
///
/// Exactly one `-` is allowed and both trimmed halves must be non-empty.
pub fn parse_new_word(text: &str) -> Result<NewWord, ParseError> {
    let mut parts = text.split('-');
    let (Some(english), Some(russian), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::Malformed(text.to_string()));
    };

    let (english, russian) = (english.trim(), russian.trim());
    if english.is_empty() || russian.is_empty() {
        return Err(ParseError::Malformed(text.to_string()));
    }

    Ok(NewWord {
        english: english.to_string(),
        russian: russian.to_string(),
    })
}

/// Result of the add-word operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// How far a removal reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveScope {
    /// The user authored the word, so the row itself is gone.
    Global,
    /// Someone else's or a global word, now hidden for this user only.
    PersonalHide,
}

/// Result of the remove-word operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(RemoveScope),
    NotFound,
}
