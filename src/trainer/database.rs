//! Persistent SQLite store for users, words and per-user word relations.

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

use crate::trainer::words::{AddOutcome, NewWord, RemoveOutcome, RemoveScope, UserId, Word};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Telegram-side identity of a chat participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Persistent SQLite database for the trainer.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Create a new in-memory database.
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
        let db = Self { conn: Mutex::new(conn) };
        db.init_schema().expect("Failed to initialize database schema");
        db
    }

    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn: Mutex::new(conn) };
        db.init_schema()?;

        let (user_count, word_count) = db.get_counts()?;
        info!("Loaded database from {:?} ({} users, {} words)", path, user_count, word_count);

        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Multi-statement writes run in transactions, so a poisoned connection is still consistent.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();

        conn.execute_batch(r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                telegram_id INTEGER UNIQUE NOT NULL,
                username TEXT,
                first_name TEXT,
                last_name TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS words (
                id INTEGER PRIMARY KEY,
                english TEXT NOT NULL UNIQUE,
                russian TEXT NOT NULL,
                owner_id INTEGER REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS user_favorites (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, word_id)
            );

            CREATE TABLE IF NOT EXISTS user_hidden_words (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, word_id)
            );

            CREATE INDEX IF NOT EXISTS idx_words_owner ON words(owner_id);
            CREATE INDEX IF NOT EXISTS idx_hidden_word ON user_hidden_words(word_id);
        "#)?;

        Ok(())
    }

    fn get_counts(&self) -> Result<(usize, usize)> {
        let conn = self.conn();
        let user_count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let word_count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok((user_count as usize, word_count as usize))
    }

    // ==================== USER METHODS ====================

    /// Register a participant on first contact and return their surrogate id.
    pub fn ensure_user(&self, profile: &UserProfile) -> Result<UserId> {
        let conn = self.conn();
        let created_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let inserted = conn.execute(
            "INSERT INTO users (telegram_id, username, first_name, last_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(telegram_id) DO NOTHING",
            params![profile.telegram_id, profile.username, profile.first_name, profile.last_name, created_at],
        )?;
        if inserted > 0 {
            info!("👤 New user: {} ({})", profile.first_name, profile.telegram_id);
        }

        let id = conn.query_row(
            "SELECT id FROM users WHERE telegram_id = ?1",
            params![profile.telegram_id],
            |row| row.get(0),
        )?;
        Ok(UserId(id))
    }

    // ==================== WORD METHODS ====================

    /// Words a user may be quizzed on: global or self-authored, minus hidden ones.
    pub fn effective_pool(&self, user: UserId) -> Result<Vec<Word>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT w.id, w.english, w.russian, w.owner_id
             FROM words w
             WHERE (w.owner_id IS NULL OR w.owner_id = ?1)
               AND NOT EXISTS (
                   SELECT 1 FROM user_hidden_words h
                   WHERE h.word_id = w.id AND h.user_id = ?1
               )
             ORDER BY w.id",
        )?;

        let words = stmt
            .query_map(params![user.0], word_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(words)
    }

    /// Look up a word by its English text.
    pub fn find_word(&self, english: &str) -> Result<Option<Word>> {
        let conn = self.conn();
        let word = conn
            .query_row(
                "SELECT id, english, russian, owner_id FROM words WHERE english = ?1",
                params![english],
                word_from_row,
            )
            .optional()?;
        Ok(word)
    }

    /// Insert a word authored by `user` and record it as their favorite.
    pub fn add_word(&self, user: UserId, word: &NewWord) -> Result<AddOutcome> {
        self.insert_word(Some(user), &word.english, &word.russian)
    }

    /// Insert a word visible to everyone.
    pub fn add_global_word(&self, english: &str, russian: &str) -> Result<AddOutcome> {
        self.insert_word(None, english, russian)
    }

    fn insert_word(&self, owner: Option<UserId>, english: &str, russian: &str) -> Result<AddOutcome> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let inserted = tx
            .query_row(
                "INSERT INTO words (english, russian, owner_id)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(english) DO NOTHING
                 RETURNING id",
                params![english, russian, owner.map(|u| u.0)],
                |row| row.get::<_, i64>(0),
            )
            .optional();

        let word_id = match inserted {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(AddOutcome::AlreadyExists),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                debug!("Constraint violation adding '{}', treating as duplicate", english);
                return Ok(AddOutcome::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(user) = owner {
            tx.execute(
                "INSERT INTO user_favorites (user_id, word_id) VALUES (?1, ?2)
                 ON CONFLICT DO NOTHING",
                params![user.0, word_id],
            )?;
        }

        tx.commit()?;
        Ok(AddOutcome::Added)
    }

    /// Delete the word if `user` owns it, otherwise hide it from them.
    pub fn remove_word_for_user(&self, user: UserId, english: &str) -> Result<RemoveOutcome> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let found = tx
            .query_row(
                "SELECT id, owner_id FROM words WHERE english = ?1",
                params![english],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        let Some((word_id, owner)) = found else {
            return Ok(RemoveOutcome::NotFound);
        };

        let scope = if owner == Some(user.0) {
            tx.execute("DELETE FROM words WHERE id = ?1", params![word_id])?;
            RemoveScope::Global
        } else {
            tx.execute(
                "INSERT INTO user_hidden_words (user_id, word_id) VALUES (?1, ?2)
                 ON CONFLICT DO NOTHING",
                params![user.0, word_id],
            )?;
            RemoveScope::PersonalHide
        };

        tx.commit()?;
        Ok(RemoveOutcome::Removed(scope))
    }

    /// Seed global words when the catalog is empty. Returns how many were inserted.
    pub fn seed_if_empty(&self, words: &[(&str, &str)]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO words (english, russian) VALUES (?1, ?2) ON CONFLICT DO NOTHING",
            )?;
            for (english, russian) in words {
                count += stmt.execute(params![english, russian])?;
            }
        }

        tx.commit()?;
        if count > 0 {
            info!("🌱 Seeded {} global words", count);
        }
        Ok(count)
    }

    /// Total words in the catalog.
    pub fn word_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[cfg(test)]
    pub fn hidden_count(&self, user: UserId) -> usize {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM user_hidden_words WHERE user_id = ?1",
            params![user.0],
            |row| row.get::<_, i64>(0),
        )
        .unwrap_or(0) as usize
    }

    /// Drop the word tables so every word query fails.
    #[cfg(test)]
    pub fn drop_word_tables(&self) {
        self.conn()
            .execute_batch("DROP TABLE user_favorites; DROP TABLE user_hidden_words; DROP TABLE words;")
            .unwrap();
    }

    #[cfg(test)]
    pub fn favorite_count(&self, user: UserId) -> usize {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM user_favorites WHERE user_id = ?1",
            params![user.0],
            |row| row.get::<_, i64>(0),
        )
        .unwrap_or(0) as usize
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

fn word_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        english: row.get(1)?,
        russian: row.get(2)?,
        owner: row.get::<_, Option<i64>>(3)?.map(UserId),
    })
}
