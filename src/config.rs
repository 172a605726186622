use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use teloxide::types::ChatId;

/// Upper bound on distractors so the reply keyboard stays readable.
const MAX_DISTRACTORS: usize = 7;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Directory for state files (logs, database). Defaults to current directory.
    data_dir: Option<String>,
    /// SQLite file. Defaults to `<data_dir>/flashrecall.db`.
    database_path: Option<String>,
    /// Admin chat that receives forwarded log lines.
    log_chat_id: Option<i64>,
    /// Wrong options shown next to the right one.
    #[serde(default = "default_distractors")]
    distractors: usize,
    /// Insert the built-in word list when the catalog is empty.
    #[serde(default = "default_seed_words")]
    seed_words: bool,
    /// Evict sessions untouched for this many minutes (0 = never).
    #[serde(default)]
    session_ttl_minutes: u32,
}

fn default_distractors() -> usize {
    3
}

fn default_seed_words() -> bool {
    true
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Directory for state files (logs, database).
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub log_chat_id: Option<ChatId>,
    pub distractors: usize,
    pub seed_words: bool,
    pub session_ttl: Option<Duration>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile { path: path.to_path_buf(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: path.to_path_buf(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        if file.distractors == 0 || file.distractors > MAX_DISTRACTORS {
            return Err(ConfigError::Validation(format!(
                "distractors must be between 1 and {MAX_DISTRACTORS}, got {}",
                file.distractors
            )));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let database_path = file
            .database_path
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("flashrecall.db"));

        let session_ttl = match file.session_ttl_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(u64::from(minutes) * 60)),
        };

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            data_dir,
            database_path,
            log_chat_id: file.log_chat_id.map(ChatId),
            distractors: file.distractors,
            seed_words: file.seed_words,
            session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config_defaults() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.distractors, 3);
        assert!(config.seed_words);
        assert!(config.session_ttl.is_none());
        assert!(config.log_chat_id.is_none());
        assert_eq!(config.database_path, PathBuf::from("./flashrecall.db"));
    }

    #[test]
    fn test_explicit_fields() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "data_dir": "/var/lib/flashrecall",
            "log_chat_id": -100123,
            "distractors": 5,
            "seed_words": false,
            "session_ttl_minutes": 30
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/flashrecall/flashrecall.db"));
        assert_eq!(config.log_chat_id, Some(ChatId(-100123)));
        assert_eq!(config.distractors, 5);
        assert!(!config.seed_words);
        assert_eq!(config.session_ttl, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_database_path_override() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "data_dir": "/data",
            "database_path": "/elsewhere/words.db"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/elsewhere/words.db"));
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{ "telegram_bot_token": "" }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{ "telegram_bot_token": "invalid_token_no_colon" }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_empty_secret() {
        let file = write_config(r#"{ "telegram_bot_token": "123456789:" }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_distractors_out_of_range() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "distractors": 0
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(err.to_string().contains("distractors"));

        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "distractors": 12
        }"#);
        assert!(matches!(assert_err(Config::load(file.path())), ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
