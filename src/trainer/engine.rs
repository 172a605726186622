//! Trainer engine - ties the store, the card generator and the sessions together.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::trainer::card::{Card, draw_card};
use crate::trainer::command::Button;
use crate::trainer::database::{Database, Result, UserProfile};
use crate::trainer::event::Event;
use crate::trainer::session::{AnswerOutcome, SessionKey, SessionRegistry};
use crate::trainer::words::{AddOutcome, RemoveOutcome, UserId, parse_new_word};

/// Trainer configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Wrong options shown next to the right one.
    pub distractors: usize,
    /// Idle sessions older than this are evicted. `None` keeps them forever.
    pub session_ttl: Option<Duration>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            distractors: 3,
            session_ttl: None,
        }
    }
}

/// The flashcard trainer.
///
/// Store calls always happen outside the session lock: a card is drawn
/// first and then installed in one short critical section. Operations on
/// one conversation are not atomic with respect to each other; callers
/// must deliver a chat's messages one at a time.
pub struct Trainer {
    config: TrainerConfig,
    database: Arc<Database>,
    sessions: SessionRegistry,
    rng: Mutex<StdRng>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, database: Arc<Database>) -> Self {
        Self::with_rng(config, database, StdRng::from_entropy())
    }

    /// Create a trainer with a fixed random source.
    pub fn with_rng(config: TrainerConfig, database: Arc<Database>, rng: StdRng) -> Self {
        Self {
            config,
            database,
            sessions: SessionRegistry::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Ensure the participant exists and return their surrogate id.
    pub fn register(&self, profile: &UserProfile) -> Result<UserId> {
        self.database.ensure_user(profile)
    }

    /// Greet and pose the first card.
    pub fn start(&self, key: SessionKey) -> Result<Vec<Event>> {
        let mut events = vec![Event::Greeting];
        events.extend(self.issue_card(key)?);
        Ok(events)
    }

    /// Draw a card from the user's effective pool.
    pub fn next_card(&self, user: UserId) -> Result<Option<Card>> {
        let pool = self.database.effective_pool(user)?;
        let pool_size = pool.len();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let card = draw_card(pool, self.config.distractors, &mut *rng);
        debug!("Drew card for user {} from pool of {}", user.0, pool_size);
        Ok(card)
    }

    /// Pose a new card, superseding any unanswered one.
    pub fn issue_card(&self, key: SessionKey) -> Result<Vec<Event>> {
        let Some(card) = self.next_card(key.user)? else {
            info!("📭 No words left for user {}", key.user.0);
            self.sessions.reset(key);
            return Ok(vec![Event::NoWordsAvailable]);
        };

        self.sessions.issue_card(key, &card);
        info!("🃏 Card for user {} in chat {}: {}", key.user.0, key.chat_id, card.target_word);

        Ok(vec![Event::CardIssued {
            translation_prompt: card.target_translation,
            option_texts: card.options,
        }])
    }

    /// Check a free-text answer against the current card.
    pub fn submit_answer(&self, key: SessionKey, text: &str) -> Vec<Event> {
        match self.sessions.submit_answer(key, text) {
            AnswerOutcome::Correct { target, translation } => {
                info!("✅ User {} answered '{}'", key.user.0, target);
                vec![Event::AnswerCorrect { target, translation }]
            }
            AnswerOutcome::Incorrect { translation } => {
                debug!("❌ User {} missed the card", key.user.0);
                vec![Event::AnswerIncorrect { translation }]
            }
            AnswerOutcome::NoActiveCard => vec![Event::NoActiveCard],
        }
    }

    /// Remove the word on the current card for this user, then pose a new card.
    pub fn delete_current(&self, key: SessionKey) -> Result<Vec<Event>> {
        let target = self
            .sessions
            .get(key)
            .and_then(|s| s.target_word().map(str::to_string));

        let Some(word) = target else {
            return self.issue_card(key);
        };

        let mut events = match self.database.remove_word_for_user(key.user, &word)? {
            RemoveOutcome::Removed(scope) => {
                info!("🗑️ User {} removed '{}' ({:?})", key.user.0, word, scope);
                vec![Event::WordRemoved { word, scope }]
            }
            RemoveOutcome::NotFound => {
                warn!("Word '{}' vanished before user {} could remove it", word, key.user.0);
                vec![Event::WordNotFound { word }]
            }
        };

        self.sessions.reset(key);
        events.extend(self.issue_card(key)?);
        Ok(events)
    }

    /// Ask for a new `english - russian` pair.
    pub fn prompt_add_word(&self, key: SessionKey) -> Vec<Event> {
        self.sessions.begin_add_word(key);
        vec![Event::AddWordPrompt]
    }

    /// Parse and store a pair typed after the add-word prompt.
    ///
    /// Malformed input keeps the prompt pending so the next message is
    /// parsed again.
    pub fn add_word(&self, key: SessionKey, text: &str) -> Result<Vec<Event>> {
        let word = match parse_new_word(text) {
            Ok(word) => word,
            Err(e) => {
                debug!("User {}: {}", key.user.0, e);
                return Ok(vec![Event::MalformedAddWordInput]);
            }
        };

        let outcome = self.database.add_word(key.user, &word)?;
        self.sessions.finish_add_word(key);

        Ok(match outcome {
            AddOutcome::Added => {
                info!("➕ User {} added '{}' - '{}'", key.user.0, word.english, word.russian);
                vec![Event::WordAdded]
            }
            AddOutcome::AlreadyExists => vec![Event::WordAlreadyExists],
        })
    }

    /// Route a plain text message: buttons first, then a pending add-word
    /// prompt, otherwise an answer.
    pub fn handle_text(&self, key: SessionKey, text: &str) -> Result<Vec<Event>> {
        match Button::parse(text) {
            Some(Button::Next) => self.issue_card(key),
            Some(Button::AddWord) => Ok(self.prompt_add_word(key)),
            Some(Button::DeleteWord) => self.delete_current(key),
            None if self.sessions.is_awaiting_new_word(key) => self.add_word(key, text),
            None => Ok(self.submit_answer(key, text)),
        }
    }

    /// Drop sessions idle for longer than the configured TTL.
    pub fn evict_idle_sessions(&self) -> usize {
        let Some(ttl) = self.config.session_ttl else {
            return 0;
        };
        let evicted = self.sessions.evict_idle(ttl);
        if evicted > 0 {
            info!("🧹 Evicted {} idle session(s), {} left", evicted, self.sessions.len());
        }
        evicted
    }
}
