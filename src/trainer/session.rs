//! Per-conversation quiz state.
//!
//! A session only exists once something has been asked in a conversation;
//! a missing entry is the idle state. Sessions live in memory and are lost
//! on restart, after which the next interaction simply issues a new card.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::trainer::card::Card;
use crate::trainer::words::UserId;

/// One conversation of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user: UserId,
    pub chat_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingAnswer {
        target_word: String,
        target_translation: String,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub phase: Phase,
    /// The next free-text message is a new `english - russian` pair.
    pub awaiting_new_word: bool,
    touched_at: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            phase: Phase::Idle,
            awaiting_new_word: false,
            touched_at: now,
        }
    }

    pub fn target_word(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingAnswer { target_word, .. } => Some(target_word.as_str()),
            Phase::Idle => None,
        }
    }

    pub fn target_translation(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingAnswer { target_translation, .. } => Some(target_translation.as_str()),
            Phase::Idle => None,
        }
    }
}

/// Outcome of checking a free-text answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { target: String, translation: String },
    Incorrect { translation: String },
    /// Nothing has been asked, or the last card was already answered.
    NoActiveCard,
}

/// All live sessions, keyed by conversation.
///
/// Every method takes the registry lock for a single in-memory update and
/// never performs I/O while holding it.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn entry_at<'a>(map: &'a mut HashMap<SessionKey, Session>, key: SessionKey, now: Instant) -> &'a mut Session {
        let session = map.entry(key).or_insert_with(|| Session::new(now));
        session.touched_at = now;
        session
    }

    /// Snapshot of a session, if one exists.
    pub fn get(&self, key: SessionKey) -> Option<Session> {
        self.lock().get(&key).cloned()
    }

    /// Pose `card`, replacing whatever was being asked before. Cancels a
    /// pending add-word prompt.
    pub fn issue_card(&self, key: SessionKey, card: &Card) {
        self.issue_card_at(key, card, Instant::now());
    }

    fn issue_card_at(&self, key: SessionKey, card: &Card, now: Instant) {
        let mut sessions = self.lock();
        let session = Self::entry_at(&mut sessions, key, now);
        session.phase = Phase::AwaitingAnswer {
            target_word: card.target_word.clone(),
            target_translation: card.target_translation.clone(),
        };
        session.awaiting_new_word = false;
    }

    /// Compare `text` with the current target. Exact match only.
    pub fn submit_answer(&self, key: SessionKey, text: &str) -> AnswerOutcome {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(&key) else {
            return AnswerOutcome::NoActiveCard;
        };
        session.touched_at = Instant::now();

        match &session.phase {
            Phase::Idle => AnswerOutcome::NoActiveCard,
            Phase::AwaitingAnswer { target_word, target_translation } if text == target_word => {
                let outcome = AnswerOutcome::Correct {
                    target: target_word.clone(),
                    translation: target_translation.clone(),
                };
                session.phase = Phase::Idle;
                outcome
            }
            Phase::AwaitingAnswer { target_translation, .. } => AnswerOutcome::Incorrect {
                translation: target_translation.clone(),
            },
        }
    }

    /// Drop the current card and any pending add-word prompt, keeping the
    /// session itself.
    pub fn reset(&self, key: SessionKey) {
        if let Some(session) = self.lock().get_mut(&key) {
            session.phase = Phase::Idle;
            session.awaiting_new_word = false;
            session.touched_at = Instant::now();
        }
    }

    /// Mark that the next free text is a word to add.
    pub fn begin_add_word(&self, key: SessionKey) {
        let mut sessions = self.lock();
        Self::entry_at(&mut sessions, key, Instant::now()).awaiting_new_word = true;
    }

    /// Clear the add-word prompt. Returns whether one was pending.
    pub fn finish_add_word(&self, key: SessionKey) -> bool {
        match self.lock().get_mut(&key) {
            Some(session) => std::mem::take(&mut session.awaiting_new_word),
            None => false,
        }
    }

    pub fn is_awaiting_new_word(&self, key: SessionKey) -> bool {
        self.lock().get(&key).is_some_and(|s| s.awaiting_new_word)
    }

    /// Remove sessions untouched for longer than `ttl`. Returns how many went.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(ttl, Instant::now())
    }

    fn evict_idle_at(&self, ttl: Duration, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.touched_at) <= ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
