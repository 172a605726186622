//! Trainer module - vocabulary quiz over Telegram.

pub mod card;
pub mod command;
pub mod database;
pub mod engine;
pub mod event;
pub mod seed;
pub mod session;
pub mod telegram;
pub mod words;


pub use card::Card;
pub use command::{Button, Command};
pub use database::{Database, StoreError, UserProfile};
pub use engine::{Trainer, TrainerConfig};
pub use event::Event;
pub use session::{SessionKey, SessionRegistry};
pub use telegram::TelegramClient;
pub use words::{AddOutcome, RemoveOutcome, RemoveScope, UserId, Word};
