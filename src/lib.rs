//! FlashRecall: a Telegram vocabulary trainer.

pub mod config;
pub mod telegram_log;
pub mod trainer;
