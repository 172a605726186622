//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::trainer::command::Command;
use crate::trainer::event::Event;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Publish the slash commands in the client's command menu.
    pub async fn register_commands(&self) -> Result<(), String> {
        self.bot
            .set_my_commands(Command::bot_commands())
            .await
            .map(|_| info!("Registered bot commands"))
            .map_err(|e| {
                let msg = format!("Failed to register commands: {e}");
                warn!("{}", msg);
                msg
            })
    }

    /// Render an event, attaching the answer keyboard to new cards.
    pub async fn send_event(&self, chat_id: i64, event: &Event) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), event.text());

        if let Some(rows) = event.keyboard() {
            let keyboard = KeyboardMarkup::new(
                rows.into_iter()
                    .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>()),
            )
            .resize_keyboard();
            request = request.reply_markup(keyboard);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Send events in order, stopping at the first failure.
    pub async fn send_events(&self, chat_id: i64, events: &[Event]) -> Result<(), String> {
        for event in events {
            self.send_event(chat_id, event).await?;
        }
        Ok(())
    }

    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, String> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }
}
