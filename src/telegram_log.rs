//! Tracing layer that mirrors log lines into an admin chat.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Telegram rejects messages longer than this.
const MAX_MESSAGE_CHARS: usize = 4000;
/// INFO lines buffered before an early flush.
const MAX_BUFFERED: usize = 50;
const FLUSH_INTERVAL: Duration = Duration::from_secs(10);

struct LogLine {
    urgent: bool,
    text: String,
}

pub struct TelegramLogLayer {
    tx: mpsc::UnboundedSender<LogLine>,
}

impl TelegramLogLayer {
    /// Spawns the forwarding task; must be called inside a tokio runtime.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<LogLine>();
        tokio::spawn(forward(bot, chat_id, rx));
        Self { tx }
    }
}

/// WARN/ERROR go out at once; INFO is batched and flushed periodically.
async fn forward(bot: Bot, chat_id: ChatId, mut rx: mpsc::UnboundedReceiver<LogLine>) {
    let mut pending: Vec<String> = Vec::new();
    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);

    loop {
        tokio::select! {
            line = rx.recv() => {
                let Some(line) = line else {
                    flush(&bot, chat_id, &mut pending).await;
                    break;
                };
                if line.urgent {
                    flush(&bot, chat_id, &mut pending).await;
                    deliver(&bot, chat_id, &line.text).await;
                } else {
                    pending.push(line.text);
                    if pending.len() >= MAX_BUFFERED {
                        flush(&bot, chat_id, &mut pending).await;
                    }
                }
            }
            _ = ticker.tick() => flush(&bot, chat_id, &mut pending).await,
        }
    }
}

async fn flush(bot: &Bot, chat_id: ChatId, pending: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let combined = std::mem::take(pending).join("\n");
    deliver(bot, chat_id, &combined).await;
}

async fn deliver(bot: &Bot, chat_id: ChatId, text: &str) {
    let text = truncate(text);
    // Logging from here would feed back into this layer.
    if let Err(e) = bot.send_message(chat_id, text).await {
        eprintln!("Failed to send log to Telegram: {e}");
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
    cut.push_str("...");
    cut
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<String>,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, self.fields.join(", "))
        }
    }
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{} = {:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for TelegramLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::INFO {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let body = visitor.finish();

        let line = match level {
            Level::ERROR => LogLine { urgent: true, text: format!("❌ {body}") },
            Level::WARN => LogLine { urgent: true, text: format!("⚠️ {body}") },
            _ => LogLine { urgent: false, text: body },
        };

        if self.tx.send(line).is_err() {
            eprintln!("Log channel closed, message dropped");
        }
    }
}
