use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use flashrecall::config::Config;
use flashrecall::telegram_log;
use flashrecall::trainer::seed::DEFAULT_WORDS;
use flashrecall::trainer::{
    Command, Database, Event, SessionKey, StoreError, TelegramClient, Trainer, TrainerConfig, UserProfile,
};

/// How often idle sessions are swept when a TTL is configured.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

struct BotState {
    trainer: Trainer,
    telegram: TelegramClient,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "flashrecall.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("flashrecall.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_chat_id) = config.log_chat_id {
        let tg_layer = telegram_log::TelegramLogLayer::new(bot.clone(), log_chat_id);
        registry.with(tg_layer).init();
    } else {
        registry.init();
    }

    info!("🚀 Starting flashrecall...");
    info!("Loaded config from {config_path}");

    let database = match Database::open(&config.database_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Cannot open database {:?}: {e}", config.database_path);
            std::process::exit(1);
        }
    };

    if config.seed_words
        && let Err(e) = database.seed_if_empty(DEFAULT_WORDS)
    {
        warn!("Seeding failed: {e}");
    }

    let trainer_config = TrainerConfig {
        distractors: config.distractors,
        session_ttl: config.session_ttl,
    };
    let telegram = TelegramClient::new(bot.clone());
    telegram.register_commands().await.ok();

    let state = Arc::new(BotState {
        trainer: Trainer::new(trainer_config, database),
        telegram,
    });

    if let Some(ttl) = config.session_ttl {
        info!("Session TTL: {} min", ttl.as_secs() / 60);
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(EVICTION_INTERVAL);
            loop {
                interval.tick().await;
                state.trainer.evict_idle_sessions();
            }
        });
    }

    let handler = Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
        .branch(dptree::endpoint(handle_text));

    // The default distribution function handles one chat's updates in order.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(key) = session_key(&msg, &state).await else {
        return Ok(());
    };

    let result = match cmd {
        Command::Start => {
            info!("👋 /start from user {} in chat {}", key.user.0, chat_id);
            state.trainer.start(key)
        }
        Command::Cards => state.trainer.issue_card(key),
        Command::Help => {
            state.telegram.send_text(chat_id, &Command::descriptions().to_string()).await.ok();
            return Ok(());
        }
    };

    reply(&state, chat_id, result).await;
    Ok(())
}

async fn handle_text(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(key) = session_key(&msg, &state).await else {
        return Ok(());
    };

    let result = state.trainer.handle_text(key, text);
    reply(&state, msg.chat.id.0, result).await;
    Ok(())
}

/// Register the sender on first contact and key their session by chat.
async fn session_key(msg: &Message, state: &BotState) -> Option<SessionKey> {
    let user = msg.from.as_ref()?;
    let profile = UserProfile {
        telegram_id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    };

    match state.trainer.register(&profile) {
        Ok(user) => Some(SessionKey { user, chat_id: msg.chat.id.0 }),
        Err(e) => {
            error!("Failed to register user {}: {e}", profile.telegram_id);
            state.telegram.send_event(msg.chat.id.0, &Event::StoreFailure).await.ok();
            None
        }
    }
}

async fn reply(state: &BotState, chat_id: i64, result: Result<Vec<Event>, StoreError>) {
    let events = result.unwrap_or_else(|e| {
        error!("Store error in chat {chat_id}: {e}");
        vec![Event::StoreFailure]
    });

    if let Err(e) = state.telegram.send_events(chat_id, &events).await {
        warn!("Reply to chat {chat_id} incomplete: {e}");
    }
}
