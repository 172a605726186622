//! Inbound triggers: slash commands and reply-keyboard buttons.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команды / Commands:")]
pub enum Command {
    #[command(description = "начать / start learning")]
    Start,
    #[command(description = "новая карточка / next card")]
    Cards,
    #[command(description = "показать команды / show this help")]
    Help,
}

/// Reply-keyboard buttons shown under every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Next,
    AddWord,
    DeleteWord,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Next, Button::AddWord, Button::DeleteWord];

    pub fn label(self) -> &'static str {
        match self {
            Button::Next => "Дальше ⏭",
            Button::AddWord => "Добавить слово ➕",
            Button::DeleteWord => "Удалить слово 🔙",
        }
    }

    /// Match a message against the button labels exactly.
    pub fn parse(text: &str) -> Option<Button> {
        Self::ALL.into_iter().find(|b| b.label() == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_round_trip() {
        for button in Button::ALL {
            assert_eq!(Button::parse(button.label()), Some(button));
        }
    }

    #[test]
    fn test_button_needs_exact_label() {
        assert_eq!(Button::parse("Дальше"), None);
        assert_eq!(Button::parse("dog"), None);
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "flashrecall_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/cards", "flashrecall_bot").unwrap(), Command::Cards);
        assert!(Command::parse("/nope", "flashrecall_bot").is_err());
    }
}
