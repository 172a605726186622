//! Outbound events and their chat rendering.

use crate::trainer::command::Button;
use crate::trainer::words::RemoveScope;

/// Buttons per keyboard row.
const ROW_WIDTH: usize = 2;

/// Something the trainer wants shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Greeting,
    CardIssued {
        translation_prompt: String,
        option_texts: Vec<String>,
    },
    AnswerCorrect {
        target: String,
        translation: String,
    },
    AnswerIncorrect {
        translation: String,
    },
    AddWordPrompt,
    WordAdded,
    WordAlreadyExists,
    WordRemoved {
        word: String,
        scope: RemoveScope,
    },
    WordNotFound {
        word: String,
    },
    MalformedAddWordInput,
    NoWordsAvailable,
    NoActiveCard,
    StoreFailure,
}

impl Event {
    /// Message text, bilingual where the bot greets or confirms.
    pub fn text(&self) -> String {
        match self {
            Event::Greeting => {
                "Привет! Давай учить английские слова!\nHello! Let's learn english words!".to_string()
            }
            Event::CardIssued { translation_prompt, .. } => {
                format!("Выбери перевод слова:\n🇷🇺 {translation_prompt}")
            }
            Event::AnswerCorrect { target, translation } => format!(
                "Отлично!❤ {target} -> {translation}\n⏭ Нажми «{}» для следующего слова",
                Button::Next.label()
            ),
            Event::AnswerIncorrect { translation } => {
                format!("Ошибка! Попробуй снова перевести 🇷🇺 {translation}")
            }
            Event::AddWordPrompt => {
                "Введите новое слово (английское и русское через тире):".to_string()
            }
            Event::WordAdded => "Слово добавлено!\nThe word added!".to_string(),
            Event::WordAlreadyExists => "Слово уже существует!\nThe word already exists!".to_string(),
            Event::WordRemoved { word, scope: RemoveScope::PersonalHide } => {
                format!("Слово '{word}' удалено для вас!")
            }
            Event::WordRemoved { word, scope: RemoveScope::Global } => {
                format!("Слово '{word}' удалено из словаря!")
            }
            Event::WordNotFound { word } => format!("Слово '{word}' не найдено."),
            Event::MalformedAddWordInput => {
                "Неправильный формат! Введите как 'apple - яблоко' или нажмите Дальше ⏭".to_string()
            }
            Event::NoWordsAvailable => {
                "Слова закончились! Добавьте новое слово.\nNo words left! Add a new one.".to_string()
            }
            Event::NoActiveCard => "Нажмите /cards или Дальше для нового слова.".to_string(),
            Event::StoreFailure => {
                "Что-то пошло не так, попробуйте ещё раз.\nSomething went wrong, please try again."
                    .to_string()
            }
        }
    }

    /// Reply keyboard rows, only for a freshly issued card.
    pub fn keyboard(&self) -> Option<Vec<Vec<String>>> {
        let Event::CardIssued { option_texts, .. } = self else {
            return None;
        };

        let labels: Vec<String> = option_texts
            .iter()
            .cloned()
            .chain(Button::ALL.iter().map(|b| b.label().to_string()))
            .collect();

        Some(labels.chunks(ROW_WIDTH).map(<[String]>::to_vec).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_event() -> Event {
        Event::CardIssued {
            translation_prompt: "собака".into(),
            option_texts: vec!["cat".into(), "dog".into(), "sun".into(), "car".into()],
        }
    }

    #[test]
    fn test_card_text_shows_prompt_only() {
        let text = card_event().text();
        assert!(text.contains("собака"));
        assert!(!text.contains("dog"));
    }

    #[test]
    fn test_card_keyboard_layout() {
        let rows = card_event().keyboard().unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["cat".to_string(), "dog".to_string()],
                vec!["sun".to_string(), "car".to_string()],
                vec![Button::Next.label().to_string(), Button::AddWord.label().to_string()],
                vec![Button::DeleteWord.label().to_string()],
            ]
        );
    }

    #[test]
    fn test_short_card_keyboard() {
        let event = Event::CardIssued {
            translation_prompt: "кот".into(),
            option_texts: vec!["cat".into()],
        };
        let rows = event.keyboard().unwrap();
        assert_eq!(rows[0], vec!["cat".to_string(), Button::Next.label().to_string()]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_other_events_have_no_keyboard() {
        assert!(Event::WordAdded.keyboard().is_none());
        assert!(Event::AnswerIncorrect { translation: "кот".into() }.keyboard().is_none());
    }

    #[test]
    fn test_removal_text_depends_on_scope() {
        let hidden = Event::WordRemoved { word: "cat".into(), scope: RemoveScope::PersonalHide };
        let deleted = Event::WordRemoved { word: "fox".into(), scope: RemoveScope::Global };
        assert!(hidden.text().contains("для вас"));
        assert!(deleted.text().contains("из словаря"));
    }

    #[test]
    fn test_correct_answer_mentions_next_button() {
        let text = Event::AnswerCorrect { target: "dog".into(), translation: "собака".into() }.text();
        assert!(text.contains("dog -> собака"));
        assert!(text.contains(Button::Next.label()));
    }
}
