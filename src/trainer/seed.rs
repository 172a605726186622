//! Built-in global vocabulary inserted into an empty catalog.

pub const DEFAULT_WORDS: &[(&str, &str)] = &[
    // nouns
    ("table", "стол"),
    ("computer", "компьютер"),
    ("book", "книга"),
    ("water", "вода"),
    ("tree", "дерево"),
    ("phone", "телефон"),
    ("car", "машина"),
    ("house", "дом"),
    ("sun", "солнце"),
    ("dog", "собака"),
    // adjectives
    ("big", "большой"),
    ("small", "маленький"),
    ("fast", "быстрый"),
    ("slow", "медленный"),
    ("beautiful", "красивый"),
    ("ugly", "уродливый"),
    ("smart", "умный"),
    ("stupid", "глупый"),
    ("hot", "горячий"),
    ("cold", "холодный"),
    // verbs
    ("run", "бежать"),
    ("eat", "есть"),
    ("sleep", "спать"),
    ("read", "читать"),
    ("write", "писать"),
    ("speak", "говорить"),
    ("listen", "слушать"),
    ("learn", "учить"),
    ("work", "работать"),
    ("play", "играть"),
    // adverbs
    ("quickly", "быстро"),
    ("slowly", "медленно"),
    ("loudly", "громко"),
    ("quietly", "тихо"),
    ("well", "хорошо"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_english_is_unique() {
        let english: HashSet<_> = DEFAULT_WORDS.iter().map(|(en, _)| en).collect();
        assert_eq!(english.len(), DEFAULT_WORDS.len());
    }
}
