//! Integration tests against an on-disk database shared by many threads.
//!
//! Run with: cargo test --test concurrent_words

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use flashrecall::trainer::words::NewWord;
use flashrecall::trainer::{AddOutcome, Database, RemoveOutcome, RemoveScope, SessionKey, Trainer, TrainerConfig, UserProfile};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn profile(telegram_id: i64) -> UserProfile {
    UserProfile {
        telegram_id,
        username: Some(format!("user{telegram_id}")),
        first_name: format!("User {telegram_id}"),
        last_name: None,
    }
}

fn open_temp() -> (tempfile::TempDir, Arc<Database>) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("flashrecall.db")).unwrap();
    (dir, Arc::new(db))
}

#[test]
fn test_concurrent_add_stores_one_word() {
    let (_dir, db) = open_temp();
    let users: Vec<_> = (1..=8).map(|id| db.ensure_user(&profile(id)).unwrap()).collect();

    let outcomes: Vec<AddOutcome> = thread::scope(|s| {
        let handles: Vec<_> = users
            .iter()
            .map(|user| {
                let db = db.clone();
                let user = *user;
                s.spawn(move || {
                    let word = NewWord { english: "fox".into(), russian: "лиса".into() };
                    db.add_word(user, &word).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|o| **o == AddOutcome::Added).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| **o == AddOutcome::AlreadyExists).count(), 7);
    assert_eq!(db.word_count().unwrap(), 1);

    // Only the winner sees it as their own word.
    let fox = db.find_word("fox").unwrap().unwrap();
    let owner = fox.owner.unwrap();
    for user in &users {
        let visible = db.effective_pool(*user).unwrap().iter().any(|w| w.english == "fox");
        assert_eq!(visible, *user == owner);
    }
}

#[test]
fn test_concurrent_hides_are_idempotent() {
    let (_dir, db) = open_temp();
    let user = db.ensure_user(&profile(1)).unwrap();
    db.add_global_word("cat", "кот").unwrap();

    thread::scope(|s| {
        for _ in 0..6 {
            let db = db.clone();
            s.spawn(move || {
                let outcome = db.remove_word_for_user(user, "cat").unwrap();
                assert_eq!(outcome, RemoveOutcome::Removed(RemoveScope::PersonalHide));
            });
        }
    });

    assert!(db.effective_pool(user).unwrap().is_empty());
    assert_eq!(db.word_count().unwrap(), 1);
}

#[test]
fn test_sessions_survive_many_conversations() {
    let (_dir, db) = open_temp();
    for (en, ru) in [("cat", "кот"), ("dog", "собака"), ("sun", "солнце"), ("car", "машина"), ("book", "книга")] {
        db.add_global_word(en, ru).unwrap();
    }
    let trainer = Trainer::with_rng(TrainerConfig::default(), db.clone(), StdRng::seed_from_u64(3));
    let keys: Vec<SessionKey> = (1..=10)
        .map(|id| SessionKey { user: trainer.register(&profile(id)).unwrap(), chat_id: id })
        .collect();

    thread::scope(|s| {
        for key in &keys {
            let trainer = &trainer;
            s.spawn(move || {
                for _ in 0..20 {
                    trainer.issue_card(*key).unwrap();
                }
            });
        }
    });

    assert_eq!(trainer.sessions().len(), keys.len());
    let targets: HashSet<String> = keys
        .iter()
        .filter_map(|k| trainer.sessions().get(*k).and_then(|s| s.target_word().map(str::to_string)))
        .collect();
    assert!(!targets.is_empty());
    for target in targets {
        assert!(db.find_word(&target).unwrap().is_some());
    }
}
