//! Import a word list into the catalog as global words.
//!
//! Usage: cargo run --bin import_words <flashrecall.db> <words.json>
//!
//! The JSON file is an array whose entries are either `["english", "russian"]`
//! pairs or `{"english": "...", "russian": "..."}` objects. Words whose English
//! text is already in the catalog are skipped.

use serde::Deserialize;
use std::path::Path;

use flashrecall::trainer::{AddOutcome, Database};

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Pair(String, String),
    Object { english: String, russian: String },
}

impl Entry {
    fn into_parts(self) -> (String, String) {
        match self {
            Entry::Pair(english, russian) => (english, russian),
            Entry::Object { english, russian } => (english, russian),
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <flashrecall.db> <words.json>", args[0]);
        eprintln!();
        eprintln!("Import global English/Russian word pairs into the catalog.");
        std::process::exit(1);
    }

    let db_path = Path::new(&args[1]);
    let words_path = Path::new(&args[2]);

    let json = match std::fs::read_to_string(words_path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("ERROR: failed to read {:?}: {e}", words_path);
            std::process::exit(1);
        }
    };
    let entries: Vec<Entry> = match serde_json::from_str(&json) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("ERROR: failed to parse {:?}: {e}", words_path);
            std::process::exit(1);
        }
    };
    println!("Read {} entries from {:?}", entries.len(), words_path);

    let db = match Database::open(db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("ERROR: cannot open database {:?}: {e}", db_path);
            std::process::exit(1);
        }
    };

    let mut added = 0;
    let mut skipped = 0;
    for entry in entries {
        let (english, russian) = entry.into_parts();
        let (english, russian) = (english.trim(), russian.trim());
        if english.is_empty() || russian.is_empty() {
            skipped += 1;
            continue;
        }

        match db.add_global_word(english, russian) {
            Ok(AddOutcome::Added) => added += 1,
            Ok(AddOutcome::AlreadyExists) => skipped += 1,
            Err(e) => {
                eprintln!("ERROR: import stopped at '{english}': {e}");
                std::process::exit(1);
            }
        }
    }

    println!("Imported {} words ({} skipped)", added, skipped);
    match db.word_count() {
        Ok(total) => println!("Catalog now holds {} words", total),
        Err(e) => eprintln!("Could not count words: {e}"),
    }
}
