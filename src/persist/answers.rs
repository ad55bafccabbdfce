// src/persist/answers.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info};

use super::store::KeyValueStore;

static ANSWER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^q(\d+)_code$").expect("answer key pattern is valid"));

/// Storage key for the answer of question `index`.
pub fn answer_key(index: usize) -> String {
    format!("q{index}_code")
}

/// Whether `key` belongs to an attempt's answer mirror.
pub fn is_answer_key(key: &str) -> bool {
    ANSWER_KEY.is_match(key)
}

fn index_of(key: &str) -> Option<usize> {
    ANSWER_KEY
        .captures(key)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Mirror of the active attempt's answers, one entry per question.
pub struct AnswerPersistence {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for AnswerPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerPersistence").finish_non_exhaustive()
    }
}

impl AnswerPersistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the stored answer for `index`.
    pub fn save(&mut self, index: usize, answer: &str) -> Result<()> {
        self.store.set(&answer_key(index), answer)?;
        debug!(index, bytes = answer.len(), "answer mirrored");
        Ok(())
    }

    pub fn load(&self, index: usize) -> Result<Option<String>> {
        self.store.get(&answer_key(index))
    }

    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.store.remove(&answer_key(index))
    }

    /// Remove every answer entry; other keys are left alone.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> Result<usize> {
        let keys: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| is_answer_key(k))
            .collect();

        for key in &keys {
            self.store.remove(key)?;
        }

        info!(removed = keys.len(), "answer storage cleared");
        Ok(keys.len())
    }

    /// Answers left behind by an interrupted attempt, keyed by question
    /// index. Only indices that were actually stored appear.
    pub fn recover(&self) -> Result<BTreeMap<usize, String>> {
        let mut answers = BTreeMap::new();
        for key in self.store.keys()? {
            let Some(index) = index_of(&key) else {
                continue;
            };
            if let Some(value) = self.store.get(&key)? {
                answers.insert(index, value);
            }
        }
        Ok(answers)
    }
}
