// src/session/question.rs

use serde::{Deserialize, Serialize};

/// One question of an attempt.
///
/// Field names are part of the snapshot export format and must stay stable:
/// `text`, `images`, `preCode`, `answer`, `output`, `flagged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    /// Images as `data:` URLs, in the order they were attached.
    #[serde(default)]
    pub images: Vec<String>,
    /// Starter code. Fixed for the lifetime of the attempt.
    #[serde(default)]
    pub pre_code: String,
    #[serde(default)]
    pub answer: String,
    /// Last engine result; empty until the first check.
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub flagged: bool,
}

impl Question {
    /// Whether this question has been run through the engine at least once.
    pub fn was_executed(&self) -> bool {
        !self.output.is_empty()
    }
}

/// Setup-time input for a question. Nothing here is part of the session until
/// the attempt starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub images: Vec<String>,
    pub pre_code: String,
    /// When false the starter code is discarded at commit time.
    pub use_pre_code: bool,
}

impl QuestionDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            images: Vec::new(),
            pre_code: String::new(),
            use_pre_code: true,
        }
    }

    /// Freeze the draft into a question record; `answer` starts as the
    /// starter code.
    pub fn commit(&self) -> Question {
        let pre_code = if self.use_pre_code {
            self.pre_code.clone()
        } else {
            String::new()
        };

        Question {
            text: self.text.clone(),
            images: self.images.clone(),
            answer: pre_code.clone(),
            pre_code,
            output: String::new(),
            flagged: false,
        }
    }
}

impl From<&Question> for QuestionDraft {
    /// Rebuild the setup input of a finished question (used by retakes).
    fn from(q: &Question) -> Self {
        Self {
            text: q.text.clone(),
            images: q.images.clone(),
            pre_code: q.pre_code.clone(),
            use_pre_code: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_seeds_answer_from_starter_code() {
        let mut draft = QuestionDraft::new("Sum a list");
        draft.pre_code = "def total(xs):\n    pass\n".to_string();

        let q = draft.commit();
        assert_eq!(q.pre_code, draft.pre_code);
        assert_eq!(q.answer, q.pre_code);
        assert!(q.output.is_empty());
        assert!(!q.flagged);
    }

    #[test]
    fn commit_drops_starter_code_when_disabled() {
        let mut draft = QuestionDraft::new("Free form");
        draft.pre_code = "x = 1".to_string();
        draft.use_pre_code = false;

        let q = draft.commit();
        assert_eq!(q.pre_code, "");
        assert_eq!(q.answer, "");
    }

    #[test]
    fn snapshot_field_names_are_stable() {
        let q = QuestionDraft::new("t").commit();
        let json = serde_json::to_value(&q).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["answer", "flagged", "images", "output", "preCode", "text"]
        );
    }
}
