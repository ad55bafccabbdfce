#![allow(dead_code)]

use examsim::config::{ExamConfig, QuestionConfig, RawExamConfig};
use examsim::session::QuestionDraft;

/// Builder for `ExamConfig` to simplify test setup.
pub struct ExamConfigBuilder {
    config: RawExamConfig,
}

impl ExamConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawExamConfig::default(),
        }
    }

    pub fn with_question(mut self, text: &str) -> Self {
        self.config.question.push(QuestionConfig {
            text: text.to_string(),
            pre_code: String::new(),
            use_pre_code: true,
            images: Vec::new(),
        });
        self
    }

    pub fn with_question_config(mut self, question: QuestionConfig) -> Self {
        self.config.question.push(question);
        self
    }

    pub fn minutes(mut self, minutes: u64) -> Self {
        self.config.exam.minutes = minutes;
        self
    }

    pub fn unlimited(mut self) -> Self {
        self.config.exam.unlimited = true;
        self
    }

    pub fn raw(self) -> RawExamConfig {
        self.config
    }

    pub fn build(self) -> ExamConfig {
        ExamConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ExamConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `QuestionDraft`.
pub struct DraftBuilder {
    draft: QuestionDraft,
}

impl DraftBuilder {
    pub fn new(text: &str) -> Self {
        Self {
            draft: QuestionDraft::new(text),
        }
    }

    pub fn pre_code(mut self, code: &str) -> Self {
        self.draft.pre_code = code.to_string();
        self
    }

    pub fn without_pre_code(mut self) -> Self {
        self.draft.use_pre_code = false;
        self
    }

    pub fn image(mut self, data_url: &str) -> Self {
        self.draft.images.push(data_url.to_string());
        self
    }

    pub fn build(self) -> QuestionDraft {
        self.draft
    }
}

/// `n` plain drafts titled "Question 1", "Question 2", ...
pub fn drafts(n: usize) -> Vec<QuestionDraft> {
    (1..=n)
        .map(|i| QuestionDraft::new(format!("Question {i}")))
        .collect()
}
