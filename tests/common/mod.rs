#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing_subscriber::EnvFilter;
use trivia_quiz::loader::{ProviderError, QuestionSource};
use trivia_quiz::question::{AnswerOption, Difficulty, Question, QuestionBatch, QuestionFilter};

/// Routes engine logs to the test output. Set `RUST_LOG=trivia_quiz=debug`
/// to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ten questions whose correct option sits at `id % 4`
pub fn batch(label: &str) -> QuestionBatch {
    (0..10)
        .map(|id| Question {
            id,
            text: format!("{label} {id}"),
            answers: (0..4)
                .map(|a| AnswerOption {
                    id: a,
                    text: format!("answer {a}"),
                    is_selected: false,
                    is_correct: a == id % 4,
                })
                .collect(),
            difficulty: Difficulty::Medium,
            category: "General Knowledge".into(),
        })
        .collect()
}

pub fn correct_id(q: &Question) -> usize {
    q.correct_answer().map(|a| a.id).unwrap()
}

pub fn wrong_id(q: &Question) -> usize {
    q.incorrect_answers().map(|a| a.id).next().unwrap()
}

/// In-process source that labels batches by filter and records calls
#[derive(Default)]
pub struct StaticSource {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl QuestionSource for StaticSource {
    fn fetch(&self, filter: &QuestionFilter) -> Result<QuestionBatch, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Status(500));
        }
        let label = filter
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "any".to_string());
        Ok(batch(&label))
    }
}
