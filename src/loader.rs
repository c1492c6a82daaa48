//! Question bank loading from the trivia provider.

use crate::config::QuizSettings;
use crate::question::{
    AnswerOption, Difficulty, Question, QuestionBatch, QuestionFilter, ANSWERS_PER_QUESTION,
};
use rand::Rng;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Any of these leaves the session without questions
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider answered with HTTP status {0}")]
    Status(u16),
    #[error("provider answered with response code {0}")]
    ResponseCode(u8),
    #[error("malformed provider payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    response_code: u8,
    results: Vec<RawQuestion>,
}

/// One trivia item as the provider sends it
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub difficulty: Difficulty,
    pub category: String,
}

/// Anything able to produce a fresh batch for a filter
pub trait QuestionSource: Send + Sync {
    fn fetch(&self, filter: &QuestionFilter) -> Result<QuestionBatch, ProviderError>;
}

pub fn build_url(base: &str, filter: &QuestionFilter, amount: usize) -> Result<Url, ProviderError> {
    let mut params = vec![("amount", amount.to_string())];
    if let Some(category) = filter.category {
        params.push(("category", category.provider_id().to_string()));
    }
    if let Some(difficulty) = filter.difficulty {
        params.push(("difficulty", difficulty.to_string()));
    }
    params.push(("type", "multiple".to_string()));

    Url::parse_with_params(base, &params).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Places the correct answer at a uniformly random slot among the four and
/// numbers the options by position.
pub fn normalize<R: Rng + ?Sized>(
    index: usize,
    raw: RawQuestion,
    rng: &mut R,
) -> Result<Question, ProviderError> {
    if raw.incorrect_answers.len() != ANSWERS_PER_QUESTION - 1 {
        return Err(ProviderError::Malformed(format!(
            "question {index} has {} incorrect answers",
            raw.incorrect_answers.len()
        )));
    }

    let correct_slot = rng.gen_range(0..ANSWERS_PER_QUESTION);
    let mut texts = raw.incorrect_answers;
    texts.insert(correct_slot, raw.correct_answer);

    let answers = texts
        .into_iter()
        .enumerate()
        .map(|(id, text)| AnswerOption {
            id,
            text,
            is_selected: false,
            is_correct: id == correct_slot,
        })
        .collect();

    Ok(Question {
        id: index,
        text: raw.question,
        answers,
        difficulty: raw.difficulty,
        category: raw.category,
    })
}

/// Decodes a provider payload into a batch of exactly `amount` questions
pub fn parse_batch<R: Rng + ?Sized>(
    body: &[u8],
    amount: usize,
    rng: &mut R,
) -> Result<QuestionBatch, ProviderError> {
    let response: ProviderResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if response.response_code != 0 {
        return Err(ProviderError::ResponseCode(response.response_code));
    }
    if response.results.len() != amount {
        return Err(ProviderError::Malformed(format!(
            "expected {amount} questions, got {}",
            response.results.len()
        )));
    }

    response
        .results
        .into_iter()
        .enumerate()
        .map(|(index, raw)| normalize(index, raw, &mut *rng))
        .collect()
}

/// Open Trivia DB over blocking HTTP
#[derive(Debug, Clone)]
pub struct OpenTdbSource {
    client: reqwest::blocking::Client,
    base_url: String,
    amount: usize,
}

impl OpenTdbSource {
    pub fn new(settings: &QuizSettings) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: settings.provider_url.clone(),
            amount: settings.question_count,
        })
    }
}

impl QuestionSource for OpenTdbSource {
    #[instrument(skip(self), fields(base = %self.base_url))]
    fn fetch(&self, filter: &QuestionFilter) -> Result<QuestionBatch, ProviderError> {
        let url = build_url(&self.base_url, filter, self.amount)?;
        debug!(%url, "requesting question batch");

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.bytes()?;
        parse_batch(&body, self.amount, &mut rand::thread_rng())
    }
}
