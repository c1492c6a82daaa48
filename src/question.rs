use serde::{Deserialize, Serialize};

/// Number of questions in one quiz attempt
pub const BATCH_SIZE: usize = 10;

/// Number of options a freshly loaded question carries
pub const ANSWERS_PER_QUESTION: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Categories the quiz offers, keyed by the provider's numeric id
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Category {
    #[strum(to_string = "General Knowledge")]
    GeneralKnowledge,
    Books,
    Film,
    #[strum(to_string = "Computer Science")]
    ComputerScience,
    Sports,
    History,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::GeneralKnowledge,
        Category::Sports,
        Category::Books,
        Category::Film,
        Category::ComputerScience,
        Category::History,
    ];

    pub fn provider_id(&self) -> u32 {
        match self {
            Category::GeneralKnowledge => 9,
            Category::Books => 10,
            Category::Film => 11,
            Category::ComputerScience => 18,
            Category::Sports => 21,
            Category::History => 23,
        }
    }

    pub fn from_provider_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.provider_id() == id)
    }
}

/// Display name for the active category filter
pub fn category_name(category: Option<Category>) -> String {
    match category {
        Some(c) => c.to_string(),
        None => "Any Category".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Position within the list the option was created in
    pub id: usize,
    pub text: String,
    pub is_selected: bool,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 0-based index within the batch
    pub id: usize,
    pub text: String,
    pub answers: Vec<AnswerOption>,
    pub difficulty: Difficulty,
    /// Category label as reported by the provider
    pub category: String,
}

impl Question {
    pub fn correct_answer(&self) -> Option<&AnswerOption> {
        self.answers.iter().find(|a| a.is_correct)
    }

    pub fn incorrect_answers(&self) -> impl Iterator<Item = &AnswerOption> {
        self.answers.iter().filter(|a| !a.is_correct)
    }

    pub fn selected_answer(&self) -> Option<&AnswerOption> {
        self.answers.iter().find(|a| a.is_selected)
    }

    pub fn is_answered_correctly(&self) -> bool {
        self.answers.iter().any(|a| a.is_correct && a.is_selected)
    }
}

pub type QuestionBatch = Vec<Question>;

/// Optional category/difficulty constraint for a batch request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}
