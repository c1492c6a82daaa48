//! What the presentation layer needs per phase, derived on demand from the
//! session rather than stored alongside it.

use crate::question::{category_name, Difficulty, Question};
use crate::session::{Phase, QuizSession};
use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionView<'a> {
    NameEntry {
        stored_name: Option<&'a str>,
        category_name: String,
        difficulty: Option<Difficulty>,
    },
    Countdown {
        player_name: &'a str,
        seconds: u32,
        category_name: String,
        difficulty: Option<Difficulty>,
    },
    Active {
        player_name: &'a str,
        question: Option<&'a Question>,
        index: usize,
        total: usize,
        remaining_secs: u32,
        hint_budget: u32,
        wrong_answers_eliminated: bool,
        correct_answer_revealed: bool,
        category_name: String,
        difficulty: Option<Difficulty>,
    },
    Summary {
        player_name: &'a str,
        score: u32,
        questions: &'a [Question],
        finished_at: Option<DateTime<Local>>,
    },
    Error {
        message: &'a str,
    },
}

impl SessionView<'_> {
    pub fn is_error(&self) -> bool {
        matches!(self, SessionView::Error { .. })
    }
}

pub fn view(session: &QuizSession) -> SessionView<'_> {
    let filter = session.filter();
    let player_name = session.player_name().unwrap_or_default();

    match session.phase() {
        Phase::NameEntry => SessionView::NameEntry {
            stored_name: session.stored_name(),
            category_name: category_name(filter.category),
            difficulty: filter.difficulty,
        },
        Phase::StartCountdown => SessionView::Countdown {
            player_name,
            seconds: session.start_countdown_secs(),
            category_name: category_name(filter.category),
            difficulty: filter.difficulty,
        },
        Phase::Active => SessionView::Active {
            player_name,
            question: session.current_question(),
            index: session.current_index(),
            total: session.batch().len(),
            remaining_secs: session.remaining_quiz_secs(),
            hint_budget: session.hint_budget(),
            wrong_answers_eliminated: session.wrong_answers_eliminated(),
            correct_answer_revealed: session.correct_answer_revealed(),
            category_name: category_name(filter.category),
            difficulty: filter.difficulty,
        },
        Phase::Summary => SessionView::Summary {
            player_name,
            score: session.score().unwrap_or_default(),
            questions: session.batch(),
            finished_at: session.finished_at(),
        },
        Phase::Error => SessionView::Error {
            message: session.error().unwrap_or("the question provider is unavailable"),
        },
    }
}
