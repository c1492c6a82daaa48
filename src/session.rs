use crate::answers;
use crate::config::QuizSettings;
use crate::error::ActionRejected;
use crate::loader::ProviderError;
use crate::question::{Category, Difficulty, Question, QuestionBatch, QuestionFilter};
use crate::scorer::compute_score;
use crate::store::{KeyValueStore, NAME_KEY};
use crate::timer::{Countdown, TimerSignal, Timers};
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NameEntry,
    StartCountdown,
    Active,
    Summary,
    Error,
}

/// Feedback sound requested by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Short,
    Long,
}

impl Cue {
    pub fn duration(&self) -> Duration {
        match self {
            Cue::Short => Duration::from_millis(400),
            Cue::Long => Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// A batch fetch the caller must run and report back through
/// [`QuizSession::apply_batch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub filter: QuestionFilter,
}

#[derive(Debug, Clone, Copy, Default)]
struct Assists {
    eliminated: bool,
    revealed: bool,
}

/// A single player's quiz attempt, from name entry to summary
pub struct QuizSession {
    settings: QuizSettings,
    store: Box<dyn KeyValueStore>,
    rng: StdRng,
    phase: Phase,
    player_name: Option<String>,
    stored_name: Option<String>,
    filter: QuestionFilter,
    batch: QuestionBatch,
    assists: Vec<Assists>,
    current: usize,
    hint_budget: u32,
    timers: Timers,
    score: Option<u32>,
    finished_at: Option<DateTime<Local>>,
    last_request: u64,
    error: Option<String>,
    cues: Vec<Cue>,
}

impl QuizSession {
    pub fn new(settings: QuizSettings, store: Box<dyn KeyValueStore>) -> Self {
        Self::with_rng(settings, store, StdRng::from_entropy())
    }

    pub fn with_rng(settings: QuizSettings, store: Box<dyn KeyValueStore>, rng: StdRng) -> Self {
        let stored_name = store.get(NAME_KEY);
        let hint_budget = settings.hint_budget;
        Self {
            settings,
            store,
            rng,
            phase: Phase::NameEntry,
            player_name: None,
            stored_name,
            filter: QuestionFilter::default(),
            batch: vec![],
            assists: vec![],
            current: 0,
            hint_budget,
            timers: Timers::default(),
            score: None,
            finished_at: None,
            last_request: 0,
            error: None,
            cues: vec![],
        }
    }

    /// Issues a new fetch for the active filter. Results of any earlier
    /// request are ignored from now on.
    pub fn request_batch(&mut self) -> FetchRequest {
        self.last_request += 1;
        let request = FetchRequest {
            id: RequestId(self.last_request),
            filter: self.filter,
        };
        debug!(id = self.last_request, filter = ?self.filter, "issuing batch request");
        request
    }

    /// Applies a fetch result. Returns false when the result belongs to a
    /// superseded request, or the session already failed or finished.
    pub fn apply_batch(
        &mut self,
        id: RequestId,
        result: Result<QuestionBatch, ProviderError>,
    ) -> bool {
        if id.0 != self.last_request {
            debug!(id = id.0, latest = self.last_request, "discarding stale batch");
            return false;
        }
        if matches!(self.phase, Phase::Error | Phase::Summary) {
            debug!(id = id.0, phase = %self.phase, "ignoring batch, quiz is over");
            return false;
        }

        match result {
            Ok(batch) => {
                info!(id = id.0, questions = batch.len(), "question batch loaded");
                self.assists = vec![Assists::default(); batch.len()];
                self.batch = batch;
                self.current = self.current.min(self.last_index());
                true
            }
            Err(err) => {
                self.fail(&err);
                true
            }
        }
    }

    fn fail(&mut self, err: &ProviderError) {
        warn!(%err, phase = %self.phase, "question provider unavailable");
        self.timers.cancel_all();
        self.batch.clear();
        self.assists.clear();
        self.error = Some(err.to_string());
        self.phase = Phase::Error;
    }

    pub fn submit_name(&mut self, name: &str) -> Result<(), ActionRejected> {
        if self.phase != Phase::NameEntry {
            return Err(ActionRejected::AlreadyStarted);
        }

        let name = name.trim();
        let player_name = match (&self.stored_name, name.is_empty()) {
            (None, true) => return Err(ActionRejected::InvalidName),
            (Some(stored), true) => stored.clone(),
            (_, false) => name.to_string(),
        };

        if self.stored_name.is_none() {
            if let Err(err) = self.store.set(NAME_KEY, &player_name) {
                warn!(%err, "could not persist player name");
            }
            self.stored_name = Some(player_name.clone());
        }

        self.timers.arm(
            Countdown::new(self.settings.start_countdown_secs, self.settings.start_transition()),
            Countdown::new(self.settings.quiz_duration_secs, self.settings.quiz_duration()),
        );
        info!(player = %player_name, "starting countdown");
        self.player_name = Some(player_name);
        self.phase = Phase::StartCountdown;
        Ok(())
    }

    /// Changes the category filter, returning the fetch to run when it
    /// actually changed. A batch already in play is replaced once it lands.
    /// In the summary the filter is only recorded for the next session.
    pub fn select_category(&mut self, category: Option<Category>) -> Option<FetchRequest> {
        self.change_filter(QuestionFilter {
            category,
            ..self.filter
        })
    }

    pub fn select_difficulty(&mut self, difficulty: Option<Difficulty>) -> Option<FetchRequest> {
        self.change_filter(QuestionFilter {
            difficulty,
            ..self.filter
        })
    }

    fn change_filter(&mut self, filter: QuestionFilter) -> Option<FetchRequest> {
        if self.phase == Phase::Error || filter == self.filter {
            return None;
        }
        self.filter = filter;
        match self.phase {
            Phase::Summary => return None,
            Phase::Active => warn!(?filter, "filter changed mid-quiz, batch will be replaced"),
            _ => {}
        }
        Some(self.request_batch())
    }

    pub fn navigate_next(&mut self) {
        if self.current < self.last_index() {
            self.current += 1;
        }
    }

    pub fn navigate_previous(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    fn last_index(&self) -> usize {
        self.batch.len().saturating_sub(1)
    }

    fn active_index(&self) -> Result<usize, ActionRejected> {
        if self.phase != Phase::Active {
            return Err(ActionRejected::QuizNotActive);
        }
        if self.current < self.batch.len() {
            Ok(self.current)
        } else {
            Err(ActionRejected::NoQuestionLoaded)
        }
    }

    fn replace(&mut self, index: usize, question: Question) {
        self.batch[index] = question;
        self.cues.push(Cue::Short);
    }

    pub fn select_answer(&mut self, answer_id: usize) -> Result<(), ActionRejected> {
        let idx = self.active_index()?;
        let next = answers::select(&self.batch[idx], answer_id);
        self.replace(idx, next);
        Ok(())
    }

    pub fn use_hint(&mut self) -> Result<(), ActionRejected> {
        let idx = self.active_index()?;
        let next = answers::hint(&self.batch[idx], self.hint_budget, &mut self.rng)
            .inspect_err(|e| debug!(%e, "hint rejected"))?;
        self.hint_budget -= 1;
        self.replace(idx, next);
        Ok(())
    }

    pub fn eliminate_two_wrong(&mut self) -> Result<(), ActionRejected> {
        let idx = self.active_index()?;
        if self.assists[idx].eliminated {
            return Err(ActionRejected::AlreadyEliminated);
        }
        let next = answers::eliminate_two_wrong(&self.batch[idx], &mut self.rng);
        self.assists[idx].eliminated = true;
        self.replace(idx, next);
        Ok(())
    }

    pub fn reveal_correct(&mut self) -> Result<(), ActionRejected> {
        let idx = self.active_index()?;
        let next = answers::reveal_correct(&self.batch[idx])?;
        self.assists[idx].revealed = true;
        self.replace(idx, next);
        Ok(())
    }

    /// Ends the quiz and scores it. Returns the score only for the call that
    /// actually finished the session.
    pub fn finish(&mut self) -> Option<u32> {
        if !matches!(self.phase, Phase::StartCountdown | Phase::Active) {
            return None;
        }

        self.timers.cancel_all();
        let score = compute_score(&self.batch);
        self.score = Some(score);
        self.finished_at = Some(Local::now());
        self.phase = Phase::Summary;
        self.cues.push(Cue::Long);
        info!(player = ?self.player_name, score, "quiz finished");
        Some(score)
    }

    /// Forgets the persisted player name. A running session keeps its name.
    pub fn rename(&mut self) {
        if let Err(err) = self.store.remove(NAME_KEY) {
            warn!(%err, "could not clear stored player name");
        }
        self.stored_name = None;
    }

    /// Drops the current attempt and goes back to name entry, keeping the
    /// stored name and filters. Returns the fetch for the fresh batch.
    pub fn start_new_session(&mut self) -> FetchRequest {
        self.timers.cancel_all();
        self.timers = Timers::default();
        self.phase = Phase::NameEntry;
        self.player_name = None;
        self.stored_name = self.store.get(NAME_KEY);
        self.batch.clear();
        self.assists.clear();
        self.current = 0;
        self.hint_budget = self.settings.hint_budget;
        self.score = None;
        self.finished_at = None;
        self.error = None;
        self.cues.clear();
        info!("new session");
        self.request_batch()
    }

    /// Feeds elapsed time to the running timers
    pub fn advance(&mut self, dt: Duration) {
        for signal in self.timers.advance(dt) {
            match signal {
                TimerSignal::CountdownTick { .. } => self.cues.push(Cue::Short),
                TimerSignal::CountdownElapsed => {
                    if self.phase == Phase::StartCountdown {
                        info!("quiz active");
                        self.phase = Phase::Active;
                    }
                }
                TimerSignal::QuizTick { .. } => {}
                TimerSignal::QuizElapsed => {
                    info!("quiz time is up");
                    self.finish();
                }
            }
        }
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn stored_name(&self) -> Option<&str> {
        self.stored_name.as_deref()
    }

    pub fn filter(&self) -> QuestionFilter {
        self.filter
    }

    pub fn batch(&self) -> &[Question] {
        &self.batch
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.batch.get(self.current)
    }

    pub fn hint_budget(&self) -> u32 {
        self.hint_budget
    }

    pub fn wrong_answers_eliminated(&self) -> bool {
        self.assists.get(self.current).is_some_and(|a| a.eliminated)
    }

    pub fn correct_answer_revealed(&self) -> bool {
        self.assists.get(self.current).is_some_and(|a| a.revealed)
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn finished_at(&self) -> Option<DateTime<Local>> {
        self.finished_at
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start_countdown_secs(&self) -> u32 {
        self.timers
            .start_countdown()
            .map_or(self.settings.start_countdown_secs, Countdown::remaining)
    }

    pub fn remaining_quiz_secs(&self) -> u32 {
        self.timers
            .quiz_timer()
            .map_or(self.settings.quiz_duration_secs, Countdown::remaining)
    }

    pub fn timers_running(&self) -> bool {
        self.timers.any_running()
    }
}
