use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ActionRejected;
use crate::loader::{ProviderError, QuestionSource};
use crate::question::{Category, Difficulty, QuestionBatch};
use crate::session::{FetchRequest, QuizSession, RequestId};

/// Everything the player can ask the engine to do
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerAction {
    SubmitName(String),
    SelectCategory(Option<Category>),
    SelectDifficulty(Option<Difficulty>),
    SelectAnswer(usize),
    Hint,
    EliminateTwoWrong,
    RevealCorrect,
    Next,
    Previous,
    Finish,
    Rename,
    NewSession,
}

/// Unified event type consumed by the driver
#[derive(Debug)]
pub enum QuizEvent {
    Action(PlayerAction),
    BatchLoaded {
        request: RequestId,
        result: Result<QuestionBatch, ProviderError>,
    },
    Tick,
}

/// Source of player actions and fetch completions
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;
}

/// Event source backed by an mpsc channel. The presentation layer and the
/// fetch threads share the sending half.
pub struct ChannelEventSource {
    rx: Receiver<QuizEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<QuizEvent>) -> Self {
        Self { rx }
    }
}

impl QuizEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub fn event_channel() -> (Sender<QuizEvent>, ChannelEventSource) {
    let (tx, rx) = mpsc::channel();
    (tx, ChannelEventSource::new(rx))
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: QuizEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: QuizEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> QuizEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => QuizEvent::Tick,
        }
    }
}

/// Owns a session and applies events to it one at a time. Fetches run on
/// background threads and come back as [`QuizEvent::BatchLoaded`].
pub struct Driver<S: QuestionSource + 'static> {
    session: QuizSession,
    source: Arc<S>,
    events: Sender<QuizEvent>,
    last_seen: Instant,
}

impl<S: QuestionSource + 'static> Driver<S> {
    pub fn new(session: QuizSession, source: Arc<S>, events: Sender<QuizEvent>) -> Self {
        Self {
            session,
            source,
            events,
            last_seen: Instant::now(),
        }
    }

    /// Kicks off the initial fetch for the session's current filter
    pub fn start(&mut self) {
        let request = self.session.request_batch();
        self.spawn_fetch(request);
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    pub fn step<E: QuizEventSource, T: Ticker>(
        &mut self,
        runner: &Runner<E, T>,
    ) -> Result<(), ActionRejected> {
        self.handle(runner.step())
    }

    /// Applies one event. Wall-clock time since the previous event is fed to
    /// the session timers first.
    pub fn handle(&mut self, event: QuizEvent) -> Result<(), ActionRejected> {
        let now = Instant::now();
        self.session.advance(now.duration_since(self.last_seen));
        self.last_seen = now;

        match event {
            QuizEvent::Tick => Ok(()),
            QuizEvent::BatchLoaded { request, result } => {
                self.session.apply_batch(request, result);
                Ok(())
            }
            QuizEvent::Action(action) => self.apply(action),
        }
    }

    fn apply(&mut self, action: PlayerAction) -> Result<(), ActionRejected> {
        let session = &mut self.session;
        match action {
            PlayerAction::SubmitName(name) => session.submit_name(&name),
            PlayerAction::SelectCategory(category) => {
                if let Some(request) = session.select_category(category) {
                    self.spawn_fetch(request);
                }
                Ok(())
            }
            PlayerAction::SelectDifficulty(difficulty) => {
                if let Some(request) = session.select_difficulty(difficulty) {
                    self.spawn_fetch(request);
                }
                Ok(())
            }
            PlayerAction::SelectAnswer(id) => session.select_answer(id),
            PlayerAction::Hint => session.use_hint(),
            PlayerAction::EliminateTwoWrong => session.eliminate_two_wrong(),
            PlayerAction::RevealCorrect => session.reveal_correct(),
            PlayerAction::Next => {
                session.navigate_next();
                Ok(())
            }
            PlayerAction::Previous => {
                session.navigate_previous();
                Ok(())
            }
            PlayerAction::Finish => {
                session.finish();
                Ok(())
            }
            PlayerAction::Rename => {
                session.rename();
                Ok(())
            }
            PlayerAction::NewSession => {
                let request = session.start_new_session();
                self.spawn_fetch(request);
                Ok(())
            }
        }
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        debug!(?request, "spawning fetch");
        thread::spawn(move || {
            let result = source.fetch(&request.filter);
            // The receiver is gone once the driver shuts down
            let _ = events.send(QuizEvent::BatchLoaded {
                request: request.id,
                result,
            });
        });
    }
}
