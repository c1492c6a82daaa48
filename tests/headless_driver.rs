mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use trivia_quiz::config::QuizSettings;
use trivia_quiz::question::Category;
use trivia_quiz::runtime::{event_channel, Driver, FixedTicker, PlayerAction, QuizEvent, Runner};
use trivia_quiz::store::MemoryStore;
use trivia_quiz::view::{view, SessionView};
use trivia_quiz::{ActionRejected, Phase, QuizSession};

use common::{init_tracing, StaticSource};

fn session() -> QuizSession {
    QuizSession::new(QuizSettings::default(), Box::new(MemoryStore::new()))
}

/// Steps the driver until `done` holds or the deadline passes
fn pump<E, T>(driver: &mut Driver<StaticSource>, runner: &Runner<E, T>, done: impl Fn(&QuizSession) -> bool)
where
    E: trivia_quiz::runtime::QuizEventSource,
    T: trivia_quiz::runtime::Ticker,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(driver.session()) && Instant::now() < deadline {
        let _ = driver.step(runner);
    }
}

#[test]
fn headless_flow_loads_batch_and_scores() {
    init_tracing();
    let (tx, es) = event_channel();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));
    let source = Arc::new(StaticSource::default());
    let mut driver = Driver::new(session(), Arc::clone(&source), tx.clone());

    driver.start();
    pump(&mut driver, &runner, |s| !s.batch().is_empty());
    assert_eq!(driver.session().batch().len(), 10);
    assert_eq!(driver.session().batch()[0].text, "any 0");

    driver
        .handle(QuizEvent::Action(PlayerAction::SubmitName("Ada".into())))
        .unwrap();
    assert_eq!(driver.session().phase(), Phase::StartCountdown);

    // Skip the countdown without waiting on the wall clock
    driver.session_mut().advance(Duration::from_secs(7));
    assert_eq!(driver.session().phase(), Phase::Active);

    driver.handle(QuizEvent::Action(PlayerAction::SelectAnswer(0))).unwrap();
    driver.handle(QuizEvent::Action(PlayerAction::Next)).unwrap();
    driver.handle(QuizEvent::Action(PlayerAction::RevealCorrect)).unwrap();
    driver.handle(QuizEvent::Action(PlayerAction::Finish)).unwrap();

    assert_matches!(view(driver.session()), SessionView::Summary { score: 20, .. });
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn rejected_actions_come_back_to_the_caller() {
    init_tracing();
    let (tx, _es) = event_channel();
    let mut driver = Driver::new(session(), Arc::new(StaticSource::default()), tx);

    assert_matches!(
        driver.handle(QuizEvent::Action(PlayerAction::SubmitName(" ".into()))),
        Err(ActionRejected::InvalidName)
    );
    assert_matches!(
        driver.handle(QuizEvent::Action(PlayerAction::Hint)),
        Err(ActionRejected::QuizNotActive)
    );
    assert_eq!(driver.session().phase(), Phase::NameEntry);
}

#[test]
fn filter_change_refetches_and_latest_wins() {
    init_tracing();
    let (tx, es) = event_channel();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));
    let source = Arc::new(StaticSource::default());
    let mut driver = Driver::new(session(), Arc::clone(&source), tx);

    driver.start();
    driver
        .handle(QuizEvent::Action(PlayerAction::SelectCategory(Some(Category::Sports))))
        .unwrap();
    driver
        .handle(QuizEvent::Action(PlayerAction::SelectCategory(Some(Category::Sports))))
        .unwrap();

    pump(&mut driver, &runner, |s| {
        s.batch().first().is_some_and(|q| q.text == "Sports 0")
    });
    assert_eq!(driver.session().batch()[0].text, "Sports 0");

    // Let the superseded fetch land too; it must not win
    let deadline = Instant::now() + Duration::from_millis(200);
    while Instant::now() < deadline {
        let _ = driver.step(&runner);
    }
    assert_eq!(driver.session().batch()[0].text, "Sports 0");
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn provider_failure_moves_to_error() {
    init_tracing();
    let (tx, es) = event_channel();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));
    let source = Arc::new(StaticSource {
        fail: true,
        ..StaticSource::default()
    });
    let mut driver = Driver::new(session(), source, tx);

    driver.start();
    pump(&mut driver, &runner, |s| s.phase() == Phase::Error);
    assert!(view(driver.session()).is_error());
    assert!(!driver.session().timers_running());
}

#[test]
fn new_session_fetches_fresh_batch() {
    init_tracing();
    let (tx, es) = event_channel();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));
    let source = Arc::new(StaticSource::default());
    let mut driver = Driver::new(session(), Arc::clone(&source), tx);

    driver.start();
    pump(&mut driver, &runner, |s| !s.batch().is_empty());
    driver
        .handle(QuizEvent::Action(PlayerAction::SubmitName("Ada".into())))
        .unwrap();
    driver.handle(QuizEvent::Action(PlayerAction::Finish)).unwrap();
    assert_eq!(driver.session().phase(), Phase::Summary);

    driver.handle(QuizEvent::Action(PlayerAction::NewSession)).unwrap();
    assert_eq!(driver.session().phase(), Phase::NameEntry);
    assert_eq!(driver.session().stored_name(), Some("Ada"));
    pump(&mut driver, &runner, |s| !s.batch().is_empty());
    assert_eq!(driver.session().batch().len(), 10);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn filter_change_after_finish_keeps_scored_batch() {
    init_tracing();
    let (tx, es) = event_channel();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));
    let source = Arc::new(StaticSource::default());
    let mut driver = Driver::new(session(), Arc::clone(&source), tx);

    driver.start();
    pump(&mut driver, &runner, |s| !s.batch().is_empty());
    driver
        .handle(QuizEvent::Action(PlayerAction::SubmitName("Ada".into())))
        .unwrap();
    driver.session_mut().advance(Duration::from_secs(7));
    driver.handle(QuizEvent::Action(PlayerAction::SelectAnswer(0))).unwrap();
    driver.handle(QuizEvent::Action(PlayerAction::Finish)).unwrap();

    driver
        .handle(QuizEvent::Action(PlayerAction::SelectCategory(Some(Category::Books))))
        .unwrap();
    let deadline = Instant::now() + Duration::from_millis(100);
    while Instant::now() < deadline {
        let _ = driver.step(&runner);
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_matches!(
        view(driver.session()),
        SessionView::Summary { score: 10, questions, .. } if questions[0].text == "any 0"
    );

    driver.handle(QuizEvent::Action(PlayerAction::NewSession)).unwrap();
    pump(&mut driver, &runner, |s| !s.batch().is_empty());
    assert_eq!(driver.session().batch()[0].text, "Books 0");
}
