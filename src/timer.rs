//! Countdown timers owned by a session.
//!
//! Timers never read the clock themselves. The session feeds them elapsed
//! time through `advance`, so every transition lands on an exact second.

use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Running,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// A whole second passed before expiry; carries the displayed value
    Tick { remaining: u32 },
    Expired,
}

/// Displays `from` counting down once per second and expires after
/// `expires_after`, independently of the displayed value.
#[derive(Debug, Clone)]
pub struct Countdown {
    from: u32,
    expires_after: Duration,
    elapsed: Duration,
    state: TimerState,
}

impl Countdown {
    pub fn new(from: u32, expires_after: Duration) -> Self {
        Self {
            from,
            expires_after,
            elapsed: Duration::ZERO,
            state: TimerState::Running,
        }
    }

    pub fn advance(&mut self, dt: Duration) -> Vec<TimerEvent> {
        if self.state != TimerState::Running {
            return vec![];
        }

        let before = self.elapsed.as_secs();
        self.elapsed += dt;
        let reached = self.elapsed.min(self.expires_after);

        let mut events: Vec<TimerEvent> = (before + 1..=reached.as_secs())
            .filter(|s| SECOND * (*s as u32) < self.expires_after)
            .map(|s| TimerEvent::Tick {
                remaining: self.from.saturating_sub(s as u32),
            })
            .collect();

        if self.elapsed >= self.expires_after {
            self.state = TimerState::Expired;
            events.push(TimerEvent::Expired);
        }
        events
    }

    /// Value shown to the player, never below zero
    pub fn remaining(&self) -> u32 {
        self.from
            .saturating_sub(self.elapsed.min(self.expires_after).as_secs() as u32)
    }

    pub fn cancel(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Cancelled;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn has_expired(&self) -> bool {
        self.state == TimerState::Expired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    CountdownTick { remaining: u32 },
    CountdownElapsed,
    QuizTick { remaining: u32 },
    QuizElapsed,
}

/// The start countdown and the quiz duration timer, armed together
#[derive(Debug, Clone, Default)]
pub struct Timers {
    start: Option<Countdown>,
    quiz: Option<Countdown>,
}

impl Timers {
    pub fn arm(&mut self, start: Countdown, quiz: Countdown) {
        self.start = Some(start);
        self.quiz = Some(quiz);
    }

    pub fn cancel_all(&mut self) {
        if let Some(t) = self.start.as_mut() {
            t.cancel();
        }
        if let Some(t) = self.quiz.as_mut() {
            t.cancel();
        }
    }

    /// Advances both timers, start countdown first
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerSignal> {
        let mut signals = vec![];
        if let Some(t) = self.start.as_mut() {
            signals.extend(t.advance(dt).into_iter().map(|e| match e {
                TimerEvent::Tick { remaining } => TimerSignal::CountdownTick { remaining },
                TimerEvent::Expired => TimerSignal::CountdownElapsed,
            }));
        }
        if let Some(t) = self.quiz.as_mut() {
            signals.extend(t.advance(dt).into_iter().map(|e| match e {
                TimerEvent::Tick { remaining } => TimerSignal::QuizTick { remaining },
                TimerEvent::Expired => TimerSignal::QuizElapsed,
            }));
        }
        signals
    }

    pub fn start_countdown(&self) -> Option<&Countdown> {
        self.start.as_ref()
    }

    pub fn quiz_timer(&self) -> Option<&Countdown> {
        self.quiz.as_ref()
    }

    pub fn any_running(&self) -> bool {
        self.start.as_ref().is_some_and(Countdown::is_running)
            || self.quiz.as_ref().is_some_and(Countdown::is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_start_countdown_ticks_then_expires_at_seven() {
        let mut t = Countdown::new(5, secs(7));
        let mut ticks = vec![];
        let mut expired_at = None;

        for second in 1..=10 {
            for event in t.advance(secs(1)) {
                match event {
                    TimerEvent::Tick { remaining } => ticks.push(remaining),
                    TimerEvent::Expired => expired_at = Some(second),
                }
            }
        }

        assert_eq!(ticks, vec![4, 3, 2, 1, 0, 0]);
        assert_eq!(expired_at, Some(7));
        assert!(t.has_expired());
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn test_sub_second_steps() {
        let mut t = Countdown::new(5, secs(7));
        assert!(t.advance(Duration::from_millis(600)).is_empty());
        assert_eq!(
            t.advance(Duration::from_millis(600)),
            vec![TimerEvent::Tick { remaining: 4 }]
        );
        assert_eq!(t.remaining(), 4);
    }

    #[test]
    fn test_large_step_expires_once() {
        let mut t = Countdown::new(67, secs(67));
        let events = t.advance(secs(100));
        assert_eq!(events.len(), 67);
        assert_eq!(events.last(), Some(&TimerEvent::Expired));
        assert!(t.advance(secs(1)).is_empty());
    }

    #[test]
    fn test_expires_exactly_on_boundary() {
        let mut t = Countdown::new(67, secs(67));
        assert!(!t.advance(secs(66)).contains(&TimerEvent::Expired));
        assert!(t.is_running());
        assert_eq!(t.remaining(), 1);
        assert_eq!(t.advance(secs(1)), vec![TimerEvent::Expired]);
    }

    #[test]
    fn test_cancelled_timer_is_silent() {
        let mut t = Countdown::new(5, secs(7));
        t.advance(secs(2));
        t.cancel();
        assert!(t.advance(secs(10)).is_empty());
        assert!(!t.is_running());
        assert!(!t.has_expired());
        assert_eq!(t.remaining(), 3);
    }

    #[test]
    fn test_timers_cancel_all() {
        let mut timers = Timers::default();
        assert!(!timers.any_running());
        timers.arm(Countdown::new(5, secs(7)), Countdown::new(67, secs(67)));
        assert!(timers.any_running());

        timers.cancel_all();
        assert!(!timers.any_running());
        assert!(timers.advance(secs(100)).is_empty());
    }

    #[test]
    fn test_timers_order_start_before_quiz() {
        let mut timers = Timers::default();
        timers.arm(Countdown::new(5, secs(7)), Countdown::new(67, secs(67)));
        let signals = timers.advance(secs(1));
        assert_eq!(
            signals,
            vec![
                TimerSignal::CountdownTick { remaining: 4 },
                TimerSignal::QuizTick { remaining: 66 }
            ]
        );
    }
}
