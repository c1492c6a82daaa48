use thiserror::Error;

/// Recoverable notices returned by session actions. A rejected action leaves
/// the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("please enter a valid name")]
    InvalidName,
    #[error("no hints remaining")]
    NoHintsRemaining,
    #[error("there is just one option")]
    OnlyOneOptionRemains,
    #[error("wrong answers were already eliminated for this question")]
    AlreadyEliminated,
    #[error("the session has already started")]
    AlreadyStarted,
    #[error("the quiz is not running")]
    QuizNotActive,
    #[error("no question is loaded")]
    NoQuestionLoaded,
}
