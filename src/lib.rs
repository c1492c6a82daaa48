// Library surface for embedding the quiz engine behind any presentation layer.
pub mod answers;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod loader;
pub mod question;
pub mod runtime;
pub mod scorer;
pub mod session;
pub mod store;
pub mod timer;
pub mod view;

pub use error::ActionRejected;
pub use loader::ProviderError;
pub use session::{Phase, QuizSession};
