use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuizSettings {
    pub provider_url: String,
    pub question_count: usize,
    pub start_countdown_secs: u32,
    /// Delay between name submission and the quiz becoming active
    pub start_transition_secs: u32,
    pub quiz_duration_secs: u32,
    pub hint_budget: u32,
    pub request_timeout_secs: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            provider_url: "https://opentdb.com/api.php".to_string(),
            question_count: crate::question::BATCH_SIZE,
            start_countdown_secs: 5,
            start_transition_secs: 7,
            quiz_duration_secs: 67,
            hint_budget: 3,
            request_timeout_secs: 10,
        }
    }
}

impl QuizSettings {
    pub fn start_transition(&self) -> Duration {
        Duration::from_secs(self.start_transition_secs.into())
    }

    pub fn quiz_duration(&self) -> Duration {
        Duration::from_secs(self.quiz_duration_secs.into())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub trait ConfigStore {
    fn load(&self) -> QuizSettings;
    fn save(&self, cfg: &QuizSettings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("trivia_quiz_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> QuizSettings {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<QuizSettings>(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable settings");
                QuizSettings::default()
            }),
            Err(_) => QuizSettings::default(),
        }
    }

    fn save(&self, cfg: &QuizSettings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
