use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "trivia-quiz").map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn store_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("trivia-quiz");
            Some(state_dir.join("store.json"))
        } else {
            ProjectDirs::from("", "", "trivia-quiz")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("store.json"))
        }
    }
}
