use std::env;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    /// Directory holding the settings file.
    pub data_dir: PathBuf,
    /// Register commands in one guild instead of globally.
    pub guild_id: Option<u64>,
    pub dialogflow_project_id: Option<String>,
    pub dialogflow_access_token: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let data_dir = env::var("DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let guild_id = env::var("GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let dialogflow_project_id = env::var("DIALOGFLOW_PROJECT_ID")
            .ok()
            .filter(|s| !s.is_empty());

        let dialogflow_access_token = env::var("DIALOGFLOW_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            discord_token,
            data_dir,
            guild_id,
            dialogflow_project_id,
            dialogflow_access_token,
        })
    }
}
