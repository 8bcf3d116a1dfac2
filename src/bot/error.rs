use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dialogflow request failed: {0}")]
    Dialogflow(#[from] reqwest::Error),

    #[error("Dialogflow is not configured")]
    DialogflowNotConfigured,

    #[error("Channel not found: {0}")]
    ChannelNotFound(u64),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }
}
