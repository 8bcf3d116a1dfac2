use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::AbortHandle;

use crate::bot::error::Error;
use crate::config::Settings;
use crate::services::dialogflow::client::DialogflowClient;
use crate::services::dialogflow::session::SessionRegistry;
use crate::store::SettingsStore;

/// Shared data available to all commands and handlers
pub struct Data {
    pub store: SettingsStore,
    pub settings: Settings,
    /// Present when both Dialogflow env vars are set.
    pub dialogflow: Option<DialogflowClient>,
    /// Active onboarding conversations.
    pub sessions: SessionRegistry,
    /// user_id -> time of their last slot machine pull
    pub slot_register: DashMap<u64, DateTime<Utc>>,
    reset_task: OnceLock<AbortHandle>,
}

impl Data {
    pub fn new(store: SettingsStore, settings: Settings) -> Self {
        let dialogflow = match (&settings.dialogflow_project_id, &settings.dialogflow_access_token) {
            (Some(project), Some(token)) => {
                Some(DialogflowClient::new(project.clone(), token.clone()))
            }
            _ => None,
        };

        Self {
            store,
            settings,
            dialogflow,
            sessions: SessionRegistry::new(),
            slot_register: DashMap::new(),
            reset_task: OnceLock::new(),
        }
    }

    pub fn dialogflow_client(&self) -> Result<&DialogflowClient, Error> {
        self.dialogflow.as_ref().ok_or(Error::DialogflowNotConfigured)
    }

    /// Remember the reset timer's handle so shutdown can cancel it.
    pub fn set_reset_task(&self, handle: AbortHandle) {
        let _ = self.reset_task.set(handle);
    }

    /// Cancel the reset timer. Safe at any of its suspension points: every
    /// per-member edit commits before the next begins.
    pub fn abort_reset_task(&self) {
        if let Some(handle) = self.reset_task.get() {
            handle.abort();
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("dialogflow_configured", &self.dialogflow.is_some())
            .field("slot_register_count", &self.slot_register.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
