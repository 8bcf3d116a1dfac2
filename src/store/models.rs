use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::services::dialogflow::actions::FlowAction;

/// Everything the bot persists, one JSON document on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub guilds: BTreeMap<u64, GuildData>,
    /// Member id -> interrupted onboarding conversation, resumed on the
    /// member's next DM (survives restarts).
    #[serde(default)]
    pub dialogflow_status: BTreeMap<u64, PendingInquiry>,
}

/// Per-guild settings for all three plugins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuildData {
    /// Channel id -> daily mute/reset configuration.
    #[serde(default)]
    pub daily: BTreeMap<u64, ChannelDailyConfig>,
    #[serde(default)]
    pub slots: SlotConfig,
    /// User id -> credit balance.
    #[serde(default)]
    pub bank: BTreeMap<u64, i64>,
    #[serde(default)]
    pub dialogflow: Option<GuildFlowConfig>,
}

/// Configuration of one channel under daily management.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDailyConfig {
    /// Delay between a member's message and the mute, in seconds.
    #[serde(default)]
    pub grace_seconds: u64,
    /// Members the mute gate never touches.
    #[serde(default)]
    pub ignored_members: BTreeSet<u64>,
    /// Members holding any of these roles are never touched either.
    #[serde(default)]
    pub ignored_roles: BTreeSet<u64>,
    /// Members the nightly reset never clears.
    #[serde(default)]
    pub muted_members: BTreeSet<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub min_bid: i64,
    pub max_bid: i64,
    /// Seconds a player has to wait between pulls.
    pub cooldown_seconds: i64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            min_bid: 5,
            max_bid: 100,
            cooldown_seconds: 0,
        }
    }
}

/// Last inquiry sent into a member's onboarding conversation, kept so the
/// conversation can be re-seeded after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInquiry {
    pub inquiry: String,
    pub guild_id: u64,
}

/// Dialogflow onboarding flow for one guild. Edited directly in the
/// settings file; the bot only reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuildFlowConfig {
    /// Channel that receives kick/role audit messages.
    #[serde(default)]
    pub log_channel: Option<u64>,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub try_again_message: String,
    /// Actions run when a member joins the guild.
    #[serde(default)]
    pub join_actions: Vec<FlowAction>,
    /// DM trigger phrase -> opening inquiry for a fresh conversation.
    #[serde(default)]
    pub triggers: BTreeMap<String, String>,
}
