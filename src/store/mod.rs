mod models;
mod settings_store;

pub use models::{
    ChannelDailyConfig, GuildData, GuildFlowConfig, PendingInquiry, SlotConfig, StoreData,
};
pub use settings_store::{DailyUpdate, SettingsStore};
