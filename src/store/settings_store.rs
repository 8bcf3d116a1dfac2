use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::info;

use crate::bot::error::Error;
use crate::store::models::{ChannelDailyConfig, PendingInquiry, SlotConfig, StoreData};

const SETTINGS_FILE: &str = "settings.json";

/// Outcome of a mutation against the daily configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyUpdate {
    /// The change was made and persisted.
    Applied,
    /// The entry was already in the requested state; nothing was written.
    AlreadySet,
    /// The channel is not under daily management.
    UnknownChannel,
}

/// JSON-backed settings store. Every mutation is a scoped read-modify-write
/// under the lock followed by an atomic save (write temp file, rename).
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl SettingsStore {
    /// Open (or create) the settings file under `dir`.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(SETTINGS_FILE);

        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            info!("No settings file at {}, starting empty", path.display());
            StoreData::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Read a value out of the store.
    pub async fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> T {
        let data = self.data.read().await;
        f(&data)
    }

    /// Mutate the store and persist the result before releasing the lock.
    pub async fn update<T>(&self, f: impl FnOnce(&mut StoreData) -> T) -> Result<T, Error> {
        let mut data = self.data.write().await;
        let out = f(&mut data);
        self.save(&data).await?;
        Ok(out)
    }

    async fn save(&self, data: &StoreData) -> Result<(), Error> {
        let raw = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Daily plugin
    // ------------------------------------------------------------------

    /// Snapshot of a guild's monitored channels.
    pub async fn guild_daily(&self, guild_id: u64) -> std::collections::BTreeMap<u64, ChannelDailyConfig> {
        self.read(|d| {
            d.guilds
                .get(&guild_id)
                .map(|g| g.daily.clone())
                .unwrap_or_default()
        })
        .await
    }

    pub async fn add_daily_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
        grace_seconds: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update(|d| {
            let daily = &mut d.guilds.entry(guild_id).or_default().daily;
            if daily.contains_key(&channel_id) {
                return DailyUpdate::AlreadySet;
            }
            daily.insert(
                channel_id,
                ChannelDailyConfig {
                    grace_seconds,
                    ..Default::default()
                },
            );
            DailyUpdate::Applied
        })
        .await
    }

    pub async fn remove_daily_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update(|d| {
            let Some(guild) = d.guilds.get_mut(&guild_id) else {
                return DailyUpdate::UnknownChannel;
            };
            if guild.daily.remove(&channel_id).is_some() {
                DailyUpdate::Applied
            } else {
                DailyUpdate::UnknownChannel
            }
        })
        .await
    }

    pub async fn set_grace(
        &self,
        guild_id: u64,
        channel_id: u64,
        grace_seconds: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            if c.grace_seconds == grace_seconds {
                DailyUpdate::AlreadySet
            } else {
                c.grace_seconds = grace_seconds;
                DailyUpdate::Applied
            }
        })
        .await
    }

    pub async fn mute_member(
        &self,
        guild_id: u64,
        channel_id: u64,
        member_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            insert_outcome(c.muted_members.insert(member_id))
        })
        .await
    }

    pub async fn unmute_member(
        &self,
        guild_id: u64,
        channel_id: u64,
        member_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            remove_outcome(c.muted_members.remove(&member_id))
        })
        .await
    }

    pub async fn ignore_member(
        &self,
        guild_id: u64,
        channel_id: u64,
        member_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            insert_outcome(c.ignored_members.insert(member_id))
        })
        .await
    }

    pub async fn unignore_member(
        &self,
        guild_id: u64,
        channel_id: u64,
        member_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            remove_outcome(c.ignored_members.remove(&member_id))
        })
        .await
    }

    pub async fn ignore_role(
        &self,
        guild_id: u64,
        channel_id: u64,
        role_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            insert_outcome(c.ignored_roles.insert(role_id))
        })
        .await
    }

    pub async fn unignore_role(
        &self,
        guild_id: u64,
        channel_id: u64,
        role_id: u64,
    ) -> Result<DailyUpdate, Error> {
        self.update_channel(guild_id, channel_id, |c| {
            remove_outcome(c.ignored_roles.remove(&role_id))
        })
        .await
    }

    async fn update_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
        f: impl FnOnce(&mut ChannelDailyConfig) -> DailyUpdate,
    ) -> Result<DailyUpdate, Error> {
        self.update(|d| {
            let Some(config) = d
                .guilds
                .get_mut(&guild_id)
                .and_then(|g| g.daily.get_mut(&channel_id))
            else {
                return DailyUpdate::UnknownChannel;
            };
            f(config)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Slot machine
    // ------------------------------------------------------------------

    pub async fn slot_config(&self, guild_id: u64) -> SlotConfig {
        self.read(|d| {
            d.guilds
                .get(&guild_id)
                .map(|g| g.slots)
                .unwrap_or_default()
        })
        .await
    }

    pub async fn update_slot_config(
        &self,
        guild_id: u64,
        f: impl FnOnce(&mut SlotConfig),
    ) -> Result<SlotConfig, Error> {
        self.update(|d| {
            let slots = &mut d.guilds.entry(guild_id).or_default().slots;
            f(slots);
            *slots
        })
        .await
    }

    // ------------------------------------------------------------------
    // Dialogflow conversation status
    // ------------------------------------------------------------------

    pub async fn dialogflow_status(&self, member_id: u64) -> Option<PendingInquiry> {
        self.read(|d| d.dialogflow_status.get(&member_id).cloned()).await
    }

    pub async fn set_dialogflow_status(
        &self,
        member_id: u64,
        status: PendingInquiry,
    ) -> Result<(), Error> {
        self.update(|d| {
            d.dialogflow_status.insert(member_id, status);
        })
        .await
    }

    pub async fn clear_dialogflow_status(&self, member_id: u64) -> Result<(), Error> {
        self.update(|d| {
            d.dialogflow_status.remove(&member_id);
        })
        .await
    }
}

fn insert_outcome(inserted: bool) -> DailyUpdate {
    if inserted {
        DailyUpdate::Applied
    } else {
        DailyUpdate::AlreadySet
    }
}

fn remove_outcome(removed: bool) -> DailyUpdate {
    if removed {
        DailyUpdate::Applied
    } else {
        DailyUpdate::AlreadySet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let (_dir, store) = open_store();

        assert_eq!(
            store.add_daily_channel(1, 10, 30).await.unwrap(),
            DailyUpdate::Applied
        );
        assert_eq!(
            store.add_daily_channel(1, 10, 30).await.unwrap(),
            DailyUpdate::AlreadySet
        );

        let daily = store.guild_daily(1).await;
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[&10].grace_seconds, 30);
    }

    #[tokio::test]
    async fn remove_unknown_channel_is_reported() {
        let (_dir, store) = open_store();

        assert_eq!(
            store.remove_daily_channel(1, 10).await.unwrap(),
            DailyUpdate::UnknownChannel
        );

        store.add_daily_channel(1, 10, 0).await.unwrap();
        assert_eq!(
            store.remove_daily_channel(1, 10).await.unwrap(),
            DailyUpdate::Applied
        );
        assert!(store.guild_daily(1).await.is_empty());
    }

    #[tokio::test]
    async fn mute_and_ignore_lists() {
        let (_dir, store) = open_store();
        store.add_daily_channel(1, 10, 0).await.unwrap();

        assert_eq!(store.mute_member(1, 10, 7).await.unwrap(), DailyUpdate::Applied);
        assert_eq!(store.mute_member(1, 10, 7).await.unwrap(), DailyUpdate::AlreadySet);
        assert_eq!(
            store.mute_member(1, 99, 7).await.unwrap(),
            DailyUpdate::UnknownChannel
        );

        assert_eq!(store.ignore_role(1, 10, 42).await.unwrap(), DailyUpdate::Applied);
        assert_eq!(store.unignore_role(1, 10, 42).await.unwrap(), DailyUpdate::Applied);
        assert_eq!(
            store.unignore_role(1, 10, 42).await.unwrap(),
            DailyUpdate::AlreadySet
        );

        assert_eq!(store.unmute_member(1, 10, 7).await.unwrap(), DailyUpdate::Applied);
        assert!(store.guild_daily(1).await[&10].muted_members.is_empty());
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = SettingsStore::open(dir.path()).unwrap();
            store.add_daily_channel(1, 10, 15).await.unwrap();
            store.mute_member(1, 10, 7).await.unwrap();
            store
                .update_slot_config(1, |s| s.max_bid = 500)
                .await
                .unwrap();
        }

        let store = SettingsStore::open(dir.path()).unwrap();
        let daily = store.guild_daily(1).await;
        assert_eq!(daily[&10].grace_seconds, 15);
        assert!(daily[&10].muted_members.contains(&7));
        assert_eq!(store.slot_config(1).await.max_bid, 500);
        assert_eq!(store.slot_config(2).await.max_bid, 100);
    }

    #[tokio::test]
    async fn dialogflow_status_round_trip() {
        let (_dir, store) = open_store();

        assert!(store.dialogflow_status(5).await.is_none());
        store
            .set_dialogflow_status(
                5,
                PendingInquiry {
                    inquiry: "rules".into(),
                    guild_id: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            store.dialogflow_status(5).await.unwrap().inquiry,
            "rules"
        );
        store.clear_dialogflow_status(5).await.unwrap();
        assert!(store.dialogflow_status(5).await.is_none());
    }
}
