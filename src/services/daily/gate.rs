use std::collections::BTreeMap;
use std::time::Duration;

use serenity::all::{ChannelId, PermissionOverwrite, PermissionOverwriteType, Permissions, UserId};
use tracing::{debug, info};

use crate::bot::error::Error;
use crate::store::ChannelDailyConfig;

/// The slice of an inbound message the gate decision needs.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_roles: Vec<u64>,
    /// The message was sent by this bot's own user.
    pub from_self: bool,
}

/// External effect to perform after a positive gate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateAction {
    pub channel_id: u64,
    pub member_id: u64,
    /// Wait this long before applying the mute. Zero means immediately.
    pub grace: Duration,
}

/// Decide whether a message should get its author muted.
///
/// Returns `None` for DMs, the bot itself, channels not under daily
/// management, and ignored members/roles.
pub fn evaluate(
    event: &MessageEvent,
    daily: &BTreeMap<u64, ChannelDailyConfig>,
) -> Option<GateAction> {
    event.guild_id?;
    if event.from_self {
        return None;
    }

    let config = daily.get(&event.channel_id)?;
    if config.ignored_members.contains(&event.author_id) {
        return None;
    }
    if event
        .author_roles
        .iter()
        .any(|role| config.ignored_roles.contains(role))
    {
        return None;
    }

    Some(GateAction {
        channel_id: event.channel_id,
        member_id: event.author_id,
        grace: Duration::from_secs(config.grace_seconds),
    })
}

/// Apply a gate decision: merge a SEND_MESSAGES denial into the member's
/// permission overwrite, preserving every other bit already on it.
pub async fn apply_mute(
    ctx: &serenity::all::Context,
    action: &GateAction,
) -> Result<(), Error> {
    if !action.grace.is_zero() {
        debug!(
            "Waiting {}s grace before muting {} in {}",
            action.grace.as_secs(),
            action.member_id,
            action.channel_id
        );
        tokio::time::sleep(action.grace).await;
    }

    let channel_id = ChannelId::new(action.channel_id);
    let member_id = UserId::new(action.member_id);

    let channel = channel_id
        .to_channel(&ctx.http)
        .await?
        .guild()
        .ok_or_else(|| Error::ChannelNotFound(action.channel_id))?;

    let existing = channel
        .permission_overwrites
        .iter()
        .find(|o| o.kind == PermissionOverwriteType::Member(member_id));

    let (allow, deny) = match existing {
        Some(o) => (
            o.allow & !Permissions::SEND_MESSAGES,
            o.deny | Permissions::SEND_MESSAGES,
        ),
        None => (Permissions::empty(), Permissions::SEND_MESSAGES),
    };

    channel
        .create_permission(
            &ctx.http,
            PermissionOverwrite {
                allow,
                deny,
                kind: PermissionOverwriteType::Member(member_id),
            },
        )
        .await?;

    info!(
        "Muted member {} in channel {} until the next reset",
        action.member_id, action.channel_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn monitored(channel_id: u64, config: ChannelDailyConfig) -> BTreeMap<u64, ChannelDailyConfig> {
        BTreeMap::from([(channel_id, config)])
    }

    fn event(channel_id: u64, author_id: u64) -> MessageEvent {
        MessageEvent {
            guild_id: Some(1),
            channel_id,
            author_id,
            author_roles: vec![],
            from_self: false,
        }
    }

    #[test]
    fn test_unmonitored_channel_is_ignored() {
        let daily = monitored(10, ChannelDailyConfig::default());
        assert_eq!(evaluate(&event(11, 7), &daily), None);
    }

    #[test]
    fn test_dm_and_self_are_ignored() {
        let daily = monitored(10, ChannelDailyConfig::default());

        let mut dm = event(10, 7);
        dm.guild_id = None;
        assert_eq!(evaluate(&dm, &daily), None);

        let mut own = event(10, 7);
        own.from_self = true;
        assert_eq!(evaluate(&own, &daily), None);
    }

    #[test]
    fn test_plain_member_is_muted_with_zero_grace() {
        let daily = monitored(10, ChannelDailyConfig::default());
        assert_eq!(
            evaluate(&event(10, 7), &daily),
            Some(GateAction {
                channel_id: 10,
                member_id: 7,
                grace: Duration::ZERO,
            })
        );
    }

    #[test]
    fn test_grace_period_is_carried() {
        let daily = monitored(
            10,
            ChannelDailyConfig {
                grace_seconds: 30,
                ..Default::default()
            },
        );
        let action = evaluate(&event(10, 7), &daily).unwrap();
        assert_eq!(action.grace, Duration::from_secs(30));
    }

    #[test]
    fn test_ignored_member_passes() {
        let daily = monitored(
            10,
            ChannelDailyConfig {
                ignored_members: [7].into(),
                ..Default::default()
            },
        );
        assert_eq!(evaluate(&event(10, 7), &daily), None);
        assert!(evaluate(&event(10, 8), &daily).is_some());
    }

    #[test]
    fn test_ignored_role_passes() {
        let daily = monitored(
            10,
            ChannelDailyConfig {
                ignored_roles: [42].into(),
                ..Default::default()
            },
        );

        let mut with_role = event(10, 7);
        with_role.author_roles = vec![41, 42];
        assert_eq!(evaluate(&with_role, &daily), None);

        let mut other_role = event(10, 7);
        other_role.author_roles = vec![41];
        assert!(evaluate(&other_role, &daily).is_some());
    }
}
