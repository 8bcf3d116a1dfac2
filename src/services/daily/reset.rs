use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Local;
use serenity::all::{
    ChannelId, Http, PermissionOverwrite, PermissionOverwriteType, Permissions, UserId,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::daily::schedule;

/// A member permission overwrite as read from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOverwrite {
    pub member_id: u64,
    pub allow: Permissions,
    pub deny: Permissions,
}

/// One edit the nightly pass performs on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetAction {
    /// Removing SEND_MESSAGES left the overwrite empty; delete it outright.
    Delete { member_id: u64 },
    /// The overwrite carries other bits; persist it without SEND_MESSAGES.
    Reduce {
        member_id: u64,
        allow: Permissions,
        deny: Permissions,
    },
}

/// Plan the nightly pass for one channel. Members on the permanent mute
/// list are never touched; overwrites without a SEND_MESSAGES bit need no
/// edit at all.
pub fn plan_reset(overwrites: &[MemberOverwrite], muted: &BTreeSet<u64>) -> Vec<ResetAction> {
    let mut plan = Vec::new();

    for overwrite in overwrites {
        if muted.contains(&overwrite.member_id) {
            continue;
        }

        let send = Permissions::SEND_MESSAGES;
        if !overwrite.allow.contains(send) && !overwrite.deny.contains(send) {
            continue;
        }

        let allow = overwrite.allow & !send;
        let deny = overwrite.deny & !send;
        if allow.is_empty() && deny.is_empty() {
            plan.push(ResetAction::Delete {
                member_id: overwrite.member_id,
            });
        } else {
            plan.push(ResetAction::Reduce {
                member_id: overwrite.member_id,
                allow,
                deny,
            });
        }
    }

    plan
}

/// Start the reset timer: sleep until the next local midnight, run a pass
/// over every monitored channel, repeat. The returned handle is aborted on
/// shutdown; every per-member edit commits before the next begins, so an
/// abort at any point leaves at most a partially processed night, finished
/// by the following cycle.
pub fn spawn_reset_task(http: Arc<Http>, data: Arc<Data>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = schedule::duration_until_midnight(&Local::now());
            debug!("Reset timer sleeping {}s until local midnight", wait.as_secs());
            tokio::time::sleep(wait).await;

            if let Err(e) = run_reset_pass(&http, &data).await {
                error!("Nightly reset pass aborted: {:?}", e);
            }
        }
    })
}

/// One full pass over every monitored channel of every guild.
pub async fn run_reset_pass(http: &Http, data: &Data) -> Result<(), Error> {
    let channels: Vec<(u64, BTreeSet<u64>)> = data
        .store
        .read(|d| {
            d.guilds
                .values()
                .flat_map(|g| {
                    g.daily
                        .iter()
                        .map(|(channel_id, config)| (*channel_id, config.muted_members.clone()))
                })
                .collect()
        })
        .await;

    info!("Running daily reset over {} channel(s)", channels.len());

    for (channel_id, muted) in channels {
        reset_channel(http, channel_id, &muted).await?;
    }

    Ok(())
}

async fn reset_channel(http: &Http, channel_id: u64, muted: &BTreeSet<u64>) -> Result<(), Error> {
    let channel = ChannelId::new(channel_id)
        .to_channel(http)
        .await?
        .guild()
        .ok_or_else(|| Error::ChannelNotFound(channel_id))?;

    let overwrites: Vec<MemberOverwrite> = channel
        .permission_overwrites
        .iter()
        .filter_map(|o| match o.kind {
            PermissionOverwriteType::Member(user_id) => Some(MemberOverwrite {
                member_id: user_id.get(),
                allow: o.allow,
                deny: o.deny,
            }),
            _ => None,
        })
        .collect();

    for action in plan_reset(&overwrites, muted) {
        match action {
            ResetAction::Delete { member_id } => {
                channel
                    .delete_permission(
                        http,
                        PermissionOverwriteType::Member(UserId::new(member_id)),
                    )
                    .await?;
                debug!("Cleared overwrite for {} in {}", member_id, channel_id);
            }
            ResetAction::Reduce {
                member_id,
                allow,
                deny,
            } => {
                channel
                    .create_permission(
                        http,
                        PermissionOverwrite {
                            allow,
                            deny,
                            kind: PermissionOverwriteType::Member(UserId::new(member_id)),
                        },
                    )
                    .await?;
                debug!("Reduced overwrite for {} in {}", member_id, channel_id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send_denied(member_id: u64) -> MemberOverwrite {
        MemberOverwrite {
            member_id,
            allow: Permissions::empty(),
            deny: Permissions::SEND_MESSAGES,
        }
    }

    #[test]
    fn test_muted_member_is_never_cleared() {
        let overwrites = vec![send_denied(1), send_denied(2)];
        let muted = BTreeSet::from([1]);

        let plan = plan_reset(&overwrites, &muted);
        assert_eq!(plan, vec![ResetAction::Delete { member_id: 2 }]);
    }

    #[test]
    fn test_send_denial_only_overwrite_is_deleted() {
        let plan = plan_reset(&[send_denied(5)], &BTreeSet::new());
        assert_eq!(plan, vec![ResetAction::Delete { member_id: 5 }]);
    }

    #[test]
    fn test_other_bits_are_preserved() {
        let overwrites = vec![MemberOverwrite {
            member_id: 5,
            allow: Permissions::ATTACH_FILES,
            deny: Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS,
        }];

        let plan = plan_reset(&overwrites, &BTreeSet::new());
        assert_eq!(
            plan,
            vec![ResetAction::Reduce {
                member_id: 5,
                allow: Permissions::ATTACH_FILES,
                deny: Permissions::ADD_REACTIONS,
            }]
        );
    }

    #[test]
    fn test_overwrite_without_send_bit_is_untouched() {
        let overwrites = vec![MemberOverwrite {
            member_id: 5,
            allow: Permissions::empty(),
            deny: Permissions::ADD_REACTIONS,
        }];

        assert!(plan_reset(&overwrites, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_send_allowed_overwrite_is_also_cleared() {
        let overwrites = vec![MemberOverwrite {
            member_id: 5,
            allow: Permissions::SEND_MESSAGES,
            deny: Permissions::empty(),
        }];

        let plan = plan_reset(&overwrites, &BTreeSet::new());
        assert_eq!(plan, vec![ResetAction::Delete { member_id: 5 }]);
    }
}
