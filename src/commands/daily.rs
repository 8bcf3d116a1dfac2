use std::collections::BTreeSet;

use chrono::Local;
use poise::serenity_prelude as serenity;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::daily::schedule;
use crate::store::DailyUpdate;
use crate::utils::formatting::{mention_channel, mention_role, mention_user};

fn guild_id(ctx: &Context<'_>) -> Result<u64, Error> {
    ctx.guild_id()
        .map(|g| g.get())
        .ok_or_else(|| Error::custom("Not in a guild"))
}

/// `[channel]` arguments default to the channel the command was used in.
fn channel_target(ctx: &Context<'_>, channel: &Option<serenity::Channel>) -> u64 {
    channel
        .as_ref()
        .map(|c| c.id().get())
        .unwrap_or_else(|| ctx.channel_id().get())
}

fn not_a_daily_channel(channel_id: u64) -> String {
    format!("{} is not a daily reset channel.", mention_channel(channel_id))
}

/// Daily channel management: mute members after posting, reset at midnight
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands(
        "add",
        "remove",
        "grace",
        "mute",
        "unmute",
        "ignore",
        "unignore",
        "ignorerole",
        "unignorerole",
        "status"
    )
)]
pub async fn daily(ctx: Context<'_>) -> Result<(), Error> {
    // Bare prefix invocation gets the same report as `daily status`.
    status_report(ctx).await
}

/// Add a channel to the daily reset
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Channel to put under daily management"] channel: serenity::Channel,
    #[description = "Grace period in seconds"] grace_seconds: Option<u64>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel.id().get();

    let reply = match ctx
        .data()
        .store
        .add_daily_channel(guild_id, channel_id, grace_seconds.unwrap_or(0))
        .await?
    {
        DailyUpdate::Applied => {
            format!("{} added to daily cooldown.", mention_channel(channel_id))
        }
        _ => format!(
            "{} is already on daily cooldown.",
            mention_channel(channel_id)
        ),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Remove a channel from the daily reset
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Channel to release"] channel: serenity::Channel,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel.id().get();

    let reply = match ctx
        .data()
        .store
        .remove_daily_channel(guild_id, channel_id)
        .await?
    {
        DailyUpdate::Applied => {
            format!("{} removed from daily cooldown.", mention_channel(channel_id))
        }
        _ => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Set a channel's grace period
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn grace(
    ctx: Context<'_>,
    #[description = "Seconds between a message and the mute"] seconds: u64,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .set_grace(guild_id, channel_id, seconds)
        .await?
    {
        DailyUpdate::Applied => format!(
            "Grace period for {} set to {} seconds.",
            mention_channel(channel_id),
            seconds
        ),
        DailyUpdate::AlreadySet => format!(
            "Grace period for {} is already {} seconds.",
            mention_channel(channel_id),
            seconds
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Keep a member restricted through the nightly reset
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "Member to keep restricted"] user: serenity::User,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .mute_member(guild_id, channel_id, user.id.get())
        .await?
    {
        DailyUpdate::Applied => format!(
            "{} in {} will not reset daily.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::AlreadySet => format!(
            "{} in {} is already on the mute list.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Let a member reset again at the next midnight
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn unmute(
    ctx: Context<'_>,
    #[description = "Member to release"] user: serenity::User,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .unmute_member(guild_id, channel_id, user.id.get())
        .await?
    {
        DailyUpdate::Applied => format!(
            "{} in {} will now reset daily.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::AlreadySet => format!(
            "{} in {} is not on the mute list.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Exempt a member from the mute gate
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn ignore(
    ctx: Context<'_>,
    #[description = "Member to exempt"] user: serenity::User,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .ignore_member(guild_id, channel_id, user.id.get())
        .await?
    {
        DailyUpdate::Applied => format!(
            "{} in {} will be ignored.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::AlreadySet => format!(
            "{} in {} is already ignored.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Put a member back under the mute gate
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn unignore(
    ctx: Context<'_>,
    #[description = "Member to stop exempting"] user: serenity::User,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .unignore_member(guild_id, channel_id, user.id.get())
        .await?
    {
        DailyUpdate::Applied => format!(
            "{} in {} is no longer ignored.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::AlreadySet => format!(
            "{} in {} was not ignored.",
            mention_user(user.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Exempt every member holding a role from the mute gate
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn ignorerole(
    ctx: Context<'_>,
    #[description = "Role to exempt"] role: serenity::Role,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .ignore_role(guild_id, channel_id, role.id.get())
        .await?
    {
        DailyUpdate::Applied => format!(
            "Members with {} in {} will be ignored.",
            mention_role(role.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::AlreadySet => format!(
            "{} in {} is already ignored.",
            mention_role(role.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Stop exempting a role from the mute gate
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn unignorerole(
    ctx: Context<'_>,
    #[description = "Role to stop exempting"] role: serenity::Role,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let channel_id = channel_target(&ctx, &channel);

    let reply = match ctx
        .data()
        .store
        .unignore_role(guild_id, channel_id, role.id.get())
        .await?
    {
        DailyUpdate::Applied => format!(
            "{} in {} is no longer ignored.",
            mention_role(role.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::AlreadySet => format!(
            "{} in {} was not ignored.",
            mention_role(role.id.get()),
            mention_channel(channel_id)
        ),
        DailyUpdate::UnknownChannel => not_a_daily_channel(channel_id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Show time until the next reset and every channel's settings
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    status_report(ctx).await
}

async fn status_report(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let daily = ctx.data().store.guild_daily(guild_id).await;

    let countdown =
        schedule::format_countdown(schedule::duration_until_midnight(&Local::now()));

    let mut embed = embeds::standard_embed()
        .title("Daily reset")
        .description(if daily.is_empty() {
            format!(
                "Next reset in {}.\nNo channels are under daily management.",
                countdown
            )
        } else {
            format!("Next reset in {}.", countdown)
        });

    for (channel_id, config) in &daily {
        let lines = vec![
            format!("Channel: {}", mention_channel(*channel_id)),
            format!("Grace: {} seconds", config.grace_seconds),
            format!("Ignored members: {}", id_list(&config.ignored_members, mention_user)),
            format!("Ignored roles: {}", id_list(&config.ignored_roles, mention_role)),
            format!("Muted: {}", id_list(&config.muted_members, mention_user)),
        ];
        embed = embed.field(
            format!("Channel {}", channel_id),
            embeds::bullet_list(&lines),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn id_list(ids: &BTreeSet<u64>, mention: fn(u64) -> String) -> String {
    if ids.is_empty() {
        "None".to_string()
    } else {
        ids.iter().map(|id| mention(*id)).collect::<Vec<_>>().join(" ")
    }
}
