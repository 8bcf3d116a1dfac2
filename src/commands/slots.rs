use chrono::Utc;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::economy::bank;
use crate::services::slots::{machine, payouts};
use crate::utils::formatting::{format_number, mention_user};

/// Show the slot machine payout table
#[poise::command(slash_command, prefix_command)]
pub async fn slotpayouts(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(payouts::payouts_message())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Play the slot machine
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn pull(
    ctx: Context<'_>,
    #[description = "Amount of credits to bid"] bid: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| Error::custom("Not in a guild"))?
        .get();
    let author_id = ctx.author().id.get();
    let data = ctx.data();
    let config = data.store.slot_config(guild_id).await;

    // Every rejection is a chat reply, never an error.
    if !bank::has_account(&data.store, guild_id, author_id).await {
        ctx.say(format!(
            "{} You need an account to use the slot machine. Use `bank register` to open one.",
            mention_user(author_id)
        ))
        .await?;
        return Ok(());
    }

    let now = Utc::now();
    let cooling_off = data
        .slot_register
        .get(&author_id)
        .is_some_and(|last| (now - *last).num_seconds() < config.cooldown_seconds);
    if cooling_off {
        ctx.say(format!(
            "Slot machine is still cooling off! Wait {} seconds between each pull.",
            config.cooldown_seconds
        ))
        .await?;
        return Ok(());
    }

    if bid < config.min_bid || bid > config.max_bid {
        ctx.say(format!(
            "Bid must be between {} and {}.",
            config.min_bid, config.max_bid
        ))
        .await?;
        return Ok(());
    }

    if !bank::can_spend(&data.store, guild_id, author_id, bid).await {
        ctx.say(format!(
            "{} You need an account with enough funds to play the slot machine.",
            mention_user(author_id)
        ))
        .await?;
        return Ok(());
    }

    data.slot_register.insert(author_id, now);

    let spin = machine::spin(&mut rand::thread_rng());
    let payout = payouts::resolve(spin.pay_line());

    let before = bank::balance(&data.store, guild_id, author_id)
        .await
        .unwrap_or(0);
    bank::withdraw(&data.store, guild_id, author_id, bid)
        .await
        .map_err(|e| Error::custom(e.to_string()))?;
    let (after, outcome) = match payout {
        Some(payout) => {
            let after = bank::deposit(
                &data.store,
                guild_id,
                author_id,
                payouts::winnings(bid, payout),
            )
            .await
            .map_err(|e| Error::custom(e.to_string()))?;
            (after, format!("{} {}", mention_user(author_id), payout.phrase))
        }
        None => (
            before - bid,
            format!("{} Nothing!", mention_user(author_id)),
        ),
    };

    ctx.say(format!(
        "{}{}\n\nYour bid: {}\n{} \u{2192} {}!",
        spin.render(),
        outcome,
        bid,
        format_number(before),
        format_number(after)
    ))
    .await?;
    Ok(())
}

/// Slot machine settings for this guild
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("min", "max", "time")
)]
pub async fn slotset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| Error::custom("Not in a guild"))?
        .get();
    let config = ctx.data().store.slot_config(guild_id).await;

    let embed = embeds::info_embed().title("Slot machine settings").description(format!(
        "Minimum bid: {}\nMaximum bid: {}\nCooldown: {} seconds",
        config.min_bid, config.max_bid, config.cooldown_seconds
    ));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Set the minimum bid
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn min(
    ctx: Context<'_>,
    #[description = "Minimum bid in credits"] credits: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| Error::custom("Not in a guild"))?
        .get();
    ctx.data()
        .store
        .update_slot_config(guild_id, |s| s.min_bid = credits)
        .await?;
    ctx.say(format!("Minimum bid is now {} credits.", credits)).await?;
    Ok(())
}

/// Set the maximum bid
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn max(
    ctx: Context<'_>,
    #[description = "Maximum bid in credits"] credits: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| Error::custom("Not in a guild"))?
        .get();
    ctx.data()
        .store
        .update_slot_config(guild_id, |s| s.max_bid = credits)
        .await?;
    ctx.say(format!("Maximum bid is now {} credits.", credits)).await?;
    Ok(())
}

/// Set the cooldown between pulls
#[poise::command(slash_command, prefix_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn time(
    ctx: Context<'_>,
    #[description = "Seconds between pulls"] seconds: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| Error::custom("Not in a guild"))?
        .get();
    ctx.data()
        .store
        .update_slot_config(guild_id, |s| s.cooldown_seconds = seconds)
        .await?;
    ctx.say(format!("Cooldown between pulls is now {} seconds.", seconds))
        .await?;
    Ok(())
}
