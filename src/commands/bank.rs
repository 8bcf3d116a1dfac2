use poise::serenity_prelude as serenity;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::services::economy::bank;
use crate::utils::formatting::{format_number, mention_user};

fn guild_id(ctx: &Context<'_>) -> Result<u64, Error> {
    ctx.guild_id()
        .map(|g| g.get())
        .ok_or_else(|| Error::custom("Not in a guild"))
}

/// Bank account for the slot machine
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("register", "balance")
)]
pub async fn bank(ctx: Context<'_>) -> Result<(), Error> {
    // Bare prefix invocation shows the caller's own balance.
    show_balance(ctx, None).await
}

/// Open a bank account
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author_id = ctx.author().id.get();

    let reply = if bank::register(&ctx.data().store, guild_id, author_id).await? {
        format!(
            "{} Account opened. Current balance: {}",
            mention_user(author_id),
            format_number(bank::REGISTER_CREDITS)
        )
    } else {
        format!("{} You already have an account.", mention_user(author_id))
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Check a balance
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn balance(
    ctx: Context<'_>,
    #[description = "Whose balance (defaults to yours)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    show_balance(ctx, user).await
}

async fn show_balance(ctx: Context<'_>, user: Option<serenity::User>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author_id = ctx.author().id.get();
    let target_id = user.as_ref().map(|u| u.id.get()).unwrap_or(author_id);

    let reply = match bank::balance(&ctx.data().store, guild_id, target_id).await {
        Some(credits) if target_id == author_id => {
            format!("{} Your balance is: {}", mention_user(author_id), format_number(credits))
        }
        Some(credits) => format!(
            "{}'s balance is {}",
            mention_user(target_id),
            format_number(credits)
        ),
        None if target_id == author_id => format!(
            "{} You don't have an account. Use `bank register` to open one.",
            mention_user(author_id)
        ),
        None => format!("{} doesn't have an account.", mention_user(target_id)),
    };
    ctx.say(reply).await?;
    Ok(())
}
