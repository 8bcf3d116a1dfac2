use std::collections::VecDeque;
use std::sync::Arc;

use serenity::all::{ChannelId, Context, CreateMessage, GuildId, Message, UserId};
use tracing::{debug, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::dialogflow::actions::{self, FlowAction};
use crate::store::{GuildFlowConfig, PendingInquiry};

const DEFAULT_TRY_AGAIN: &str = "Sorry, I didn't understand that. Let's try again.";
const DEFAULT_WELCOME: &str = "You're all set. Welcome!";

/// A member joined: if the guild has a join flow configured, open a session
/// and run its actions.
pub async fn start_join_flow(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<(), Error> {
    if data.dialogflow.is_none() {
        return Ok(());
    }
    let Some(config) = flow_config(data, guild_id.get()).await else {
        return Ok(());
    };
    if config.join_actions.is_empty() {
        return Ok(());
    }

    info!("Starting onboarding flow for {} in {}", user_id, guild_id);
    data.sessions.open(user_id.get(), guild_id.get());
    run_actions(ctx, data, user_id, config.join_actions, true).await
}

/// A DM arrived: resume an interrupted conversation, feed an awaited answer
/// to the agent, or start a fresh conversation from a trigger phrase.
pub async fn handle_direct_message(
    ctx: &Context,
    data: &Arc<Data>,
    msg: &Message,
) -> Result<(), Error> {
    if data.dialogflow.is_none() {
        return Ok(());
    }
    let member_id = msg.author.id.get();

    // Bot restarted mid-conversation: re-seed the agent from the persisted
    // status without repeating its messages to the member.
    if !data.sessions.is_active(member_id) {
        if let Some(status) = data.store.dialogflow_status(member_id).await {
            debug!("Resuming onboarding conversation for {}", member_id);
            data.sessions.open(member_id, status.guild_id);
            run_inquiry(ctx, data, msg.author.id, &status.inquiry, false).await?;
        }
    }

    if data.sessions.is_active(member_id) {
        if data.sessions.take_awaiting(member_id) {
            let result = data
                .dialogflow_client()?
                .detect_intent(member_id, &msg.content)
                .await?;
            process_result(ctx, data, msg.author.id, result, true).await?;
        }
        return Ok(());
    }

    if let Some((guild_id, inquiry)) = find_trigger(data, &msg.content).await {
        info!("DM trigger matched, opening conversation for {}", member_id);
        data.sessions.open(member_id, guild_id);
        run_inquiry(ctx, data, msg.author.id, &inquiry, true).await?;
    }

    Ok(())
}

/// Send an inquiry into the member's session and work through everything
/// the agent answers with, following chained inquiries until none remain.
async fn run_inquiry(
    ctx: &Context,
    data: &Arc<Data>,
    user_id: UserId,
    inquiry: &str,
    respond: bool,
) -> Result<(), Error> {
    let member_id = user_id.get();
    let mut queue = VecDeque::from([inquiry.to_string()]);

    while let Some(inquiry) = queue.pop_front() {
        let Some(guild_id) = data.sessions.guild_of(member_id) else {
            return Ok(());
        };
        data.store
            .set_dialogflow_status(
                member_id,
                PendingInquiry {
                    inquiry: inquiry.clone(),
                    guild_id,
                },
            )
            .await?;

        let result = data
            .dialogflow_client()?
            .detect_intent(member_id, &inquiry)
            .await?;

        if result.conversation_expiring() {
            data.sessions.deactivate(member_id);
        }
        for message in &result.fulfillment_messages {
            for action in actions::parse_actions(&message.payload) {
                if let Some(follow_up) = execute(ctx, data, user_id, action, respond).await? {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    Ok(())
}

async fn process_result(
    ctx: &Context,
    data: &Arc<Data>,
    user_id: UserId,
    result: crate::services::dialogflow::client::QueryResult,
    respond: bool,
) -> Result<(), Error> {
    if result.conversation_expiring() {
        data.sessions.deactivate(user_id.get());
    }
    let mut follow_ups = Vec::new();
    for message in &result.fulfillment_messages {
        for action in actions::parse_actions(&message.payload) {
            if let Some(follow_up) = execute(ctx, data, user_id, action, respond).await? {
                follow_ups.push(follow_up);
            }
        }
    }
    for follow_up in follow_ups {
        run_inquiry(ctx, data, user_id, &follow_up, respond).await?;
    }
    Ok(())
}

async fn run_actions(
    ctx: &Context,
    data: &Arc<Data>,
    user_id: UserId,
    flow_actions: Vec<FlowAction>,
    respond: bool,
) -> Result<(), Error> {
    for action in flow_actions {
        if let Some(inquiry) = execute(ctx, data, user_id, action, respond).await? {
            run_inquiry(ctx, data, user_id, &inquiry, respond).await?;
        }
    }
    Ok(())
}

/// Perform one flow action. Returns a follow-up inquiry when the action
/// feeds the conversation back into the agent.
async fn execute(
    ctx: &Context,
    data: &Arc<Data>,
    user_id: UserId,
    action: FlowAction,
    respond: bool,
) -> Result<Option<String>, Error> {
    let member_id = user_id.get();

    match action {
        FlowAction::Inquire { inquiry } => return Ok(Some(inquiry)),

        FlowAction::Message { message } => {
            if respond {
                dm(ctx, user_id, &message).await;
            }
        }

        FlowAction::Question { message } => {
            if respond {
                dm(ctx, user_id, &message).await;
            }
            data.sessions.mark_awaiting(member_id);
        }

        FlowAction::Kick { message } => {
            if respond {
                if let Some(message) = message {
                    dm(ctx, user_id, &message).await;
                }
            }
            if let Some(guild_id) = data.sessions.guild_of(member_id) {
                GuildId::new(guild_id).kick(&ctx.http, user_id).await?;
                info!("Onboarding flow kicked {} from {}", member_id, guild_id);
                log_to_guild(
                    ctx,
                    data,
                    guild_id,
                    &format!("Dialogflow: kicked <@{}> ({}).", member_id, member_id),
                )
                .await;
            }
            data.sessions.close(member_id);
            data.store.clear_dialogflow_status(member_id).await?;
        }

        FlowAction::AddRole { role } => {
            if let Some(guild_id) = data.sessions.guild_of(member_id) {
                add_role_by_name(ctx, GuildId::new(guild_id), user_id, &role).await?;
                log_to_guild(
                    ctx,
                    data,
                    guild_id,
                    &format!(
                        "Dialogflow: added {} role to <@{}> ({}).",
                        role, member_id, member_id
                    ),
                )
                .await;
            }
        }

        FlowAction::TryAgain => {
            if respond {
                let message = guild_message(data, member_id, |c| c.try_again_message.clone())
                    .await
                    .unwrap_or_else(|| DEFAULT_TRY_AGAIN.to_string());
                dm(ctx, user_id, &message).await;
            }
            data.sessions.mark_awaiting(member_id);
        }

        FlowAction::Finished => {
            if respond {
                let message = guild_message(data, member_id, |c| c.welcome_message.clone())
                    .await
                    .unwrap_or_else(|| DEFAULT_WELCOME.to_string());
                dm(ctx, user_id, &message).await;
            }
            data.sessions.close(member_id);
            data.store.clear_dialogflow_status(member_id).await?;
        }
    }

    Ok(None)
}

/// DM a member; closed DMs are logged, never fatal.
async fn dm(ctx: &Context, user_id: UserId, content: &str) {
    let message = CreateMessage::new().content(content);
    match user_id.create_dm_channel(&ctx.http).await {
        Ok(channel) => {
            if let Err(e) = channel.send_message(&ctx.http, message).await {
                debug!("Could not DM user {}: {:?}", user_id, e);
            }
        }
        Err(e) => {
            debug!("Could not create DM channel for user {}: {:?}", user_id, e);
        }
    }
}

async fn add_role_by_name(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
    role_name: &str,
) -> Result<(), Error> {
    let roles = guild_id.roles(&ctx.http).await?;
    let Some(role_id) = roles
        .iter()
        .find(|(_, role)| role.name == role_name)
        .map(|(id, _)| *id)
    else {
        warn!("Role {:?} not found in guild {}", role_name, guild_id);
        return Ok(());
    };

    ctx.http
        .add_member_role(guild_id, user_id, role_id, Some("Onboarding flow"))
        .await?;
    Ok(())
}

async fn log_to_guild(ctx: &Context, data: &Arc<Data>, guild_id: u64, text: &str) {
    let Some(channel_id) = flow_config(data, guild_id)
        .await
        .and_then(|c| c.log_channel)
    else {
        return;
    };
    if let Err(e) = ChannelId::new(channel_id).say(&ctx.http, text).await {
        warn!("Could not write to onboarding log channel: {:?}", e);
    }
}

async fn flow_config(data: &Data, guild_id: u64) -> Option<GuildFlowConfig> {
    data.store
        .read(|d| d.guilds.get(&guild_id).and_then(|g| g.dialogflow.clone()))
        .await
}

async fn guild_message(
    data: &Data,
    member_id: u64,
    pick: impl FnOnce(&GuildFlowConfig) -> String,
) -> Option<String> {
    let guild_id = data.sessions.guild_of(member_id)?;
    let config = flow_config(data, guild_id).await?;
    let message = pick(&config);
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

async fn find_trigger(data: &Data, content: &str) -> Option<(u64, String)> {
    data.store
        .read(|d| {
            d.guilds.iter().find_map(|(guild_id, guild)| {
                guild.dialogflow.as_ref().and_then(|flow| {
                    flow.triggers
                        .get(content)
                        .map(|inquiry| (*guild_id, inquiry.clone()))
                })
            })
        })
        .await
}
