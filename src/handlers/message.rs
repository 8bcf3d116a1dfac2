use std::sync::Arc;

use serenity::all::{Context, Message};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::daily::gate::{self, MessageEvent};
use crate::services::dialogflow::flow;

/// Route an inbound message: guild messages go through the daily mute gate,
/// DMs go to the onboarding flow.
pub async fn handle_message(ctx: &Context, data: &Arc<Data>, msg: &Message) -> Result<(), Error> {
    let own_id = ctx.cache.current_user().id;

    match msg.guild_id {
        Some(guild_id) => {
            let event = MessageEvent {
                guild_id: Some(guild_id.get()),
                channel_id: msg.channel_id.get(),
                author_id: msg.author.id.get(),
                author_roles: msg
                    .member
                    .as_ref()
                    .map(|m| m.roles.iter().map(|r| r.get()).collect())
                    .unwrap_or_default(),
                from_self: msg.author.id == own_id,
            };

            let daily = data.store.guild_daily(guild_id.get()).await;
            if let Some(action) = gate::evaluate(&event, &daily) {
                gate::apply_mute(ctx, &action).await?;
            }
            Ok(())
        }
        None => {
            if msg.author.id == own_id || msg.author.bot {
                return Ok(());
            }
            flow::handle_direct_message(ctx, data, msg).await
        }
    }
}
