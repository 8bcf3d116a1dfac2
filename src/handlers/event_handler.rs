use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::message;
use crate::services::dialogflow::flow;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::Message { new_message } => {
            if let Err(e) = message::handle_message(ctx, data, new_message).await {
                error!("Message handler error: {:?}", e);
            }
        }

        FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) =
                flow::start_join_flow(ctx, data, new_member.guild_id, new_member.user.id).await
            {
                error!("Join flow error for {}: {:?}", new_member.user.id, e);
            }
        }

        _ => {}
    }

    Ok(())
}
