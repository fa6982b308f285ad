use teloxide::prelude::*;
use tracing::{debug, error};

use super::{deliver, profile_of, ReplyTarget};
use crate::messages;
use crate::router::InboundEvent;
use crate::AppState;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let event = InboundEvent::from_text(user_id, profile_of(user), text);
    let kind = event.kind();
    debug!("Received {} message from user {}", kind, user_id);

    let target = ReplyTarget {
        chat_id: msg.chat.id,
        origin: None,
        callback_id: None,
    };

    match state.router.route(event).await {
        Ok(replies) => deliver(&bot, &target, replies).await,
        Err(e) => {
            error!("Failed to handle {} event for user {}: {:#}", kind, user_id, e);
            bot.send_message(msg.chat.id, messages::GENERIC_FAILURE)
                .await?;
            Ok(())
        }
    }
}
