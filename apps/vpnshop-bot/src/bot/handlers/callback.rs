use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error};

use super::{deliver, profile_of, ReplyTarget};
use crate::messages;
use crate::router::InboundEvent;
use crate::AppState;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let user_id = q.from.id.0 as i64;
    debug!("Received callback {:?} from user {}", q.data, user_id);

    let (Some(data), Some(message)) = (q.data.clone(), q.message.as_ref()) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let target = ReplyTarget {
        chat_id: message.chat().id,
        origin: Some(message.id()),
        callback_id: Some(q.id.clone()),
    };
    let event = InboundEvent::Callback {
        user_id,
        profile: profile_of(&q.from),
        data,
    };

    match state.router.route(event).await {
        Ok(replies) => deliver(&bot, &target, replies).await,
        Err(e) => {
            error!("Failed to handle callback event for user {}: {:#}", user_id, e);
            bot.answer_callback_query(q.id.clone())
                .text(messages::GENERIC_FAILURE)
                .await?;
            Ok(())
        }
    }
}
