pub mod callback;
pub mod command;

use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, MessageId};
use tracing::warn;
use vpnshop_db::UserProfile;

use crate::bot::keyboards;
use crate::router::Outgoing;

pub(crate) fn profile_of(user: &teloxide::types::User) -> UserProfile {
    UserProfile {
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}

/// Where router replies go: the chat, the message a callback came from, and the
/// callback to answer.
pub(crate) struct ReplyTarget {
    pub chat_id: ChatId,
    pub origin: Option<MessageId>,
    pub callback_id: Option<CallbackQueryId>,
}

pub(crate) async fn deliver(
    bot: &Bot,
    target: &ReplyTarget,
    replies: Vec<Outgoing>,
) -> Result<(), teloxide::RequestError> {
    for reply in replies {
        match reply {
            Outgoing::Message { text, keyboard } => {
                let request = bot.send_message(target.chat_id, text);
                match keyboard {
                    Some(keyboard) => request.reply_markup(keyboards::render(&keyboard)).await?,
                    None => request.await?,
                };
            }
            Outgoing::Edit { text } => match target.origin {
                Some(message_id) => {
                    bot.edit_message_text(target.chat_id, message_id, text)
                        .await?;
                }
                None => {
                    bot.send_message(target.chat_id, text).await?;
                }
            },
            Outgoing::AnswerCallback { text } => match &target.callback_id {
                Some(id) => {
                    let request = bot.answer_callback_query(id.clone());
                    match text {
                        Some(text) => request.text(text).await?,
                        None => request.await?,
                    };
                }
                None => warn!("Dropping callback answer outside a callback query"),
            },
        }
    }
    Ok(())
}
