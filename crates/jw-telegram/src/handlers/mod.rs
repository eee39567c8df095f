//! Telegram update handlers.
//!
//! Commands (`/start`, `/search`, ...) go to `commands`; everything else is
//! input for the user's `/search` dialogue.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use jw_core::domain::{ChatId, UserId, UserProfile};

use crate::router::AppState;

mod commands;
mod text;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.text().is_some_and(|t| t.starts_with('/')) {
        return commands::handle_command(msg, state).await;
    }

    text::handle_text(msg, state).await
}

/// Sender identity + chat for a message; `None` for channel posts and other
/// updates without a user.
pub(crate) fn sender(msg: &Message) -> Option<(ChatId, UserProfile)> {
    let user = msg.from()?;
    Some((
        ChatId(msg.chat.id.0),
        UserProfile {
            telegram_id: UserId(user.id.0 as i64),
            username: user.username.clone(),
            first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
            last_name: user.last_name.clone(),
        },
    ))
}
