use std::sync::Arc;

use teloxide::prelude::*;

use crate::handlers::sender;
use crate::router::AppState;

/// Non-command messages feed the `/search` dialogue. Stickers, photos and other
/// non-text messages arrive as `None` and get re-prompted.
pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some((chat_id, profile)) = sender(&msg) else {
        return Ok(());
    };

    if let Err(e) = state
        .conversation
        .handle_input(
            chat_id,
            profile.telegram_id,
            msg.text(),
            state.messenger.as_ref(),
        )
        .await
    {
        tracing::warn!(
            user_id = profile.telegram_id.0,
            error = %e,
            "failed to handle conversation input"
        );
    }

    Ok(())
}
