//! The `/search` dialogue: term → location → results.
//!
//! ```text
//!   IDLE ──/search──▶ AWAITING_TERM ──text──▶ AWAITING_LOCATION ──text──▶ IDLE (search runs)
//!     ▲                    │                          │
//!     └──────/cancel───────┴──────────────────────────┘
//! ```
//!
//! Empty input in either awaiting state re-prompts without changing state.
//! The session is cleared before the search starts, so anything the user sends
//! while results are pending is handled as idle input.

pub mod store;

use std::sync::Arc;

use crate::{
    domain::{ChatId, UserId},
    formatting::{escape_html, format_search_outcome},
    jobs::JobSearchService,
    messaging::{port::MessagingPort, types::ChatAction},
    Result,
};

pub use store::{InMemorySessionStore, SessionState, SessionStore};

pub const TERM_PROMPT: &str = "🔍 <b>Job search</b>\n\n\
What job title or keywords are you looking for?\n\
<i>e.g. data scientist, rust developer</i>\n\n\
Send /cancel to stop.";

pub const TERM_REPROMPT: &str =
    "Please send the job title or keywords as a text message (or /cancel).";

pub const LOCATION_REPROMPT: &str =
    "Please send the location as a text message, e.g. <i>Toronto, ON</i> (or /cancel).";

pub const CANCELLED: &str = "❌ Search cancelled.";

pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel. Send /search to start a new job search.";

pub const IDLE_HINT: &str = "Send /search to look for jobs, or /help to see all commands.";

pub const SEARCH_ERROR: &str =
    "❌ Sorry, something went wrong while searching. Please try /search again.";

/// What `/cancel` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NothingToCancel,
}

fn location_prompt(search_term: &str) -> String {
    format!(
        "Got it: <b>{}</b>\n\n📍 Where should I look? Send a city and province/state, e.g. <i>Toronto, ON</i> or <i>Austin, TX</i>.",
        escape_html(search_term)
    )
}

fn searching_notice(search_term: &str, location: &str) -> String {
    format!(
        "🔎 Searching for <b>{}</b> in <b>{}</b>...",
        escape_html(search_term),
        escape_html(location)
    )
}

fn non_empty_trimmed(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Drives the per-user search dialogue over a `SessionStore`.
pub struct SearchConversation {
    sessions: Arc<dyn SessionStore>,
    search: Arc<JobSearchService>,
}

impl SearchConversation {
    pub fn new(sessions: Arc<dyn SessionStore>, search: Arc<JobSearchService>) -> Self {
        Self { sessions, search }
    }

    pub async fn state(&self, user_id: UserId) -> Option<SessionState> {
        self.sessions.get(user_id).await
    }

    /// `/search`: (re)start the dialogue and ask for the search term.
    pub async fn start(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        if let Some(previous) = self.sessions.get(user_id).await {
            tracing::debug!(user_id = user_id.0, ?previous, "restarting search dialogue");
        }
        self.sessions.set(user_id, SessionState::AwaitingTerm).await;
        messenger.send_html(chat_id, TERM_PROMPT).await?;
        Ok(())
    }

    /// `/cancel`: drop any in-progress dialogue.
    pub async fn cancel(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        messenger: &dyn MessagingPort,
    ) -> Result<CancelOutcome> {
        let outcome = match self.sessions.clear(user_id).await {
            Some(_) => CancelOutcome::Cancelled,
            None => CancelOutcome::NothingToCancel,
        };
        let reply = match outcome {
            CancelOutcome::Cancelled => CANCELLED,
            CancelOutcome::NothingToCancel => NOTHING_TO_CANCEL,
        };
        messenger.send_html(chat_id, reply).await?;
        Ok(outcome)
    }

    /// Any non-command message. `text` is `None` for stickers, photos and the like.
    pub async fn handle_input(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        text: Option<&str>,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        match self.sessions.get(user_id).await {
            None => {
                messenger.send_html(chat_id, IDLE_HINT).await?;
            }
            Some(SessionState::AwaitingTerm) => {
                let Some(term) = non_empty_trimmed(text) else {
                    messenger.send_html(chat_id, TERM_REPROMPT).await?;
                    return Ok(());
                };
                self.sessions
                    .set(
                        user_id,
                        SessionState::AwaitingLocation {
                            search_term: term.to_string(),
                        },
                    )
                    .await;
                messenger.send_html(chat_id, &location_prompt(term)).await?;
            }
            Some(SessionState::AwaitingLocation { search_term }) => {
                let Some(location) = non_empty_trimmed(text) else {
                    messenger.send_html(chat_id, LOCATION_REPROMPT).await?;
                    return Ok(());
                };
                self.sessions.clear(user_id).await;
                self.run_search(chat_id, &search_term, location, messenger)
                    .await;
            }
        }
        Ok(())
    }

    async fn run_search(
        &self,
        chat_id: ChatId,
        search_term: &str,
        location: &str,
        messenger: &dyn MessagingPort,
    ) {
        if let Err(e) = messenger
            .send_html(chat_id, &searching_notice(search_term, location))
            .await
        {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send searching notice");
        }
        if let Err(e) = messenger.send_chat_action(chat_id, ChatAction::Typing).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send typing action");
        }

        let outcome = self.search.search(search_term, Some(location)).await;
        let reply = format_search_outcome(&outcome);

        if let Err(e) = messenger.send_html(chat_id, &reply).await {
            tracing::error!(chat_id = chat_id.0, error = %e, "failed to deliver search results");
            if let Err(e) = messenger.send_html(chat_id, SEARCH_ERROR).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send search error");
            }
        }
    }
}
