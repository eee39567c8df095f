use std::sync::Arc;

use teloxide::prelude::*;

use jw_core::{
    domain::{ChatId, NewAlert, UserProfile, DEFAULT_ALERT_INTERVAL_HOURS},
    formatting::{escape_html, format_alert_list},
};

use crate::handlers::sender;
use crate::router::AppState;

const ALERT_USAGE: &str = "Usage: <code>/alert keywords | location | hours</code>\n\
Location and hours are optional, e.g.\n\
<code>/alert rust developer</code>\n\
<code>/alert nurse | Toronto, ON</code>\n\
<code>/alert welder | | 12</code>";

const STORAGE_ERROR: &str = "❌ Sorry, I couldn't reach the database. Please try again later.";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

#[derive(Debug, PartialEq, Eq)]
struct AlertArgs {
    search_term: String,
    location: Option<String>,
    interval_hours: u32,
}

/// `keywords | location | hours`, with location and hours optional.
fn parse_alert_args(arg: &str) -> Option<AlertArgs> {
    let parts: Vec<&str> = arg.split('|').map(str::trim).collect();
    if parts.len() > 3 {
        return None;
    }

    let search_term = parts.first().filter(|s| !s.is_empty())?.to_string();
    let location = parts
        .get(1)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let interval_hours = match parts.get(2).filter(|s| !s.is_empty()) {
        None => DEFAULT_ALERT_INTERVAL_HOURS,
        Some(raw) => raw
            .trim_end_matches(['h', 'H'])
            .parse::<u32>()
            .ok()
            .filter(|h| *h > 0)?,
    };

    Some(AlertArgs {
        search_term,
        location,
        interval_hours,
    })
}

fn help_text(hours_old: u32) -> String {
    format!(
        "<b>📋 Commands:</b>\n\
/search - Search for jobs (keywords, then location)\n\
/cancel - Cancel the current search\n\
/alert - Save a search: <code>/alert keywords | location | hours</code>\n\
/alerts - List your saved searches\n\
/help - Show this message\n\n\
<b>💡 Tips:</b>\n\
• Results cover postings from the last {hours_old}h\n\
• Add a province (e.g. <i>Toronto, ON</i>) to search Canadian listings"
    )
}

async fn reply(state: &AppState, chat_id: ChatId, html: &str) {
    if let Err(e) = state.messenger.send_html(chat_id, html).await {
        tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
    }
}

/// Registration never blocks the conversation; storage errors are only logged.
fn register(state: &AppState, profile: &UserProfile) -> Option<String> {
    match state.users.find_or_create(profile) {
        Ok(user) => Some(user.display_name()),
        Err(e) => {
            tracing::error!(
                telegram_id = profile.telegram_id.0,
                error = %e,
                "failed to register user"
            );
            None
        }
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some((chat_id, profile)) = sender(&msg) else {
        return Ok(());
    };
    if let Some(text) = msg.text() {
        run_command(&state, chat_id, &profile, text).await;
    }
    Ok(())
}

/// Dispatch one `/command` line from `profile`. Failures are logged and answered
/// in chat; nothing is propagated.
pub(crate) async fn run_command(
    state: &AppState,
    chat_id: ChatId,
    profile: &UserProfile,
    text: &str,
) {
    let user_id = profile.telegram_id;
    let (cmd, arg) = parse_command(text);
    tracing::debug!(user_id = user_id.0, cmd = %cmd, "command received");

    match cmd.as_str() {
        "start" => {
            tracing::info!(user_id = user_id.0, "user started the bot");
            let name = register(state, profile)
                .or_else(|| profile.first_name.clone())
                .unwrap_or_else(|| "there".to_string());
            let body = format!(
                "🚀 <b>Welcome to Jobs Watcher Bot, {}!</b>\n\n\
I'm here to help you find job opportunities.\n\n{}",
                escape_html(&name),
                help_text(state.cfg.search.hours_old)
            );
            reply(state, chat_id, &body).await;
        }

        "help" => {
            reply(state, chat_id, &help_text(state.cfg.search.hours_old)).await;
        }

        "search" => {
            if let Err(e) = state
                .conversation
                .start(chat_id, user_id, state.messenger.as_ref())
                .await
            {
                tracing::warn!(user_id = user_id.0, error = %e, "failed to start search");
            }
        }

        "cancel" => {
            if let Err(e) = state
                .conversation
                .cancel(chat_id, user_id, state.messenger.as_ref())
                .await
            {
                tracing::warn!(user_id = user_id.0, error = %e, "failed to cancel search");
            }
        }

        "alert" => {
            let Some(args) = parse_alert_args(&arg) else {
                reply(state, chat_id, ALERT_USAGE).await;
                return;
            };
            let body = create_alert(state, profile, args);
            reply(state, chat_id, &body).await;
        }

        "alerts" => {
            let body = match state.alerts.list_alerts(user_id) {
                Ok(alerts) => format_alert_list(&alerts),
                Err(e) => {
                    tracing::error!(user_id = user_id.0, error = %e, "failed to list alerts");
                    STORAGE_ERROR.to_string()
                }
            };
            reply(state, chat_id, &body).await;
        }

        _ => {
            reply(
                state,
                chat_id,
                &format!(
                    "Unknown command: <code>/{}</code>\nSend /help to see what I can do.",
                    escape_html(&cmd)
                ),
            )
            .await;
        }
    }
}

fn create_alert(state: &AppState, profile: &UserProfile, args: AlertArgs) -> String {
    register(state, profile);

    let new_alert = NewAlert {
        owner: profile.telegram_id,
        search_term: args.search_term,
        location: args.location,
        interval_hours: args.interval_hours,
    };

    match state.alerts.create_alert(&new_alert) {
        Ok(alert) => format!(
            "🔔 Saved alert #{}: <b>{}</b> in {} (every {}h)",
            alert.id,
            escape_html(&alert.search_term),
            alert
                .location
                .as_deref()
                .map(escape_html)
                .unwrap_or_else(|| "anywhere".to_string()),
            alert.interval_hours
        ),
        Err(e) => {
            tracing::error!(
                user_id = profile.telegram_id.0,
                error = %e,
                "failed to create alert"
            );
            STORAGE_ERROR.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use jw_core::{
        config::Config,
        conversation::{InMemorySessionStore, SearchConversation, SessionState},
        domain::{Alert, MessageId, MessageRef, User, UserId},
        errors::Error,
        jobs::{JobPosting, JobSearchService, ScrapeRequest, SearchSettings},
        messaging::{port::MessagingPort, types::ChatAction},
        ports::{AlertStore, JobBoard, UserRegistry},
        Result,
    };
    use jw_store::Database;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeMessenger {
        sends: Mutex<Vec<String>>,
    }

    impl FakeMessenger {
        fn last(&self) -> String {
            self.sends.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            let mut sends = self.sends.lock().unwrap();
            sends.push(html.to_string());
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(sends.len() as i32),
            })
        }

        async fn send_chat_action(&self, _chat_id: ChatId, _action: ChatAction) -> Result<()> {
            Ok(())
        }
    }

    struct EmptyBoard;

    #[async_trait]
    impl JobBoard for EmptyBoard {
        async fn scrape(&self, _req: &ScrapeRequest) -> Result<Vec<JobPosting>> {
            Ok(Vec::new())
        }
    }

    /// Storage that is always down.
    struct BrokenStore;

    impl UserRegistry for BrokenStore {
        fn find_or_create(&self, _profile: &UserProfile) -> Result<User> {
            Err(Error::Storage("database is locked".to_string()))
        }
    }

    impl AlertStore for BrokenStore {
        fn create_alert(&self, _alert: &NewAlert) -> Result<Alert> {
            Err(Error::Storage("database is locked".to_string()))
        }

        fn list_alerts(&self, _owner: UserId) -> Result<Vec<Alert>> {
            Err(Error::Storage("database is locked".to_string()))
        }
    }

    const CHAT: ChatId = ChatId(500);

    fn jane() -> UserProfile {
        UserProfile {
            telegram_id: UserId(77),
            username: Some("jane_d".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: None,
        }
    }

    fn app<S>(store: Arc<S>) -> (AppState, Arc<FakeMessenger>)
    where
        S: UserRegistry + AlertStore + 'static,
    {
        let cfg = Config::from_lookup(|key| match key {
            "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
            "DATABASE_URL" => Some(":memory:".to_string()),
            _ => None,
        })
        .unwrap();
        let search = Arc::new(JobSearchService::new(
            Arc::new(EmptyBoard),
            SearchSettings::default(),
        ));
        let messenger = Arc::new(FakeMessenger::default());
        let state = AppState {
            cfg: Arc::new(cfg),
            messenger: messenger.clone(),
            conversation: Arc::new(SearchConversation::new(
                Arc::new(InMemorySessionStore::new()),
                search,
            )),
            users: store.clone(),
            alerts: store,
        };
        (state, messenger)
    }

    #[tokio::test]
    async fn start_registers_and_greets_by_name() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let (state, m) = app(db.clone());

        run_command(&state, CHAT, &jane(), "/start").await;

        assert_eq!(db.count_users().unwrap(), 1);
        assert!(m.last().starts_with("🚀 <b>Welcome to Jobs Watcher Bot, Jane!</b>"));
        assert!(m.last().contains("/search"));
    }

    #[tokio::test]
    async fn start_still_greets_when_registration_fails() {
        let (state, m) = app(Arc::new(BrokenStore));

        run_command(&state, CHAT, &jane(), "/start").await;

        assert!(m.last().contains("Welcome to Jobs Watcher Bot, Jane!"));
    }

    #[tokio::test]
    async fn alert_registers_owner_then_saves() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let (state, m) = app(db.clone());

        run_command(&state, CHAT, &jane(), "/alert nurse | Toronto, ON | 12").await;
        assert_eq!(
            m.last(),
            "🔔 Saved alert #1: <b>nurse</b> in Toronto, ON (every 12h)"
        );
        assert_eq!(db.count_users().unwrap(), 1);

        run_command(&state, CHAT, &jane(), "/alerts").await;
        assert!(m.last().contains("1. <b>nurse</b> in Toronto, ON (every 12h)"));
        assert_eq!(db.list_alerts(UserId(77)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn storage_failures_get_an_apology() {
        let (state, m) = app(Arc::new(BrokenStore));

        run_command(&state, CHAT, &jane(), "/alert welder").await;
        assert_eq!(m.last(), STORAGE_ERROR);

        run_command(&state, CHAT, &jane(), "/alerts").await;
        assert_eq!(m.last(), STORAGE_ERROR);
    }

    #[tokio::test]
    async fn malformed_alert_and_unknown_commands() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let (state, m) = app(db.clone());

        run_command(&state, CHAT, &jane(), "/alert nurse | | never").await;
        assert_eq!(m.last(), ALERT_USAGE);
        assert!(db.list_alerts(UserId(77)).unwrap().is_empty());

        run_command(&state, CHAT, &jane(), "/frobnicate").await;
        assert!(m.last().starts_with("Unknown command: <code>/frobnicate</code>"));
    }

    #[tokio::test]
    async fn search_and_cancel_drive_the_dialogue() {
        let (state, _) = app(Arc::new(Database::open_in_memory().unwrap()));

        run_command(&state, CHAT, &jane(), "/search@JobsWatcherBot").await;
        assert_eq!(
            state.conversation.state(UserId(77)).await,
            Some(SessionState::AwaitingTerm)
        );

        run_command(&state, CHAT, &jane(), "/cancel").await;
        assert_eq!(state.conversation.state(UserId(77)).await, None);
    }

    #[test]
    fn parses_commands_with_bot_suffix() {
        assert_eq!(
            parse_command("/search@JobsWatcherBot"),
            ("search".to_string(), String::new())
        );
        assert_eq!(
            parse_command("/Alert nurse | Toronto, ON"),
            ("alert".to_string(), "nurse | Toronto, ON".to_string())
        );
    }

    #[test]
    fn alert_args_term_only() {
        assert_eq!(
            parse_alert_args("rust developer"),
            Some(AlertArgs {
                search_term: "rust developer".to_string(),
                location: None,
                interval_hours: 24,
            })
        );
    }

    #[test]
    fn alert_args_all_fields() {
        assert_eq!(
            parse_alert_args(" nurse | Toronto, ON | 12h "),
            Some(AlertArgs {
                search_term: "nurse".to_string(),
                location: Some("Toronto, ON".to_string()),
                interval_hours: 12,
            })
        );
        assert_eq!(
            parse_alert_args("welder | | 6").map(|a| (a.location, a.interval_hours)),
            Some((None, 6))
        );
    }

    #[test]
    fn alert_args_rejects_bad_input() {
        assert_eq!(parse_alert_args(""), None);
        assert_eq!(parse_alert_args(" | Toronto"), None);
        assert_eq!(parse_alert_args("nurse | Toronto | 0"), None);
        assert_eq!(parse_alert_args("nurse | Toronto | soon"), None);
        assert_eq!(parse_alert_args("a | b | 1 | d"), None);
    }

    #[test]
    fn help_mentions_every_command() {
        let help = help_text(2);
        for cmd in ["/search", "/cancel", "/alert", "/alerts", "/help"] {
            assert!(help.contains(cmd), "missing {cmd}");
        }
        assert!(help.contains("last 2h"));
    }
}
