use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Profile fields Telegram reports for a user on every update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub telegram_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A registered bot user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub telegram_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Best human-readable name: first name, then username, then the numeric id.
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.telegram_id.0.to_string())
    }
}

pub const DEFAULT_ALERT_INTERVAL_HOURS: u32 = 24;

/// Input for creating a saved search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAlert {
    pub owner: UserId,
    pub search_term: String,
    pub location: Option<String>,
    pub interval_hours: u32,
}

/// A persisted saved search. Nothing executes these yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub id: i64,
    pub user_id: i64,
    pub search_term: String,
    pub location: Option<String>,
    pub interval_hours: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
