use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::{ChatId, MessageRef},
    messaging::{
        port::MessagingPort,
        types::ChatAction,
    },
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Spacing between any two outbound calls.
    pub global_min_interval: Duration,
    /// Spacing between calls into the same chat.
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            global_min_interval: Duration::from_millis(40),
            per_chat_min_interval: Duration::from_millis(1050),
        }
    }
}

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return how long to wait before using it.
    fn reserve_at(&mut self, now: Instant) -> Duration {
        let start = now.max(self.next);
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that rate-limits outbound calls.
///
/// A search sends a burst (notice, typing action, results) into one chat, so
/// calls are spaced per chat as well as globally.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<ChatId, IntervalLimiter>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    /// Reserve a slot on both limiters; the later of the two wins.
    async fn next_slot(&self, chat_id: ChatId) -> Duration {
        let now = Instant::now();
        let global_wait = self.global.lock().await.reserve_at(now);
        let mut per_chat = self.per_chat.lock().await;
        // Forget chats whose next slot is already free.
        per_chat.retain(|_, lim| lim.next > now);
        let chat_wait = per_chat
            .entry(chat_id)
            .or_insert_with(|| IntervalLimiter {
                interval: self.cfg.per_chat_min_interval,
                next: now,
            })
            .reserve_at(now);
        global_wait.max(chat_wait)
    }

    async fn pace(&self, chat_id: ChatId) {
        let wait = self.next_slot(chat_id).await;
        if !wait.is_zero() {
            tracing::debug!(
                chat_id = chat_id.0,
                wait_ms = wait.as_millis() as u64,
                "throttling send"
            );
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.pace(chat_id).await;
        self.inner.send_html(chat_id, html).await
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        self.pace(chat_id).await;
        self.inner.send_chat_action(chat_id, action).await
    }
}
