use async_trait::async_trait;

use crate::{
    domain::{Alert, NewAlert, User, UserId, UserProfile},
    jobs::{JobPosting, ScrapeRequest},
    Result,
};

/// Persistence port for chat users.
///
/// Synchronous: each call is one short request/response against the database.
pub trait UserRegistry: Send + Sync {
    /// Return the user for `profile.telegram_id` with its profile fields refreshed,
    /// or insert it.
    fn find_or_create(&self, profile: &UserProfile) -> Result<User>;
}

/// Persistence port for saved searches.
pub trait AlertStore: Send + Sync {
    /// Fails with `Error::Storage` when the owner has never been registered.
    fn create_alert(&self, alert: &NewAlert) -> Result<Alert>;

    /// All alerts of `owner`, in insertion order.
    fn list_alerts(&self, owner: UserId) -> Result<Vec<Alert>>;
}

/// Port for the external job aggregation service.
#[async_trait]
pub trait JobBoard: Send + Sync {
    async fn scrape(&self, req: &ScrapeRequest) -> Result<Vec<JobPosting>>;
}
