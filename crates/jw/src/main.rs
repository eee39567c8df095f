use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use jw_core::{
    config::Config,
    conversation::{store::InMemorySessionStore, SearchConversation},
    jobs::JobSearchService,
};
use jw_jobspy::JobSpyClient;
use jw_store::Database;
use jw_telegram::router::Services;

#[tokio::main]
async fn main() -> Result<(), jw_core::Error> {
    let cfg = Arc::new(Config::load()?);
    jw_core::logging::init("jw", cfg.debug)?;

    tracing::info!(
        debug = cfg.debug,
        health_addr = %cfg.health_addr,
        jobspy_api_url = %cfg.jobspy_api_url,
        sites = ?cfg.search.sites,
        results_wanted = cfg.search.results_wanted,
        hours_old = cfg.search.hours_old,
        "starting jobs watcher bot"
    );
    if cfg.sentry_dsn.is_some() {
        tracing::info!("SENTRY_DSN is set; error reporting is handled outside this process");
    }

    let db = Arc::new(Database::open(&cfg.database_url)?);
    match db.count_users() {
        Ok(users) => tracing::info!(users, "database ready"),
        Err(e) => tracing::warn!(error = %e, "could not count registered users"),
    }

    let board = Arc::new(JobSpyClient::new(
        cfg.jobspy_api_url.clone(),
        cfg.jobspy_api_key.clone(),
        cfg.jobspy_timeout,
    )?);
    let search = Arc::new(JobSearchService::new(board, cfg.search.clone()));
    let sessions = Arc::new(InMemorySessionStore::new());
    let conversation = Arc::new(SearchConversation::new(sessions, search));

    let shutdown = CancellationToken::new();
    let health = tokio::spawn({
        let addr = cfg.health_addr;
        let stop = shutdown.clone().cancelled_owned();
        async move {
            if let Err(e) = jw_health::serve(addr, stop).await {
                tracing::error!(error = %e, "health server stopped");
            }
        }
    });

    let services = Services {
        conversation,
        users: db.clone(),
        alerts: db,
    };
    let result = jw_telegram::router::run_polling(cfg, services)
        .await
        .map_err(|e| jw_core::Error::External(format!("telegram bot failed: {e}")));

    shutdown.cancel();
    let _ = health.await;

    result
}
