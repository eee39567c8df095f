use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use crate::{errors::Error, jobs::SearchSettings, Result};

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub database_url: String,
    pub sentry_dsn: Option<String>,
    pub debug: bool,

    // Liveness
    pub health_addr: SocketAddr,

    // JobSpy
    pub jobspy_api_url: String,
    pub jobspy_api_key: Option<String>,
    pub jobspy_timeout: Duration,
    pub search: SearchSettings,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let database_url = get("DATABASE_URL").ok_or_else(|| {
            Error::Config("DATABASE_URL environment variable is required".to_string())
        })?;

        // Optional error reporting
        let sentry_dsn = get("SENTRY_DSN");

        // Debug / production toggle
        let env_debug = get("APP_ENV")
            .map(|v| matches!(v.to_lowercase().as_str(), "development" | "dev" | "debug"))
            .unwrap_or(false);
        let debug = env_debug || get("DEBUG").map(|v| parse_bool(&v)).unwrap_or(false);

        let health_addr = match get("HEALTH_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                Error::Config(format!("HEALTH_ADDR is not a socket address ({raw}): {e}"))
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 5000)),
        };

        let jobspy_api_url = get("JOBSPY_API_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        let jobspy_api_key = get("JOBSPY_API_KEY");
        let jobspy_timeout =
            Duration::from_secs(parse_num(&get, "JOBSPY_TIMEOUT_SECS")?.unwrap_or(60));

        let defaults = SearchSettings::default();
        let sites = get("JOBSPY_SITES")
            .map(|v| parse_csv_lower(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.sites);
        let search = SearchSettings {
            sites,
            results_wanted: parse_num(&get, "JOBSPY_RESULTS_WANTED")?
                .unwrap_or(defaults.results_wanted),
            hours_old: parse_num(&get, "JOBSPY_HOURS_OLD")?.unwrap_or(defaults.hours_old),
        };

        Ok(Self {
            telegram_bot_token,
            database_url,
            sentry_dsn,
            debug,
            health_addr,
            jobspy_api_url,
            jobspy_api_key,
            jobspy_timeout,
            search,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }
        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_num<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = get(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a number, got {raw:?}")))
}

fn parse_csv_lower(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
