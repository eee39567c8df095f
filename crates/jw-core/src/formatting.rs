//! Formatting utilities (search results and alerts → Telegram HTML).

use crate::{
    domain::Alert,
    jobs::{JobPosting, SearchOutcome},
};

/// Maximum number of postings rendered in one reply.
pub const MAX_DISPLAYED_JOBS: usize = 5;

const PLACEHOLDER: &str = "N/A";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn field_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => PLACEHOLDER.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `indeed` → `Indeed`, `zip_recruiter` → `Zip_Recruiter`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Render one posting block; `index` is 1-based.
pub fn format_posting(job: &JobPosting, index: usize) -> String {
    let title = field_or_placeholder(job.title.as_deref());
    let company = field_or_placeholder(job.company.as_deref());
    let location = field_or_placeholder(job.location.as_deref());
    let site = non_empty(job.site.as_deref())
        .map(|s| escape_html(&title_case(s)))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let mut out = format!("<b>{index}. {title}</b>\n🏢 {company}\n📍 {location}\n🌐 {site}\n");

    if let Some(date) = non_empty(job.date_posted.as_deref()) {
        out.push_str(&format!("📅 {}\n", escape_html(date)));
    }
    if let Some(url) = non_empty(job.job_url.as_deref()) {
        out.push_str(&format!(
            "🔗 <a href=\"{}\">Apply Here</a>\n",
            escape_html(url)
        ));
    }
    out
}

/// Render a search outcome as a single chat message.
pub fn format_search_outcome(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Failed { message } => format!("❌ {}", escape_html(message)),
        SearchOutcome::NoResults { message } => escape_html(message),
        SearchOutcome::Found {
            postings,
            count,
            search_term,
            location,
        } => {
            let mut out = String::from("🔍 <b>Search Results</b>\n");
            out.push_str(&format!("<b>Query</b>: {}\n", escape_html(search_term)));
            if let Some(loc) = non_empty(location.as_deref()) {
                out.push_str(&format!("<b>Location</b>: {}\n", escape_html(loc)));
            }
            out.push_str(&format!("<b>Found</b>: {count} jobs\n\n"));

            for (i, job) in postings.iter().take(MAX_DISPLAYED_JOBS).enumerate() {
                out.push_str(&format_posting(job, i + 1));
                out.push('\n');
            }

            if postings.len() > MAX_DISPLAYED_JOBS {
                out.push_str(&format!(
                    "... and {} more jobs\n",
                    postings.len() - MAX_DISPLAYED_JOBS
                ));
            }
            out
        }
    }
}

/// Render the `/alerts` listing.
pub fn format_alert_list(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "You have no saved alerts yet.\nCreate one with <code>/alert term | location | hours</code>."
            .to_string();
    }

    let mut out = format!("🔔 <b>Your alerts</b> ({})\n\n", alerts.len());
    for (i, alert) in alerts.iter().enumerate() {
        let location = non_empty(alert.location.as_deref())
            .map(escape_html)
            .unwrap_or_else(|| "anywhere".to_string());
        out.push_str(&format!(
            "{}. <b>{}</b> in {} (every {}h)\n",
            i + 1,
            escape_html(&alert.search_term),
            location,
            alert.interval_hours
        ));
    }
    out
}
