//! Job search: posting model, region detection, and the scraping adapter.

pub mod region;
pub mod search;

use serde::{Deserialize, Serialize};

pub use region::Region;
pub use search::{JobSearchService, SearchSettings};

/// One job opening as returned by the aggregation service.
///
/// Every field is optional; the formatter substitutes `N/A` for missing text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
}

/// Parameters sent to the aggregation service for one search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub sites: Vec<String>,
    pub search_term: String,
    pub location: Option<String>,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub region: Region,
}

/// Result of a search, ready for formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        postings: Vec<JobPosting>,
        count: usize,
        search_term: String,
        location: Option<String>,
    },
    NoResults {
        message: String,
    },
    Failed {
        message: String,
    },
}

/// `No jobs found for '<term>' in '<location>'`, without the location part when absent.
pub fn no_results_message(search_term: &str, location: Option<&str>) -> String {
    match location {
        Some(loc) => format!("No jobs found for '{search_term}' in '{loc}'"),
        None => format!("No jobs found for '{search_term}'"),
    }
}
