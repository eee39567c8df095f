use std::sync::Arc;

use crate::{
    jobs::{no_results_message, region::detect_region, ScrapeRequest, SearchOutcome},
    ports::JobBoard,
};

/// Fixed parameters applied to every search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSettings {
    pub sites: Vec<String>,
    pub results_wanted: u32,
    pub hours_old: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            sites: vec!["indeed".to_string()],
            results_wanted: 20,
            hours_old: 2,
        }
    }
}

/// Scraping adapter: turns a (term, location) pair into a `SearchOutcome`.
///
/// Never returns an error; failures of the job board become `SearchOutcome::Failed`.
pub struct JobSearchService {
    board: Arc<dyn JobBoard>,
    settings: SearchSettings,
}

impl JobSearchService {
    pub fn new(board: Arc<dyn JobBoard>, settings: SearchSettings) -> Self {
        Self { board, settings }
    }

    pub fn build_request(&self, search_term: &str, location: Option<&str>) -> ScrapeRequest {
        ScrapeRequest {
            sites: self.settings.sites.clone(),
            search_term: search_term.to_string(),
            location: location.map(str::to_string),
            results_wanted: self.settings.results_wanted,
            hours_old: self.settings.hours_old,
            region: detect_region(location),
        }
    }

    pub async fn search(&self, search_term: &str, location: Option<&str>) -> SearchOutcome {
        let req = self.build_request(search_term, location);
        tracing::info!(
            search_term,
            location = location.unwrap_or(""),
            sites = ?req.sites,
            region = %req.region,
            "searching jobs"
        );

        match self.board.scrape(&req).await {
            Ok(postings) if postings.is_empty() => SearchOutcome::NoResults {
                message: no_results_message(search_term, location),
            },
            Ok(postings) => {
                tracing::info!(count = postings.len(), "found jobs");
                SearchOutcome::Found {
                    count: postings.len(),
                    postings,
                    search_term: search_term.to_string(),
                    location: location.map(str::to_string),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "job search failed");
                SearchOutcome::Failed {
                    message: format!("Search failed: {e}"),
                }
            }
        }
    }
}
