//! JobSpy adapter.
//!
//! Talks to a JobSpy HTTP API (`GET /api/v1/search_jobs`) and implements the
//! `jw-core` `JobBoard` port.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use jw_core::{
    errors::Error,
    jobs::{JobPosting, ScrapeRequest},
    ports::JobBoard,
    Result,
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs: Vec<JobPosting>,
}

#[derive(Clone, Debug)]
pub struct JobSpyClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl JobSpyClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("jobspy client build error: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    fn query_params(req: &ScrapeRequest) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = req
            .sites
            .iter()
            .map(|site| ("site_name", site.clone()))
            .collect();
        params.push(("search_term", req.search_term.clone()));
        if let Some(location) = &req.location {
            params.push(("location", location.clone()));
        }
        params.push(("results_wanted", req.results_wanted.to_string()));
        params.push(("hours_old", req.hours_old.to_string()));
        params.push(("country_indeed", req.region.as_str().to_string()));
        params
    }
}

#[async_trait]
impl JobBoard for JobSpyClient {
    async fn scrape(&self, req: &ScrapeRequest) -> Result<Vec<JobPosting>> {
        let url = format!("{}/api/v1/search_jobs", self.base_url);
        let mut call = self.http.get(&url).query(&Self::query_params(req));
        if let Some(key) = &self.api_key {
            call = call.header("x-api-key", key);
        }

        let resp = call
            .send()
            .await
            .map_err(|e| Error::External(format!("jobspy request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "jobspy search failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("jobspy json error: {e}")))?;

        tracing::debug!(count = parsed.jobs.len(), "jobspy returned postings");
        Ok(parsed.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use jw_core::jobs::Region;
    use serde_json::json;

    fn request(location: Option<&str>, region: Region) -> ScrapeRequest {
        ScrapeRequest {
            sites: vec!["indeed".to_string()],
            search_term: "data scientist".to_string(),
            location: location.map(str::to_string),
            results_wanted: 20,
            hours_old: 2,
            region,
        }
    }

    fn client(server: &MockServer, key: Option<&str>) -> JobSpyClient {
        JobSpyClient::new(
            server.base_url(),
            key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_search_parameters_and_parses_jobs() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/search_jobs")
                    .query_param("site_name", "indeed")
                    .query_param("search_term", "data scientist")
                    .query_param("location", "Toronto, ON")
                    .query_param("results_wanted", "20")
                    .query_param("hours_old", "2")
                    .query_param("country_indeed", "canada")
                    .header("x-api-key", "secret");
                then.status(200).json_body(json!({
                    "count": 2,
                    "cached": false,
                    "jobs": [
                        {
                            "title": "Data Scientist",
                            "company": "Maple Analytics",
                            "location": "Toronto, ON, CA",
                            "site": "indeed",
                            "date_posted": "2024-05-01",
                            "job_url": "https://ca.indeed.com/viewjob?jk=1",
                            "min_amount": 90000
                        },
                        { "title": "ML Engineer", "company": null }
                    ]
                }));
            })
            .await;

        let jobs = client(&server, Some("secret"))
            .scrape(&request(Some("Toronto, ON"), Region::Canada))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company.as_deref(), Some("Maple Analytics"));
        assert_eq!(jobs[0].date_posted.as_deref(), Some("2024-05-01"));
        assert_eq!(jobs[1].title.as_deref(), Some("ML Engineer"));
        assert_eq!(jobs[1].company, None);
        assert_eq!(jobs[1].job_url, None);
    }

    #[tokio::test]
    async fn missing_jobs_field_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/search_jobs");
                then.status(200).json_body(json!({ "count": 0 }));
            })
            .await;

        let jobs = client(&server, None)
            .scrape(&request(None, Region::Usa))
            .await
            .unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/search_jobs");
                then.status(500).body("scraper exploded");
            })
            .await;

        let err = client(&server, None)
            .scrape(&request(None, Region::Usa))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("scraper exploded"));
    }

    #[test]
    fn query_omits_location_when_absent() {
        let params = JobSpyClient::query_params(&request(None, Region::Usa));
        assert!(params.iter().all(|(k, _)| *k != "location"));
        assert!(params.contains(&("country_indeed", "usa".to_string())));
    }
}
