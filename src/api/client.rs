use crate::config::Config;
use crate::error::AppError;
use crate::store::{MatchSource, Page};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints::{self, url};
use super::models::*;

const MAX_RETRIES: u32 = 3;

pub struct BackendClient {
    base_url: String,
    agent: ureq::Agent,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl BackendClient {
    pub fn new(config: &Config) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("rift_stats/", env!("CARGO_PKG_VERSION")))
            .build();

        BackendClient {
            base_url: config.api_url.clone(),
            agent,
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    fn throttle(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(DefaultClock::default().now()));
        }
    }

    fn execute_request(&self, request: ureq::Request) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.throttle();
            tracing::debug!("GET {}", request.url());

            match request.clone().call() {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    tracing::warn!("Rate limited, waiting {}ms before retry", wait_ms);
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(status, resp)) => {
                    let status_text = resp.status_text().to_string();
                    let body = resp.into_string().unwrap_or_default();
                    return Err(AppError::ApiError {
                        status,
                        message: error_message(status, &status_text, &body),
                    });
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    pub fn get_profile(
        &self,
        riot_id: &RiotId,
        include_matches: bool,
    ) -> Result<ProfileResponse, AppError> {
        let request = self
            .agent
            .get(&url(&self.base_url, endpoints::PROFILE_ENDPOINT))
            .query("riotId", &riot_id.to_string())
            .query("includeMatches", if include_matches { "true" } else { "false" });

        let body = match self.execute_request(request) {
            Err(AppError::ApiError { status: 404, .. }) => {
                return Err(AppError::PlayerNotFound(riot_id.to_string()))
            }
            other => other?,
        };
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    /// Profile fetch with one retry, as the primary query of a search.
    pub fn get_profile_with_retry(
        &self,
        riot_id: &RiotId,
        include_matches: bool,
    ) -> Result<ProfileResponse, AppError> {
        match self.get_profile(riot_id, include_matches) {
            Err(e) if e.is_retryable() => {
                tracing::warn!("Profile fetch for {} failed ({}), retrying once", riot_id, e);
                self.get_profile(riot_id, include_matches)
            }
            result => result,
        }
    }

    pub fn get_matches(
        &self,
        riot_id: &str,
        start: usize,
        count: usize,
    ) -> Result<Page, AppError> {
        let request = self
            .agent
            .get(&url(&self.base_url, endpoints::MATCHES_ENDPOINT))
            .query("riotId", riot_id)
            .query("start", &start.to_string())
            .query("count", &count.to_string());

        let body = self.execute_request(request)?;
        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))?;
        Ok(ingest_page(raw))
    }

    fn query_suggestions(&self, endpoint: &str, query: &str) -> Result<Vec<Suggestion>, AppError> {
        let request = self
            .agent
            .get(&url(&self.base_url, endpoint))
            .query("query", query);

        let body = self.execute_request(request)?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    /// Remote suggestions for `query`. Failures degrade to an empty list.
    pub fn get_suggestions(&self, query: &str) -> Vec<Suggestion> {
        let result = match self.query_suggestions(endpoints::SUGGESTIONS_ENDPOINT, query) {
            Err(AppError::ApiError { status: 404, .. }) => {
                self.query_suggestions(endpoints::LEGACY_SUGGESTIONS_ENDPOINT, query)
            }
            other => other,
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("Suggestions for '{}' unavailable: {}", query, e);
            Vec::new()
        })
    }
}

impl MatchSource for BackendClient {
    fn fetch_page(&self, riot_id: &str, start: usize, count: usize) -> Result<Page, AppError> {
        self.get_matches(riot_id, start, count)
    }
}

/// Human-readable message for a non-2xx response.
pub fn error_message(status: u16, status_text: &str, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message"].iter().find_map(|key| {
                json.get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            })
        });

    from_body
        .or_else(|| Some(status_text.trim().to_string()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", status))
}
