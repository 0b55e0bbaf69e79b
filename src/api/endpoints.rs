// Backend routes, relative to the configured API base URL

pub const PROFILE_ENDPOINT: &str = "/api/profile";
pub const MATCHES_ENDPOINT: &str = "/api/matches";
pub const SUGGESTIONS_ENDPOINT: &str = "/api/summoner-suggestions";
pub const LEGACY_SUGGESTIONS_ENDPOINT: &str = "/api/suggestions";

pub fn url(base: &str, endpoint: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), endpoint)
}
