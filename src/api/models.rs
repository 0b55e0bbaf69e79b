use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::analysis::queues::REMAKE_MAX_SECONDS;
use crate::error::AppError;
use crate::store::Page;

/// A `GameName#Tagline` player identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl FromStr for RiotId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s.trim().rsplit_once('#').ok_or(AppError::InvalidRiotId)?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(AppError::InvalidRiotId);
        }
        Ok(RiotId {
            game_name: name.to_string(),
            tag_line: tag.to_string(),
        })
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

// Riot's teamPosition enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Top,
    Jungle,
    Middle,
    Bottom,
    Utility,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Top,
        Position::Jungle,
        Position::Middle,
        Position::Bottom,
        Position::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Top => "TOP",
            Position::Jungle => "JUNGLE",
            Position::Middle => "MIDDLE",
            Position::Bottom => "BOTTOM",
            Position::Utility => "UTILITY",
        }
    }
}

/// Case-sensitive, like the values Riot sends.
impl FromStr for Position {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AppError::InvalidFilter(format!("unknown position '{}'", s)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn position_from_raw<'de, D>(deserializer: D) -> Result<Option<Position>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

// Match payload as served by /api/profile and /api/matches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Match {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub queue_id: u32,
    /// Seconds.
    #[serde(default)]
    pub game_duration: i64,
    #[serde(default)]
    pub game_end_timestamp: Option<i64>,
    #[serde(default)]
    pub game_creation: Option<i64>,
    #[serde(default)]
    pub lp_change: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub puuid: String,
    #[serde(default)]
    pub champion_name: String,
    #[serde(default)]
    pub team_id: i32,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub win: bool,
    #[serde(default, deserialize_with = "position_from_raw")]
    pub team_position: Option<Position>,
    #[serde(default)]
    pub gold_earned: u64,
    #[serde(default)]
    pub total_minions_killed: u32,
    #[serde(default)]
    pub neutral_minions_killed: u32,
    #[serde(default)]
    pub total_damage_dealt_to_champions: u64,
    #[serde(default)]
    pub vision_score: u32,
}

impl Participant {
    pub fn creep_score(&self) -> u64 {
        self.total_minions_killed as u64 + self.neutral_minions_killed as u64
    }

    pub fn kda_line(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}

impl Match {
    pub fn id(&self) -> &str {
        &self.metadata.match_id
    }

    pub fn participant(&self, puuid: &str) -> Option<&Participant> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }

    /// Total kills credited to `team_id`; zero when the team id is unknown.
    pub fn team_kills(&self, team_id: i32) -> u64 {
        if team_id == 0 {
            return 0;
        }
        self.info
            .participants
            .iter()
            .filter(|p| p.team_id == team_id)
            .fold(0u64, |total, p| total.saturating_add(p.kills as u64))
    }

    pub fn is_remake(&self) -> bool {
        self.info.game_duration > 0 && self.info.game_duration <= REMAKE_MAX_SECONDS
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        let millis = self.info.game_end_timestamp.or_else(|| {
            self.info
                .game_creation
                .map(|created| created.saturating_add(self.info.game_duration.saturating_mul(1000)))
        })?;
        Utc.timestamp_millis_opt(millis).single()
    }

    fn validate(&self) -> Result<(), String> {
        if self.metadata.match_id.trim().is_empty() {
            return Err("empty matchId".to_string());
        }
        let mut seen = HashSet::new();
        for participant in &self.info.participants {
            if !seen.insert(participant.puuid.as_str()) {
                return Err(format!("duplicate participant {}", participant.puuid));
            }
        }
        Ok(())
    }
}

/// Turns raw match JSON into typed matches. Malformed entries are dropped, never fatal.
pub fn ingest_matches(raw: Vec<serde_json::Value>) -> Vec<Match> {
    raw.into_iter()
        .filter_map(|value| {
            let parsed = serde_json::from_value::<Match>(value)
                .map_err(|e| e.to_string())
                .and_then(|m| m.validate().map(|_| m));
            match parsed {
                Ok(m) => Some(m),
                Err(reason) => {
                    tracing::warn!("Dropping malformed match: {}", reason);
                    None
                }
            }
        })
        .collect()
}

/// Ingests a backend page, remembering how many raw records it held.
pub fn ingest_page(raw: Vec<serde_json::Value>) -> Page {
    let returned = raw.len();
    Page {
        matches: ingest_matches(raw),
        returned,
    }
}

// /api/profile response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(alias = "summoner")]
    pub profile: SummonerProfile,
    #[serde(default)]
    pub matches: Vec<serde_json::Value>,
    #[serde(default)]
    pub matches_page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerProfile {
    pub puuid: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
    #[serde(default)]
    pub summoner_level: i64,
}

// /api/summoner-suggestions response item
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub riot_id: String,
    #[serde(default)]
    pub profile_icon_id: Option<i64>,
    #[serde(default)]
    pub profile_icon_url: Option<String>,
    #[serde(default)]
    pub summoner_level: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_match(id: &str, puuids: &[&str]) -> serde_json::Value {
        let participants: Vec<_> = puuids
            .iter()
            .map(|p| json!({ "puuid": p, "championName": "Ahri", "teamId": 100, "win": true }))
            .collect();
        json!({
            "metadata": { "matchId": id },
            "info": { "participants": participants, "queueId": 420, "gameDuration": 1800 }
        })
    }

    #[test]
    fn test_riot_id_parsing() {
        let id: RiotId = "Faker#KR1".parse().unwrap();
        assert_eq!(id.game_name, "Faker");
        assert_eq!(id.tag_line, "KR1");
        assert_eq!(id.to_string(), "Faker#KR1");

        let spaced: RiotId = "  Hide on bush # KR1 ".parse().unwrap();
        assert_eq!(spaced.to_string(), "Hide on bush#KR1");

        assert!("NoTag".parse::<RiotId>().is_err());
        assert!("#KR1".parse::<RiotId>().is_err());
        assert!("Name#".parse::<RiotId>().is_err());
    }

    #[test]
    fn test_position_is_case_sensitive() {
        assert_eq!("UTILITY".parse::<Position>().unwrap(), Position::Utility);
        assert!("utility".parse::<Position>().is_err());
    }

    #[test]
    fn test_ingest_defaults_missing_stats() {
        let raw = json!({
            "metadata": { "matchId": "NA1_1" },
            "info": {
                "participants": [{ "puuid": "me", "teamPosition": "" }],
                "queueId": 450
            }
        });
        let matches = ingest_matches(vec![raw]);
        assert_eq!(matches.len(), 1);
        let me = matches[0].participant("me").unwrap();
        assert_eq!(me.kills, 0);
        assert_eq!(me.team_position, None);
        assert!(!me.win);
        assert_eq!(matches[0].info.lp_change, None);
    }

    #[test]
    fn test_ingest_drops_malformed_and_keeps_rest() {
        let matches = ingest_matches(vec![
            raw_match("NA1_1", &["a", "b"]),
            json!({ "metadata": {}, "info": {} }),
            raw_match("", &["a"]),
            raw_match("NA1_2", &["a", "a"]),
            json!({ "metadata": { "matchId": "NA1_3" }, "info": { "participants": [{ "puuid": "a", "kills": -1 }] } }),
            raw_match("NA1_4", &["a"]),
        ]);
        let ids: Vec<_> = matches.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["NA1_1", "NA1_4"]);
    }

    #[test]
    fn test_ingest_page_counts_dropped_records() {
        let page = ingest_page(vec![
            raw_match("NA1_1", &["a"]),
            json!({ "metadata": {}, "info": {} }),
            raw_match("NA1_2", &["a"]),
        ]);
        assert_eq!(page.returned, 3);
        assert_eq!(page.matches.len(), 2);
    }

    #[test]
    fn test_remake_boundaries() {
        let mut m = ingest_matches(vec![raw_match("NA1_1", &["a"])]).remove(0);
        for (duration, remake) in [(0, false), (1, true), (300, true), (301, false)] {
            m.info.game_duration = duration;
            assert_eq!(m.is_remake(), remake, "duration {}", duration);
        }
    }

    #[test]
    fn test_ended_at_falls_back_to_creation() {
        let mut m = ingest_matches(vec![raw_match("NA1_1", &["a"])]).remove(0);
        m.info.game_creation = Some(1_700_000_000_000);
        assert_eq!(
            m.ended_at().unwrap().timestamp_millis(),
            1_700_000_000_000 + 1800 * 1000
        );
        m.info.game_end_timestamp = Some(1_700_000_500_000);
        assert_eq!(m.ended_at().unwrap().timestamp_millis(), 1_700_000_500_000);
    }

    #[test]
    fn test_profile_accepts_summoner_alias() {
        let profile: ProfileResponse = serde_json::from_value(json!({
            "summoner": { "puuid": "p1", "gameName": "Foo", "tagLine": "1", "summonerLevel": 300 },
            "matchesPageSize": 10
        }))
        .unwrap();
        assert_eq!(profile.profile.puuid, "p1");
        assert!(profile.matches.is_empty());
        assert_eq!(profile.matches_page_size, Some(10));
    }
}
