use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::api::models::Match;
use crate::error::AppError;

/// How many of the most recent matches a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    Recent(usize),
    All,
}

impl Default for RangeSelection {
    fn default() -> Self {
        RangeSelection::Recent(40)
    }
}

impl RangeSelection {
    /// Number of matches to take from a store of `available` matches.
    pub fn limit(&self, available: usize) -> usize {
        match self {
            RangeSelection::Recent(n) => (*n).min(available),
            RangeSelection::All => available,
        }
    }

    /// Match count pagination should reach; `All` never auto-loads.
    pub fn target(&self) -> Option<usize> {
        match self {
            RangeSelection::Recent(n) => Some(*n),
            RangeSelection::All => None,
        }
    }
}

impl FromStr for RangeSelection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(RangeSelection::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(RangeSelection::Recent(n)),
            _ => Err(AppError::InvalidFilter(format!(
                "range must be a positive number or 'all', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for RangeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSelection::Recent(n) => write!(f, "{}", n),
            RangeSelection::All => f.write_str("all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KdaRatio {
    Ratio(f64),
    /// No deaths, at least one kill or assist.
    Perfect,
    NoGames,
}

impl KdaRatio {
    pub fn from_totals(kills: u64, deaths: u64, assists: u64) -> Self {
        let takedowns = kills.saturating_add(assists);
        if deaths == 0 && takedowns > 0 {
            return KdaRatio::Perfect;
        }
        KdaRatio::Ratio(round_to(takedowns as f64 / deaths.max(1) as f64, 2))
    }
}

impl fmt::Display for KdaRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdaRatio::Ratio(ratio) => write!(f, "{:.2}", ratio),
            KdaRatio::Perfect => f.write_str("Perfect"),
            KdaRatio::NoGames => f.write_str("0.0"),
        }
    }
}

impl Serialize for KdaRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KdaRatio::Ratio(ratio) => serializer.serialize_f64(*ratio),
            KdaRatio::Perfect => serializer.serialize_str("Perfect"),
            KdaRatio::NoGames => serializer.serialize_str("0.0"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_wins: u32,
    pub total_losses: u32,
    pub avg_kda: String,
    pub kda_ratio: KdaRatio,
    pub avg_cs_per_min: f64,
    pub avg_gold: u64,
    pub avg_duration: u64,
    pub win_rate: u32,
    pub avg_damage: u64,
    pub avg_vision: f64,
    pub kill_participation: u32,
}

impl Summary {
    pub fn empty() -> Self {
        Summary {
            total_wins: 0,
            total_losses: 0,
            avg_kda: "0/0/0".to_string(),
            kda_ratio: KdaRatio::NoGames,
            avg_cs_per_min: 0.0,
            avg_gold: 0,
            avg_duration: 0,
            win_rate: 0,
            avg_damage: 0,
            avg_vision: 0.0,
            kill_participation: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.total_wins + self.total_losses
    }
}

#[derive(Default)]
struct Totals {
    games: u32,
    wins: u32,
    kills: u64,
    deaths: u64,
    assists: u64,
    creep_score: u64,
    gold: u64,
    duration_secs: u64,
    damage: u64,
    vision: u64,
    kill_participation: f64,
}

/// Aggregates the viewer's stats over the `range` most recent matches.
pub fn summarize(matches: &[Match], puuid: &str, range: RangeSelection) -> Summary {
    let slice = &matches[..range.limit(matches.len())];
    let mut totals = Totals::default();

    for m in slice {
        let Some(me) = m.participant(puuid) else {
            continue;
        };

        totals.games += 1;
        if me.win {
            totals.wins += 1;
        }
        totals.kills = totals.kills.saturating_add(me.kills as u64);
        totals.deaths = totals.deaths.saturating_add(me.deaths as u64);
        totals.assists = totals.assists.saturating_add(me.assists as u64);
        totals.creep_score = totals.creep_score.saturating_add(me.creep_score());
        totals.gold = totals.gold.saturating_add(me.gold_earned);
        totals.duration_secs = totals
            .duration_secs
            .saturating_add(m.info.game_duration.max(0) as u64);
        totals.damage = totals.damage.saturating_add(me.total_damage_dealt_to_champions);
        totals.vision = totals.vision.saturating_add(me.vision_score as u64);

        let team_kills = m.team_kills(me.team_id);
        if team_kills > 0 {
            totals.kill_participation += (me.kills as f64 + me.assists as f64) / team_kills as f64;
        }
    }

    if totals.games == 0 {
        return Summary::empty();
    }

    let games = totals.games as f64;
    let minutes = totals.duration_secs as f64 / 60.0;
    let avg_cs_per_min = if minutes > 0.0 {
        round_to(totals.creep_score as f64 / minutes, 1)
    } else {
        0.0
    };

    Summary {
        total_wins: totals.wins,
        total_losses: totals.games - totals.wins,
        avg_kda: format!(
            "{:.1}/{:.1}/{:.1}",
            totals.kills as f64 / games,
            totals.deaths as f64 / games,
            totals.assists as f64 / games
        ),
        kda_ratio: KdaRatio::from_totals(totals.kills, totals.deaths, totals.assists),
        avg_cs_per_min,
        avg_gold: mean(totals.gold, totals.games),
        avg_duration: mean(totals.duration_secs, totals.games),
        win_rate: percent(totals.wins, totals.games),
        avg_damage: mean(totals.damage, totals.games),
        avg_vision: round_to(totals.vision as f64 / games, 1),
        kill_participation: (100.0 * totals.kill_participation / games).round() as u32,
    }
}

pub(crate) fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

fn mean(total: u64, games: u32) -> u64 {
    (total as f64 / games.max(1) as f64).round() as u64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
