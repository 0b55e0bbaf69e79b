use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::queues::{is_ranked, queue_name, KNOWN_QUEUES};
use super::summary::{percent, KdaRatio};
use crate::api::models::{Match, Position};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueFilter {
    #[default]
    All,
    /// Any of the ranked queues.
    Ranked,
    Queue(u32),
}

impl QueueFilter {
    pub fn accepts(&self, queue_id: u32) -> bool {
        match self {
            QueueFilter::All => true,
            QueueFilter::Ranked => is_ranked(queue_id),
            QueueFilter::Queue(id) => *id == queue_id,
        }
    }
}

impl FromStr for QueueFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(QueueFilter::All)
        } else if s.eq_ignore_ascii_case("ranked") {
            Ok(QueueFilter::Ranked)
        } else {
            s.parse()
                .map(QueueFilter::Queue)
                .map_err(|_| AppError::InvalidFilter(format!("unknown queue '{}'", s)))
        }
    }
}

impl fmt::Display for QueueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueFilter::All => f.write_str("all"),
            QueueFilter::Ranked => f.write_str("ranked"),
            QueueFilter::Queue(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFilter {
    #[default]
    All,
    Win,
    Loss,
}

impl FromStr for ResultFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ResultFilter::All),
            "win" => Ok(ResultFilter::Win),
            "loss" => Ok(ResultFilter::Loss),
            other => Err(AppError::InvalidFilter(format!("unknown result '{}'", other))),
        }
    }
}

impl fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultFilter::All => f.write_str("all"),
            ResultFilter::Win => f.write_str("win"),
            ResultFilter::Loss => f.write_str("loss"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Position(Position),
}

impl FromStr for RoleFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(RoleFilter::All);
        }
        s.parse().map(RoleFilter::Position)
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleFilter::All => f.write_str("all"),
            RoleFilter::Position(position) => write!(f, "{}", position),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub queue: QueueFilter,
    pub result: ResultFilter,
    pub role: RoleFilter,
}

impl FilterState {
    /// All three predicates must hold; a match without the viewer never passes.
    pub fn accepts(&self, m: &Match, puuid: &str) -> bool {
        let Some(me) = m.participant(puuid) else {
            return false;
        };

        let queue_ok = self.queue.accepts(m.info.queue_id);
        let result_ok = match self.result {
            ResultFilter::All => true,
            ResultFilter::Win => me.win,
            ResultFilter::Loss => !me.win,
        };
        let role_ok = match self.role {
            RoleFilter::All => true,
            RoleFilter::Position(position) => me.team_position == Some(position),
        };

        queue_ok && result_ok && role_ok
    }
}

/// Matches passing `filter`, in store order.
pub fn filter_matches<'a>(matches: &'a [Match], puuid: &str, filter: &FilterState) -> Vec<&'a Match> {
    matches.iter().filter(|m| filter.accepts(m, puuid)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSummary {
    /// Visible matches that count toward stats (remakes excluded).
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub remakes: u32,
    pub win_rate: Option<u32>,
    pub kda: Option<KdaRatio>,
}

impl VisibleSummary {
    pub fn is_empty(&self) -> bool {
        self.games == 0
    }

    pub fn win_rate_label(&self) -> String {
        self.win_rate
            .map(|rate| format!("{}%", rate))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn kda_label(&self) -> String {
        self.kda
            .map(|kda| kda.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Win rate and KDA over the visible rows, ignoring remakes.
pub fn visible_summary(visible: &[&Match], puuid: &str) -> VisibleSummary {
    let mut summary = VisibleSummary {
        games: 0,
        wins: 0,
        losses: 0,
        remakes: 0,
        win_rate: None,
        kda: None,
    };
    let (mut kills, mut deaths, mut assists) = (0u64, 0u64, 0u64);

    for m in visible {
        let Some(me) = m.participant(puuid) else {
            continue;
        };
        if m.is_remake() {
            summary.remakes += 1;
            continue;
        }
        summary.games += 1;
        if me.win {
            summary.wins += 1;
        } else {
            summary.losses += 1;
        }
        kills = kills.saturating_add(me.kills as u64);
        deaths = deaths.saturating_add(me.deaths as u64);
        assists = assists.saturating_add(me.assists as u64);
    }

    if summary.games > 0 {
        summary.win_rate = Some(percent(summary.wins, summary.games));
        summary.kda = Some(KdaRatio::from_totals(kills, deaths, assists));
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueOption {
    pub label: String,
    pub filter: QueueFilter,
}

/// Queue choices for the loaded matches, led by "All queues" and "Ranked (any)".
pub fn queue_menu(matches: &[Match]) -> Vec<QueueOption> {
    let ids: BTreeSet<u32> = if matches.is_empty() {
        KNOWN_QUEUES.iter().map(|(id, _)| *id).collect()
    } else {
        matches.iter().map(|m| m.info.queue_id).collect()
    };

    let mut menu = vec![
        QueueOption {
            label: "All queues".to_string(),
            filter: QueueFilter::All,
        },
        QueueOption {
            label: "Ranked (any)".to_string(),
            filter: QueueFilter::Ranked,
        },
    ];
    menu.extend(ids.into_iter().map(|id| QueueOption {
        label: queue_name(id),
        filter: QueueFilter::Queue(id),
    }));
    menu
}
