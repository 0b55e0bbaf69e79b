use crate::analysis::filter::QueueOption;
use crate::analysis::queues::queue_name;
use crate::analysis::summary::{RangeSelection, Summary};
use crate::api::models::{Match, SummonerProfile};
use crate::dashboard::DashboardView;
use crate::search::suggestions::SuggestionItem;
use chrono::{DateTime, Utc};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    number: String,
    result: String,
    champion: String,
    role: String,
    kda: String,
    cs: String,
    queue: String,
    duration: String,
    lp: String,
    played: String,
}

#[derive(Tabled)]
struct StatRow {
    stat: String,
    value: String,
}

#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "#")]
    number: String,
    riot_id: String,
    source: String,
    level: String,
    icon: String,
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_profile_header(profile: &SummonerProfile) {
    let name = if profile.game_name.is_empty() {
        profile.puuid.clone()
    } else {
        format!("{}#{}", profile.game_name, profile.tag_line)
    };
    println!("\n{}", format!("🎮 {}", name).bold().cyan());
    println!("   Level {}", profile.summoner_level);
}

pub fn display_summary(summary: &Summary, range: RangeSelection, loaded: usize) {
    let scope = match range {
        RangeSelection::All => format!("All {} loaded games", loaded),
        RangeSelection::Recent(n) => format!("Last {} games", n.min(loaded)),
    };
    println!("\n{}", format!("📊 SUMMARY ({})", scope).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if summary.games() == 0 {
        println!("{}", "No games to summarize".yellow());
        return;
    }

    println!(
        "{} {} W / {} L ({}% WR)\n",
        "📈 Overall:".bold(),
        summary.total_wins.to_string().green(),
        summary.total_losses.to_string().red(),
        summary.win_rate
    );

    let rows = vec![
        stat("KDA", format!("{} ({})", summary.avg_kda, summary.kda_ratio)),
        stat("CS/min", format!("{:.1}", summary.avg_cs_per_min)),
        stat("Gold", summary.avg_gold.to_string()),
        stat("Damage", summary.avg_damage.to_string()),
        stat("Vision", format!("{:.1}", summary.avg_vision)),
        stat("Kill participation", format!("{}%", summary.kill_participation)),
        stat("Game length", format_duration(summary.avg_duration as i64)),
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn stat(name: &str, value: String) -> StatRow {
    StatRow {
        stat: name.to_string(),
        value,
    }
}

/// `more_hint` tells the user how to load further pages, when there are any.
pub fn display_match_history(view: &DashboardView<'_>, puuid: &str, more_hint: Option<&str>) {
    println!(
        "\n{}",
        format!("📜 MATCH HISTORY ({} shown)", view.visible.len()).bold().cyan()
    );
    println!(
        "{}",
        format!(
            "queue {} · result {} · role {}",
            view.filter.queue, view.filter.result, view.filter.role
        )
        .dimmed()
    );
    println!("{}\n", "=".repeat(80).cyan());

    if view.visible.is_empty() {
        println!("{}", "No matches for the selected filters".yellow());
    } else {
        let now = Utc::now();
        let rows: Vec<MatchRow> = view
            .visible
            .iter()
            .enumerate()
            .filter_map(|(idx, m)| match_row(idx, m, puuid, now))
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    let visible = &view.visible_summary;
    if visible.is_empty() && !view.visible.is_empty() {
        println!("{}", "Only remakes match the selected filters".yellow());
    }
    println!(
        "\n{} {} games · {} WR · {} KDA{}",
        "🔎 Filtered:".bold(),
        visible.games,
        visible.win_rate_label(),
        visible.kda_label(),
        if visible.remakes > 0 {
            format!(" · {} remakes excluded", visible.remakes)
        } else {
            String::new()
        }
    );
    if let Some(hint) = more_hint {
        println!("{}", format!("More matches available ({})", hint).dimmed());
    }
    println!();
}

fn match_row(idx: usize, m: &Match, puuid: &str, now: DateTime<Utc>) -> Option<MatchRow> {
    let me = m.participant(puuid)?;
    let result = if m.is_remake() {
        "REMAKE".dimmed().to_string()
    } else if me.win {
        "WIN".green().to_string()
    } else {
        "LOSS".red().to_string()
    };

    Some(MatchRow {
        number: format!("{}", idx + 1),
        result,
        champion: me.champion_name.clone(),
        role: me
            .team_position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string()),
        kda: me.kda_line(),
        cs: me.creep_score().to_string(),
        queue: queue_name(m.info.queue_id),
        duration: format_duration(m.info.game_duration),
        lp: format_lp(m.info.lp_change),
        played: m
            .ended_at()
            .map(|ended| time_ago(ended, now))
            .unwrap_or_default(),
    })
}

pub fn display_queue_menu(menu: &[QueueOption]) {
    println!("\n{}", "Queues".bold().yellow());
    for option in menu {
        println!("  {:<8} {}", option.filter.to_string(), option.label);
    }
}

pub fn display_suggestions(items: &[SuggestionItem]) {
    if items.is_empty() {
        return;
    }

    let rows: Vec<SuggestionRow> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let (source, level, icon) = match item {
                SuggestionItem::Recent(_) => ("recent".to_string(), String::new(), String::new()),
                SuggestionItem::Remote(s) => (
                    "search".to_string(),
                    s.summoner_level.map(|l| l.to_string()).unwrap_or_default(),
                    s.profile_icon_url
                        .clone()
                        .or_else(|| s.profile_icon_id.map(|id| format!("#{}", id)))
                        .unwrap_or_default(),
                ),
            };
            SuggestionRow {
                number: format!("{}", idx + 1),
                riot_id: item.riot_id().to_string(),
                source,
                level,
                icon,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_history(entries: &[String]) {
    if entries.is_empty() {
        display_info("No recent searches");
        return;
    }
    println!("\n{}", "🕘 Recent searches".bold().cyan());
    for (idx, entry) in entries.iter().enumerate() {
        println!("  {:>2}. {}", idx + 1, entry);
    }
}

pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_lp(lp_change: Option<i32>) -> String {
    match lp_change {
        Some(lp) if lp > 0 => format!("+{} LP", lp),
        Some(lp) => format!("{} LP", lp),
        None => String::new(),
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}
