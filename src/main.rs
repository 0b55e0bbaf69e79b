mod analysis;
mod api;
mod config;
mod dashboard;
mod display;
mod error;
#[cfg(test)]
mod fixtures;
mod search;
mod store;

use analysis::filter::{FilterState, QueueFilter, ResultFilter, RoleFilter};
use analysis::summary::{RangeSelection, Summary};
use anyhow::Context;
use api::client::BackendClient;
use api::models::{ingest_page, RiotId};
use clap::{Parser, Subcommand};
use config::Config;
use dashboard::Dashboard;
use display::output::{
    display_error, display_history, display_info, display_match_history, display_profile_header,
    display_queue_menu, display_success, display_suggestions, display_summary,
};
use error::AppError;
use indicatif::ProgressBar;
use search::history::SearchHistory;
use search::session::{SearchSession, SessionAction, SessionEvent};
use search::suggestions::{merge_suggestions, should_query};
use serde::Serialize;
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use store::Identity;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rift_stats")]
#[command(about = "League of Legends profiles, match history and stats", long_about = None)]
#[command(version)]
struct Args {
    /// Backend base URL (overrides RIFT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a player's summary and match history
    Profile {
        /// Riot ID, e.g. "Faker#KR1"
        riot_id: RiotId,

        /// Most recent games to summarize: a number or "all"
        #[arg(short, long, default_value = "40")]
        range: RangeSelection,

        /// Queue filter: "all", "ranked" or a queue id (420, 440, 450, ...)
        #[arg(short, long, default_value = "all")]
        queue: QueueFilter,

        /// Result filter: all, win or loss
        #[arg(long, default_value = "all")]
        result: ResultFilter,

        /// Role filter: all, TOP, JUNGLE, MIDDLE, BOTTOM or UTILITY
        #[arg(long, default_value = "all")]
        role: RoleFilter,

        /// Print the summary as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Also list the queues present in the loaded matches
        #[arg(long)]
        menu: bool,
    },

    /// Interactive search with live suggestions
    Search,

    /// Suggestions for a partial Riot ID
    Suggest {
        query: String,
    },

    /// List or clear recent searches
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, Default)]
struct ProfileOptions {
    range: RangeSelection,
    filter: FilterState,
    json: bool,
    menu: bool,
    /// Running inside `search`, where `:more` loads further pages.
    interactive: bool,
}

impl ProfileOptions {
    fn more_hint(&self) -> &'static str {
        if self.interactive {
            "type :more to load the next page"
        } else {
            "raise --range to load them"
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    riot_id: String,
    loaded: usize,
    range: String,
    summary: &'a Summary,
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!("Using backend {}", config.api_url);

    let client = Arc::new(BackendClient::new(&config));

    match args.command {
        Command::Profile {
            riot_id,
            range,
            queue,
            result,
            role,
            json,
            menu,
        } => {
            let options = ProfileOptions {
                range,
                filter: FilterState { queue, result, role },
                json,
                menu,
                interactive: false,
            };
            let mut history = SearchHistory::load(&config.history_path);
            let mut dashboard = Dashboard::new(config.page_size);
            show_profile(&client, &mut dashboard, &riot_id, &options)
                .with_context(|| format!("loading profile for {}", riot_id))?;
            history.record(&riot_id.to_string());
            save_history(&history);
        }
        Command::Search => run_search(&config, client)?,
        Command::Suggest { query } => {
            let history = SearchHistory::load(&config.history_path);
            let remote = if should_query(&query) {
                client.get_suggestions(query.trim())
            } else {
                Vec::new()
            };
            let items = merge_suggestions(&history, &query, &remote);
            if items.is_empty() {
                display_info(&format!("No suggestions for '{}'", query));
            }
            display_suggestions(&items);
        }
        Command::History { clear } => {
            let mut history = SearchHistory::load(&config.history_path);
            if clear {
                history.clear();
                history.save().context("clearing search history")?;
                display_success("Search history cleared");
            } else {
                display_history(history.entries());
            }
        }
    }

    Ok(())
}

fn save_history(history: &SearchHistory) {
    if let Err(e) = history.save() {
        tracing::warn!("Could not save search history: {}", e);
    }
}

fn show_profile(
    client: &BackendClient,
    dashboard: &mut Dashboard,
    riot_id: &RiotId,
    options: &ProfileOptions,
) -> Result<(), AppError> {
    let response = client.get_profile_with_retry(riot_id, true)?;
    let first_page = ingest_page(response.matches);

    dashboard.open(
        Identity {
            riot_id: riot_id.to_string(),
            puuid: response.profile.puuid.clone(),
        },
        first_page,
        response.matches_page_size,
    );
    dashboard.set_range(options.range);
    dashboard.set_filter(options.filter);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Loading matches");
    dashboard.ensure_range(client, |loaded| {
        spinner.set_message(format!("Loaded {} matches", loaded));
        spinner.tick();
    });
    spinner.finish_and_clear();

    let view = dashboard.view();
    let loaded = dashboard.feed().len();

    if options.json {
        let report = JsonReport {
            riot_id: riot_id.to_string(),
            loaded,
            range: view.range.to_string(),
            summary: &view.summary,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::JsonError(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    display_profile_header(&response.profile);
    display_summary(&view.summary, view.range, loaded);
    if options.menu {
        display_queue_menu(&dashboard.queue_menu());
    }
    render_history(dashboard, options);

    Ok(())
}

fn render_history(dashboard: &Dashboard, options: &ProfileOptions) {
    let Some(identity) = dashboard.feed().identity() else {
        return;
    };
    let more_hint = dashboard.feed().has_more().then(|| options.more_hint());
    display_match_history(&dashboard.view(), &identity.puuid, more_hint);
}

fn spawn_input_reader(tx: Sender<SessionEvent>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(SessionEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(SessionEvent::Closed);
    });
}

fn spawn_suggestion_fetch(client: Arc<BackendClient>, query: String, tx: Sender<SessionEvent>) {
    thread::spawn(move || {
        let results = client.get_suggestions(&query);
        let _ = tx.send(SessionEvent::Suggestions { query, results });
    });
}

fn run_search(config: &Config, client: Arc<BackendClient>) -> Result<(), AppError> {
    let mut session = SearchSession::new(SearchHistory::load(&config.history_path), config.debounce);
    let mut dashboard = Dashboard::new(config.page_size);

    let (tx, rx) = mpsc::channel();
    spawn_input_reader(tx.clone());

    display_info(
        "Type a Riot ID (Name#TAG). ':go' opens it, ':more' loads more matches, ':clear' clears history, ':q' quits.",
    );
    let options = ProfileOptions {
        interactive: true,
        ..ProfileOptions::default()
    };
    display_history(session.history().entries());

    loop {
        let event = match session.deadline() {
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(SessionEvent::Closed),
                }
            }
            None => Some(rx.recv().unwrap_or(SessionEvent::Closed)),
        };

        let action = match event {
            Some(event) => session.handle(event, Instant::now()),
            None => session.tick(Instant::now()),
        };

        match action {
            SessionAction::Idle => {}
            SessionAction::Query(query) => {
                spawn_suggestion_fetch(Arc::clone(&client), query, tx.clone())
            }
            SessionAction::Show(items) => display_suggestions(&items),
            SessionAction::Submit(riot_id) => {
                // A failed lookup leaves the session usable.
                match show_profile(&client, &mut dashboard, &riot_id, &options) {
                    Ok(()) => {
                        session.record_success(&riot_id);
                        save_history(session.history());
                    }
                    Err(e) => {
                        dashboard.close();
                        display_error(&e.to_string());
                    }
                }
            }
            SessionAction::LoadMore => {
                if dashboard.feed().identity().is_none() {
                    display_info("Open a profile with ':go' first");
                } else if !dashboard.feed().has_more() {
                    display_info("No more matches to load");
                } else {
                    let added = dashboard.load_more(&*client);
                    display_success(&format!(
                        "Loaded {} more matches ({} total)",
                        added,
                        dashboard.feed().len()
                    ));
                    render_history(&dashboard, &options);
                }
            }
            SessionAction::Invalid(text) => {
                display_error(&format!("'{}' is not a Riot ID (Name#TAG)", text))
            }
            SessionAction::HistoryCleared => {
                save_history(session.history());
                display_success("Search history cleared");
            }
            SessionAction::Quit => break,
        }
    }

    Ok(())
}
