//! Match builders shared by unit tests.

use crate::api::models::{Match, MatchInfo, MatchMetadata, Participant, Position};

pub const ME: &str = "me-puuid";

pub fn player(puuid: &str, team_id: i32, kda: (u32, u32, u32), win: bool) -> Participant {
    Participant {
        puuid: puuid.to_string(),
        champion_name: "Ahri".to_string(),
        team_id,
        kills: kda.0,
        deaths: kda.1,
        assists: kda.2,
        win,
        team_position: None,
        gold_earned: 10_000,
        total_minions_killed: 150,
        neutral_minions_killed: 30,
        total_damage_dealt_to_champions: 20_000,
        vision_score: 20,
    }
}

pub fn game(id: &str, queue_id: u32, duration: i64, participants: Vec<Participant>) -> Match {
    Match {
        metadata: MatchMetadata {
            match_id: id.to_string(),
        },
        info: MatchInfo {
            participants,
            queue_id,
            game_duration: duration,
            game_end_timestamp: None,
            game_creation: None,
            lp_change: None,
        },
    }
}

/// A 30 minute game with the viewer on team 100, one ally with 5 kills and one enemy.
pub fn my_game(id: &str, queue_id: u32, win: bool, kda: (u32, u32, u32)) -> Match {
    game(
        id,
        queue_id,
        1800,
        vec![
            player(ME, 100, kda, win),
            player("ally", 100, (5, 3, 4), win),
            player("enemy", 200, (4, 6, 2), !win),
        ],
    )
}

pub fn with_position(mut m: Match, position: Position) -> Match {
    if let Some(me) = m.info.participants.iter_mut().find(|p| p.puuid == ME) {
        me.team_position = Some(position);
    }
    m
}

pub fn with_duration(mut m: Match, seconds: i64) -> Match {
    m.info.game_duration = seconds;
    m
}

/// `count` alternating win/loss games, newest first, ids `G{n}`.
pub fn history(count: usize) -> Vec<Match> {
    (0..count)
        .map(|n| my_game(&format!("G{}", n), 420, n % 2 == 0, (3, 2, 5)))
        .collect()
}
