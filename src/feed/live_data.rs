use super::types::{
    Action, ActionKind, BoxscorePlayer, GameInput, PlayerId, SubDirection, TeamId,
};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

// ── Play-by-play Deserialization ─────────────────────────────────────

#[derive(Deserialize)]
struct PlayByPlayDoc {
    game: PlayByPlayGame,
}

#[derive(Deserialize)]
struct PlayByPlayGame {
    #[serde(default)]
    actions: Vec<RawAction>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawAction {
    order_number: Option<Value>,
    action_number: Option<Value>,
    period: Option<Value>,
    clock: Option<String>,
    action_type: Option<String>,
    sub_type: Option<String>,
    team_id: Option<Value>,
    person_id: Option<Value>,
    score_home: Option<Value>,
    score_away: Option<Value>,
    shot_result: Option<String>,
    descriptor: Option<String>,
    description: Option<String>,
    x_legacy: Option<Value>,
    y_legacy: Option<Value>,
}

impl From<RawAction> for Action {
    fn from(raw: RawAction) -> Self {
        let action_type = raw.action_type.unwrap_or_default().to_lowercase();
        let kind = match action_type.as_str() {
            "3pt" => ActionKind::ThreePoint {
                made: raw
                    .shot_result
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case("made")),
            },
            "substitution" => ActionKind::Substitution {
                direction: raw.sub_type.as_deref().and_then(sub_direction),
            },
            _ => ActionKind::Other(action_type),
        };
        Action {
            order_number: raw.order_number.as_ref().and_then(as_i64_any).unwrap_or(0),
            action_number: raw.action_number.as_ref().and_then(as_i64_any).unwrap_or(0),
            period: raw
                .period
                .as_ref()
                .and_then(as_i64_any)
                .and_then(|p| u8::try_from(p).ok())
                .filter(|p| *p > 0),
            clock: raw.clock.unwrap_or_default(),
            kind,
            team_id: raw.team_id.as_ref().and_then(as_id_any),
            person_id: raw.person_id.as_ref().and_then(as_id_any),
            score_home: raw.score_home.as_ref().and_then(as_i32_any),
            score_away: raw.score_away.as_ref().and_then(as_i32_any),
            descriptor: raw.descriptor.filter(|s| !s.is_empty()),
            description: raw.description.filter(|s| !s.is_empty()),
            x_legacy: raw.x_legacy.as_ref().and_then(as_f64_any),
            y_legacy: raw.y_legacy.as_ref().and_then(as_f64_any),
        }
    }
}

fn sub_direction(raw: &str) -> Option<SubDirection> {
    match raw.to_lowercase().as_str() {
        "in" => Some(SubDirection::In),
        "out" => Some(SubDirection::Out),
        _ => None,
    }
}

/// Parse a live-data play-by-play document into actions, in feed order.
pub fn parse_playbyplay(json: &str) -> Result<Vec<Action>> {
    let doc: PlayByPlayDoc = serde_json::from_str(json).context("parse play-by-play JSON")?;
    Ok(doc.game.actions.into_iter().map(Action::from).collect())
}

// ── Boxscore Deserialization ─────────────────────────────────────────

#[derive(Deserialize)]
struct BoxscoreDoc {
    game: BoxscoreGame,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxscoreGame {
    #[serde(default)]
    game_id: Option<String>,
    home_team: BoxscoreTeam,
    away_team: BoxscoreTeam,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxscoreTeam {
    team_id: Value,
    #[serde(default)]
    players: Vec<RawBoxscorePlayer>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawBoxscorePlayer {
    person_id: Option<Value>,
    first_name: Option<String>,
    family_name: Option<String>,
    name: Option<String>,
    played: Option<Value>,
    starter: Option<Value>,
    statistics: Option<RawPlayerStatistics>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawPlayerStatistics {
    plus_minus_points: Option<Value>,
}

/// The parts of a boxscore the engine consumes.
#[derive(Debug, Clone)]
pub struct Boxscore {
    pub game_id: Option<String>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub players: Vec<BoxscorePlayer>,
}

impl Boxscore {
    /// Starters per team, in boxscore order.
    pub fn starters(&self) -> HashMap<TeamId, Vec<PlayerId>> {
        let mut out: HashMap<TeamId, Vec<PlayerId>> = HashMap::new();
        for p in self.players.iter().filter(|p| p.starter) {
            out.entry(p.team_id).or_default().push(p.player_id);
        }
        out
    }
}

pub fn parse_boxscore(json: &str) -> Result<Boxscore> {
    let doc: BoxscoreDoc = serde_json::from_str(json).context("parse boxscore JSON")?;
    let game = doc.game;
    let Some(home_team_id) = as_id_any(&game.home_team.team_id) else {
        bail!("boxscore is missing the home team id");
    };
    let Some(away_team_id) = as_id_any(&game.away_team.team_id) else {
        bail!("boxscore is missing the away team id");
    };

    let mut players = Vec::new();
    for (team_id, team) in [(home_team_id, &game.home_team), (away_team_id, &game.away_team)] {
        for p in &team.players {
            let Some(player_id) = p.person_id.as_ref().and_then(as_id_any) else { continue };
            players.push(BoxscorePlayer {
                player_id,
                player_name: player_name(p),
                team_id,
                played: p.played.as_ref().is_some_and(is_flag_set),
                starter: p.starter.as_ref().is_some_and(is_flag_set),
                plus_minus: p
                    .statistics
                    .as_ref()
                    .and_then(|s| s.plus_minus_points.as_ref())
                    .and_then(as_f64_any),
            });
        }
    }

    Ok(Boxscore {
        game_id: game.game_id,
        home_team_id,
        away_team_id,
        players,
    })
}

fn player_name(p: &RawBoxscorePlayer) -> String {
    let first = p.first_name.as_deref().unwrap_or("");
    let last = p.family_name.as_deref().unwrap_or("");
    let joined = format!("{first} {last}").trim().to_string();
    if joined.is_empty() {
        p.name.clone().unwrap_or_default()
    } else {
        joined
    }
}

/// Assemble a [`GameInput`] from the two live-data documents of one game.
pub fn game_input_from_live_data(
    game_id: &str,
    date: NaiveDate,
    playbyplay_json: &str,
    boxscore_json: &str,
) -> Result<GameInput> {
    let actions = parse_playbyplay(playbyplay_json)
        .with_context(|| format!("game {game_id}: play-by-play"))?;
    let boxscore =
        parse_boxscore(boxscore_json).with_context(|| format!("game {game_id}: boxscore"))?;
    if let Some(box_id) = boxscore.game_id.as_deref() {
        if box_id.trim_start_matches('0') != game_id.trim_start_matches('0') {
            bail!("game {game_id}: boxscore belongs to game {box_id}");
        }
    }
    Ok(GameInput {
        game_id: game_id.to_string(),
        date,
        home_team_id: boxscore.home_team_id,
        away_team_id: boxscore.away_team_id,
        starters: boxscore.starters(),
        players: boxscore.players,
        actions,
    })
}

// ── Value helpers ────────────────────────────────────────────────────

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if let Some(f) = v.as_f64() {
        return Some(f as i64);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

fn as_i32_any(v: &Value) -> Option<i32> {
    i32::try_from(as_i64_any(v)?).ok()
}

/// Ids of zero mean "no player/team" in the feed.
fn as_id_any(v: &Value) -> Option<u64> {
    let n = as_i64_any(v)?;
    u64::try_from(n).ok().filter(|id| *id > 0)
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(f) = v.as_f64() {
        return Some(f);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

fn is_flag_set(v: &Value) -> bool {
    match v {
        Value::String(s) => s.trim() == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    }
}
