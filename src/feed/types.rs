use chrono::NaiveDate;
use std::collections::HashMap;

pub type PlayerId = u64;
pub type TeamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubDirection {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    ThreePoint { made: bool },
    Substitution { direction: Option<SubDirection> },
    Other(String),
}

/// One play-by-play event. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub order_number: i64,
    pub action_number: i64,
    pub period: Option<u8>,
    pub clock: String,
    pub kind: ActionKind,
    pub team_id: Option<TeamId>,
    pub person_id: Option<PlayerId>,
    pub score_home: Option<i32>,
    pub score_away: Option<i32>,
    pub descriptor: Option<String>,
    pub description: Option<String>,
    pub x_legacy: Option<f64>,
    pub y_legacy: Option<f64>,
}

impl Action {
    /// Bare action of the given kind; the remaining fields are filled in by
    /// the parser or, in tests, with struct-update syntax.
    pub fn new(order_number: i64, period: u8, clock: &str, kind: ActionKind) -> Self {
        Self {
            order_number,
            action_number: order_number,
            period: Some(period),
            clock: clock.to_string(),
            kind,
            team_id: None,
            person_id: None,
            score_home: None,
            score_away: None,
            descriptor: None,
            description: None,
            x_legacy: None,
            y_legacy: None,
        }
    }

    pub fn sequence_key(&self) -> (i64, i64) {
        (self.order_number, self.action_number)
    }

    pub fn is_substitution(&self) -> bool {
        matches!(self.kind, ActionKind::Substitution { .. })
    }
}

/// A boxscore line for a player who dressed for the game.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxscorePlayer {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub played: bool,
    pub starter: bool,
    pub plus_minus: Option<f64>,
}

/// Everything the engine needs to process one game.
#[derive(Debug, Clone)]
pub struct GameInput {
    pub game_id: String,
    pub date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub starters: HashMap<TeamId, Vec<PlayerId>>,
    pub players: Vec<BoxscorePlayer>,
    pub actions: Vec<Action>,
}

impl GameInput {
    /// Game id with the provider's zero padding removed.
    pub fn normalized_game_id(&self) -> String {
        self.game_id.trim_start_matches('0').to_string()
    }

    pub fn opponent(&self, team_id: TeamId) -> Option<TeamId> {
        if team_id == self.home_team_id {
            Some(self.away_team_id)
        } else if team_id == self.away_team_id {
            Some(self.home_team_id)
        } else {
            None
        }
    }
}
