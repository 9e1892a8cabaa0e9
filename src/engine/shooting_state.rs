use crate::feed::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Recency-weighted career 3PT volume for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerShootingState {
    #[serde(default)]
    pub player_name: String,
    #[serde(rename = "A_r", default)]
    pub attempts_weighted: f64,
    #[serde(rename = "M_r", default)]
    pub made_weighted: f64,
}

/// One player's 3PT line for a single game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameShootingLine {
    pub player_id: PlayerId,
    pub player_name: String,
    pub attempts: u32,
    pub makes: u32,
}

/// Career totals used to seed a player's state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerTotals {
    pub fg3a: f64,
    pub fg3m: f64,
}

/// Season-long shooting state, keyed by player. Read-only while a game is
/// attributed; every update returns a new table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShootingStateTable {
    players: BTreeMap<PlayerId, PlayerShootingState>,
}

impl ShootingStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: impl IntoIterator<Item = (PlayerId, PlayerShootingState)>) -> Self {
        Self {
            players: players.into_iter().collect(),
        }
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerShootingState> {
        self.players.get(&player_id)
    }

    /// `(A_r, M_r)`, zero for players never seen.
    pub fn weighted(&self, player_id: PlayerId) -> (f64, f64) {
        self.players
            .get(&player_id)
            .map(|s| (s.attempts_weighted, s.made_weighted))
            .unwrap_or((0.0, 0.0))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerShootingState)> {
        self.players.iter()
    }

    /// Adds zero-state entries for shooters not yet tracked.
    pub fn ensure_players(&self, lines: &[GameShootingLine]) -> Self {
        let mut next = self.clone();
        for line in lines {
            next.players
                .entry(line.player_id)
                .or_insert_with(|| PlayerShootingState {
                    player_name: line.player_name.clone(),
                    ..Default::default()
                });
        }
        next
    }

    /// Post-game decay update:
    /// `A_r' = gamma^a * A_r + a`, `M_r' = gamma^a * M_r + m`,
    /// with `gamma = 0.5^(1/half_life_attempts)`. Players without an attempt
    /// are untouched.
    pub fn after_game(&self, lines: &[GameShootingLine], half_life_attempts: f64) -> Self {
        let gamma = 0.5_f64.powf(1.0 / half_life_attempts);
        let mut next = self.clone();
        for line in lines.iter().filter(|l| l.attempts > 0) {
            let entry = next.players.entry(line.player_id).or_default();
            let decay = gamma.powf(line.attempts as f64);
            entry.attempts_weighted = decay * entry.attempts_weighted + line.attempts as f64;
            entry.made_weighted = decay * entry.made_weighted + line.makes as f64;
            if entry.player_name.is_empty() {
                entry.player_name = line.player_name.clone();
            }
        }
        next
    }

    /// Adds career totals on top of the current weighted volume.
    pub fn with_career_baseline(&self, career: &HashMap<PlayerId, CareerTotals>) -> Self {
        let mut next = self.clone();
        for (player_id, state) in next.players.iter_mut() {
            let Some(totals) = career.get(player_id) else { continue };
            if totals.fg3a <= 0.0 {
                continue;
            }
            state.attempts_weighted += totals.fg3a;
            state.made_weighted += totals.fg3m;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(player_id: PlayerId, attempts: u32, makes: u32) -> GameShootingLine {
        GameShootingLine {
            player_id,
            player_name: format!("Player {player_id}"),
            attempts,
            makes,
        }
    }

    #[test]
    fn test_unknown_player_defaults_to_zero() {
        let table = ShootingStateTable::new();
        assert_eq!(table.weighted(42), (0.0, 0.0));
    }

    #[test]
    fn test_after_game_from_empty_state() {
        let table = ShootingStateTable::new().after_game(&[line(1, 5, 2)], 500.0);
        assert_eq!(table.weighted(1), (5.0, 2.0));
        assert_eq!(table.get(1).unwrap().player_name, "Player 1");
    }

    #[test]
    fn test_after_game_decays_history() {
        let table = ShootingStateTable::from_players([(
            1,
            PlayerShootingState {
                player_name: "A".into(),
                attempts_weighted: 400.0,
                made_weighted: 140.0,
            },
        )]);
        // half-life of 4 attempts: four attempts halve the history.
        let next = table.after_game(&[line(1, 4, 1)], 4.0);
        let (a, m) = next.weighted(1);
        assert!((a - 204.0).abs() < 1e-9, "got {a}");
        assert!((m - 71.0).abs() < 1e-9, "got {m}");
        // The input table is left as it was.
        assert_eq!(table.weighted(1), (400.0, 140.0));
    }

    #[test]
    fn test_after_game_skips_zero_attempts() {
        let table = ShootingStateTable::new().after_game(&[line(7, 0, 0)], 500.0);
        assert!(table.get(7).is_none());
    }

    #[test]
    fn test_ensure_players_keeps_existing() {
        let table = ShootingStateTable::new().after_game(&[line(1, 10, 4)], 500.0);
        let ensured = table.ensure_players(&[line(1, 0, 0), line(2, 3, 1)]);
        assert_eq!(ensured.weighted(1), (10.0, 4.0));
        assert_eq!(ensured.weighted(2), (0.0, 0.0));
        assert_eq!(ensured.len(), 2);
    }

    #[test]
    fn test_career_baseline_adds_totals() {
        let table = ShootingStateTable::new()
            .ensure_players(&[line(1, 0, 0), line(2, 0, 0)])
            .after_game(&[line(1, 10, 4)], 500.0);
        let career = HashMap::from([
            (1, CareerTotals { fg3a: 1000.0, fg3m: 370.0 }),
            (2, CareerTotals { fg3a: 0.0, fg3m: 0.0 }),
        ]);
        let seeded = table.with_career_baseline(&career);
        assert_eq!(seeded.weighted(1), (1010.0, 374.0));
        assert_eq!(seeded.weighted(2), (0.0, 0.0));
    }

    #[test]
    fn test_state_serializes_with_short_column_names() {
        let state = PlayerShootingState {
            player_name: "A".into(),
            attempts_weighted: 1.5,
            made_weighted: 0.5,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"A_r\":1.5"), "got {json}");
        assert!(json.contains("\"M_r\":0.5"), "got {json}");
    }

    #[test]
    fn test_table_reads_and_writes_player_keyed_json() {
        let json = r#"{"201939": {"player_name": "Stephen Curry", "A_r": 900.0, "M_r": 380.0}}"#;
        let table: ShootingStateTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.weighted(201939), (900.0, 380.0));
        assert_eq!(table.get(201939).unwrap().player_name, "Stephen Curry");

        let written = serde_json::to_value(&table).unwrap();
        assert_eq!(written, serde_json::from_str::<serde_json::Value>(json).unwrap());
        assert_eq!(serde_json::to_string(&ShootingStateTable::new()).unwrap(), "{}");
    }
}
