use crate::engine::lineup::LineupTracker;
use crate::feed::types::{Action, PlayerId, TeamId};
use std::collections::{BTreeMap, HashMap};

/// Which points ledger a delta lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ledger {
    Raw,
    Adjusted,
}

/// One player's on-court totals for a single game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerOnOff {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub on_pts_for: f64,
    pub on_pts_against: f64,
    pub on_pts_for_adj: f64,
    pub on_pts_against_adj: f64,
    pub seconds_on: u32,
}

impl PlayerOnOff {
    fn credit(&mut self, ledger: Ledger, points: f64, is_for: bool) {
        match (ledger, is_for) {
            (Ledger::Raw, true) => self.on_pts_for += points,
            (Ledger::Raw, false) => self.on_pts_against += points,
            (Ledger::Adjusted, true) => self.on_pts_for_adj += points,
            (Ledger::Adjusted, false) => self.on_pts_against_adj += points,
        }
    }
}

/// Per-player accumulators for one game. Players are added up front from
/// the boxscore, or lazily the first time they are seen on court.
#[derive(Debug, Clone)]
pub struct OnOffLedger {
    home_team_id: TeamId,
    away_team_id: TeamId,
    names: HashMap<PlayerId, String>,
    players: BTreeMap<PlayerId, PlayerOnOff>,
}

impl OnOffLedger {
    pub fn new(home_team_id: TeamId, away_team_id: TeamId) -> Self {
        Self {
            home_team_id,
            away_team_id,
            names: HashMap::new(),
            players: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, player_id: PlayerId, player_name: &str, team_id: TeamId) {
        self.names.insert(player_id, player_name.to_string());
        self.ensure(player_id, team_id);
    }

    fn ensure(&mut self, player_id: PlayerId, team_id: TeamId) -> &mut PlayerOnOff {
        let names = &self.names;
        self.players.entry(player_id).or_insert_with(|| PlayerOnOff {
            player_id,
            player_name: names.get(&player_id).cloned().unwrap_or_default(),
            team_id,
            ..Default::default()
        })
    }

    fn opponent(&self, team_id: TeamId) -> Option<TeamId> {
        if team_id == self.home_team_id {
            Some(self.away_team_id)
        } else if team_id == self.away_team_id {
            Some(self.home_team_id)
        } else {
            None
        }
    }

    /// Credits `points` for `team_id`'s on-court players and against the
    /// opponent's. Zero deltas and unknown teams are no-ops.
    pub fn apply_points(&mut self, lineups: &LineupTracker, team_id: TeamId, points: f64, ledger: Ledger) {
        if points == 0.0 {
            return;
        }
        let Some(opp_id) = self.opponent(team_id) else { return };
        for (side, is_for) in [(team_id, true), (opp_id, false)] {
            let Some(lineup) = lineups.lineup(side) else { continue };
            for &pid in lineup {
                self.ensure(pid, side).credit(ledger, points, is_for);
            }
        }
    }

    /// Adds elapsed seconds to everyone on court.
    pub fn accrue_time(&mut self, lineups: &LineupTracker, seconds: u32) {
        if seconds == 0 {
            return;
        }
        for (team_id, pid) in lineups.on_court() {
            self.ensure(pid, team_id).seconds_on += seconds;
        }
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerOnOff> {
        self.players.get(&player_id)
    }

    pub fn into_players(self) -> Vec<PlayerOnOff> {
        self.players.into_values().collect()
    }
}

/// Running actual and adjusted score for both teams.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreTally {
    pub home: i32,
    pub away: i32,
    pub adj_home: f64,
    pub adj_away: f64,
}

impl ScoreTally {
    /// Reads the action's score snapshot. Returns `(delta_home, delta_away)`;
    /// a missing side keeps its previous value. The actual deltas also move
    /// the adjusted tally one-for-one.
    pub fn observe(&mut self, action: &Action) -> (i32, i32) {
        let home = action.score_home.unwrap_or(self.home);
        let away = action.score_away.unwrap_or(self.away);
        let delta = (home - self.home, away - self.away);
        self.home = home;
        self.away = away;
        self.adj_home += delta.0 as f64;
        self.adj_away += delta.1 as f64;
        delta
    }

    pub fn add_adjustment(&mut self, is_home: bool, points: f64) {
        if is_home {
            self.adj_home += points;
        } else {
            self.adj_away += points;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::ActionKind;

    const HOME: TeamId = 1610612744;
    const AWAY: TeamId = 1610612747;

    fn lineups() -> LineupTracker {
        let starters = HashMap::from([(HOME, vec![1, 2, 3, 4, 5]), (AWAY, vec![11, 12, 13, 14, 15])]);
        LineupTracker::from_starters(HOME, AWAY, &starters).unwrap()
    }

    #[test]
    fn test_points_credit_both_sides() {
        let lineups = lineups();
        let mut ledger = OnOffLedger::new(HOME, AWAY);
        ledger.apply_points(&lineups, HOME, 3.0, Ledger::Raw);
        ledger.apply_points(&lineups, AWAY, 2.0, Ledger::Raw);

        let home = ledger.get(1).unwrap();
        assert_eq!((home.on_pts_for, home.on_pts_against), (3.0, 2.0));
        assert_eq!(home.team_id, HOME);
        let away = ledger.get(15).unwrap();
        assert_eq!((away.on_pts_for, away.on_pts_against), (2.0, 3.0));
        assert_eq!(away.on_pts_for_adj, 0.0);
    }

    #[test]
    fn test_adjusted_ledger_is_separate() {
        let lineups = lineups();
        let mut ledger = OnOffLedger::new(HOME, AWAY);
        ledger.apply_points(&lineups, AWAY, -0.75, Ledger::Adjusted);
        let away = ledger.get(12).unwrap();
        assert_eq!(away.on_pts_for_adj, -0.75);
        assert_eq!(away.on_pts_for, 0.0);
        assert_eq!(ledger.get(3).unwrap().on_pts_against_adj, -0.75);
    }

    #[test]
    fn test_unknown_team_is_ignored() {
        let lineups = lineups();
        let mut ledger = OnOffLedger::new(HOME, AWAY);
        ledger.apply_points(&lineups, 42, 2.0, Ledger::Raw);
        assert!(ledger.into_players().is_empty());
    }

    #[test]
    fn test_register_keeps_name_for_lazy_entries() {
        let lineups = lineups();
        let mut ledger = OnOffLedger::new(HOME, AWAY);
        ledger.register(20, "Bench Guy", AWAY);
        ledger.accrue_time(&lineups, 30);
        assert_eq!(ledger.get(20).unwrap().seconds_on, 0);
        assert_eq!(ledger.get(11).unwrap().seconds_on, 30);
        assert_eq!(ledger.into_players().len(), 11);
    }

    #[test]
    fn test_score_tally_deltas() {
        let mut tally = ScoreTally::default();
        let mut made = Action::new(1, 1, "PT11M00.00S", ActionKind::ThreePoint { made: true });
        made.score_home = Some(3);
        made.score_away = Some(0);
        assert_eq!(tally.observe(&made), (3, 0));

        let no_score = Action::new(2, 1, "PT10M50.00S", ActionKind::Other("rebound".into()));
        assert_eq!(tally.observe(&no_score), (0, 0));

        let mut partial = Action::new(3, 1, "PT10M40.00S", ActionKind::Other("2pt".into()));
        partial.score_away = Some(2);
        assert_eq!(tally.observe(&partial), (0, 2));
        assert_eq!((tally.home, tally.away), (3, 2));

        tally.add_adjustment(true, -0.9);
        assert!((tally.adj_home - 2.1).abs() < 1e-12);
        assert_eq!(tally.adj_away, 2.0);
    }
}
