use crate::engine::attribution::ScoreTally;
use crate::engine::lineup::{LineupTracker, LINEUP_SIZE};
use crate::feed::types::{PlayerId, TeamId};
use chrono::NaiveDate;
use serde::Serialize;

/// Game clock at the opening tip.
pub const TIP_OFF_CLOCK: &str = "PT12M00.00S";

/// Game position at a stint boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub elapsed: u32,
    pub period: Option<u8>,
    pub clock: String,
    pub score: ScoreTally,
}

/// An interval during which neither lineup changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Stint {
    pub game_id: String,
    pub date: NaiveDate,
    pub stint_index: u32,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_players: [PlayerId; LINEUP_SIZE],
    pub away_players: [PlayerId; LINEUP_SIZE],
    pub seconds: u32,
    pub home_pts: i32,
    pub away_pts: i32,
    pub home_pts_adj: f64,
    pub away_pts_adj: f64,
    pub start: Boundary,
    pub end: Boundary,
}

impl Stint {
    pub fn net_points(&self) -> i32 {
        self.home_pts - self.away_pts
    }

    pub fn net_points_adj(&self) -> f64 {
        self.home_pts_adj - self.away_pts_adj
    }

    pub fn to_row(&self) -> StintRow {
        let [home_p1, home_p2, home_p3, home_p4, home_p5] = self.home_players;
        let [away_p1, away_p2, away_p3, away_p4, away_p5] = self.away_players;
        StintRow {
            game_id: self.game_id.clone(),
            date: self.date,
            stint_index: self.stint_index,
            home_id: self.home_id,
            away_id: self.away_id,
            home_p1,
            home_p2,
            home_p3,
            home_p4,
            home_p5,
            away_p1,
            away_p2,
            away_p3,
            away_p4,
            away_p5,
            seconds: self.seconds,
            home_pts: self.home_pts,
            away_pts: self.away_pts,
            home_pts_adj: self.home_pts_adj,
            away_pts_adj: self.away_pts_adj,
            start_period: self.start.period,
            start_clock: self.start.clock.clone(),
            end_period: self.end.period,
            end_clock: self.end.clock.clone(),
            start_home_score: self.start.score.home,
            start_away_score: self.start.score.away,
            end_home_score: self.end.score.home,
            end_away_score: self.end.score.away,
        }
    }
}

/// Flat output row for one stint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintRow {
    pub game_id: String,
    pub date: NaiveDate,
    pub stint_index: u32,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_p1: PlayerId,
    pub home_p2: PlayerId,
    pub home_p3: PlayerId,
    pub home_p4: PlayerId,
    pub home_p5: PlayerId,
    pub away_p1: PlayerId,
    pub away_p2: PlayerId,
    pub away_p3: PlayerId,
    pub away_p4: PlayerId,
    pub away_p5: PlayerId,
    pub seconds: u32,
    pub home_pts: i32,
    pub away_pts: i32,
    pub home_pts_adj: f64,
    pub away_pts_adj: f64,
    pub start_period: Option<u8>,
    pub start_clock: String,
    pub end_period: Option<u8>,
    pub end_clock: String,
    pub start_home_score: i32,
    pub start_away_score: i32,
    pub end_home_score: i32,
    pub end_away_score: i32,
}

/// Cuts the game into stints at lineup changes. The caller marks a boundary
/// right before applying a lineup-changing substitution batch and once more
/// after the last action.
#[derive(Debug, Clone)]
pub struct StintSegmenter {
    game_id: String,
    date: NaiveDate,
    home_id: TeamId,
    away_id: TeamId,
    start: Boundary,
    stints: Vec<Stint>,
    dropped: u32,
}

impl StintSegmenter {
    pub fn new(game_id: &str, date: NaiveDate, home_id: TeamId, away_id: TeamId) -> Self {
        Self {
            game_id: game_id.to_string(),
            date,
            home_id,
            away_id,
            start: Boundary {
                elapsed: 0,
                period: Some(1),
                clock: TIP_OFF_CLOCK.to_string(),
                score: ScoreTally::default(),
            },
            stints: Vec::new(),
            dropped: 0,
        }
    }

    /// Closes the open interval at `end` and opens the next one there.
    /// The interval becomes a stint only if both sides had five players
    /// and time actually passed.
    pub fn boundary(&mut self, lineups: &LineupTracker, end: Boundary) {
        let seconds = end.elapsed.saturating_sub(self.start.elapsed);
        let home = lineups.sorted_five(self.home_id);
        let away = lineups.sorted_five(self.away_id);
        let start = std::mem::replace(&mut self.start, end.clone());

        let (Some(home_players), Some(away_players)) = (home, away) else {
            if seconds > 0 {
                self.dropped += 1;
                tracing::debug!(game_id = %self.game_id, seconds, "dropping stint without two full lineups");
            }
            return;
        };
        if seconds == 0 {
            return;
        }

        self.stints.push(Stint {
            game_id: self.game_id.clone(),
            date: self.date,
            stint_index: self.stints.len() as u32,
            home_id: self.home_id,
            away_id: self.away_id,
            home_players,
            away_players,
            seconds,
            home_pts: end.score.home - start.score.home,
            away_pts: end.score.away - start.score.away,
            home_pts_adj: end.score.adj_home - start.score.adj_home,
            away_pts_adj: end.score.adj_away - start.score.adj_away,
            start,
            end,
        });
    }

    /// Intervals with positive time that were discarded for short lineups.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn finish(self) -> Vec<Stint> {
        self.stints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const HOME: TeamId = 1;
    const AWAY: TeamId = 2;

    fn lineups(home: Vec<PlayerId>) -> LineupTracker {
        let starters = HashMap::from([(HOME, home), (AWAY, vec![11, 12, 13, 14, 15])]);
        LineupTracker::from_starters(HOME, AWAY, &starters).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(elapsed: u32, home: i32, away: i32, adj_home: f64, adj_away: f64) -> Boundary {
        Boundary {
            elapsed,
            period: Some(1),
            clock: String::new(),
            score: ScoreTally { home, away, adj_home, adj_away },
        }
    }

    #[test]
    fn test_boundary_records_deltas() {
        let full = lineups(vec![5, 4, 3, 2, 1]);
        let mut seg = StintSegmenter::new("22300001", day(), HOME, AWAY);
        seg.boundary(&full, at(120, 7, 4, 6.5, 4.0));
        seg.boundary(&full, at(300, 12, 12, 11.2, 12.0));
        let stints = seg.finish();

        assert_eq!(stints.len(), 2);
        assert_eq!(stints[0].home_players, [1, 2, 3, 4, 5]);
        assert_eq!(stints[0].seconds, 120);
        assert_eq!((stints[0].home_pts, stints[0].away_pts), (7, 4));
        assert_eq!(stints[1].stint_index, 1);
        assert_eq!(stints[1].seconds, 180);
        assert_eq!(stints[1].net_points(), -3);
        assert!((stints[1].home_pts_adj - 4.7).abs() < 1e-9);
        assert!((stints[1].net_points_adj() - (4.7 - 8.0)).abs() < 1e-9);
    }

    #[test]
    fn test_first_stint_starts_at_tip_off() {
        let full = lineups(vec![1, 2, 3, 4, 5]);
        let mut seg = StintSegmenter::new("22300001", day(), HOME, AWAY);
        seg.boundary(&full, at(90, 2, 0, 2.0, 0.0));
        let row = seg.finish()[0].to_row();
        assert_eq!(row.start_period, Some(1));
        assert_eq!(row.start_clock, "PT12M00.00S");
        assert_eq!((row.start_home_score, row.start_away_score), (0, 0));
    }

    #[test]
    fn test_zero_length_interval_is_not_a_stint() {
        let full = lineups(vec![1, 2, 3, 4, 5]);
        let mut seg = StintSegmenter::new("g", day(), HOME, AWAY);
        seg.boundary(&full, at(0, 0, 0, 0.0, 0.0));
        assert!(seg.finish().is_empty());
    }

    #[test]
    fn test_short_lineup_is_dropped_but_advances_start() {
        let short = lineups(vec![1, 2, 3, 4]);
        let full = lineups(vec![1, 2, 3, 4, 5]);
        let mut seg = StintSegmenter::new("g", day(), HOME, AWAY);
        seg.boundary(&short, at(60, 2, 0, 2.0, 0.0));
        seg.boundary(&full, at(100, 5, 0, 5.0, 0.0));
        assert_eq!(seg.dropped(), 1);
        let stints = seg.finish();
        assert_eq!(stints.len(), 1);
        assert_eq!(stints[0].seconds, 40);
        assert_eq!(stints[0].home_pts, 3);
        assert_eq!(stints[0].stint_index, 0);
    }

    #[test]
    fn test_row_flattens_players() {
        let full = lineups(vec![1, 2, 3, 4, 5]);
        let mut seg = StintSegmenter::new("g", day(), HOME, AWAY);
        seg.boundary(&full, at(30, 0, 3, 0.0, 2.1));
        let row = seg.finish()[0].to_row();
        assert_eq!(row.home_p5, 5);
        assert_eq!(row.away_p1, 11);
        assert_eq!(row.end_away_score, 3);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["away_p5"], 15);
        assert_eq!(json["seconds"], 30);
    }
}
