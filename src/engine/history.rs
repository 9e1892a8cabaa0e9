use crate::engine::game::PlayerGameRow;
use crate::engine::round_to;
use crate::feed::types::{PlayerId, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Inclusive date range; an open end matches everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// A player's on/off results aggregated over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerOnOffHistory {
    pub player_id: PlayerId,
    pub player_name: String,
    pub games: usize,
    pub minutes_on_total: f64,
    pub minutes_on_avg: f64,
    pub on_diff_total: f64,
    pub off_diff_total: f64,
    pub on_off_diff_total: f64,
    pub on_diff_avg: f64,
    pub off_diff_avg: f64,
    pub on_off_diff_avg: f64,
    pub on_diff_adj_total: f64,
    pub off_diff_adj_total: f64,
    pub on_off_diff_adj_total: f64,
    pub on_diff_adj_avg: f64,
    pub off_diff_adj_avg: f64,
    pub on_off_diff_adj_avg: f64,
    pub first_game_date: NaiveDate,
    pub last_game_date: NaiveDate,
    pub latest_team_id: TeamId,
}

#[derive(Default)]
struct Totals {
    name: String,
    games: BTreeSet<String>,
    rows: usize,
    minutes: f64,
    on: f64,
    off: f64,
    on_off: f64,
    on_adj: f64,
    off_adj: f64,
    on_off_adj: f64,
    first: Option<NaiveDate>,
    last: Option<(NaiveDate, String, TeamId)>,
}

/// Per-player aggregates over the game rows inside `window`, sorted by
/// adjusted on-off average then total minutes, both descending.
pub fn build_onoff_history(rows: &[PlayerGameRow], window: &DateWindow) -> Vec<PlayerOnOffHistory> {
    let mut by_player: BTreeMap<PlayerId, Totals> = BTreeMap::new();
    for row in rows.iter().filter(|r| window.contains(r.date)) {
        let t = by_player.entry(row.player_id).or_default();
        if t.name.is_empty() {
            t.name = row.player_name.clone();
        }
        t.games.insert(row.game_id.clone());
        t.rows += 1;
        t.minutes += row.minutes_on;
        t.on += row.on_diff;
        t.off += row.off_diff;
        t.on_off += row.on_off_diff;
        t.on_adj += row.on_diff_adj;
        t.off_adj += row.off_diff_adj;
        t.on_off_adj += row.on_off_diff_adj;
        t.first = Some(t.first.map_or(row.date, |d| d.min(row.date)));
        let later = t
            .last
            .as_ref()
            .map_or(true, |(date, game, _)| (row.date, &row.game_id) >= (*date, game));
        if later {
            t.last = Some((row.date, row.game_id.clone(), row.team_id));
        }
    }

    let mut out: Vec<PlayerOnOffHistory> = by_player
        .into_iter()
        .filter_map(|(player_id, t)| {
            let first_game_date = t.first?;
            let (last_game_date, _, latest_team_id) = t.last?;
            let n = t.rows as f64;
            Some(PlayerOnOffHistory {
                player_id,
                player_name: t.name,
                games: t.games.len(),
                minutes_on_total: round_to(t.minutes, 3),
                minutes_on_avg: round_to(t.minutes / n, 3),
                on_diff_total: round_to(t.on, 3),
                off_diff_total: round_to(t.off, 3),
                on_off_diff_total: round_to(t.on_off, 3),
                on_diff_avg: round_to(t.on / n, 3),
                off_diff_avg: round_to(t.off / n, 3),
                on_off_diff_avg: round_to(t.on_off / n, 3),
                on_diff_adj_total: round_to(t.on_adj, 3),
                off_diff_adj_total: round_to(t.off_adj, 3),
                on_off_diff_adj_total: round_to(t.on_off_adj, 3),
                on_diff_adj_avg: round_to(t.on_adj / n, 3),
                off_diff_adj_avg: round_to(t.off_adj / n, 3),
                on_off_diff_adj_avg: round_to(t.on_off_adj / n, 3),
                first_game_date,
                last_game_date,
                latest_team_id,
            })
        })
        .collect();
    out.sort_by(|a, b| {
        b.on_off_diff_adj_avg
            .total_cmp(&a.on_off_diff_adj_avg)
            .then(b.minutes_on_total.total_cmp(&a.minutes_on_total))
    });
    out
}

/// Actual vs luck-adjusted plus-minus for one player in one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBoxscoreRow {
    pub date: NaiveDate,
    pub game_id: String,
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub minutes_on: f64,
    pub plus_minus_actual: f64,
    pub plus_minus_adjusted: f64,
    pub plus_minus_delta: f64,
    pub on_off_actual: f64,
    pub on_off_adjusted: f64,
    pub on_off_delta: f64,
}

impl From<&PlayerGameRow> for DailyBoxscoreRow {
    fn from(row: &PlayerGameRow) -> Self {
        Self {
            date: row.date,
            game_id: row.game_id.clone(),
            team_id: row.team_id,
            player_id: row.player_id,
            player_name: row.player_name.clone(),
            minutes_on: round_to(row.minutes_on, 3),
            plus_minus_actual: round_to(row.on_diff, 3),
            plus_minus_adjusted: round_to(row.on_diff_adj, 3),
            plus_minus_delta: round_to(row.on_diff_adj - row.on_diff, 3),
            on_off_actual: round_to(row.on_off_diff, 3),
            on_off_adjusted: round_to(row.on_off_diff_adj, 3),
            on_off_delta: round_to(row.on_off_diff_adj - row.on_off_diff, 3),
        }
    }
}

/// Sorted by date, game, team, then player name.
pub fn build_daily_boxscore(rows: &[PlayerGameRow]) -> Vec<DailyBoxscoreRow> {
    let mut out: Vec<DailyBoxscoreRow> = rows.iter().map(DailyBoxscoreRow::from).collect();
    out.sort_by(|a, b| {
        (a.date, &a.game_id, a.team_id, &a.player_name).cmp(&(b.date, &b.game_id, b.team_id, &b.player_name))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn row(date: u32, game: &str, team: TeamId, player: PlayerId, minutes: f64, on: f64, on_adj: f64) -> PlayerGameRow {
        PlayerGameRow {
            date: day(date),
            game_id: game.into(),
            team_id: team,
            player_id: player,
            player_name: format!("P{player}"),
            on_pts_for: 0.0,
            on_pts_against: 0.0,
            on_diff: on,
            off_pts_for: 0.0,
            off_pts_against: 0.0,
            off_diff: -on,
            on_pts_for_adj: 0.0,
            on_pts_against_adj: 0.0,
            on_diff_adj: on_adj,
            off_pts_for_adj: 0.0,
            off_pts_against_adj: 0.0,
            off_diff_adj: -on_adj,
            on_off_diff: 2.0 * on,
            on_off_diff_adj: 2.0 * on_adj,
            on_diff_reconstructed: on,
            off_diff_reconstructed: -on,
            on_off_diff_reconstructed: 2.0 * on,
            minutes_on: minutes,
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let w = DateWindow::new(Some(day(5)), Some(day(10)));
        assert!(w.contains(day(5)));
        assert!(w.contains(day(10)));
        assert!(!w.contains(day(4)));
        assert!(!w.contains(day(11)));
        assert!(DateWindow::default().contains(day(1)));
    }

    #[test]
    fn test_history_aggregates_and_sorts() {
        let rows = vec![
            row(1, "100", 1, 7, 30.0, 4.0, 2.0),
            row(3, "101", 2, 7, 20.0, -2.0, 1.0),
            row(1, "100", 1, 8, 10.0, 6.0, 6.0),
            row(2, "102", 3, 9, 40.0, 1.0, 1.5),
        ];
        let hist = build_onoff_history(&rows, &DateWindow::default());
        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0].player_id, 8);

        let p7 = hist.iter().find(|h| h.player_id == 7).unwrap();
        assert_eq!(p7.games, 2);
        assert_eq!(p7.minutes_on_total, 50.0);
        assert_eq!(p7.minutes_on_avg, 25.0);
        assert_eq!(p7.on_diff_total, 2.0);
        assert_eq!(p7.on_diff_adj_avg, 1.5);
        assert_eq!(p7.on_off_diff_adj_avg, 3.0);
        assert_eq!(p7.first_game_date, day(1));
        assert_eq!(p7.last_game_date, day(3));
        assert_eq!(p7.latest_team_id, 2);
    }

    #[test]
    fn test_history_ties_break_on_minutes() {
        let rows = vec![row(1, "100", 1, 7, 10.0, 1.0, 1.0), row(1, "100", 1, 8, 30.0, 1.0, 1.0)];
        let hist = build_onoff_history(&rows, &DateWindow::default());
        assert_eq!(hist[0].player_id, 8);
    }

    #[test]
    fn test_history_respects_window() {
        let rows = vec![row(1, "100", 1, 7, 30.0, 4.0, 2.0), row(9, "105", 1, 7, 30.0, 0.0, 0.0)];
        let hist = build_onoff_history(&rows, &DateWindow::new(Some(day(5)), None));
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].games, 1);
        assert_eq!(hist[0].on_diff_total, 0.0);
        let early = build_onoff_history(&rows, &DateWindow::new(None, Some(day(1))));
        assert_eq!(early[0].on_diff_total, 4.0);
    }

    #[test]
    fn test_daily_boxscore_deltas() {
        let rows = vec![row(2, "200", 1, 9, 31.456, 5.0, 3.25), row(1, "100", 1, 8, 10.0, -1.0, 0.5)];
        let daily = build_daily_boxscore(&rows);
        assert_eq!(daily[0].player_id, 8);
        let p9 = &daily[1];
        assert_eq!(p9.plus_minus_actual, 5.0);
        assert_eq!(p9.plus_minus_adjusted, 3.25);
        assert_eq!(p9.plus_minus_delta, -1.75);
        assert_eq!(p9.on_off_delta, -3.5);
        assert_eq!(p9.minutes_on, 31.456);
    }
}
