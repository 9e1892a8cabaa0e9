use crate::config::AdjustConfig;
use crate::engine::attribution::{Ledger, OnOffLedger, PlayerOnOff, ScoreTally};
use crate::engine::clock::{sort_actions, GameClock};
use crate::engine::lineup::{LineupTracker, SubstitutionBatch};
use crate::engine::round_to;
use crate::engine::shooting_state::GameShootingLine;
use crate::engine::shot_model::{action_shot_type, classify_area, ExpectedShotModel, ShotArea, ShotType};
use crate::engine::stint::{Boundary, Stint, StintSegmenter};
use crate::feed::types::{Action, ActionKind, GameInput, PlayerId, TeamId};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One three-point attempt with the full expectation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotRecord {
    pub period: Option<u8>,
    pub clock: String,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub area: ShotArea,
    pub shot_type: ShotType,
    #[serde(rename = "A_r")]
    pub attempts_weighted: f64,
    #[serde(rename = "M_r")]
    pub made_weighted: f64,
    pub mu: f64,
    pub kappa: f64,
    pub p_hat: f64,
    pub multiplier: f64,
    pub expected: f64,
    pub made: bool,
    pub adj_delta: f64,
}

/// A shooter's 3PT luck for one game. Positive `luck_pts` means the
/// player made more than expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLuckLine {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub fg3a: u32,
    pub fg3m: u32,
    pub exp_3pm: f64,
    pub luck_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGameSummary {
    pub team_id: TeamId,
    pub is_home: bool,
    pub points: i32,
    pub adj_points: f64,
    pub fg3a: u32,
    pub fg3m: u32,
    pub exp_3pm: f64,
    pub margin: i32,
    pub adj_margin: f64,
}

/// Per-player per-game on/off output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGameRow {
    pub date: NaiveDate,
    pub game_id: String,
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub on_pts_for: f64,
    pub on_pts_against: f64,
    pub on_diff: f64,
    pub off_pts_for: f64,
    pub off_pts_against: f64,
    pub off_diff: f64,
    pub on_pts_for_adj: f64,
    pub on_pts_against_adj: f64,
    pub on_diff_adj: f64,
    pub off_pts_for_adj: f64,
    pub off_pts_against_adj: f64,
    pub off_diff_adj: f64,
    pub on_off_diff: f64,
    pub on_off_diff_adj: f64,
    pub on_diff_reconstructed: f64,
    pub off_diff_reconstructed: f64,
    pub on_off_diff_reconstructed: f64,
    pub minutes_on: f64,
}

#[derive(Debug, Clone)]
pub struct GameReport {
    pub game_id: String,
    pub date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub rows: Vec<PlayerGameRow>,
    pub stints: Vec<Stint>,
    pub shots: Vec<ShotRecord>,
    pub luck: Vec<PlayerLuckLine>,
    pub teams: Vec<TeamGameSummary>,
    pub dropped_stints: u32,
}

impl GameReport {
    /// The shooter whose makes strayed furthest from expectation.
    pub fn biggest_swing(&self) -> Option<&PlayerLuckLine> {
        self.luck
            .iter()
            .max_by(|a, b| a.luck_pts.abs().total_cmp(&b.luck_pts.abs()))
    }

    /// 3PT attempts and makes per shooter, for the post-game state update.
    pub fn shooting_lines(&self) -> Vec<GameShootingLine> {
        self.luck
            .iter()
            .map(|l| GameShootingLine {
                player_id: l.player_id,
                player_name: l.player_name.clone(),
                attempts: l.fg3a,
                makes: l.fg3m,
            })
            .collect()
    }

    pub fn team(&self, team_id: TeamId) -> Option<&TeamGameSummary> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }
}

fn round3(value: f64) -> f64 {
    round_to(value, 3)
}

fn boundary_at(clock: &GameClock, action: &Action, score: ScoreTally) -> Boundary {
    Boundary {
        elapsed: clock.elapsed(),
        period: action.period,
        clock: action.clock.clone(),
        score,
    }
}

/// Single pass over one game: lineups, time on court, raw and
/// luck-adjusted scoring, stints and the shot audit trail.
///
/// Fails only on structural defects (bad team ids or starters); noisy
/// events are skipped and logged.
pub fn process_game(game: &GameInput, model: &ExpectedShotModel<'_>, adjust: &AdjustConfig) -> Result<GameReport> {
    let home = game.home_team_id;
    let away = game.away_team_id;
    if home == away {
        bail!("game {} lists team {home} as both home and away", game.game_id);
    }
    let game_id = game.normalized_game_id();
    let actions = sort_actions(&game.actions);
    if actions.is_empty() {
        tracing::warn!(game_id = %game.game_id, "no play-by-play actions");
    }

    let mut lineups = LineupTracker::from_starters(home, away, &game.starters)?;
    let mut ledger = OnOffLedger::new(home, away);
    let mut names: HashMap<PlayerId, String> = HashMap::new();
    let mut official_plus_minus: HashMap<PlayerId, f64> = HashMap::new();
    for p in &game.players {
        names.insert(p.player_id, p.player_name.clone());
        if !p.played || game.opponent(p.team_id).is_none() {
            continue;
        }
        ledger.register(p.player_id, &p.player_name, p.team_id);
        if let Some(pm) = p.plus_minus {
            official_plus_minus.insert(p.player_id, pm);
        }
    }

    let adj_factor = adjust.adjustment_factor();
    let mut clock = GameClock::default();
    let mut tally = ScoreTally::default();
    let mut segmenter = StintSegmenter::new(&game_id, game.date, home, away);
    let mut shots: Vec<ShotRecord> = Vec::new();

    let mut i = 0;
    while i < actions.len() {
        let action = &actions[i];
        let dt = clock.advance(action);
        ledger.accrue_time(&lineups, dt);

        if action.is_substitution() {
            let (batch, next) = SubstitutionBatch::collect(&actions, i);
            match batch {
                Some(batch) if lineups.lineup(batch.team_id).is_none() => {
                    tracing::warn!(game_id = %game_id, team_id = batch.team_id, "substitution for a team not in this game, skipping");
                }
                Some(batch) if lineups.changes_lineup(&batch) => {
                    segmenter.boundary(&lineups, boundary_at(&clock, action, tally));
                    lineups.apply(&batch);
                }
                Some(_) => {}
                None => {
                    tracing::debug!(game_id = %game_id, order = action.order_number, "substitution without team, skipping");
                }
            }
            i = next;
            continue;
        }

        let (delta_home, delta_away) = tally.observe(action);
        for (team_id, delta) in [(home, delta_home), (away, delta_away)] {
            if delta != 0 {
                ledger.apply_points(&lineups, team_id, delta as f64, Ledger::Raw);
                ledger.apply_points(&lineups, team_id, delta as f64, Ledger::Adjusted);
            }
        }

        if let ActionKind::ThreePoint { made } = action.kind {
            match (action.team_id, action.person_id) {
                (Some(team_id), Some(player_id)) if team_id == home || team_id == away => {
                    let area = classify_area(action.x_legacy, action.y_legacy, model.shot_config());
                    let shot_type = action_shot_type(action);
                    let b = model.breakdown(player_id, area, shot_type);
                    let actual = if made { 1.0 } else { 0.0 };
                    let adj_delta = (b.expected - actual) * adj_factor;
                    ledger.apply_points(&lineups, team_id, adj_delta, Ledger::Adjusted);
                    tally.add_adjustment(team_id == home, adj_delta);
                    shots.push(ShotRecord {
                        period: action.period,
                        clock: action.clock.clone(),
                        player_id,
                        player_name: names.get(&player_id).cloned().unwrap_or_default(),
                        team_id,
                        area,
                        shot_type,
                        attempts_weighted: b.attempts_weighted,
                        made_weighted: b.made_weighted,
                        mu: b.mu,
                        kappa: b.kappa,
                        p_hat: b.p_hat,
                        multiplier: b.multiplier,
                        expected: b.expected,
                        made,
                        adj_delta,
                    });
                }
                _ => {
                    tracing::debug!(game_id = %game_id, order = action.order_number, "3pt attempt without shooter or team, skipping");
                }
            }
        }

        i += 1;
    }

    if let Some(last) = actions.last() {
        segmenter.boundary(&lineups, boundary_at(&clock, last, tally));
    }
    let dropped_stints = segmenter.dropped();
    let stints = segmenter.finish();

    let mut rows: Vec<PlayerGameRow> = ledger
        .into_players()
        .into_iter()
        .filter_map(|p| player_row(game, &game_id, &p, &tally, &official_plus_minus))
        .collect();
    rows.sort_by_key(|r| (r.team_id, r.player_id));

    let luck = luck_lines(&shots, adj_factor);
    let teams = vec![team_summary(home, true, &tally, &shots), team_summary(away, false, &tally, &shots)];

    tracing::debug!(
        game_id = %game_id,
        players = rows.len(),
        stints = stints.len(),
        shots = shots.len(),
        dropped_stints,
        "game processed"
    );

    Ok(GameReport {
        game_id,
        date: game.date,
        home_team_id: home,
        away_team_id: away,
        rows,
        stints,
        shots,
        luck,
        teams,
        dropped_stints,
    })
}

fn team_points(tally: &ScoreTally, is_home: bool) -> (f64, f64) {
    if is_home {
        (tally.home as f64, tally.adj_home)
    } else {
        (tally.away as f64, tally.adj_away)
    }
}

fn player_row(
    game: &GameInput,
    game_id: &str,
    p: &PlayerOnOff,
    tally: &ScoreTally,
    official_plus_minus: &HashMap<PlayerId, f64>,
) -> Option<PlayerGameRow> {
    game.opponent(p.team_id)?;
    let is_home = p.team_id == game.home_team_id;
    let (team_actual, team_adj) = team_points(tally, is_home);
    let (opp_actual, opp_adj) = team_points(tally, !is_home);

    let off_for = team_actual - p.on_pts_for;
    let off_against = opp_actual - p.on_pts_against;
    let off_for_adj = team_adj - p.on_pts_for_adj;
    let off_against_adj = opp_adj - p.on_pts_against_adj;

    let on_diff_reconstructed = p.on_pts_for - p.on_pts_against;
    let off_diff_reconstructed = off_for - off_against;
    let on_diff_adj = p.on_pts_for_adj - p.on_pts_against_adj;
    let off_diff_adj = off_for_adj - off_against_adj;

    // The boxscore plus-minus wins over the reconstruction; off_diff
    // follows from it so on + off always equals the final margin.
    let team_margin = team_actual - opp_actual;
    let on_diff = official_plus_minus
        .get(&p.player_id)
        .copied()
        .unwrap_or(on_diff_reconstructed);
    let off_diff = team_margin - on_diff;

    Some(PlayerGameRow {
        date: game.date,
        game_id: game_id.to_string(),
        team_id: p.team_id,
        player_id: p.player_id,
        player_name: p.player_name.clone(),
        on_pts_for: round3(p.on_pts_for),
        on_pts_against: round3(p.on_pts_against),
        on_diff: round3(on_diff),
        off_pts_for: round3(off_for),
        off_pts_against: round3(off_against),
        off_diff: round3(off_diff),
        on_pts_for_adj: round3(p.on_pts_for_adj),
        on_pts_against_adj: round3(p.on_pts_against_adj),
        on_diff_adj: round3(on_diff_adj),
        off_pts_for_adj: round3(off_for_adj),
        off_pts_against_adj: round3(off_against_adj),
        off_diff_adj: round3(off_diff_adj),
        on_off_diff: round3(on_diff - off_diff),
        on_off_diff_adj: round3(on_diff_adj - off_diff_adj),
        on_diff_reconstructed: round3(on_diff_reconstructed),
        off_diff_reconstructed: round3(off_diff_reconstructed),
        on_off_diff_reconstructed: round3(on_diff_reconstructed - off_diff_reconstructed),
        minutes_on: round_to(p.seconds_on as f64 / 60.0, 2),
    })
}

fn luck_lines(shots: &[ShotRecord], adj_factor: f64) -> Vec<PlayerLuckLine> {
    let mut by_player: BTreeMap<PlayerId, PlayerLuckLine> = BTreeMap::new();
    for shot in shots {
        let line = by_player.entry(shot.player_id).or_insert_with(|| PlayerLuckLine {
            player_id: shot.player_id,
            player_name: shot.player_name.clone(),
            team_id: shot.team_id,
            fg3a: 0,
            fg3m: 0,
            exp_3pm: 0.0,
            luck_pts: 0.0,
        });
        line.fg3a += 1;
        line.fg3m += u32::from(shot.made);
        line.exp_3pm += shot.expected;
    }
    let mut lines: Vec<PlayerLuckLine> = by_player
        .into_values()
        .map(|mut l| {
            l.luck_pts = (l.fg3m as f64 - l.exp_3pm) * adj_factor;
            l
        })
        .collect();
    lines.sort_by(|a, b| b.luck_pts.total_cmp(&a.luck_pts));
    lines
}

fn team_summary(team_id: TeamId, is_home: bool, tally: &ScoreTally, shots: &[ShotRecord]) -> TeamGameSummary {
    let (points, adj_points) = team_points(tally, is_home);
    let (opp_points, opp_adj) = team_points(tally, !is_home);
    let team_shots = shots.iter().filter(|s| s.team_id == team_id);
    let (fg3a, fg3m, exp_3pm) = team_shots.fold((0, 0, 0.0), |(a, m, e), s| {
        (a + 1, m + u32::from(s.made), e + s.expected)
    });
    TeamGameSummary {
        team_id,
        is_home,
        points: points as i32,
        adj_points,
        fg3a,
        fg3m,
        exp_3pm,
        margin: (points - opp_points) as i32,
        adj_margin: adj_points - opp_adj,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PriorConfig, ShotConfig};
    use crate::engine::shooting_state::{PlayerShootingState, ShootingStateTable};
    use crate::engine::shot_model::ShotMixTable;
    use crate::feed::types::{BoxscorePlayer, SubDirection};

    const HOME: TeamId = 10;
    const AWAY: TeamId = 20;

    struct Builder {
        actions: Vec<Action>,
        order: i64,
        home: i32,
        away: i32,
    }

    impl Builder {
        fn new() -> Self {
            Self { actions: Vec::new(), order: 0, home: 0, away: 0 }
        }

        fn push(&mut self, period: u8, clock: &str, kind: ActionKind) -> &mut Action {
            self.order += 1;
            let mut a = Action::new(self.order, period, clock, kind);
            a.score_home = Some(self.home);
            a.score_away = Some(self.away);
            self.actions.push(a);
            self.actions.last_mut().unwrap()
        }

        fn three(&mut self, period: u8, clock: &str, team: TeamId, pid: PlayerId, made: bool) {
            if made {
                if team == HOME {
                    self.home += 3;
                } else {
                    self.away += 3;
                }
            }
            let a = self.push(period, clock, ActionKind::ThreePoint { made });
            a.team_id = Some(team);
            a.person_id = Some(pid);
        }

        fn two(&mut self, period: u8, clock: &str, team: TeamId) {
            if team == HOME {
                self.home += 2;
            } else {
                self.away += 2;
            }
            let a = self.push(period, clock, ActionKind::Other("2pt".into()));
            a.team_id = Some(team);
        }

        fn sub(&mut self, period: u8, clock: &str, team: TeamId, pid: PlayerId, direction: SubDirection) {
            let a = self.push(period, clock, ActionKind::Substitution { direction: Some(direction) });
            a.team_id = Some(team);
            a.person_id = Some(pid);
            a.score_home = None;
            a.score_away = None;
        }

        fn end(&mut self, period: u8) {
            self.push(period, "PT00M00.00S", ActionKind::Other("period".into()));
        }
    }

    fn game(actions: Vec<Action>, players: Vec<BoxscorePlayer>) -> GameInput {
        GameInput {
            game_id: "0022300100".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            home_team_id: HOME,
            away_team_id: AWAY,
            starters: HashMap::from([(HOME, vec![1, 2, 3, 4, 5]), (AWAY, vec![11, 12, 13, 14, 15])]),
            players,
            actions,
        }
    }

    fn run(input: &GameInput, states: &ShootingStateTable) -> GameReport {
        let prior = PriorConfig::default();
        let shot = ShotConfig::default();
        let mix = ShotMixTable::default();
        let model = ExpectedShotModel::new(&prior, &shot, states, &mix);
        process_game(input, &model, &AdjustConfig::default()).unwrap()
    }

    fn row(report: &GameReport, pid: PlayerId) -> &PlayerGameRow {
        report.rows.iter().find(|r| r.player_id == pid).unwrap()
    }

    #[test]
    fn test_simple_game_rows_and_stints() {
        let mut b = Builder::new();
        b.push(1, "PT12M00.00S", ActionKind::Other("period".into()));
        b.two(1, "PT11M00.00S", HOME);
        b.sub(1, "PT10M00.00S", HOME, 1, SubDirection::Out);
        b.sub(1, "PT10M00.00S", HOME, 6, SubDirection::In);
        b.two(1, "PT09M00.00S", AWAY);
        b.two(1, "PT08M00.00S", HOME);
        b.end(1);

        let report = run(&game(b.actions, vec![]), &ShootingStateTable::new());
        assert_eq!(report.game_id, "22300100");
        assert_eq!(report.stints.len(), 2);
        assert_eq!(report.stints[0].seconds, 120);
        assert_eq!(report.stints[1].seconds, 600);
        assert_eq!(report.stints[0].net_points(), 2);
        assert_eq!(report.stints[1].net_points(), 0);
        assert_eq!(report.stints[1].home_players, [2, 3, 4, 5, 6]);

        let starter = row(&report, 1);
        assert_eq!(starter.on_pts_for, 2.0);
        assert_eq!(starter.off_pts_for, 2.0);
        assert_eq!(starter.off_pts_against, 2.0);
        assert_eq!(starter.minutes_on, 2.0);
        let sub_in = row(&report, 6);
        assert_eq!(sub_in.on_diff, 0.0);
        assert_eq!(sub_in.minutes_on, 10.0);
        for r in &report.rows {
            let margin = if r.team_id == HOME { 2.0 } else { -2.0 };
            assert_eq!(r.on_diff + r.off_diff, margin, "player {}", r.player_id);
        }
    }

    #[test]
    fn test_missed_three_credits_adjusted_ledger() {
        let mut b = Builder::new();
        b.push(4, "PT03M10.00S", ActionKind::Other("period".into()));
        b.three(4, "PT03M00.00S", HOME, 3, false);
        b.end(4);
        let states = ShootingStateTable::from_players([(
            3,
            PlayerShootingState { player_name: "Shooter".into(), attempts_weighted: 400.0, made_weighted: 140.0 },
        )]);
        let mut input = game(b.actions, vec![]);
        input.actions[1].x_legacy = Some(-235.0);
        input.actions[1].y_legacy = Some(20.0);
        let report = run(&input, &states);

        let shot = &report.shots[0];
        assert_eq!(shot.area, ShotArea::Corner);
        assert_eq!(shot.shot_type, ShotType::CatchShoot);
        assert!(shot.expected >= 0.15 && shot.expected <= 0.55);
        let factor = AdjustConfig::default().adjustment_factor();
        assert!((shot.adj_delta - shot.expected * factor).abs() < 1e-12);
        assert!(shot.adj_delta > 0.0);

        let teammate = row(&report, 1);
        assert!((teammate.on_pts_for_adj - round3(shot.adj_delta)).abs() < 1e-9);
        assert_eq!(teammate.on_pts_for, 0.0);
        let opponent = row(&report, 11);
        assert!((opponent.on_pts_against_adj - round3(shot.adj_delta)).abs() < 1e-9);

        let home = report.team(HOME).unwrap();
        assert_eq!((home.fg3a, home.fg3m), (1, 0));
        assert!((home.adj_points - shot.adj_delta).abs() < 1e-12);
        assert_eq!(report.luck[0].fg3a, 1);
        assert!(report.luck[0].luck_pts < 0.0);
        assert_eq!(report.biggest_swing().unwrap().player_id, 3);
    }

    #[test]
    fn test_three_without_shooter_keeps_raw_points_only() {
        let mut b = Builder::new();
        b.push(1, "PT12M00.00S", ActionKind::Other("period".into()));
        b.home += 3;
        let a = b.push(1, "PT11M00.00S", ActionKind::ThreePoint { made: true });
        a.team_id = Some(HOME);
        b.away += 3;
        let a = b.push(1, "PT10M00.00S", ActionKind::ThreePoint { made: true });
        a.person_id = Some(12);
        b.two(1, "PT09M00.00S", AWAY);
        b.end(1);
        let report = run(&game(b.actions, vec![]), &ShootingStateTable::new());

        assert!(report.shots.is_empty());
        assert!(report.luck.is_empty());
        let home = report.team(HOME).unwrap();
        assert_eq!((home.points, home.fg3a), (3, 0));
        assert_eq!(home.adj_points, 3.0);
        assert_eq!(home.margin, -2);
        assert_eq!(home.adj_margin, -2.0);

        let starter = row(&report, 1);
        assert_eq!((starter.on_pts_for, starter.on_pts_against), (3.0, 5.0));
        assert_eq!((starter.on_pts_for_adj, starter.on_pts_against_adj), (3.0, 5.0));
        let opponent = row(&report, 11);
        assert_eq!((opponent.on_pts_for, opponent.on_pts_against), (5.0, 3.0));
        assert_eq!(report.stints.len(), 1);
        assert_eq!(report.stints[0].seconds, 720);
    }

    #[test]
    fn test_made_three_raw_and_adjusted() {
        let mut b = Builder::new();
        b.push(1, "PT12M00.00S", ActionKind::Other("period".into()));
        b.three(1, "PT11M30.00S", AWAY, 12, true);
        b.end(1);
        let report = run(&game(b.actions, vec![]), &ShootingStateTable::new());

        let shot = &report.shots[0];
        assert!(shot.made);
        assert!(shot.adj_delta < 0.0);
        let shooter = row(&report, 12);
        assert_eq!(shooter.on_pts_for, 3.0);
        assert!((shooter.on_pts_for_adj - round3(3.0 + shot.adj_delta)).abs() < 1e-9);
        let away = report.team(AWAY).unwrap();
        assert_eq!(away.points, 3);
        assert_eq!(away.margin, 3);
        assert_eq!(report.shooting_lines()[0].makes, 1);
    }

    #[test]
    fn test_official_plus_minus_overrides() {
        let mut b = Builder::new();
        b.push(1, "PT12M00.00S", ActionKind::Other("period".into()));
        b.two(1, "PT11M00.00S", HOME);
        b.end(1);
        let players = vec![
            BoxscorePlayer { player_id: 1, player_name: "One".into(), team_id: HOME, played: true, starter: true, plus_minus: Some(5.0) },
            BoxscorePlayer { player_id: 30, player_name: "Dnp".into(), team_id: HOME, played: false, starter: false, plus_minus: None },
            BoxscorePlayer { player_id: 31, player_name: "Bench".into(), team_id: HOME, played: true, starter: false, plus_minus: None },
        ];
        let report = run(&game(b.actions, players), &ShootingStateTable::new());

        let one = row(&report, 1);
        assert_eq!(one.player_name, "One");
        assert_eq!(one.on_diff, 5.0);
        assert_eq!(one.off_diff, -3.0);
        assert_eq!(one.on_diff_reconstructed, 2.0);
        assert_eq!(one.off_diff_reconstructed, 0.0);
        assert!(report.rows.iter().all(|r| r.player_id != 30));
        let bench = row(&report, 31);
        assert_eq!(bench.minutes_on, 0.0);
        assert_eq!(bench.off_diff, 2.0);
    }

    #[test]
    fn test_structural_defects_are_errors() {
        let mut input = game(vec![], vec![]);
        input.away_team_id = HOME;
        let prior = PriorConfig::default();
        let shot = ShotConfig::default();
        let states = ShootingStateTable::new();
        let mix = ShotMixTable::default();
        let model = ExpectedShotModel::new(&prior, &shot, &states, &mix);
        assert!(process_game(&input, &model, &AdjustConfig::default()).is_err());

        let mut input = game(vec![], vec![]);
        input.starters.insert(99, vec![1]);
        assert!(process_game(&input, &model, &AdjustConfig::default()).is_err());
    }

    #[test]
    fn test_empty_game_produces_empty_stints() {
        let report = run(&game(vec![], vec![]), &ShootingStateTable::new());
        assert!(report.stints.is_empty());
        assert!(report.shots.is_empty());
    }
}
