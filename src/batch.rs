use crate::config::Config;
use crate::engine::game::{process_game, GameReport, PlayerGameRow};
use crate::engine::shooting_state::ShootingStateTable;
use crate::engine::shot_model::{ExpectedShotModel, ShotMixTable};
use crate::engine::stint::Stint;
use crate::feed::GameSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;

/// Result of processing one game. A failed game contributes nothing.
#[derive(Debug)]
pub struct GameOutcome {
    pub game_id: String,
    pub date: NaiveDate,
    pub result: Result<GameReport>,
}

#[derive(Debug)]
pub struct SeasonRun {
    pub outcomes: Vec<GameOutcome>,
    /// Dates whose game list could not be fetched.
    pub failed_dates: Vec<(NaiveDate, String)>,
    /// Shooting state after the last processed game.
    pub state: ShootingStateTable,
}

impl SeasonRun {
    pub fn reports(&self) -> impl Iterator<Item = &GameReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &GameOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn player_rows(&self) -> Vec<PlayerGameRow> {
        self.reports().flat_map(|r| r.rows.iter().cloned()).collect()
    }

    pub fn stints(&self) -> Vec<Stint> {
        self.reports().flat_map(|r| r.stints.iter().cloned()).collect()
    }
}

/// Processes every game on `dates`, oldest date first.
///
/// Games of one date run in parallel against the shooting state as it stood
/// at the start of that date; their decay updates are then applied one game
/// at a time, in the order the source listed them. A game that fails is
/// logged and recorded, never aborting the run.
pub fn run_season<S: GameSource + ?Sized>(
    source: &S,
    dates: &[NaiveDate],
    initial: ShootingStateTable,
    shot_mix: &ShotMixTable,
    config: &Config,
) -> SeasonRun {
    let mut dates = dates.to_vec();
    dates.sort();
    dates.dedup();

    let mut state = initial;
    let mut outcomes = Vec::new();
    let mut failed_dates = Vec::new();

    for date in dates {
        let game_ids = match source.game_ids_for_date(date) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(%date, error = %e, "failed to list games, skipping date");
                failed_dates.push((date, format!("{e:#}")));
                continue;
            }
        };
        tracing::info!(%date, games = game_ids.len(), "processing date");

        let model = ExpectedShotModel::new(&config.prior, &config.shot, &state, shot_mix);
        let day: Vec<GameOutcome> = game_ids
            .par_iter()
            .map(|game_id| GameOutcome {
                game_id: game_id.clone(),
                date,
                result: run_game(source, game_id, date, &model, config),
            })
            .collect();

        for outcome in &day {
            match &outcome.result {
                Ok(report) => {
                    let lines = report.shooting_lines();
                    state = state
                        .ensure_players(&lines)
                        .after_game(&lines, config.adjust.half_life_3pa);
                    tracing::info!(
                        game_id = %report.game_id,
                        players = report.rows.len(),
                        stints = report.stints.len(),
                        shots = report.shots.len(),
                        "game done"
                    );
                }
                Err(e) => {
                    tracing::warn!(game_id = %outcome.game_id, %date, error = %e, "game failed, skipping");
                }
            }
        }
        outcomes.extend(day);
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(games = outcomes.len(), failed, players_tracked = state.len(), "season run complete");

    SeasonRun {
        outcomes,
        failed_dates,
        state,
    }
}

fn run_game<S: GameSource + ?Sized>(
    source: &S,
    game_id: &str,
    date: NaiveDate,
    model: &ExpectedShotModel<'_>,
    config: &Config,
) -> Result<GameReport> {
    let game = source
        .load_game(game_id, date)
        .with_context(|| format!("loading game {game_id}"))?;
    process_game(&game, model, &config.adjust).with_context(|| format!("processing game {game_id}"))
}
