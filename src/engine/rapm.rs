//! Regularized adjusted plus-minus from a corpus of stints.
//!
//! Each stint becomes one observation (or two for the offensive split):
//! `+1` for the credited side's players, `-1` for their opponents, target
//! points per 100 possessions with possessions estimated as
//! `seconds / possession_seconds`. Rows are scaled by `sqrt(possessions)`
//! and a ridge regression with intercept is fit on the scaled data.

use crate::config::RapmConfig;
use crate::engine::game::PlayerGameRow;
use crate::engine::history::DateWindow;
use crate::engine::round_to;
use crate::engine::stint::Stint;
use crate::feed::types::{PlayerId, TeamId};
use anyhow::{bail, Result};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

const MIN_POSSESSIONS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// One row per stint, target is home minus away.
    Net,
    /// Two rows per stint, one per team on offense, target is points scored.
    Offense,
}

/// One observation before weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignRow {
    pub entries: Vec<(usize, f64)>,
    pub target: f64,
    pub weight: f64,
}

/// Sparse design matrix with its player column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    pub players: Vec<PlayerId>,
    pub rows: Vec<DesignRow>,
}

impl DesignMatrix {
    pub fn build(stints: &[&Stint], target: Target, use_adjusted: bool, possession_seconds: f64) -> Self {
        let players: Vec<PlayerId> = stints
            .iter()
            .flat_map(|s| s.home_players.iter().chain(s.away_players.iter()).copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<PlayerId, usize> = players.iter().enumerate().map(|(i, p)| (*p, i)).collect();
        let signed = |offense: &[PlayerId], defense: &[PlayerId]| -> Vec<(usize, f64)> {
            offense
                .iter()
                .filter_map(|p| index.get(p).map(|&i| (i, 1.0)))
                .chain(defense.iter().filter_map(|p| index.get(p).map(|&i| (i, -1.0))))
                .collect()
        };

        let mut rows = Vec::with_capacity(stints.len() * if target == Target::Offense { 2 } else { 1 });
        for stint in stints {
            let possessions = (stint.seconds as f64 / possession_seconds).max(MIN_POSSESSIONS);
            let weight = possessions.sqrt();
            let (home_pts, away_pts) = if use_adjusted {
                (stint.home_pts_adj, stint.away_pts_adj)
            } else {
                (stint.home_pts as f64, stint.away_pts as f64)
            };
            let per_100 = |pts: f64| pts / possessions * 100.0;
            match target {
                Target::Net => rows.push(DesignRow {
                    entries: signed(&stint.home_players, &stint.away_players),
                    target: per_100(home_pts - away_pts),
                    weight,
                }),
                Target::Offense => {
                    rows.push(DesignRow {
                        entries: signed(&stint.home_players, &stint.away_players),
                        target: per_100(home_pts),
                        weight,
                    });
                    rows.push(DesignRow {
                        entries: signed(&stint.away_players, &stint.home_players),
                        target: per_100(away_pts),
                        weight,
                    });
                }
            }
        }
        Self { players, rows }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RidgeFit {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Ridge regression with an unpenalized intercept on the weight-scaled rows.
/// Solves the centered normal equations `(XcᵀXc + αI)β = Xcᵀyc` by Cholesky.
pub fn fit_ridge(matrix: &DesignMatrix, alpha: f64) -> Result<RidgeFit> {
    let n = matrix.rows.len();
    let p = matrix.players.len();
    if n == 0 || p == 0 {
        bail!("ridge fit needs at least one row and one column (rows={n}, columns={p})");
    }

    let mut xtx = DMatrix::<f64>::zeros(p, p);
    let mut xty = DVector::<f64>::zeros(p);
    let mut x_sum = DVector::<f64>::zeros(p);
    let mut y_sum = 0.0;
    for row in &matrix.rows {
        let y = row.target * row.weight;
        y_sum += y;
        for &(i, vi) in &row.entries {
            let xi = vi * row.weight;
            x_sum[i] += xi;
            xty[i] += xi * y;
            for &(j, vj) in &row.entries {
                xtx[(i, j)] += xi * vj * row.weight;
            }
        }
    }

    let nf = n as f64;
    let x_mean = x_sum / nf;
    let y_mean = y_sum / nf;
    let mut system = xtx - (&x_mean * x_mean.transpose()) * nf;
    for i in 0..p {
        system[(i, i)] += alpha;
    }
    let rhs = xty - &x_mean * (y_mean * nf);

    let Some(cholesky) = system.cholesky() else {
        bail!("ridge system is not positive definite (alpha={alpha}, columns={p})");
    };
    let beta = cholesky.solve(&rhs);
    let intercept = y_mean - x_mean.dot(&beta);
    Ok(RidgeFit {
        coefficients: beta.iter().copied().collect(),
        intercept,
    })
}

/// Latest known name and team per player, from per-game on/off rows.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    latest: HashMap<PlayerId, (chrono::NaiveDate, String, TeamId)>,
}

impl PlayerDirectory {
    pub fn from_rows(rows: &[PlayerGameRow]) -> Self {
        let mut latest: HashMap<PlayerId, (chrono::NaiveDate, String, TeamId)> = HashMap::new();
        for row in rows {
            let newer = latest.get(&row.player_id).map_or(true, |(date, _, _)| row.date >= *date);
            if newer {
                latest.insert(row.player_id, (row.date, row.player_name.clone(), row.team_id));
            }
        }
        Self { latest }
    }

    pub fn name(&self, player_id: PlayerId) -> String {
        self.latest
            .get(&player_id)
            .map(|(_, name, _)| name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Player {player_id}"))
    }

    pub fn team(&self, player_id: PlayerId) -> TeamId {
        self.latest.get(&player_id).map_or(0, |(_, _, team)| *team)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RapmRow {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub minutes: f64,
    pub rapm: f64,
    pub orapm: f64,
    pub drapm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RapmReport {
    /// League-average net rating (per 100) implied by the fit.
    pub intercept: f64,
    pub offense_intercept: f64,
    pub stints_used: usize,
    pub rows: Vec<RapmRow>,
}

/// Fits net and offensive RAPM over the stints inside `window`, then reports
/// every player with at least `min_minutes`, best first.
pub fn compute_rapm(
    stints: &[Stint],
    directory: &PlayerDirectory,
    config: &RapmConfig,
    window: &DateWindow,
) -> Result<RapmReport> {
    let used: Vec<&Stint> = stints
        .iter()
        .filter(|s| s.seconds >= config.min_stint_seconds && window.contains(s.date))
        .collect();
    if used.is_empty() {
        bail!("no stints left after filtering (min_stint_seconds={})", config.min_stint_seconds);
    }
    tracing::info!(stints = used.len(), alpha = config.alpha, use_adjusted = config.use_adjusted, "fitting RAPM");

    let net = DesignMatrix::build(&used, Target::Net, config.use_adjusted, config.possession_seconds);
    let net_fit = fit_ridge(&net, config.alpha)?;
    let offense = DesignMatrix::build(&used, Target::Offense, config.use_adjusted, config.possession_seconds);
    let offense_fit = fit_ridge(&offense, config.alpha)?;

    let mut minutes: HashMap<PlayerId, f64> = HashMap::new();
    for stint in &used {
        for pid in stint.home_players.iter().chain(stint.away_players.iter()) {
            *minutes.entry(*pid).or_default() += stint.seconds as f64 / 60.0;
        }
    }

    let mut rows: Vec<RapmRow> = net
        .players
        .iter()
        .enumerate()
        .filter_map(|(i, &player_id)| {
            let played = minutes.get(&player_id).copied().unwrap_or(0.0);
            if played < config.min_minutes {
                return None;
            }
            let rapm = net_fit.coefficients[i];
            let orapm = offense_fit.coefficients[i];
            Some(RapmRow {
                player_id,
                player_name: directory.name(player_id),
                team_id: directory.team(player_id),
                minutes: round_to(played, 1),
                rapm: round_to(rapm, 2),
                orapm: round_to(orapm, 2),
                drapm: round_to(rapm - orapm, 2),
            })
        })
        .collect();
    rows.sort_by(|a, b| b.rapm.total_cmp(&a.rapm).then(a.player_id.cmp(&b.player_id)));

    tracing::info!(
        players = rows.len(),
        intercept = %format!("{:.2}", net_fit.intercept),
        "RAPM fitted"
    );

    Ok(RapmReport {
        intercept: net_fit.intercept,
        offense_intercept: offense_fit.intercept,
        stints_used: used.len(),
        rows,
    })
}
