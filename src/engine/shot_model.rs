//! Expected make probability for a single three-point attempt.
//!
//! Combines a Bayesian estimate of the shooter's skill with the difficulty
//! of the shot taken:
//!
//!   `p_hat = (M_r + kappa * mu) / (A_r + kappa)`
//!   `expected = clamp(p_hat * difficulty(area, shot_type), min, max)`
//!
//!   - `mu`, `kappa` slide linearly from rookie to veteran values with
//!     `A_r`, saturating at `scale_attempts`; `mu` is then skewed by the
//!     shooter's assisted/unassisted mix.
//!   - the clamp keeps estimates inside observed league shooting ranges.

use crate::config::{PriorConfig, ShotConfig};
use crate::engine::shooting_state::ShootingStateTable;
use crate::feed::types::{Action, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// League-average 3P% the difficulty table is expressed against.
pub const LEAGUE_AVG_3P: f64 = 0.365;
pub const DEFAULT_DIFFICULTY_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotArea {
    Corner,
    AboveBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    CatchShoot,
    Pullup,
    Stepback,
    Running,
    Fadeaway,
    Turnaround,
}

// ── Classification ───────────────────────────────────────────────────

pub struct ShotTypeRule {
    pub keywords: &'static [&'static str],
    pub tag: ShotType,
}

impl ShotTypeRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Checked in order; the first match wins.
pub const SHOT_TYPE_RULES: &[ShotTypeRule] = &[
    ShotTypeRule { keywords: &["step back", "stepback"], tag: ShotType::Stepback },
    ShotTypeRule { keywords: &["pullup", "pull-up", "pull up"], tag: ShotType::Pullup },
    ShotTypeRule { keywords: &["running", "driving"], tag: ShotType::Running },
    ShotTypeRule { keywords: &["fadeaway", "fade away"], tag: ShotType::Fadeaway },
    ShotTypeRule { keywords: &["turnaround", "turn around"], tag: ShotType::Turnaround },
];

/// Shot type from free text; anything unrecognized is a catch-and-shoot.
pub fn classify_shot_type(text: &str) -> ShotType {
    let text = text.to_lowercase();
    SHOT_TYPE_RULES
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.tag)
        .unwrap_or(ShotType::CatchShoot)
}

/// The descriptor takes precedence; the description is the fallback.
pub fn action_shot_type(action: &Action) -> ShotType {
    let text = action
        .descriptor
        .as_deref()
        .filter(|d| !d.is_empty())
        .or(action.description.as_deref())
        .unwrap_or("");
    classify_shot_type(text)
}

pub fn classify_area(x: Option<f64>, y: Option<f64>, config: &ShotConfig) -> ShotArea {
    match (x, y) {
        (Some(x), Some(y)) if x.abs() >= config.corner_min_abs_x && y <= config.corner_max_y => {
            ShotArea::Corner
        }
        _ => ShotArea::AboveBreak,
    }
}

// ── Difficulty ───────────────────────────────────────────────────────

/// League 3P% by location and shot type.
const LEAGUE_MAKE_RATES: &[((ShotArea, ShotType), f64)] = &[
    ((ShotArea::Corner, ShotType::CatchShoot), 0.41),
    ((ShotArea::Corner, ShotType::Pullup), 0.37),
    ((ShotArea::Corner, ShotType::Stepback), 0.36),
    ((ShotArea::Corner, ShotType::Running), 0.34),
    ((ShotArea::Corner, ShotType::Fadeaway), 0.33),
    ((ShotArea::Corner, ShotType::Turnaround), 0.33),
    ((ShotArea::AboveBreak, ShotType::CatchShoot), 0.38),
    ((ShotArea::AboveBreak, ShotType::Pullup), 0.34),
    ((ShotArea::AboveBreak, ShotType::Stepback), 0.33),
    ((ShotArea::AboveBreak, ShotType::Running), 0.32),
    ((ShotArea::AboveBreak, ShotType::Fadeaway), 0.31),
    ((ShotArea::AboveBreak, ShotType::Turnaround), 0.31),
];

pub fn difficulty_multiplier(area: ShotArea, shot_type: ShotType) -> f64 {
    LEAGUE_MAKE_RATES
        .iter()
        .find(|(key, _)| *key == (area, shot_type))
        .map(|(_, rate)| rate / LEAGUE_AVG_3P)
        .unwrap_or(DEFAULT_DIFFICULTY_MULTIPLIER)
}

// ── Shot mix ─────────────────────────────────────────────────────────

/// Share of a player's 3PA that were assisted, in percent (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotMix {
    #[serde(default = "half")]
    pub pct_assisted: f64,
    #[serde(default = "half")]
    pub pct_unassisted: f64,
}

fn half() -> f64 {
    50.0
}

#[derive(Debug, Clone, Deserialize)]
struct ShotMixRecord {
    player_id: PlayerId,
    #[serde(flatten)]
    mix: ShotMix,
}

/// Static per-player skew of the prior mean. Unassisted (pull-up) volume
/// depresses career %, so it raises the prior; assisted volume lowers it.
#[derive(Debug, Clone, Default)]
pub struct ShotMixTable {
    by_player: HashMap<PlayerId, ShotMix>,
}

impl ShotMixTable {
    pub fn new(by_player: HashMap<PlayerId, ShotMix>) -> Self {
        Self { by_player }
    }

    /// Parse a JSON list of `{player_id, pct_assisted, pct_unassisted}`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let records: Vec<ShotMixRecord> = serde_json::from_str(json)?;
        Ok(Self {
            by_player: records.into_iter().map(|r| (r.player_id, r.mix)).collect(),
        })
    }

    pub fn multiplier(&self, player_id: PlayerId, prior: &PriorConfig) -> f64 {
        match self.by_player.get(&player_id) {
            Some(mix) => {
                mix.pct_assisted / 100.0 * prior.assisted_multiplier
                    + mix.pct_unassisted / 100.0 * prior.unassisted_multiplier
            }
            None => 1.0,
        }
    }
}

// ── Model ────────────────────────────────────────────────────────────

/// Every intermediate value behind one expected probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShotExpectation {
    #[serde(rename = "A_r")]
    pub attempts_weighted: f64,
    #[serde(rename = "M_r")]
    pub made_weighted: f64,
    pub mu: f64,
    pub kappa: f64,
    pub p_hat: f64,
    pub multiplier: f64,
    pub expected: f64,
}

pub struct ExpectedShotModel<'a> {
    prior: &'a PriorConfig,
    shot: &'a ShotConfig,
    states: &'a ShootingStateTable,
    shot_mix: &'a ShotMixTable,
}

impl<'a> ExpectedShotModel<'a> {
    pub fn new(
        prior: &'a PriorConfig,
        shot: &'a ShotConfig,
        states: &'a ShootingStateTable,
        shot_mix: &'a ShotMixTable,
    ) -> Self {
        Self { prior, shot, states, shot_mix }
    }

    pub fn shot_config(&self) -> &ShotConfig {
        self.shot
    }

    /// `(mu, kappa)` for a player with `attempts_weighted` recent attempts.
    pub fn sliding_prior(&self, player_id: PlayerId, attempts_weighted: f64) -> (f64, f64) {
        let p = self.prior;
        let scale = if p.scale_attempts > 0.0 {
            (attempts_weighted / p.scale_attempts).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mu = p.mu_min + (p.mu_max - p.mu_min) * scale;
        let kappa = p.kappa_min + (p.kappa_max - p.kappa_min) * scale;
        (mu * self.shot_mix.multiplier(player_id, p), kappa)
    }

    pub fn breakdown(&self, player_id: PlayerId, area: ShotArea, shot_type: ShotType) -> ShotExpectation {
        let (a_r, m_r) = self.states.weighted(player_id);
        let (mu, kappa) = self.sliding_prior(player_id, a_r);
        let denom = a_r + kappa;
        let p_hat = if denom > 0.0 { (m_r + kappa * mu) / denom } else { mu };
        let multiplier = difficulty_multiplier(area, shot_type);
        // Unlike clamp, never panics on unchecked bounds.
        let expected = (p_hat * multiplier).max(self.shot.min_probability).min(self.shot.max_probability);
        ShotExpectation {
            attempts_weighted: a_r,
            made_weighted: m_r,
            mu,
            kappa,
            p_hat,
            multiplier,
            expected,
        }
    }

    pub fn expected_make_probability(&self, player_id: PlayerId, area: ShotArea, shot_type: ShotType) -> f64 {
        self.breakdown(player_id, area, shot_type).expected
    }
}
