use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub adjust: AdjustConfig,
    #[serde(default)]
    pub prior: PriorConfig,
    #[serde(default)]
    pub shot: ShotConfig,
    #[serde(default)]
    pub rapm: RapmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// League-level constants behind the luck adjustment.
#[derive(Debug, Deserialize, Clone)]
pub struct AdjustConfig {
    /// Offensive rebound rate on missed threes.
    pub orb_rate: f64,
    /// Points per possession after an offensive rebound.
    pub ppp: f64,
    /// Attempts after which a past 3PA carries half its weight.
    pub half_life_3pa: f64,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            orb_rate: 0.25,
            ppp: 1.1,
            half_life_3pa: 500.0,
        }
    }
}

impl AdjustConfig {
    /// Point value of one unit of make/miss surprise, net of the extra
    /// offensive-rebound chance a miss creates.
    pub fn adjustment_factor(&self) -> f64 {
        3.0 - self.orb_rate * self.ppp
    }
}

/// Sliding shooting prior, from rookie to veteran.
#[derive(Debug, Deserialize, Clone)]
pub struct PriorConfig {
    pub mu_min: f64,
    pub mu_max: f64,
    pub kappa_min: f64,
    pub kappa_max: f64,
    pub scale_attempts: f64,
    #[serde(default = "default_assisted_multiplier")]
    pub assisted_multiplier: f64,
    #[serde(default = "default_unassisted_multiplier")]
    pub unassisted_multiplier: f64,
}

fn default_assisted_multiplier() -> f64 { 0.95 }
fn default_unassisted_multiplier() -> f64 { 1.12 }

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            mu_min: 0.32,
            mu_max: 0.36,
            kappa_min: 200.0,
            kappa_max: 300.0,
            scale_attempts: 1000.0,
            assisted_multiplier: default_assisted_multiplier(),
            unassisted_multiplier: default_unassisted_multiplier(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShotConfig {
    pub min_probability: f64,
    pub max_probability: f64,
    /// Legacy-coordinate corner heuristic: `|x| >= corner_min_abs_x && y <= corner_max_y`.
    pub corner_min_abs_x: f64,
    pub corner_max_y: f64,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            min_probability: 0.15,
            max_probability: 0.55,
            corner_min_abs_x: 220.0,
            corner_max_y: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RapmConfig {
    pub alpha: f64,
    #[serde(default = "default_min_stint_seconds")]
    pub min_stint_seconds: u32,
    #[serde(default = "default_min_minutes")]
    pub min_minutes: f64,
    #[serde(default = "default_possession_seconds")]
    pub possession_seconds: f64,
    #[serde(default = "default_use_adjusted")]
    pub use_adjusted: bool,
}

fn default_min_stint_seconds() -> u32 { 10 }
fn default_min_minutes() -> f64 { 200.0 }
fn default_possession_seconds() -> f64 { 24.0 }
fn default_use_adjusted() -> bool { true }

impl Default for RapmConfig {
    fn default() -> Self {
        Self {
            alpha: 2500.0,
            min_stint_seconds: default_min_stint_seconds(),
            min_minutes: default_min_minutes(),
            possession_seconds: default_possession_seconds(),
            use_adjusted: default_use_adjusted(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_filter() -> String {
    "lineup_rapm=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let shot = &self.shot;
        for (name, p) in [("min_probability", shot.min_probability), ("max_probability", shot.max_probability)] {
            if !(0.0..=1.0).contains(&p) {
                bail!("[shot].{name} must be within [0, 1], got {p}");
            }
        }
        if shot.min_probability > shot.max_probability {
            bail!(
                "[shot].min_probability ({}) exceeds max_probability ({})",
                shot.min_probability,
                shot.max_probability
            );
        }
        for (name, v) in [
            ("[adjust].half_life_3pa", self.adjust.half_life_3pa),
            ("[rapm].possession_seconds", self.rapm.possession_seconds),
            ("[rapm].alpha", self.rapm.alpha),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                bail!("{name} must be positive, got {v}");
            }
        }
        Ok(())
    }
}
