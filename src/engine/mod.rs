pub mod attribution;
pub mod clock;
pub mod game;
pub mod history;
pub mod lineup;
pub mod rapm;
pub mod shooting_state;
pub mod shot_model;
pub mod stint;

pub use game::{process_game, GameReport, PlayerGameRow};
pub use rapm::{compute_rapm, RapmReport, RapmRow};
pub use shooting_state::ShootingStateTable;
pub use shot_model::{ExpectedShotModel, ShotMixTable};
pub use stint::Stint;

/// Rounds to `places` decimals for stable output files.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
