use crate::feed::types::Action;

pub const REGULATION_PERIODS: u8 = 4;
pub const REGULATION_PERIOD_SECS: u32 = 12 * 60;
pub const OVERTIME_PERIOD_SECS: u32 = 5 * 60;

/// Canonical event order: `(orderNumber, actionNumber)`, missing keys as 0.
/// The sort is stable, so exact ties keep their feed order.
pub fn sort_actions(actions: &[Action]) -> Vec<Action> {
    let mut sorted = actions.to_vec();
    sorted.sort_by_key(Action::sequence_key);
    sorted
}

pub fn period_length_secs(period: u8) -> u32 {
    if period <= REGULATION_PERIODS {
        REGULATION_PERIOD_SECS
    } else {
        OVERTIME_PERIOD_SECS
    }
}

/// Seconds from tip-off to the start of `period`.
pub fn period_start_secs(period: u8) -> u32 {
    let completed = period.saturating_sub(1) as u32;
    let regulation = completed.min(REGULATION_PERIODS as u32);
    let overtime = completed.saturating_sub(REGULATION_PERIODS as u32);
    regulation * REGULATION_PERIOD_SECS + overtime * OVERTIME_PERIOD_SECS
}

/// Remaining time in a period from a clock like `"PT05M30.00S"`, rounded to
/// the nearest second. Also accepts a bare seconds form (`"PT42.5S"`).
pub fn parse_clock_seconds(clock: &str) -> Option<u32> {
    if clock.is_empty() {
        return None;
    }
    let body = clock.trim().trim_start_matches("PT").trim_end_matches('S');
    let (minutes, seconds) = match body.split_once('M') {
        Some((min_str, sec_str)) => (min_str.parse::<u32>().ok()?, sec_str.parse::<f64>().ok()?),
        None => (0, body.parse::<f64>().ok()?),
    };
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let total = minutes as f64 * 60.0 + seconds;
    Some(total.round() as u32)
}

/// Total elapsed game seconds at `(period, clock)`.
/// Regulation: 4 x 12 min. Overtime periods are 5 min each.
/// `None` when the period is missing or the clock cannot be read.
pub fn elapsed_seconds(period: Option<u8>, clock: &str) -> Option<u32> {
    let period = period.filter(|p| *p > 0)?;
    let remaining = parse_clock_seconds(clock)?;
    let into_period = period_length_secs(period).checked_sub(remaining)?;
    Some(period_start_secs(period) + into_period)
}

/// Tracks the last known game time so elapsed seconds only move forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameClock {
    elapsed: u32,
}

impl GameClock {
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Advance to the action's time; returns the seconds that passed.
    /// Unknown or backwards times accrue nothing.
    pub fn advance(&mut self, action: &Action) -> u32 {
        match elapsed_seconds(action.period, &action.clock) {
            Some(now) if now >= self.elapsed => {
                let delta = now - self.elapsed;
                self.elapsed = now;
                delta
            }
            Some(now) => {
                tracing::debug!(
                    period = ?action.period,
                    clock = %action.clock,
                    now,
                    last = self.elapsed,
                    "clock moved backwards, ignoring"
                );
                0
            }
            None => 0,
        }
    }
}
