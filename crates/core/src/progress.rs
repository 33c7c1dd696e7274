//! Work day progress derived from a session and the current time.

use serde::Serialize;
use crate::session::DEFAULT_TARGET_HOURS;
use crate::Time;

/// Progress of a work day at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionProgress {
    /// Whole minutes since the day started (never negative)
    pub elapsed_minutes: i64,

    /// Whole hours of `elapsed_minutes`
    pub hours: i64,

    /// Minutes past the last whole hour
    pub minutes: i64,

    /// Share of the target reached, clamped to 100
    pub percentage: f64,

    /// Hours left until the target, never below zero
    pub remaining_hours: f64,

    /// Target the figures are measured against
    pub target_hours: f64,
}

impl Default for SessionProgress {
    fn default() -> Self {
        Self {
            elapsed_minutes: 0,
            hours: 0,
            minutes: 0,
            percentage: 0.0,
            remaining_hours: 0.0,
            target_hours: DEFAULT_TARGET_HOURS,
        }
    }
}

impl SessionProgress {
    /// Compute progress between `start` and `now` against `target_hours`.
    ///
    /// A `now` earlier than `start` (clock skew) counts as zero elapsed time.
    pub fn compute(start: Time, now: Time, target_hours: f64) -> Self {
        let elapsed_minutes = (now - start).num_minutes().max(0);
        let elapsed_hours = elapsed_minutes as f64 / 60.0;
        let percentage = (elapsed_hours / target_hours * 100.0).min(100.0);
        let remaining_hours = (target_hours - elapsed_hours).max(0.0);

        Self {
            elapsed_minutes,
            hours: elapsed_minutes / 60,
            minutes: elapsed_minutes % 60,
            percentage,
            remaining_hours,
            target_hours,
        }
    }

    /// Whether the target has been reached.
    pub fn is_target_reached(&self) -> bool {
        self.percentage >= 100.0
    }
}

impl std::fmt::Display for SessionProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}h {}m / {}h ({:.1}% complete, {:.1}h remaining)",
            self.hours, self.minutes, self.target_hours, self.percentage, self.remaining_hours
        )
    }
}
