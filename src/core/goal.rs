//! Daily intake goal.

use crate::errors::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Goal used when none is configured or the stored one is unusable.
pub const DEFAULT_GOAL_ML: u32 = 2000;

/// A strictly positive number of milliliters per day.
///
/// A `Goal` can never be zero, so percentages derived from it never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Goal(u32);

impl Goal {
    /// Validates a user-supplied goal, rounding to whole milliliters.
    pub fn new(ml: f64) -> Result<Self> {
        if !ml.is_finite() || ml.round() < 1.0 || ml.round() > f64::from(u32::MAX) {
            return Err(Error::InvalidGoal { value: ml });
        }
        // Cast safety: checked above that the rounded value lies in [1, u32::MAX].
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = ml.round() as u32;
        Ok(Self(rounded))
    }

    /// A goal from an integer amount; zero is rejected.
    pub fn from_ml(ml: u32) -> Result<Self> {
        if ml == 0 {
            return Err(Error::InvalidGoal { value: 0.0 });
        }
        Ok(Self(ml))
    }

    /// Reads a persisted goal, accepting numbers and numeric strings.
    ///
    /// Anything unusable yields `fallback`.
    #[must_use]
    pub fn from_value(value: Option<&Value>, fallback: Self) -> Self {
        let parsed = match value {
            None | Some(Value::Null) => return fallback,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed.map(Self::new) {
            Some(Ok(goal)) => goal,
            _ => {
                warn!(?value, fallback = fallback.0, "Ignoring invalid stored goal");
                fallback
            }
        }
    }

    /// Milliliters per day
    #[must_use]
    pub const fn ml(self) -> u32 {
        self.0
    }
}

impl Default for Goal {
    fn default() -> Self {
        Self(DEFAULT_GOAL_ML)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ml", self.0)
    }
}
