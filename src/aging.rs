//! Aging policy: how waiting time turns into effective priority.
//!
//! `effective = base -/+ floor(waiting_time / divisor)` depending on
//! [`AgingDirection`]. Ordering is effective priority descending, then
//! insertion order ascending, which is total for tasks with distinct
//! insertion orders.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::Task;

pub const DEFAULT_AGING_DIVISOR: u64 = 10;

/// Which way accumulated waiting time moves a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingDirection {
    /// Long waiters lose priority.
    #[default]
    Penalize,
    /// Long waiters gain priority (anti-starvation).
    Boost,
}

impl std::str::FromStr for AgingDirection {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "penalize" => Ok(AgingDirection::Penalize),
            "boost" => Ok(AgingDirection::Boost),
            other => Err(Error::InvalidConfig(format!(
                "invalid aging direction '{other}' (expected penalize|boost)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aging {
    divisor: u64,
    direction: AgingDirection,
}

impl Default for Aging {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_AGING_DIVISOR,
            direction: AgingDirection::Penalize,
        }
    }
}

impl Aging {
    pub fn new(divisor: u64, direction: AgingDirection) -> Result<Self> {
        if divisor == 0 {
            return Err(Error::InvalidConfig("aging.divisor must be >= 1".to_string()));
        }
        Ok(Self { divisor, direction })
    }

    pub fn divisor(&self) -> u64 {
        self.divisor
    }

    pub fn direction(&self) -> AgingDirection {
        self.direction
    }

    pub fn effective_priority(&self, task: &Task) -> i64 {
        let steps = i64::try_from(task.waiting_time() / self.divisor).unwrap_or(i64::MAX);
        match self.direction {
            AgingDirection::Penalize => task.base_priority().saturating_sub(steps),
            AgingDirection::Boost => task.base_priority().saturating_add(steps),
        }
    }

    /// `Greater` means `left` is served before `right`.
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        self.effective_priority(left)
            .cmp(&self.effective_priority(right))
            .then_with(|| right.insertion_order().cmp(&left.insertion_order()))
    }
}

/// Converts wall-clock time between explicit ticks into whole tick units.
///
/// Sampled only when the caller asks; the remainder below one unit is
/// carried into the next sample.
#[derive(Debug, Clone)]
pub struct ElapsedClock {
    unit: Duration,
    last_sample: DateTime<Utc>,
    carry: Duration,
}

impl ElapsedClock {
    pub fn new(unit_ms: u64, started_at: DateTime<Utc>) -> Result<Self> {
        if unit_ms == 0 {
            return Err(Error::InvalidConfig("aging.tick_unit_ms must be >= 1".to_string()));
        }
        let unit_ms = i64::try_from(unit_ms).map_err(|_| {
            Error::InvalidConfig(format!("aging.tick_unit_ms too large: {unit_ms}"))
        })?;
        Ok(Self {
            unit: Duration::milliseconds(unit_ms),
            last_sample: started_at,
            carry: Duration::zero(),
        })
    }

    pub fn last_sample(&self) -> DateTime<Utc> {
        self.last_sample
    }

    /// Sample `now` and return how many whole units elapsed since the last sample.
    pub fn advance(&mut self, now: DateTime<Utc>) -> u64 {
        // Clock going backwards counts as no time passing.
        let delta = if now > self.last_sample {
            now - self.last_sample
        } else {
            Duration::zero()
        };
        self.last_sample = self.last_sample.max(now);

        let total = delta + self.carry;
        let unit_ms = self.unit.num_milliseconds();
        let units = total.num_milliseconds() / unit_ms;
        self.carry = total - Duration::milliseconds(units * unit_ms);
        u64::try_from(units).unwrap_or(0)
    }
}
