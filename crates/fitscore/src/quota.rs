//! Daily allowance for calls to the external scoring assistant.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

/// Kept below the assistant's real daily limit to leave headroom.
pub const DEFAULT_DAILY_LIMIT: u32 = 45;

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap_or_else(PoisonError::into_inner) = today;
    }

    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = today.checked_add_days(chrono::Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaState {
    pub count: u32,
    pub window_start: NaiveDate,
}

/// Process-wide counter of assisted calls made today. Constructed once and shared.
pub struct QuotaGate {
    limit: u32,
    clock: Arc<dyn Clock>,
    state: Mutex<QuotaState>,
}

impl QuotaGate {
    pub fn new(limit: u32) -> Self {
        Self::with_clock(limit, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        Self {
            limit,
            clock,
            state: Mutex::new(QuotaState {
                count: 0,
                window_start: today,
            }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn has_capacity(&self) -> bool {
        self.current().count < self.limit
    }

    /// Record one issued call.
    pub fn consume(&self) {
        let mut state = self.current();
        state.count = state.count.saturating_add(1);
    }

    /// Check and consume in one step; `false` leaves the counter untouched.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.current();
        if state.count >= self.limit {
            return false;
        }
        state.count += 1;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.current().count)
    }

    pub fn snapshot(&self) -> QuotaState {
        *self.current()
    }

    /// Lock the state, starting a fresh window first if the day changed.
    fn current(&self) -> MutexGuard<'_, QuotaState> {
        let today = self.clock.today();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.window_start != today {
            info!(
                previous_window = %state.window_start,
                used = state.count,
                "assist quota window rolled over"
            );
            *state = QuotaState {
                count: 0,
                window_start: today,
            };
        }
        state
    }
}
