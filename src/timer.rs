//! Run timer and completion score
//!
//! Timestamps are milliseconds on the caller's clock (`Date.now()` in the
//! browser). The store only records stamps; everything derived lives here.

use crate::consts::{SCORE_BUDGET, SCORE_PENALTY_PER_SEC};
use crate::sim::{GamePhase, GameState};

/// Display refresh cadence while playing
pub const TIMER_TICK_MS: f64 = 1000.0;

/// Score for finishing after `elapsed_ms`: the budget minus a fixed penalty
/// per whole elapsed second, floored at 0
pub fn score_for_elapsed(elapsed_ms: f64) -> u32 {
    let whole_secs = (elapsed_ms.max(0.0) / 1000.0).floor();
    let penalty = whole_secs * SCORE_PENALTY_PER_SEC as f64;
    (SCORE_BUDGET as f64 - penalty).max(0.0) as u32
}

/// Time since the run started, frozen at completion. 0 before a start.
pub fn elapsed_ms(state: &GameState, now: f64) -> f64 {
    match state.start_time() {
        Some(start) => (state.end_time().unwrap_or(now) - start).max(0.0),
        None => 0.0,
    }
}

/// Format milliseconds as zero-padded `MM:SS`
pub fn format_time(ms: f64) -> String {
    let total_secs = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// HUD stopwatch
///
/// Refreshes on a one-second cadence while playing and freezes on the final
/// time once the pitcher is full.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    elapsed_ms: f64,
    last_tick: Option<f64>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the display given the current state and clock
    pub fn update(&mut self, state: &GameState, now: f64) {
        let Some(start) = state.start_time() else {
            self.elapsed_ms = 0.0;
            self.last_tick = None;
            return;
        };

        match (state.phase(), state.end_time()) {
            (GamePhase::Success, Some(end)) => {
                self.elapsed_ms = (end - start).max(0.0);
                self.last_tick = None;
            }
            (GamePhase::Playing, None) => match self.last_tick {
                None => self.last_tick = Some(now),
                Some(last) if now - last >= TIMER_TICK_MS => {
                    self.elapsed_ms = (now - start).max(0.0);
                    self.last_tick = Some(now);
                }
                Some(_) => {}
            },
            _ => {}
        }
    }

    /// Last displayed elapsed time
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn formatted(&self) -> String {
        format_time(self.elapsed_ms)
    }
}
