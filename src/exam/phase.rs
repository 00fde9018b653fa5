use serde::{Deserialize, Serialize};
use std::cmp;
use tokio::time::Instant;

/// Per-question phase. `Thinking` is the long presence-gated window,
/// `Answering` the short window in which exactly one answer may land.
/// `Finished` is session-terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExamPhase {
    Thinking,
    Answering,
    Finished,
}

/// Countdown state for the current phase. Elapsed time is derived from a
/// monotonic anchor rather than accumulated per tick, so tick jitter never
/// drifts the countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseState {
    pub phase: ExamPhase,
    pub target_ms: u64,
    pub active_ms: u64,
    /// Time accumulated before the current anchor window; combines with
    /// `running_anchor` to compute the true active duration.
    #[serde(skip)]
    pub active_ms_baseline: u64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl PhaseState {
    pub fn new() -> Self {
        Self {
            phase: ExamPhase::Finished,
            target_ms: 0,
            active_ms: 0,
            active_ms_baseline: 0,
            running_anchor: None,
        }
    }

    pub fn remaining_ms(&self) -> i64 {
        match self.phase {
            ExamPhase::Finished => 0,
            ExamPhase::Thinking | ExamPhase::Answering => {
                let remaining = self.target_ms as i64 - self.current_active_ms() as i64;
                cmp::max(remaining, 0)
            }
        }
    }

    pub fn current_active_ms(&self) -> u64 {
        if let Some(anchor) = self.running_anchor {
            self.active_ms_baseline
                .saturating_add(anchor.elapsed().as_millis() as u64)
        } else {
            self.active_ms
        }
    }

    pub fn sync_active_from_anchor(&mut self) {
        if let Some(anchor) = self.running_anchor {
            self.active_ms = self
                .active_ms_baseline
                .saturating_add(anchor.elapsed().as_millis() as u64);
        }
    }

    /// Enter a phase with a fresh countdown anchored at `now`.
    pub fn begin_phase(&mut self, phase: ExamPhase, target_ms: u64, now: Instant) {
        *self = Self {
            phase,
            target_ms,
            active_ms: 0,
            active_ms_baseline: 0,
            running_anchor: Some(now),
        };
    }

    pub fn expired(&self) -> bool {
        self.phase != ExamPhase::Finished && self.remaining_ms() <= 0
    }

    pub fn finish(&mut self) {
        self.sync_active_from_anchor();
        self.phase = ExamPhase::Finished;
        self.running_anchor = None;
        self.active_ms_baseline = self.active_ms;
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new()
    }
}
