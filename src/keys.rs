use std::collections::BTreeSet;

use tokio::time::{Duration, Instant};

/// Signals produced when the monitor is polled. The caller (the exam
/// controller) turns these into events, chimes, and forced skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySignal {
    /// All required keys held for the first time this question
    Satisfied,
    /// A required key was released with no grace timer pending
    GraceArmed,
    /// Keys restored before the grace deadline
    GraceRestored,
    /// The grace deadline passed without restoration
    GraceExpired,
}

/// Tracks the currently-held subset of the two required key sets.
///
/// Membership is restricted to the union of required keys; anything else on
/// the keyboard is ignored. At most one grace deadline is pending at a time,
/// and only during a thinking phase.
#[derive(Debug)]
pub struct KeyMonitor {
    left_required: BTreeSet<String>,
    right_required: BTreeSet<String>,
    held: BTreeSet<String>,
    grace_period: Duration,
    grace_deadline: Option<Instant>,
    satisfied_this_question: bool,
}

impl KeyMonitor {
    pub fn new(left: &[String], right: &[String], grace_period_ms: u64) -> Self {
        Self {
            left_required: left.iter().map(|k| k.to_lowercase()).collect(),
            right_required: right.iter().map(|k| k.to_lowercase()).collect(),
            held: BTreeSet::new(),
            grace_period: Duration::from_millis(grace_period_ms),
            grace_deadline: None,
            satisfied_this_question: false,
        }
    }

    fn is_required(&self, key: &str) -> bool {
        self.left_required.contains(key) || self.right_required.contains(key)
    }

    /// Register a key press. Extraneous keys are ignored. Returns true when
    /// the held set changed.
    pub fn key_down(&mut self, key: &str) -> bool {
        let key = key.to_lowercase();
        if !self.is_required(&key) {
            return false;
        }
        self.held.insert(key)
    }

    /// Register a key release. Returns true when the held set changed.
    pub fn key_up(&mut self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.held.remove(&key)
    }

    pub fn all_required_held(&self) -> bool {
        self.left_required.iter().all(|k| self.held.contains(k))
            && self.right_required.iter().all(|k| self.held.contains(k))
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn grace_pending(&self) -> bool {
        self.grace_deadline.is_some()
    }

    pub fn grace_period_ms(&self) -> u64 {
        self.grace_period.as_millis() as u64
    }

    /// Reset per-question state. Held keys are dropped on advance; the
    /// keyboard's auto-repeat re-registers anything still physically down.
    pub fn clear_for_next_question(&mut self) {
        self.held.clear();
        self.grace_deadline = None;
        self.satisfied_this_question = false;
    }

    /// Evaluate the grace timer against the current held set. Called on every
    /// clock tick and after every key event. `in_thinking` is false during
    /// answering windows, when key presence is not enforced.
    pub fn poll(&mut self, now: Instant, in_thinking: bool) -> Vec<KeySignal> {
        let mut signals = Vec::new();

        if !in_thinking {
            self.grace_deadline = None;
            return signals;
        }

        if self.all_required_held() {
            if self.grace_deadline.take().is_some() {
                signals.push(KeySignal::GraceRestored);
            }
            if !self.satisfied_this_question {
                self.satisfied_this_question = true;
                signals.push(KeySignal::Satisfied);
            }
        } else {
            match self.grace_deadline {
                None => {
                    self.grace_deadline = Some(now + self.grace_period);
                    signals.push(KeySignal::GraceArmed);
                }
                Some(deadline) if now >= deadline => {
                    self.grace_deadline = None;
                    signals.push(KeySignal::GraceExpired);
                }
                Some(_) => {}
            }
        }

        signals
    }
}
