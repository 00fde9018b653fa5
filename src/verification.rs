use log::info;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

use crate::config::DetectionThresholds;
use crate::events::ExamEvent;
use crate::vision::ZonalSnapshot;

/// Presence-challenge progression. Transitions only ever move forward; losing
/// a gesture after its step was satisfied does not revert the machine (the
/// live confidence overlay is the only feedback at that point).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VerificationState {
    Waiting,
    Face,
    Hands,
    HandRaise,
    Complete,
}

impl VerificationState {
    fn next(self) -> Option<VerificationState> {
        match self {
            VerificationState::Waiting => Some(VerificationState::Face),
            VerificationState::Face => Some(VerificationState::Hands),
            VerificationState::Hands => Some(VerificationState::HandRaise),
            VerificationState::HandRaise => Some(VerificationState::Complete),
            VerificationState::Complete => None,
        }
    }

    fn instruction(self) -> Option<&'static str> {
        match self {
            VerificationState::Waiting => None,
            VerificationState::Face => Some("Position your face inside the guide ring."),
            VerificationState::Hands => {
                Some("Face verified. Now hold both hands up beside your face.")
            }
            VerificationState::HandRaise => {
                Some("Hands verified. Raise one hand above your head.")
            }
            VerificationState::Complete => {
                Some("Verification complete. Your assessment will begin.")
            }
        }
    }
}

/// The gesture state machine. Each step requires its condition to hold
/// continuously for the settle delay, filtering single-frame flicker.
///
/// Transitions return the events they produce instead of talking to any
/// messaging layer directly, so the logic is testable frame by frame.
#[derive(Debug)]
pub struct VerificationMachine {
    state: VerificationState,
    settle_delay: Duration,
    /// Set when the current step's condition first became true; cleared the
    /// moment it goes false again.
    settle_since: Option<Instant>,
    started_at: Option<Instant>,
}

impl VerificationMachine {
    pub fn new(settle_delay_ms: u64) -> Self {
        Self {
            state: VerificationState::Waiting,
            settle_delay: Duration::from_millis(settle_delay_ms),
            settle_since: None,
            started_at: None,
        }
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == VerificationState::Complete
    }

    /// How long verification has been running. Used by the optional
    /// max-wait bypass.
    pub fn waited(&self, now: Instant) -> Duration {
        self.started_at
            .map(|at| now.duration_since(at))
            .unwrap_or(Duration::ZERO)
    }

    /// Begin the challenge sequence: `Waiting -> Face` immediately.
    pub fn start(&mut self, now: Instant) -> Vec<ExamEvent> {
        if self.state != VerificationState::Waiting {
            return Vec::new();
        }
        self.started_at = Some(now);
        self.advance()
    }

    /// Feed one frame's zonal snapshot. Returns the events produced by any
    /// transition (at most one step per frame).
    pub fn observe(
        &mut self,
        snapshot: &ZonalSnapshot,
        thresholds: &DetectionThresholds,
        now: Instant,
    ) -> Vec<ExamEvent> {
        let condition = match self.state {
            VerificationState::Waiting | VerificationState::Complete => return Vec::new(),
            VerificationState::Face => snapshot.face_centered(thresholds),
            VerificationState::Hands => snapshot.hands_visible(thresholds),
            VerificationState::HandRaise => snapshot.hand_raised(thresholds),
        };

        if !condition {
            // Flicker or lost gesture: the settle window restarts from zero
            self.settle_since = None;
            return Vec::new();
        }

        let since = *self.settle_since.get_or_insert(now);
        if now.duration_since(since) >= self.settle_delay {
            self.advance()
        } else {
            Vec::new()
        }
    }

    fn advance(&mut self) -> Vec<ExamEvent> {
        let Some(next) = self.state.next() else {
            return Vec::new();
        };
        info!("verification advanced: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.settle_since = None;

        let mut events = vec![ExamEvent::VerificationStateChanged { state: next }];
        if let Some(text) = next.instruction() {
            events.push(ExamEvent::Instruction { text: text.to_string() });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::ZonalSnapshot;

    const SETTLE_MS: u64 = 2_000;

    fn snapshot(center: f32, left: f32, right: f32, upper: f32) -> ZonalSnapshot {
        ZonalSnapshot {
            frame_width: 640,
            frame_height: 480,
            overall_ratio: (center + left + right + upper).min(1.0),
            center_ratio: center,
            left_ratio: left,
            right_ratio: right,
            upper_ratio: upper,
        }
    }

    fn face() -> ZonalSnapshot {
        snapshot(0.30, 0.0, 0.0, 0.0)
    }

    fn hands() -> ZonalSnapshot {
        snapshot(0.30, 0.20, 0.20, 0.0)
    }

    fn raised() -> ZonalSnapshot {
        snapshot(0.30, 0.0, 0.0, 0.20)
    }

    fn nothing() -> ZonalSnapshot {
        snapshot(0.0, 0.0, 0.0, 0.0)
    }

    /// Feed the same snapshot at t and t + settle to move one step.
    fn hold(
        machine: &mut VerificationMachine,
        snap: &ZonalSnapshot,
        thresholds: &DetectionThresholds,
        from: Instant,
    ) -> Vec<ExamEvent> {
        let first = machine.observe(snap, thresholds, from);
        assert!(first.is_empty(), "should not advance before settle delay");
        machine.observe(snap, thresholds, from + Duration::from_millis(SETTLE_MS))
    }

    #[test]
    fn start_moves_waiting_to_face_with_instruction() {
        let mut machine = VerificationMachine::new(SETTLE_MS);
        let events = machine.start(Instant::now());
        assert_eq!(machine.state(), VerificationState::Face);
        assert!(matches!(
            events[0],
            ExamEvent::VerificationStateChanged { state: VerificationState::Face }
        ));
        assert!(matches!(events[1], ExamEvent::Instruction { .. }));
    }

    #[test]
    fn full_sequence_never_skips_a_state() {
        let thresholds = DetectionThresholds::default();
        let mut machine = VerificationMachine::new(SETTLE_MS);
        let t0 = Instant::now();
        machine.start(t0);

        let mut observed = vec![machine.state()];
        let step = Duration::from_millis(SETTLE_MS + 10);

        for (i, snap) in [face(), hands(), raised()].iter().enumerate() {
            let base = t0 + step * (i as u32 * 2);
            machine.observe(snap, &thresholds, base);
            machine.observe(snap, &thresholds, base + step);
            observed.push(machine.state());
        }

        assert_eq!(
            observed,
            vec![
                VerificationState::Face,
                VerificationState::Hands,
                VerificationState::HandRaise,
                VerificationState::Complete,
            ]
        );
        assert!(machine.is_complete());
    }

    #[test]
    fn condition_must_hold_for_the_full_settle_delay() {
        let thresholds = DetectionThresholds::default();
        let mut machine = VerificationMachine::new(SETTLE_MS);
        let t0 = Instant::now();
        machine.start(t0);

        machine.observe(&face(), &thresholds, t0);
        let early = machine.observe(&face(), &thresholds, t0 + Duration::from_millis(1_500));
        assert!(early.is_empty());
        assert_eq!(machine.state(), VerificationState::Face);

        let done = machine.observe(&face(), &thresholds, t0 + Duration::from_millis(2_000));
        assert!(!done.is_empty());
        assert_eq!(machine.state(), VerificationState::Hands);
    }

    #[test]
    fn flicker_resets_the_settle_window() {
        let thresholds = DetectionThresholds::default();
        let mut machine = VerificationMachine::new(SETTLE_MS);
        let t0 = Instant::now();
        machine.start(t0);

        machine.observe(&face(), &thresholds, t0);
        // Condition drops at 1.9s, then returns
        machine.observe(&nothing(), &thresholds, t0 + Duration::from_millis(1_900));
        machine.observe(&face(), &thresholds, t0 + Duration::from_millis(2_000));
        // 2.1s after start, but only 0.1s of continuous hold
        let events = machine.observe(&face(), &thresholds, t0 + Duration::from_millis(2_100));
        assert!(events.is_empty());
        assert_eq!(machine.state(), VerificationState::Face);

        // Continuous from 2.0s: advances at 4.0s
        let events = machine.observe(&face(), &thresholds, t0 + Duration::from_millis(4_000));
        assert_eq!(machine.state(), VerificationState::Hands);
        assert!(!events.is_empty());
    }

    #[test]
    fn satisfied_steps_never_revert() {
        let thresholds = DetectionThresholds::default();
        let mut machine = VerificationMachine::new(SETTLE_MS);
        let t0 = Instant::now();
        machine.start(t0);
        hold(&mut machine, &face(), &thresholds, t0);
        assert_eq!(machine.state(), VerificationState::Hands);

        // Face leaves the frame entirely; the machine stays at Hands
        let t1 = t0 + Duration::from_secs(10);
        machine.observe(&nothing(), &thresholds, t1);
        assert_eq!(machine.state(), VerificationState::Hands);
    }

    #[test]
    fn complete_is_terminal_and_silent() {
        let thresholds = DetectionThresholds::default();
        let mut machine = VerificationMachine::new(0);
        let t0 = Instant::now();
        machine.start(t0);
        machine.observe(&face(), &thresholds, t0);
        machine.observe(&hands(), &thresholds, t0);
        machine.observe(&raised(), &thresholds, t0);
        assert!(machine.is_complete());

        // Further frames produce no events and no state change
        let events = machine.observe(&raised(), &thresholds, t0 + Duration::from_secs(5));
        assert!(events.is_empty());
        assert!(machine.is_complete());
    }

    #[test]
    fn start_is_idempotent() {
        let mut machine = VerificationMachine::new(SETTLE_MS);
        let t0 = Instant::now();
        assert!(!machine.start(t0).is_empty());
        assert!(machine.start(t0).is_empty());
        assert_eq!(machine.state(), VerificationState::Face);
    }
}
