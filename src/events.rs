use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::session::QuestionOutcome;
use crate::verification::VerificationState;
use crate::vision::Overlay;
use crate::exam::phase::ExamPhase;

/// Everything the engine tells the outside world. The messaging collaborator
/// (UI, logger, test harness) consumes these from an unbounded channel; the
/// engine never blocks on a slow listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExamEvent {
    /// One-shot natural-language instruction for the candidate
    Instruction { text: String },
    VerificationStateChanged { state: VerificationState },
    /// Verification was skipped: camera unavailable or max wait exceeded.
    /// The exam proceeds ungated.
    VerificationBypassed { reason: String },
    /// Per-frame presence feedback (confidence readout and overlay)
    PresenceUpdated { overlay: Overlay },
    PhaseChanged {
        question_index: usize,
        phase: ExamPhase,
        remaining_ms: i64,
    },
    QuestionAdvanced {
        from_index: usize,
        outcome: QuestionOutcome,
    },
    /// Required keys released during thinking; the grace countdown is running
    GraceArmed { grace_ms: u64 },
    /// Keys restored before the grace deadline
    GraceRestored,
    /// Grace deadline passed; the current question is being force-skipped
    GraceExpired,
    /// All required keys held for the first time this question
    KeysSatisfied,
    /// The frame source failed repeatedly and the session is degrading
    FrameSourceLost { reason: String },
    SessionSubmitted { session_id: String },
}

pub type EventSender = mpsc::UnboundedSender<ExamEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ExamEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Fire-and-forget emission. A dropped receiver means nobody is listening
/// anymore, which is not an engine error.
pub fn emit(tx: &EventSender, event: ExamEvent) {
    let _ = tx.send(event);
}
