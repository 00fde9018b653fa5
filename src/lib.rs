//! Exam-integrity verification engine.
//!
//! The engine watches a remote candidate through two cooperating loops: a
//! frame-analysis loop that classifies skin pixels, reads zonal presence, and
//! drives the verification gesture sequence, and a once-per-second ticker that
//! runs the per-question phase timers, the key-presence grace window, and the
//! global exam deadline. Both loops share one state lock, and every session
//! ends in exactly one submission to the caller-provided [`ResultSink`].
//!
//! The caller supplies questions, a [`FrameSource`] (or `None` to run
//! degraded), and a sink; progress streams back over an event channel.

pub mod audio;
pub mod config;
pub mod events;
pub mod exam;
pub mod keys;
pub mod sensing;
pub mod session;
pub mod verification;
pub mod vision;

pub use config::{ConfidenceWeights, DetectionThresholds, ExamConfig, SettingsStore};
pub use events::{channel, EventReceiver, EventSender, ExamEvent};
pub use exam::{ExamController, ExamKind, ExamPhase, ExamSnapshot};
pub use sensing::FrameSource;
pub use session::{ExamSubmission, Question, QuestionOutcome, ResultSink, SessionTimeline};
pub use verification::VerificationState;
pub use vision::{Frame, Overlay, RingState};

/// Initialize logging (reads RUST_LOG env var).
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
