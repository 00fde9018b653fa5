pub mod controller;
pub mod phase;

pub use controller::{ExamController, ExamKind, ExamSnapshot};
pub use phase::{ExamPhase, PhaseState};
