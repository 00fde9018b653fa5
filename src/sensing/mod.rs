mod controller;
mod loop_worker;

pub(crate) use controller::AnalysisController;

use anyhow::Result;

use crate::vision::Frame;

/// External frame supplier. The camera (or a test script) owns device
/// lifecycle and permissions; the engine only pulls.
///
/// `Ok(None)` means no frame is ready this tick and is not an error. `Err` is
/// treated as transient: the tick is skipped and the loop continues, until
/// failures persist long enough to count as losing the device.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}
