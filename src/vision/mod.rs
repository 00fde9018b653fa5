pub mod confidence;
pub mod frame;
pub mod skin;
pub mod zones;

pub use confidence::{build_overlay, compute_confidence, Overlay, RingState};
pub use frame::Frame;
pub use skin::SkinMask;
pub use zones::{analyze_frame, PresenceSignal, ZonalSnapshot, ZoneId};
