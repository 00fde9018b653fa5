use serde::{Deserialize, Serialize};

use super::frame::Frame;
use super::skin::SkinMask;
use crate::config::DetectionThresholds;

/// Named presence zones. Each is a fixed fractional rectangle of the frame,
/// so detection is resolution-independent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ZoneId {
    /// Face guide region in the middle of the frame
    Center,
    /// Left edge, where the candidate holds up their left hand
    Left,
    /// Right edge, mirror of `Left`
    Right,
    /// Top band, occupied when a hand is raised overhead
    Upper,
}

/// Fractional rectangle: all fields in [0, 1] relative to frame dimensions.
#[derive(Debug, Clone, Copy)]
pub struct ZoneRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ZoneId {
    pub const ALL: [ZoneId; 4] = [ZoneId::Center, ZoneId::Left, ZoneId::Right, ZoneId::Upper];

    pub fn rect(self) -> ZoneRect {
        match self {
            ZoneId::Center => ZoneRect { x: 0.30, y: 0.15, w: 0.40, h: 0.50 },
            ZoneId::Left => ZoneRect { x: 0.00, y: 0.25, w: 0.22, h: 0.55 },
            ZoneId::Right => ZoneRect { x: 0.78, y: 0.25, w: 0.22, h: 0.55 },
            ZoneId::Upper => ZoneRect { x: 0.25, y: 0.00, w: 0.50, h: 0.15 },
        }
    }

    /// Resolve the fractional rectangle against the current frame size.
    /// Computed fresh per frame: zone geometry must never be cached across a
    /// resolution change.
    fn to_pixels(self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let r = self.rect();
        let x = (r.x * width as f32) as u32;
        let y = (r.y * height as f32) as u32;
        let w = (r.w * width as f32).ceil() as u32;
        let h = (r.h * height as f32).ceil() as u32;
        (x, y, w, h)
    }
}

/// Skin occupancy of one zone for one frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSignal {
    pub zone: ZoneId,
    pub skin_ratio: f32,
}

/// All zonal signals derived from a single frame. Ratios are recomputed from
/// scratch each frame; there is no accumulation across frames.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonalSnapshot {
    pub frame_width: u32,
    pub frame_height: u32,
    pub overall_ratio: f32,
    pub center_ratio: f32,
    pub left_ratio: f32,
    pub right_ratio: f32,
    pub upper_ratio: f32,
}

impl ZonalSnapshot {
    pub fn signal(&self, zone: ZoneId) -> PresenceSignal {
        let skin_ratio = match zone {
            ZoneId::Center => self.center_ratio,
            ZoneId::Left => self.left_ratio,
            ZoneId::Right => self.right_ratio,
            ZoneId::Upper => self.upper_ratio,
        };
        PresenceSignal { zone, skin_ratio }
    }

    pub fn face_detected(&self, thresholds: &DetectionThresholds) -> bool {
        self.overall_ratio > thresholds.face_detected_min_ratio
    }

    pub fn face_centered(&self, thresholds: &DetectionThresholds) -> bool {
        self.center_ratio > thresholds.face_centered_min_ratio
    }

    pub fn hands_visible(&self, thresholds: &DetectionThresholds) -> bool {
        self.left_ratio > thresholds.hand_zone_min_ratio
            || self.right_ratio > thresholds.hand_zone_min_ratio
    }

    pub fn hand_raised(&self, thresholds: &DetectionThresholds) -> bool {
        self.upper_ratio > thresholds.hand_zone_min_ratio
    }
}

/// Classify the frame and aggregate per-zone skin ratios.
pub fn analyze_frame(frame: &Frame) -> ZonalSnapshot {
    let mask = SkinMask::classify(frame);
    let ratio_for = |zone: ZoneId| {
        let (x, y, w, h) = zone.to_pixels(frame.width(), frame.height());
        mask.ratio_in(x, y, w, h)
    };

    ZonalSnapshot {
        frame_width: frame.width(),
        frame_height: frame.height(),
        overall_ratio: mask.overall_ratio(),
        center_ratio: ratio_for(ZoneId::Center),
        left_ratio: ratio_for(ZoneId::Left),
        right_ratio: ratio_for(ZoneId::Right),
        upper_ratio: ratio_for(ZoneId::Upper),
    }
}
