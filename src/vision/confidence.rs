use serde::{Deserialize, Serialize};

use super::zones::ZonalSnapshot;
use crate::config::{ConfidenceWeights, DetectionThresholds};

/// Guide-ring feedback state for the verification overlay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RingState {
    /// No face signal: neutral ring
    Idle,
    /// Face somewhere in frame: amber ring
    Detected,
    /// Face inside the center zone: green ring
    Centered,
}

/// Renderable description of the visual feedback overlay. This is plain data;
/// a headless consumer can ignore it, a UI draws it however it likes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub ring: RingState,
    /// Bar on the left edge lit when the left zone holds a hand
    pub left_hand_bar: bool,
    /// Bar on the right edge lit when the right zone holds a hand
    pub right_hand_bar: bool,
    /// Upward arrow glyph shown while a raised hand occupies the upper band
    pub raised_arrow: bool,
    /// 0-100 confidence readout
    pub confidence: f32,
}

/// Combine the zonal signals into a single 0-100 score:
/// `overall% * ratio_scale + weight_centered + weight_hands + weight_raised`
/// for each satisfied predicate, clamped.
pub fn compute_confidence(
    snapshot: &ZonalSnapshot,
    thresholds: &DetectionThresholds,
    weights: &ConfidenceWeights,
) -> f32 {
    let mut score = snapshot.overall_ratio * 100.0 * weights.ratio_scale;
    if snapshot.face_centered(thresholds) {
        score += weights.weight_centered;
    }
    if snapshot.hands_visible(thresholds) {
        score += weights.weight_hands;
    }
    if snapshot.hand_raised(thresholds) {
        score += weights.weight_raised;
    }
    score.clamp(0.0, 100.0)
}

pub fn build_overlay(
    snapshot: &ZonalSnapshot,
    thresholds: &DetectionThresholds,
    weights: &ConfidenceWeights,
) -> Overlay {
    let ring = if snapshot.face_centered(thresholds) {
        RingState::Centered
    } else if snapshot.face_detected(thresholds) {
        RingState::Detected
    } else {
        RingState::Idle
    };

    Overlay {
        ring,
        left_hand_bar: snapshot.left_ratio > thresholds.hand_zone_min_ratio,
        right_hand_bar: snapshot.right_ratio > thresholds.hand_zone_min_ratio,
        raised_arrow: snapshot.hand_raised(thresholds),
        confidence: compute_confidence(snapshot, thresholds, weights),
    }
}
