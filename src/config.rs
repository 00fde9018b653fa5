use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Thresholds for the zonal presence predicates. All ratios are in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionThresholds {
    /// Overall skin ratio above which a face is considered present
    pub face_detected_min_ratio: f32,
    /// Center-zone skin ratio above which the face is considered centered
    pub face_centered_min_ratio: f32,
    /// Left/right/upper zone skin ratio above which a hand is considered present
    pub hand_zone_min_ratio: f32,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            face_detected_min_ratio: 0.05,
            face_centered_min_ratio: 0.15,
            hand_zone_min_ratio: 0.08,
        }
    }
}

/// Confidence scoring weights. The score is
/// `overall_ratio_percent * ratio_scale + weight_centered + weight_hands + weight_raised`
/// for each satisfied predicate, clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceWeights {
    pub ratio_scale: f32,
    pub weight_centered: f32,
    pub weight_hands: f32,
    pub weight_raised: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            ratio_scale: 2.0,
            weight_centered: 30.0,
            weight_hands: 20.0,
            weight_raised: 10.0,
        }
    }
}

/// Every tunable of the exam engine in one place. Durations that gate the
/// candidate (settle delay, grace period, phase lengths) are deliberately
/// config values rather than constants so a deployment can adjust the
/// pressure level without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamConfig {
    /// How long a verification condition must hold continuously before the
    /// state machine advances.
    pub settle_delay_ms: u64,
    /// How long the required keys may be released during a thinking phase
    /// before the question is force-skipped.
    pub grace_period_ms: u64,
    /// Length of the thinking phase per question.
    pub thinking_secs: u64,
    /// Length of the answering window per question.
    pub answering_secs: u64,
    /// Optional whole-exam countdown. When it expires the session submits
    /// whatever answers exist.
    pub total_exam_secs: Option<u64>,
    /// Optional cap on how long verification may stall before it is bypassed
    /// with a warning. `None` means verification can wait indefinitely.
    pub max_verification_wait_secs: Option<u64>,
    /// Required key identifiers for the left hand.
    pub left_hand_keys: Vec<String>,
    /// Required key identifiers for the right hand.
    pub right_hand_keys: Vec<String>,
    /// Play the confirmation chime when all required keys are first held.
    pub chime_enabled: bool,
    pub thresholds: DetectionThresholds,
    pub confidence: ConfidenceWeights,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 2_000,
            grace_period_ms: 10_000,
            thinking_secs: 60,
            answering_secs: 5,
            total_exam_secs: None,
            max_verification_wait_secs: None,
            left_hand_keys: vec!["a".into(), "z".into(), "e".into(), "r".into()],
            right_hand_keys: vec!["j".into(), "k".into(), "l".into(), "m".into()],
            chime_enabled: true,
            thresholds: DetectionThresholds::default(),
            confidence: ConfidenceWeights::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ExamConfig>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            ExamConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn config(&self) -> ExamConfig {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, config: ExamConfig) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = config;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &ExamConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: ExamConfig = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
