//! Retargeting Settings
//!
//! All calibration constants, naming conventions and rates used by the
//! retargeting pipeline. Every value has a default matching the reference
//! rig and capture setup; a JSON document may override any subset.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use marionette_retarget::settings::{RetargetSettings, FingerSolveMode};
//!
//! let settings = RetargetSettings {
//!     finger_mode: FingerSolveMode::Incremental,
//!     ..Default::default()
//! };
//!
//! let from_disk = RetargetSettings::from_file("retarget.json")?;
//! ```

use std::path::Path;

use glam::Vec3;
use marionette_core::{BoneKey, Finger, MarionetteError, Result, Segment, Side};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CoordinateMapping
// ---------------------------------------------------------------------------

/// Manual calibration constants for landmark → anchor-space conversion.
///
/// ```text
/// x' = (x - x_center) * x_scale          (negated for the left side)
/// y' = (y_reference - y) * y_scale + y_offset
/// z' = -z * z_scale - z_offset
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateMapping {
    pub x_scale: f32,
    pub y_scale: f32,
    pub z_scale: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    pub x_center: f32,
    pub y_reference: f32,
}

impl Default for CoordinateMapping {
    fn default() -> Self {
        Self {
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 2.0,
            y_offset: 0.7,
            z_offset: 0.2,
            x_center: 0.5,
            y_reference: 0.4,
        }
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Landmark samples consumed per second.
    pub sample_rate: f32,
    /// Upper bound on scheduler ticks issued by a single `advance` call.
    pub max_ticks_per_update: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            sample_rate: 30.0,
            max_ticks_per_update: 4,
        }
    }
}

impl PlaybackSettings {
    #[inline]
    #[must_use]
    pub fn tick_period(&self) -> f32 {
        1.0 / self.sample_rate
    }
}

// ---------------------------------------------------------------------------
// Finger solving
// ---------------------------------------------------------------------------

/// How a solved finger rotation is applied to its bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerSolveMode {
    /// Rotation is derived from the bone's bind pose every call.
    ///
    /// Re-applying the same frame yields the same orientation, so the
    /// render-rate refresh pass is safe.
    #[default]
    BindRelative,
    /// The delta is composed onto whatever rotation the bone currently has.
    ///
    /// Orientation drifts if a frame is applied more than once per bone.
    Incremental,
}

// ---------------------------------------------------------------------------
// Bone naming
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideTokens {
    pub left: String,
    pub right: String,
}

impl Default for SideTokens {
    fn default() -> Self {
        Self {
            left: "l".to_string(),
            right: "r".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerTokens {
    pub thumb: String,
    pub index: String,
    pub middle: String,
    pub ring: String,
    pub pinky: String,
}

impl Default for FingerTokens {
    fn default() -> Self {
        Self {
            thumb: "thumb".to_string(),
            index: "index".to_string(),
            middle: "middle".to_string(),
            ring: "ring".to_string(),
            pinky: "pinky".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentTokens {
    pub proximal: String,
    pub intermediate: String,
    pub distal: String,
    pub tip: String,
}

impl Default for SegmentTokens {
    fn default() -> Self {
        Self {
            proximal: "01".to_string(),
            intermediate: "02".to_string(),
            distal: "03".to_string(),
            tip: "end".to_string(),
        }
    }
}

/// Explicit name for one bone, bypassing the templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneNameOverride {
    #[serde(flatten)]
    pub key: BoneKey,
    pub name: String,
}

/// Per-asset bone naming table.
///
/// Templates accept the placeholders `{prefix}`, `{finger}`, `{segment}`
/// and `{side}`, which are substituted with the matching tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneNaming {
    pub prefix: String,
    pub hand_template: String,
    pub finger_template: String,
    pub sides: SideTokens,
    pub fingers: FingerTokens,
    pub segments: SegmentTokens,
    pub overrides: Vec<BoneNameOverride>,
}

impl Default for BoneNaming {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            hand_template: "{prefix}hand_{side}".to_string(),
            finger_template: "{prefix}{finger}_{segment}_{side}".to_string(),
            sides: SideTokens::default(),
            fingers: FingerTokens::default(),
            segments: SegmentTokens::default(),
            overrides: Vec::new(),
        }
    }
}

impl BoneNaming {
    /// Default templates with every name prefixed by `prefix`.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    fn side_token(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.sides.left,
            Side::Right => &self.sides.right,
        }
    }

    fn finger_token(&self, finger: Finger) -> &str {
        match finger {
            Finger::Thumb => &self.fingers.thumb,
            Finger::Index => &self.fingers.index,
            Finger::Middle => &self.fingers.middle,
            Finger::Ring => &self.fingers.ring,
            Finger::Pinky => &self.fingers.pinky,
        }
    }

    fn segment_token(&self, segment: Segment) -> &str {
        match segment {
            Segment::Proximal => &self.segments.proximal,
            Segment::Intermediate => &self.segments.intermediate,
            Segment::Distal => &self.segments.distal,
            Segment::Tip => &self.segments.tip,
        }
    }

    /// Name of the hand root bone on `side`.
    #[must_use]
    pub fn hand_name(&self, side: Side) -> String {
        self.hand_template
            .replace("{prefix}", &self.prefix)
            .replace("{side}", self.side_token(side))
    }

    /// Name of the finger bone identified by `key`.
    #[must_use]
    pub fn bone_name(&self, key: BoneKey) -> String {
        if let Some(o) = self.overrides.iter().find(|o| o.key == key) {
            return o.name.clone();
        }
        self.finger_template
            .replace("{prefix}", &self.prefix)
            .replace("{finger}", self.finger_token(key.finger))
            .replace("{segment}", self.segment_token(key.segment))
            .replace("{side}", self.side_token(key.side))
    }
}

// ---------------------------------------------------------------------------
// Axis calibration
// ---------------------------------------------------------------------------

/// Forced bone-local forward axis for one bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisOverride {
    #[serde(flatten)]
    pub key: BoneKey,
    pub axis: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisCalibration {
    /// Bone whose rest orientation decides the avatar-wide forward axis.
    pub reference: BoneKey,
    /// Axis used when the reference bone cannot be found.
    pub fallback_axis: Vec3,
    /// Per-bone axes for rigs where one shared axis does not fit.
    pub overrides: Vec<AxisOverride>,
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self {
            reference: BoneKey::new(Finger::Index, Segment::Proximal, Side::Left),
            fallback_axis: Vec3::Y,
            overrides: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// IK
// ---------------------------------------------------------------------------

/// Weights handed to the external IK solver each resolve step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSettings {
    pub enabled: bool,
    pub hand_position_weight: f32,
    pub hand_rotation_weight: f32,
    pub look_at_weight: f32,
    /// Skip wrist targets on frames without a full pose.
    pub hands_require_pose: bool,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hand_position_weight: 1.0,
            hand_rotation_weight: 0.0,
            look_at_weight: 1.0,
            hands_require_pose: false,
        }
    }
}

// ---------------------------------------------------------------------------
// RetargetSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetSettings {
    pub mapping: CoordinateMapping,
    pub playback: PlaybackSettings,
    pub finger_mode: FingerSolveMode,
    pub naming: BoneNaming,
    pub calibration: AxisCalibration,
    pub ik: IkSettings,
    /// Keep the active avatar root at the origin's translation.
    pub pin_avatar_to_origin: bool,
}

impl Default for RetargetSettings {
    fn default() -> Self {
        Self {
            mapping: CoordinateMapping::default(),
            playback: PlaybackSettings::default(),
            finger_mode: FingerSolveMode::default(),
            naming: BoneNaming::default(),
            calibration: AxisCalibration::default(),
            ik: IkSettings::default(),
            pin_avatar_to_origin: true,
        }
    }
}

impl RetargetSettings {
    /// Parses settings from JSON; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading retarget settings from: {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let m = &self.mapping;
        let mapping_values = [
            ("mapping.x_scale", m.x_scale),
            ("mapping.y_scale", m.y_scale),
            ("mapping.z_scale", m.z_scale),
            ("mapping.y_offset", m.y_offset),
            ("mapping.z_offset", m.z_offset),
            ("mapping.x_center", m.x_center),
            ("mapping.y_reference", m.y_reference),
        ];
        for (field, value) in mapping_values {
            if !value.is_finite() {
                return Err(MarionetteError::invalid_settings(field, "must be finite"));
            }
        }

        if !(self.playback.sample_rate.is_finite() && self.playback.sample_rate > 0.0) {
            return Err(MarionetteError::invalid_settings(
                "playback.sample_rate",
                "must be a positive number of samples per second",
            ));
        }
        if self.playback.max_ticks_per_update == 0 {
            return Err(MarionetteError::invalid_settings(
                "playback.max_ticks_per_update",
                "must be at least 1",
            ));
        }

        if self.calibration.fallback_axis.try_normalize().is_none() {
            return Err(MarionetteError::invalid_settings(
                "calibration.fallback_axis",
                "must be a non-zero vector",
            ));
        }
        if let Some(o) = self
            .calibration
            .overrides
            .iter()
            .find(|o| o.axis.try_normalize().is_none())
        {
            return Err(MarionetteError::invalid_settings(
                "calibration.overrides",
                &format!("axis for {} must be a non-zero vector", o.key),
            ));
        }

        let ik = &self.ik;
        for (field, weight) in [
            ("ik.hand_position_weight", ik.hand_position_weight),
            ("ik.hand_rotation_weight", ik.hand_rotation_weight),
            ("ik.look_at_weight", ik.look_at_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(MarionetteError::invalid_settings(
                    field,
                    "weight must be between 0.0 and 1.0",
                ));
            }
        }

        Ok(())
    }
}
