//! Game tuning and configuration
//!
//! Every constant the simulation reads lives here so a match can be tuned
//! from a JSON file without recompiling. Sections missing from a file fall
//! back to the defaults in [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// AI difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Easy,
    Normal,
    #[default]
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "normal" | "medium" | "med" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Opponent difficulty fraction for this preset
    pub fn difficulty(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 0.35,
            DifficultyPreset::Normal => 0.6,
            DifficultyPreset::Hard => AI_DIFFICULTY,
        }
    }
}

/// Play-field geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub width: f32,
    pub height: f32,
    /// Horizontal inset of the safe region
    pub inset_x: f32,
    /// Vertical inset of the safe region
    pub inset_y: f32,
    /// Distance of the rope ends from the top/bottom edges after reset
    pub layout_margin: f32,
    /// Distance of each puller's center from its field edge
    pub puller_offset: f32,
    pub puller_radius: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            inset_x: BOUNDS_INSET_X,
            inset_y: BOUNDS_INSET_Y,
            layout_margin: LAYOUT_MARGIN,
            puller_offset: PULLER_EDGE_OFFSET,
            puller_radius: PULLER_RADIUS,
        }
    }
}

impl FieldSettings {
    /// Center of the field
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Top-left corner of the safe region
    pub fn safe_min(&self) -> Vec2 {
        Vec2::new(self.inset_x, self.inset_y)
    }

    /// Bottom-right corner of the safe region
    pub fn safe_max(&self) -> Vec2 {
        Vec2::new(self.width - self.inset_x, self.height - self.inset_y)
    }

    /// Clamp a point into the safe region
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.safe_min(), self.safe_max())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("field.width", self.width)?;
        positive("field.height", self.height)?;
        non_negative("field.inset_x", self.inset_x)?;
        non_negative("field.inset_y", self.inset_y)?;
        non_negative("field.layout_margin", self.layout_margin)?;
        non_negative("field.puller_radius", self.puller_radius)?;
        if self.width <= 2.0 * self.inset_x
            || self.height <= 2.0 * self.inset_y
            || self.height <= 2.0 * self.layout_margin
        {
            return Err(ConfigError::FieldTooSmall {
                width: self.width,
                height: self.height,
                inset_x: self.inset_x,
                inset_y: self.inset_y,
            });
        }
        Ok(())
    }
}

/// Rope solver tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RopeSettings {
    pub particle_count: usize,
    pub rest_length: f32,
    /// Velocity retained per step (air/rope friction)
    pub damping: f32,
    /// Vertical acceleration; zero keeps the rope flat
    pub gravity: f32,
    pub pull_strength: f32,
    /// Share of the pull passed on to the second particle from an end
    pub pull_falloff: f32,
    pub relaxation_iterations: u32,
    /// Correction weight for the two end particles
    pub end_weight: f32,
    pub centering: f32,
    pub epsilon: f32,
    /// Blend factor easing the rope ends toward the grips
    pub grip_easing: f32,
}

impl Default for RopeSettings {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            rest_length: REST_LENGTH,
            damping: DAMPING,
            gravity: GRAVITY,
            pull_strength: PULL_STRENGTH,
            pull_falloff: PULL_FALLOFF,
            relaxation_iterations: RELAXATION_ITERATIONS,
            end_weight: END_CORRECTION_WEIGHT,
            centering: CENTERING_STRENGTH,
            epsilon: DISTANCE_EPSILON,
            grip_easing: GRIP_EASING,
        }
    }
}

impl RopeSettings {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count < 3 {
            return Err(ConfigError::ParticleCount {
                count: self.particle_count,
            });
        }
        if !(self.rest_length.is_finite() && self.rest_length > 0.0) {
            return Err(ConfigError::RestLength {
                value: self.rest_length,
            });
        }
        if self.relaxation_iterations == 0 {
            return Err(ConfigError::NoRelaxation);
        }
        unit("rope.damping", self.damping)?;
        unit("rope.pull_falloff", self.pull_falloff)?;
        unit("rope.end_weight", self.end_weight)?;
        unit("rope.centering", self.centering)?;
        unit("rope.grip_easing", self.grip_easing)?;
        non_negative("rope.pull_strength", self.pull_strength)?;
        positive("rope.epsilon", self.epsilon)?;
        finite("rope.gravity", self.gravity)
    }
}

/// Opponent decision tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentSettings {
    /// When false the opponent never pulls
    pub enabled: bool,
    /// 0.0 (easy) .. 1.0 (very hard)
    pub difficulty: f32,
    /// Desire gained per unit of rope displacement toward the human
    pub sensitivity: f32,
    pub difficulty_weight: f32,
    /// Width of the symmetric uniform noise added to each decision
    pub noise_width: f32,
    pub desire_threshold: f32,
    /// Minimum stamina needed to start a pull
    pub stamina_gate: f32,
    /// Stamina never drops below this after a pull
    pub stamina_floor: f32,
    pub pull_cost: f32,
    pub rest_recovery: f32,
    pub pull_base_ms: f32,
    pub pull_jitter_ms: f32,
    pub rest_base_ms: f32,
    pub rest_jitter_ms: f32,
    /// Rest jitter scales with `1 - difficulty + rest_jitter_bias`
    pub rest_jitter_bias: f32,
    /// Rest recovery scales with `1 - difficulty + recovery_bias`
    pub recovery_bias: f32,
}

impl Default for OpponentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            difficulty: AI_DIFFICULTY,
            sensitivity: AI_SENSITIVITY,
            difficulty_weight: AI_DIFFICULTY_WEIGHT,
            noise_width: AI_NOISE_WIDTH,
            desire_threshold: AI_DESIRE_THRESHOLD,
            stamina_gate: AI_STAMINA_GATE,
            stamina_floor: AI_STAMINA_FLOOR,
            pull_cost: AI_PULL_COST,
            rest_recovery: AI_REST_RECOVERY,
            pull_base_ms: AI_PULL_BASE_MS,
            pull_jitter_ms: AI_PULL_JITTER_MS,
            rest_base_ms: AI_REST_BASE_MS,
            rest_jitter_ms: AI_REST_JITTER_MS,
            rest_jitter_bias: AI_REST_JITTER_BIAS,
            recovery_bias: AI_RECOVERY_BIAS,
        }
    }
}

impl OpponentSettings {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        unit("opponent.difficulty", self.difficulty)?;
        unit("opponent.stamina_gate", self.stamina_gate)?;
        unit("opponent.stamina_floor", self.stamina_floor)?;
        non_negative("opponent.noise_width", self.noise_width)?;
        non_negative("opponent.pull_cost", self.pull_cost)?;
        non_negative("opponent.rest_recovery", self.rest_recovery)?;
        non_negative("opponent.pull_base_ms", self.pull_base_ms)?;
        non_negative("opponent.pull_jitter_ms", self.pull_jitter_ms)?;
        non_negative("opponent.rest_base_ms", self.rest_base_ms)?;
        non_negative("opponent.rest_jitter_ms", self.rest_jitter_ms)?;
        non_negative("opponent.rest_jitter_bias", self.rest_jitter_bias)?;
        non_negative("opponent.recovery_bias", self.recovery_bias)?;
        finite("opponent.sensitivity", self.sensitivity)?;
        finite("opponent.difficulty_weight", self.difficulty_weight)?;
        finite("opponent.desire_threshold", self.desire_threshold)
    }
}

/// Complete match configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub field: FieldSettings,
    pub rope: RopeSettings,
    pub opponent: OpponentSettings,
    /// Midpoint displacement from center that ends a round
    pub victory_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field: FieldSettings::default(),
            rope: RopeSettings::default(),
            opponent: OpponentSettings::default(),
            victory_threshold: VICTORY_THRESHOLD,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(preset);
        settings
    }

    /// Apply a difficulty preset to the opponent
    pub fn apply_difficulty(&mut self, preset: DifficultyPreset) {
        self.opponent.difficulty = preset.difficulty();
    }

    /// Reject configurations that would break the solver or the AI
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.rope.validate()?;
        self.opponent.validate()?;
        positive("victory_threshold", self.victory_threshold)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file, using defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

fn unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
