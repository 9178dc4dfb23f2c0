//! Tug of Rope - a two-player rope pulling game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rope solver, AI opponent, match flow)
//! - `settings`: Data-driven tuning with JSON load/save
//! - `input`: Backend-neutral mapping of key/touch/mouse events to pull intent
//!
//! Rendering and device input are owned by the host. Each frame the host
//! calls [`sim::tick`] with elapsed milliseconds and the human pull flag,
//! then draws from [`sim::MatchState::snapshot`].

pub mod error;
pub mod input;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{DifficultyPreset, Settings};

/// Default tuning constants (all times in milliseconds, distances in field units)
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default play-field dimensions
    pub const FIELD_WIDTH: f32 = 480.0;
    pub const FIELD_HEIGHT: f32 = 800.0;
    /// Safe region inset from the field edges
    pub const BOUNDS_INSET_X: f32 = 40.0;
    pub const BOUNDS_INSET_Y: f32 = 60.0;
    /// Distance of the rope ends from the top/bottom edges after reset
    pub const LAYOUT_MARGIN: f32 = 80.0;

    /// Puller (character) layout
    pub const PULLER_EDGE_OFFSET: f32 = 52.0;
    pub const PULLER_RADIUS: f32 = 36.0;
    /// How far inside the character's outline the rope is gripped
    pub const GRIP_INSET: f32 = 6.0;

    /// Rope
    pub const PARTICLE_COUNT: usize = 24;
    pub const REST_LENGTH: f32 = 18.0;
    pub const DAMPING: f32 = 0.995;
    pub const GRAVITY: f32 = 0.0;
    pub const PULL_STRENGTH: f32 = 1.6;
    /// Share of the pull impulse passed to the second particle from the end
    pub const PULL_FALLOFF: f32 = 0.8;
    pub const RELAXATION_ITERATIONS: u32 = 6;
    /// Correction weight of the two end particles (stiffer grip)
    pub const END_CORRECTION_WEIGHT: f32 = 0.25;
    pub const CENTERING_STRENGTH: f32 = 0.002;
    pub const DISTANCE_EPSILON: f32 = 0.0001;
    pub const GRIP_EASING: f32 = 0.22;

    /// Midpoint displacement that ends a round
    pub const VICTORY_THRESHOLD: f32 = 120.0;

    /// Opponent
    pub const AI_DIFFICULTY: f32 = 0.86;
    pub const AI_SENSITIVITY: f32 = 0.012;
    pub const AI_DIFFICULTY_WEIGHT: f32 = 0.6;
    pub const AI_NOISE_WIDTH: f32 = 0.3;
    pub const AI_DESIRE_THRESHOLD: f32 = 0.4;
    pub const AI_STAMINA_GATE: f32 = 0.15;
    pub const AI_STAMINA_FLOOR: f32 = 0.25;
    pub const AI_PULL_COST: f32 = 0.06;
    pub const AI_REST_RECOVERY: f32 = 0.03;
    pub const AI_PULL_BASE_MS: f32 = 180.0;
    pub const AI_PULL_JITTER_MS: f32 = 220.0;
    pub const AI_REST_BASE_MS: f32 = 120.0;
    pub const AI_REST_JITTER_MS: f32 = 400.0;
    /// Added to `1 - difficulty` when scaling rest jitter and recovery
    pub const AI_REST_JITTER_BIAS: f32 = 0.2;
    pub const AI_RECOVERY_BIAS: f32 = 0.3;
}
