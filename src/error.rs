//! Configuration errors
//!
//! The simulation itself has no failure surface once constructed; everything
//! that can go wrong is caught here, before the first tick.

use thiserror::Error;

/// Reasons a [`Settings`](crate::Settings) value cannot build a match
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rope needs at least 3 particles, got {count}")]
    ParticleCount { count: usize },
    #[error("rope rest length must be positive and finite, got {value}")]
    RestLength { value: f32 },
    #[error("field {width}x{height} leaves no room inside insets ({inset_x}, {inset_y})")]
    FieldTooSmall {
        width: f32,
        height: f32,
        inset_x: f32,
        inset_y: f32,
    },
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("relaxation needs at least one iteration")]
    NoRelaxation,
    #[error("settings file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
