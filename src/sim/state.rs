//! Match state and core simulation types
//!
//! One `MatchState` owns everything a session touches: the rope, the AI
//! opponent, the score and the round flag. Nothing lives in globals.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::opponent::OpponentController;
use super::rope::{GripTargets, RopeSimulator};
use crate::consts::GRIP_INSET;
use crate::error::ConfigError;
use crate::settings::{FieldSettings, Settings};

/// Side that won a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// Human, top of the field, rope end 0
    Blue,
    /// AI, bottom of the field, last rope end
    Red,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Blue => "blue",
            Winner::Red => "red",
        }
    }

    /// Text for the end-of-round overlay
    pub fn banner(&self) -> &'static str {
        match self {
            Winner::Blue => "BLUE WINS!",
            Winner::Red => "RED WINS!",
        }
    }
}

/// Session score. Survives restarts; only `game_over` is cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub blue_score: u32,
    pub red_score: u32,
    pub game_over: bool,
}

impl MatchRecord {
    /// Record a round win
    pub fn award(&mut self, winner: Winner) {
        self.game_over = true;
        match winner {
            Winner::Blue => self.blue_score += 1,
            Winner::Red => self.red_score += 1,
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blue {} — {} Red", self.blue_score, self.red_score)
    }
}

/// A character holding one end of the rope (visual only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Puller {
    pub pos: Vec2,
    pub radius: f32,
}

impl Puller {
    /// Blue stands at the top edge, red at the bottom edge
    pub fn layout(field: &FieldSettings) -> (Self, Self) {
        let x = field.width / 2.0;
        let blue = Self {
            pos: Vec2::new(x, field.puller_offset),
            radius: field.puller_radius,
        };
        let red = Self {
            pos: Vec2::new(x, field.height - field.puller_offset),
            radius: field.puller_radius,
        };
        (blue, red)
    }

    /// Grip point on the side of the character facing the field center
    pub fn grip(&self, field: &FieldSettings) -> Vec2 {
        let reach = (self.radius - GRIP_INSET).max(0.0);
        let toward_center = if self.pos.y < field.height / 2.0 { 1.0 } else { -1.0 };
        self.pos + Vec2::new(0.0, reach * toward_center)
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Human (blue) is holding pull
    pub human_pulling: bool,
    /// Current grip points of both characters; `None` skips end easing
    pub grips: Option<GripTargets>,
}

impl TickInput {
    pub fn pulling(human_pulling: bool) -> Self {
        Self {
            human_pulling,
            grips: None,
        }
    }
}

/// What the presentation layer needs to draw a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub particles: Vec<Vec2>,
    pub midpoint: Vec2,
    pub midpoint_offset: f32,
    pub opponent_pulling: bool,
    pub record: MatchRecord,
}

/// Complete match state for one session
#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) settings: Settings,
    pub(crate) rope: RopeSimulator,
    pub(crate) opponent: OpponentController<Pcg32>,
    pub(crate) record: MatchRecord,
    pub(crate) blue: Puller,
    pub(crate) red: Puller,
    /// Rounds played since construction, including the current one
    pub(crate) round: u32,
    /// Ticks elapsed in the current round
    pub(crate) round_ticks: u64,
    seed: u64,
}

impl MatchState {
    /// Create a match with the given settings and opponent seed
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(settings, Pcg32::seed_from_u64(seed), seed)
    }

    fn with_rng(settings: Settings, rng: Pcg32, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rope = RopeSimulator::new(&settings.rope, &settings.field)?;
        let opponent = OpponentController::new(&settings.opponent, rng)?;
        let (blue, red) = Puller::layout(&settings.field);
        log::info!(
            "Match created: {} particles, difficulty {:.2}, seed {}",
            settings.rope.particle_count,
            settings.opponent.difficulty,
            seed
        );
        Ok(Self {
            settings,
            rope,
            opponent,
            record: MatchRecord::default(),
            blue,
            red,
            round: 1,
            round_ticks: 0,
            seed,
        })
    }

    /// Start a new round: straight rope, fresh opponent, scores kept
    pub fn reset(&mut self) {
        self.rope.reset();
        self.opponent.reset();
        self.record.game_over = false;
        if self.round_ticks > 0 {
            self.round += 1;
        }
        self.round_ticks = 0;
        log::info!("Round {} ({})", self.round, self.record);
    }

    /// Adopt a new field size; re-lays the rope and the characters
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        let field = FieldSettings {
            width,
            height,
            ..self.settings.field.clone()
        };
        let mut candidate = self.settings.clone();
        candidate.field = field;
        candidate.validate()?;

        self.settings = candidate;
        self.rope.set_field(&self.settings.field);
        let (blue, red) = Puller::layout(&self.settings.field);
        self.blue = blue;
        self.red = red;
        log::info!("Field resized to {}x{}", width, height);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rope(&self) -> &RopeSimulator {
        &self.rope
    }

    pub fn opponent(&self) -> &OpponentController<Pcg32> {
        &self.opponent
    }

    pub fn opponent_pulling(&self) -> bool {
        self.opponent.pulling()
    }

    pub fn record(&self) -> MatchRecord {
        self.record
    }

    pub fn game_over(&self) -> bool {
        self.record.game_over
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn round_ticks(&self) -> u64 {
        self.round_ticks
    }

    pub fn pullers(&self) -> (Puller, Puller) {
        (self.blue, self.red)
    }

    /// Grip targets of the default character layout
    pub fn default_grips(&self) -> GripTargets {
        GripTargets {
            blue: self.blue.grip(&self.settings.field),
            red: self.red.grip(&self.settings.field),
        }
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            particles: self.rope.positions().collect(),
            midpoint: self.rope.midpoint(),
            midpoint_offset: self.rope.midpoint_offset(),
            opponent_pulling: self.opponent.pulling(),
            record: self.record,
        }
    }

    /// Advance one tick; see [`super::tick::tick`]
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Option<Winner> {
        super::tick::tick(self, input, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display_and_award() {
        let mut record = MatchRecord::default();
        record.award(Winner::Red);
        record.award(Winner::Blue);
        record.award(Winner::Red);
        assert!(record.game_over);
        assert_eq!(record.to_string(), "Blue 1 — 2 Red");
        assert_eq!(Winner::Blue.banner(), "BLUE WINS!");
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.rope.particle_count = 0;
        assert!(MatchState::new(settings, 1).is_err());
    }

    #[test]
    fn test_default_grips_face_the_rope() {
        let state = MatchState::new(Settings::default(), 1).unwrap();
        let grips = state.default_grips();
        assert_eq!(grips.blue, Vec2::new(240.0, 82.0));
        assert_eq!(grips.red, Vec2::new(240.0, 718.0));
    }

    #[test]
    fn test_resize_relays_rope_and_keeps_scores() {
        let mut state = MatchState::new(Settings::default(), 1).unwrap();
        state.record.award(Winner::Blue);
        state.resize(360.0, 640.0).unwrap();

        assert_eq!(state.record().blue_score, 1);
        assert_eq!(state.rope().particles()[0].pos, Vec2::new(180.0, 80.0));
        assert_eq!(state.pullers().1.pos, Vec2::new(180.0, 588.0));
    }

    #[test]
    fn test_resize_rejects_tiny_field() {
        let mut state = MatchState::new(Settings::default(), 1).unwrap();
        assert!(state.resize(50.0, 50.0).is_err());
        assert_eq!(state.settings().field.width, 480.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = MatchState::new(Settings::default(), 1).unwrap();
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"opponent_pulling\":false"));
        assert!(json.contains("\"blue_score\":0"));
    }
}
