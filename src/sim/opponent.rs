//! AI opponent (red side)
//!
//! The opponent does not decide every tick. It commits to pulling or resting
//! for a randomized reaction time, and only when that timer runs out does it
//! look at the rope again. Low difficulty leaves long, exploitable rests;
//! high difficulty keeps near-continuous pressure, bounded by stamina.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::settings::OpponentSettings;

use super::rope::RopeSimulator;

/// Mutable opponent state, reset at the start of every round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentState {
    /// Milliseconds until the next decision
    pub reaction_timer: f32,
    pub pulling: bool,
    /// 0..1, spent by pulling and recovered by resting
    pub stamina: f32,
    /// 0.0 (easy) .. 1.0 (very hard)
    pub difficulty: f32,
    /// Length of the most recent pull (ms)
    pub pull_duration: f32,
    /// Length of the most recent rest (ms)
    pub rest_duration: f32,
}

impl OpponentState {
    pub fn new(difficulty: f32) -> Self {
        Self {
            reaction_timer: 0.0,
            pulling: false,
            stamina: 1.0,
            difficulty,
            pull_duration: 0.0,
            rest_duration: 0.0,
        }
    }
}

/// Outcome of a single decision, mostly for logging and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub desire: f32,
    pub pulling: bool,
    pub duration: f32,
}

/// Reaction-timer driven pull/rest state machine.
///
/// Randomness comes from the injected generator `R`, so a seeded generator
/// makes every decision reproducible.
#[derive(Debug, Clone)]
pub struct OpponentController<R: Rng = Pcg32> {
    state: OpponentState,
    settings: OpponentSettings,
    rng: R,
}

impl<R: Rng> OpponentController<R> {
    pub fn new(settings: &OpponentSettings, rng: R) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            state: OpponentState::new(settings.difficulty),
            settings: settings.clone(),
            rng,
        })
    }

    pub fn state(&self) -> &OpponentState {
        &self.state
    }

    pub fn pulling(&self) -> bool {
        self.state.pulling
    }

    pub fn settings(&self) -> &OpponentSettings {
        &self.settings
    }

    /// Restore the initial state; the generator keeps its position
    pub fn reset(&mut self) {
        self.state = OpponentState::new(self.settings.difficulty);
    }

    /// Stop pulling without touching the timer or stamina
    pub fn release(&mut self) {
        self.state.pulling = false;
    }

    /// Advance the timer by `dt` milliseconds and decide when it expires.
    /// Returns whether the opponent is pulling this tick.
    pub fn update(&mut self, dt: f32, rope: &RopeSimulator) -> bool {
        if !self.settings.enabled {
            self.state.pulling = false;
            return false;
        }

        self.state.reaction_timer -= dt;
        if self.state.reaction_timer > 0.0 {
            return self.state.pulling;
        }

        let decision = self.decide(rope.midpoint_offset());
        log::debug!(
            "opponent {} for {:.0}ms (desire {:.3}, stamina {:.2})",
            if decision.pulling { "pulls" } else { "rests" },
            decision.duration,
            decision.desire,
            self.state.stamina
        );
        self.state.pulling
    }

    /// Make one decision from the midpoint's offset (positive = toward red)
    pub fn decide(&mut self, center_bias: f32) -> Decision {
        let s = &self.settings;
        let difficulty = self.state.difficulty;
        let noise = (self.rng.random::<f32>() - 0.5) * s.noise_width;
        let desire = -center_bias * s.sensitivity + difficulty * s.difficulty_weight + noise;

        let duration;
        if desire > s.desire_threshold && self.state.stamina > s.stamina_gate {
            duration = s.pull_base_ms + self.rng.random::<f32>() * s.pull_jitter_ms * (1.0 + difficulty);
            self.state.pulling = true;
            self.state.pull_duration = duration;
            self.state.stamina = (self.state.stamina - s.pull_cost * (1.0 + difficulty))
                .max(s.stamina_floor);
        } else {
            let rest_scale = 1.0 - difficulty + s.rest_jitter_bias;
            duration = s.rest_base_ms + self.rng.random::<f32>() * s.rest_jitter_ms * rest_scale;
            self.state.pulling = false;
            self.state.rest_duration = duration;
            let recovery = s.rest_recovery * (1.0 - difficulty + s.recovery_bias);
            self.state.stamina = (self.state.stamina + recovery).min(1.0);
        }
        self.state.reaction_timer = duration;

        Decision {
            desire,
            pulling: self.state.pulling,
            duration,
        }
    }
}
