//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time and pull flags come in as plain values
//! - Seeded RNG only
//! - Stable iteration order (rope index order)
//! - No rendering or platform dependencies

pub mod opponent;
pub mod rope;
pub mod state;
pub mod tick;

pub use opponent::{Decision, OpponentController, OpponentState};
pub use rope::{GripTargets, Particle, PullInput, RopeSimulator};
pub use state::{MatchRecord, MatchSnapshot, MatchState, Puller, TickInput, Winner};
pub use tick::{check_victory, tick};
