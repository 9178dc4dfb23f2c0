//! Rope physics
//!
//! The rope is a chain of point masses integrated with position Verlet and
//! held together by iterative distance-constraint relaxation. Index 0 is the
//! blue end (top of the field), the last index is the red end (bottom).
//!
//! The relaxation is sequential and order-dependent: pairs are corrected
//! left to right, the end particles take a reduced share of each correction,
//! and a weak horizontal centering is interleaved into every pass. Victory
//! thresholds are calibrated against this exact behavior.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::settings::{FieldSettings, RopeSettings};

/// One point mass of the rope. Velocity is implicit: `pos - prev`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub prev: Vec2,
}

impl Particle {
    /// A particle at rest
    pub fn at(pos: Vec2) -> Self {
        Self { pos, prev: pos }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.pos - self.prev
    }
}

/// Which sides are pulling this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullInput {
    pub blue: bool,
    pub red: bool,
}

/// Where each character holds its end of the rope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripTargets {
    pub blue: Vec2,
    pub red: Vec2,
}

/// Owns the particle chain and advances it one step at a time
#[derive(Debug, Clone)]
pub struct RopeSimulator {
    particles: Vec<Particle>,
    settings: RopeSettings,
    field: FieldSettings,
}

impl RopeSimulator {
    /// Build a rope laid out straight down the middle of the field
    pub fn new(settings: &RopeSettings, field: &FieldSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut rope = Self {
            particles: Vec::with_capacity(settings.particle_count),
            settings: settings.clone(),
            field: field.clone(),
        };
        rope.reset();
        Ok(rope)
    }

    /// Lay the rope out as a straight vertical line, evenly spaced between
    /// the top and bottom layout margins, with zero velocity
    pub fn reset(&mut self) {
        let n = self.settings.particle_count;
        let x = self.field.width / 2.0;
        let top = self.field.layout_margin;
        let span = self.field.height - 2.0 * self.field.layout_margin;

        self.particles.clear();
        for i in 0..n {
            let t = i as f32 / (n - 1) as f32;
            self.particles.push(Particle::at(Vec2::new(x, top + t * span)));
        }
    }

    /// Adopt new field geometry and re-lay the rope
    pub fn set_field(&mut self, field: &FieldSettings) {
        self.field = field.clone();
        self.reset();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.pos)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn midpoint_index(&self) -> usize {
        self.particles.len() / 2
    }

    /// The particle whose displacement decides the match
    pub fn midpoint(&self) -> Vec2 {
        self.particles[self.midpoint_index()].pos
    }

    /// Vertical offset of the midpoint from the field center.
    /// Negative toward blue (top), positive toward red (bottom).
    pub fn midpoint_offset(&self) -> f32 {
        self.midpoint().y - self.field.center().y
    }

    pub fn field(&self) -> &FieldSettings {
        &self.field
    }

    /// Advance the rope by one step
    ///
    /// `dt` is in milliseconds and only feeds the gravity term. When `grips`
    /// is given the two end particles are eased toward them after the
    /// physics pass.
    pub fn integrate(&mut self, dt: f32, pulls: PullInput, grips: Option<GripTargets>) {
        self.verlet(dt);
        self.apply_pulls(pulls);
        self.relax();
        self.clamp_to_bounds();
        if let Some(grips) = grips {
            self.ease_ends(grips);
        }
    }

    fn verlet(&mut self, dt: f32) {
        let damping = self.settings.damping;
        let sag = Vec2::new(0.0, self.settings.gravity * dt * 0.001);
        for p in &mut self.particles {
            let next = p.pos + p.velocity() * damping + sag;
            p.prev = p.pos;
            p.pos = next;
        }
    }

    fn apply_pulls(&mut self, pulls: PullInput) {
        let strength = self.settings.pull_strength;
        let falloff = self.settings.pull_falloff;
        let last = self.particles.len() - 1;

        if pulls.blue {
            self.particles[0].pos.y -= strength;
            self.particles[1].pos.y -= strength * falloff;
        }
        if pulls.red {
            self.particles[last].pos.y += strength;
            self.particles[last - 1].pos.y += strength * falloff;
        }
    }

    fn relax(&mut self) {
        let rest = self.settings.rest_length;
        let epsilon = self.settings.epsilon;
        let end_weight = self.settings.end_weight;
        let centering = self.settings.centering;
        let center_x = self.field.width / 2.0;
        let last = self.particles.len() - 1;

        for _ in 0..self.settings.relaxation_iterations {
            for i in 0..last {
                let delta = self.particles[i + 1].pos - self.particles[i].pos;
                let d = delta.length().max(epsilon);
                let correction = delta * 0.5 * ((d - rest) / d);

                let a_weight = if i == 0 { end_weight } else { 1.0 };
                let b_weight = if i + 1 == last { end_weight } else { 1.0 };
                self.particles[i].pos += correction * a_weight;
                self.particles[i + 1].pos -= correction * b_weight;
            }

            for p in &mut self.particles {
                p.pos.x += (center_x - p.pos.x) * centering;
            }
        }
    }

    fn clamp_to_bounds(&mut self) {
        let min = self.field.safe_min();
        let max = self.field.safe_max();
        for p in &mut self.particles {
            p.pos = p.pos.clamp(min, max);
        }
    }

    /// Ease the end particles toward the grips. Targets are clamped into the
    /// safe region first so the ends never leave it.
    fn ease_ends(&mut self, grips: GripTargets) {
        let k = self.settings.grip_easing;
        let last = self.particles.len() - 1;
        let blue = self.field.clamp(grips.blue);
        let red = self.field.clamp(grips.red);

        let first = &mut self.particles[0];
        first.pos = first.pos.lerp(blue, k);
        let end = &mut self.particles[last];
        end.pos = end.pos.lerp(red, k);
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rope() -> RopeSimulator {
        RopeSimulator::new(&RopeSettings::default(), &FieldSettings::default()).unwrap()
    }

    fn in_bounds(rope: &RopeSimulator) -> bool {
        let min = rope.field().safe_min();
        let max = rope.field().safe_max();
        rope.positions()
            .all(|p| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y)
    }

    const IDLE: PullInput = PullInput {
        blue: false,
        red: false,
    };

    #[test]
    fn test_reset_lays_out_straight_line() {
        let rope = rope();
        let field = FieldSettings::default();
        assert_eq!(rope.len(), 24);
        assert_eq!(rope.particles()[0].pos, Vec2::new(240.0, 80.0));
        assert_eq!(rope.particles()[23].pos, Vec2::new(240.0, 720.0));

        let spacing = (field.height - 2.0 * field.layout_margin) / 23.0;
        for pair in rope.particles().windows(2) {
            assert_eq!(pair[0].pos.x, pair[1].pos.x);
            assert!((pair[1].pos.y - pair[0].pos.y - spacing).abs() < 1e-3);
        }
        assert!(rope.particles().iter().all(|p| p.velocity() == Vec2::ZERO));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut rope = rope();
        for _ in 0..30 {
            rope.integrate(16.0, PullInput { blue: true, red: false }, None);
        }
        rope.reset();
        let once: Vec<Particle> = rope.particles().to_vec();
        rope.reset();
        assert_eq!(once, rope.particles());
    }

    #[test]
    fn test_rejects_short_rope() {
        let settings = RopeSettings {
            particle_count: 2,
            ..Default::default()
        };
        assert!(RopeSimulator::new(&settings, &FieldSettings::default()).is_err());
    }

    #[test]
    fn test_minimum_rope_integrates() {
        let settings = RopeSettings {
            particle_count: 3,
            ..Default::default()
        };
        let mut rope = RopeSimulator::new(&settings, &FieldSettings::default()).unwrap();
        for _ in 0..50 {
            rope.integrate(16.0, PullInput { blue: true, red: true }, None);
        }
        assert_eq!(rope.midpoint_index(), 1);
        assert!(in_bounds(&rope));
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let mut rope = rope();
        let spot = Vec2::new(200.0, 300.0);
        for p in rope.particles_mut() {
            *p = Particle::at(spot);
        }
        rope.integrate(16.0, IDLE, None);
        assert!(rope.positions().all(|p| p.is_finite()));
        assert!(in_bounds(&rope));
    }

    #[test]
    fn test_idle_rope_settles_without_vertical_drift() {
        let mut rope = rope();
        let center = rope.field().center();
        for _ in 0..3000 {
            rope.integrate(16.0, IDLE, None);
        }
        // Even particle count: the midpoint sits half a segment below center
        let expected = REST_HALF;
        assert!(
            (rope.midpoint_offset() - expected).abs() < 0.5,
            "midpoint offset {}",
            rope.midpoint_offset()
        );
        let mean_y = rope.positions().map(|p| p.y).sum::<f32>() / rope.len() as f32;
        assert!((mean_y - center.y).abs() < 0.5, "mean y {mean_y}");
        assert!(rope.positions().all(|p| (p.x - center.x).abs() < 1e-2));
    }

    const REST_HALF: f32 = crate::consts::REST_LENGTH / 2.0;

    #[test]
    fn test_blue_pull_moves_midpoint_up() {
        let mut rope = rope();
        for _ in 0..600 {
            rope.integrate(16.0, IDLE, None);
        }
        let mut last = rope.midpoint_offset();
        for _ in 0..30 {
            rope.integrate(16.0, PullInput { blue: true, red: false }, None);
            let offset = rope.midpoint_offset();
            assert!(offset < last, "{offset} !< {last}");
            last = offset;
        }
    }

    #[test]
    fn test_red_pull_moves_midpoint_down() {
        let mut rope = rope();
        for _ in 0..600 {
            rope.integrate(16.0, IDLE, None);
        }
        let start = rope.midpoint_offset();
        for _ in 0..30 {
            rope.integrate(16.0, PullInput { blue: false, red: true }, None);
        }
        assert!(rope.midpoint_offset() > start + 50.0);
    }

    #[test]
    fn test_grip_easing_tracks_targets() {
        let mut rope = rope();
        let grips = GripTargets {
            blue: Vec2::new(200.0, 82.0),
            red: Vec2::new(280.0, 718.0),
        };
        for _ in 0..200 {
            rope.integrate(16.0, IDLE, Some(grips));
        }
        let ends = rope.particles();
        assert!(ends[0].pos.distance(grips.blue) < 40.0);
        assert!(ends[ends.len() - 1].pos.distance(grips.red) < 40.0);
    }

    #[test]
    fn test_grips_outside_field_do_not_escape_bounds() {
        let mut rope = rope();
        let grips = GripTargets {
            blue: Vec2::new(-500.0, -500.0),
            red: Vec2::new(5000.0, 5000.0),
        };
        for _ in 0..100 {
            rope.integrate(16.0, PullInput { blue: true, red: true }, Some(grips));
            assert!(in_bounds(&rope));
        }
    }

    #[test]
    fn test_set_field_relays_rope() {
        let mut rope = rope();
        let field = FieldSettings {
            width: 300.0,
            height: 600.0,
            ..Default::default()
        };
        rope.set_field(&field);
        assert_eq!(rope.particles()[0].pos, Vec2::new(150.0, 80.0));
        assert_eq!(rope.particles()[23].pos, Vec2::new(150.0, 520.0));
    }

    proptest! {
        #[test]
        fn prop_particles_stay_in_bounds(
            pulls in prop::collection::vec((any::<bool>(), any::<bool>()), 1..300),
            grip_y in -400.0f32..1200.0,
            use_grips in any::<bool>(),
        ) {
            let mut rope = rope();
            let grips = GripTargets {
                blue: Vec2::new(240.0, grip_y),
                red: Vec2::new(240.0, 800.0 - grip_y),
            };
            for (blue, red) in pulls {
                rope.integrate(16.0, PullInput { blue, red }, use_grips.then_some(grips));
                prop_assert!(in_bounds(&rope));
            }
        }
    }
}
