//! Snowflake particles.

use std::f32::consts::TAU;

use rand::Rng;
use snowmachine_core::ParticleConfig;

/// State for a single falling flake.
///
/// Radius, speed and sway are drawn once at spawn; only the position moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Horizontal position, in surface pixels.
    x: f32,
    /// Vertical position, in surface pixels. Negative is above the top edge.
    y: f32,
    /// Drawn radius.
    radius: f32,
    /// Fall speed in pixels per second, always positive.
    speed: f32,
    /// Peak sway in pixels per second.
    drift_amplitude: f32,
    /// Sway cycle length along the fall, in pixels.
    drift_wavelength: f32,
    /// Sway phase offset.
    drift_phase: f32,
}

impl Particle {
    /// Build a flake at a fixed position without sway.
    pub fn new(x: f32, y: f32, radius: f32, speed: f32) -> Self {
        debug_assert!(radius >= 0.0 && speed > 0.0);
        Self {
            x,
            y,
            radius,
            speed,
            drift_amplitude: 0.0,
            drift_wavelength: 0.0,
            drift_phase: 0.0,
        }
    }

    /// Spawn a flake just above the top edge at a random column.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        surface_width: f32,
        surface_height: f32,
        config: &ParticleConfig,
    ) -> Self {
        let radius = if config.max_radius > 0.0 {
            rng.gen_range(0.0..config.max_radius)
        } else {
            0.0
        };
        let x = rng.gen_range(0.0..=surface_width.max(0.0));

        // A flake crosses the whole surface in a random number of seconds,
        // independent of its size.
        let fall_secs = rng.gen_range(config.min_fall_secs..=config.max_fall_secs);
        let travel = (surface_height + 2.0 * config.max_radius).max(1.0);
        let speed = travel / fall_secs;

        let drift_phase = rng.gen_range(0.0..TAU);

        Self {
            x,
            y: -radius,
            radius,
            speed,
            drift_amplitude: config.drift_amplitude,
            drift_wavelength: config.drift_wavelength,
            drift_phase,
        }
    }

    /// Spawn a flake for the initial pool, scattered up to one surface
    /// height above the top edge so the first flakes do not arrive together.
    pub fn spawn_staggered<R: Rng + ?Sized>(
        rng: &mut R,
        surface_width: f32,
        surface_height: f32,
        config: &ParticleConfig,
    ) -> Self {
        let mut particle = Self::spawn(rng, surface_width, surface_height, config);
        particle.y -= rng.gen_range(0.0..=surface_height.max(0.0));
        particle
    }

    /// Recycle this flake in place as a freshly spawned one.
    pub fn respawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        surface_width: f32,
        surface_height: f32,
        config: &ParticleConfig,
    ) {
        *self = Self::spawn(rng, surface_width, surface_height, config);
    }

    /// Move the flake forward by `delta_secs` of simulated time.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance(&mut self, delta_secs: f32) {
        if !delta_secs.is_finite() || delta_secs <= 0.0 {
            return;
        }

        self.y += self.speed * delta_secs;

        if self.drift_amplitude > 0.0 && self.drift_wavelength > 0.0 {
            let sway = (self.y / self.drift_wavelength + self.drift_phase).sin();
            self.x += sway * self.drift_amplitude * delta_secs;
        }
    }

    /// Whether the flake has fully left the bottom of the surface.
    pub fn is_offscreen(&self, surface_height: f32) -> bool {
        self.y > surface_height + self.radius
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}
