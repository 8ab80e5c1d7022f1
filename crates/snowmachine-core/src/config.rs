//! Construction-time configuration for the engine and its backends.

use serde::Deserialize;
use thiserror::Error;

use crate::color::Rgba;

/// Number of flakes in the pool unless configured otherwise.
pub const DEFAULT_PARTICLE_COUNT: usize = 150;

/// Blur radius used behind foreground panels.
pub const DEFAULT_BLUR_RADIUS: u32 = 8;

/// Largest radius the stack blur lookup tables cover.
pub const MAX_BLUR_RADIUS: u32 = 254;

/// Errors raised when a configuration is rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The surface has no pixels.
    #[error("surface must not be empty (got {width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    /// The surface byte size does not fit in memory.
    #[error("surface {width}x{height} is too large")]
    SurfaceTooLarge { width: u32, height: u32 },

    /// Blur radius outside `1..=MAX_BLUR_RADIUS`.
    #[error("blur radius must be between 1 and 254, got {0}")]
    BlurRadius(u32),

    /// A blur region starts outside the surface.
    #[error("blur region {region:?} starts outside the {width}x{height} surface")]
    RegionOutsideSurface {
        region: BlurRegion,
        width: u32,
        height: u32,
    },

    /// Fall duration range is empty, inverted or non-positive.
    #[error("fall duration range {min}..{max} seconds is invalid")]
    FallDuration { min: f32, max: f32 },

    /// A particle tuning value is negative or not finite.
    #[error("particle setting `{field}` must be finite and non-negative, got {value}")]
    ParticleTuning { field: &'static str, value: f32 },

    /// Frame rate of zero.
    #[error("frame rate must be positive")]
    FrameRate,
}

/// Rectangle of the surface that is blurred after the flakes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct BlurRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BlurRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width` x `height` surface.
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Check that the region's origin lies on the surface.
    ///
    /// Regions reaching past the right or bottom edge are accepted and
    /// clipped when the blur is applied.
    pub fn validate_within(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if self.x > width || self.y > height {
            return Err(ConfigError::RegionOutsideSurface {
                region: *self,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Half-open pixel bounds `(x0, y0, x1, y1)` clipped to the surface, or
    /// `None` when nothing of the region is left.
    pub fn clip(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        (self.x < x1 && self.y < y1).then_some((self.x, self.y, x1, y1))
    }
}

/// Check a blur radius against the range the filter supports.
pub fn validate_blur_radius(radius: u32) -> Result<(), ConfigError> {
    if radius == 0 || radius > MAX_BLUR_RADIUS {
        return Err(ConfigError::BlurRadius(radius));
    }
    Ok(())
}

/// Distributions flakes are drawn from when spawned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Exclusive upper bound on flake radius, in pixels.
    pub max_radius: f32,
    /// Shortest time a flake takes to cross the surface.
    pub min_fall_secs: f32,
    /// Longest time a flake takes to cross the surface.
    pub max_fall_secs: f32,
    /// Peak horizontal sway, in pixels per second.
    pub drift_amplitude: f32,
    /// Vertical distance over which the sway completes one cycle, in pixels.
    pub drift_wavelength: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_radius: 1.5,
            min_fall_secs: 10.0,
            max_fall_secs: 30.0,
            drift_amplitude: 2.0,
            drift_wavelength: 12.0,
        }
    }
}

impl ParticleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_radius", self.max_radius),
            ("drift_amplitude", self.drift_amplitude),
            ("drift_wavelength", self.drift_wavelength),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ParticleTuning { field, value });
            }
        }
        let (min, max) = (self.min_fall_secs, self.max_fall_secs);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::FallDuration { min, max });
        }
        Ok(())
    }
}

/// Top-level configuration, usually read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    /// Flakes in the pool; constant for the engine's lifetime.
    pub particle_count: usize,
    /// Stack blur radius applied to every blur region.
    pub blur_radius: u32,
    pub particles: ParticleConfig,
    /// Colour the surface is cleared to each frame.
    pub background: Rgba,
    pub flake_color: Rgba,
    /// Fixed RNG seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    /// Target frames per second for the host's frame loop.
    pub fps: u32,
    /// Heading shown on the foreground panel.
    pub title: String,
    /// Blur the area behind the foreground panel.
    pub blur_panel: bool,
    /// Extra regions blurred in addition to the panel, in surface pixels.
    pub blur_regions: Vec<BlurRegion>,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            blur_radius: DEFAULT_BLUR_RADIUS,
            particles: ParticleConfig::default(),
            background: Rgba::opaque(0x0b, 0x1d, 0x3a),
            flake_color: Rgba::new(255, 255, 255, 0xe0),
            seed: None,
            fps: 30,
            title: "Happy holidays".to_string(),
            blur_panel: true,
            blur_regions: Vec::new(),
        }
    }
}

impl SnowConfig {
    /// Validate everything that does not depend on the surface size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_blur_radius(self.blur_radius)?;
        self.particles.validate()?;
        if self.fps == 0 {
            return Err(ConfigError::FrameRate);
        }
        Ok(())
    }
}
