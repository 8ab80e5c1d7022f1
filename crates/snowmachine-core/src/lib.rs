//! Core types for the snowmachine snowfall engine.
//!
//! Holds the construction-time configuration shared by the render crate and
//! the terminal front-end, together with the errors raised when that
//! configuration is rejected.

mod color;
mod config;

pub use color::{ColorParseError, Rgba};
pub use config::{
    BlurRegion, ConfigError, DEFAULT_BLUR_RADIUS, DEFAULT_PARTICLE_COUNT, MAX_BLUR_RADIUS,
    ParticleConfig, SnowConfig, validate_blur_radius,
};
