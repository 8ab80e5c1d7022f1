//! Snowfall rendering for snowmachine.
//!
//! This crate provides the particle engine that animates falling snow, the
//! render backends that paint flakes onto an RGBA [`PixelSurface`], and the
//! stack blur used to soften fixed regions behind foreground panels.

mod backend;
mod blur;
mod engine;
mod particle;
mod scheduler;
mod surface;

pub use backend::{BaseRenderBackend, BlurringRenderBackend, RenderBackend};
pub use blur::BlurFilter;
pub use engine::{Engine, EngineConfig, EngineState, MAX_FRAME_DELTA_MS};
pub use particle::Particle;
pub use scheduler::{FrameHandle, FrameQueue, FrameScheduler};
pub use surface::PixelSurface;
