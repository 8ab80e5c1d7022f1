//! The snowfall engine: owns the flakes and drives a render backend.

use rand::SeedableRng;
use rand::rngs::StdRng;
use snowmachine_core::{ConfigError, ParticleConfig, SnowConfig};
use tracing::{debug, info, trace};

use crate::backend::RenderBackend;
use crate::particle::Particle;
use crate::scheduler::{FrameHandle, FrameQueue, FrameScheduler};

/// Longest simulated step per frame, in milliseconds.
///
/// A host that stops delivering frames (hidden window, suspended terminal)
/// resumes with one short step instead of flakes jumping far ahead.
pub const MAX_FRAME_DELTA_MS: u64 = 250;

/// Lifecycle of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Constructed,
    Running,
    Stopped,
}

/// Engine settings for one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    pub particle_count: usize,
    pub particles: ParticleConfig,
    /// Fixed RNG seed, or `None` for entropy.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn new(width: u32, height: u32) -> Self {
        let defaults = SnowConfig::default();
        Self {
            width,
            height,
            particle_count: defaults.particle_count,
            particles: defaults.particles,
            seed: None,
        }
    }

    /// Take the particle settings from `config` for a `width` x `height` surface.
    pub fn from_snow_config(config: &SnowConfig, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            particle_count: config.particle_count,
            particles: config.particles.clone(),
            seed: config.seed,
        }
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        self.particles.validate()
    }
}

/// Snowfall simulation driven one frame at a time by a [`FrameScheduler`].
///
/// The particle count is fixed at construction. Flakes that fall off the
/// bottom are respawned in place, never added or removed.
#[derive(Debug)]
pub struct Engine<B: RenderBackend, S: FrameScheduler = FrameQueue> {
    particles: Vec<Particle>,
    backend: B,
    scheduler: S,
    rng: StdRng,
    particle_config: ParticleConfig,
    width: f32,
    height: f32,
    state: EngineState,
    /// The one frame request this engine will accept a callback for.
    pending: Option<FrameHandle>,
    /// Host timestamp of the previous tick.
    last_frame_ms: Option<u64>,
}

impl<B: RenderBackend, S: FrameScheduler> Engine<B, S> {
    /// Validate `config` and populate the particle pool.
    pub fn new(config: EngineConfig, backend: B, scheduler: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (width, height) = (config.width as f32, config.height as f32);
        let particles = (0..config.particle_count)
            .map(|_| Particle::spawn_staggered(&mut rng, width, height, &config.particles))
            .collect();

        info!(
            width = config.width,
            height = config.height,
            particles = config.particle_count,
            "snow engine created"
        );

        Ok(Self {
            particles,
            backend,
            scheduler,
            rng,
            particle_config: config.particles,
            width,
            height,
            state: EngineState::Constructed,
            pending: None,
            last_frame_ms: None,
        })
    }

    /// Begin requesting frames. Does nothing if already running.
    pub fn start(&mut self) {
        if self.state == EngineState::Running {
            return;
        }
        self.state = EngineState::Running;
        // The first tick after (re)starting simulates no elapsed time.
        self.last_frame_ms = None;
        self.pending = Some(self.scheduler.request_frame());
        debug!("snow engine started");
    }

    /// Stop requesting frames and withdraw the outstanding request.
    ///
    /// `stop` and [`on_frame`](Self::on_frame) both need `&mut self`, so a
    /// stop always lands between two ticks.
    pub fn stop(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        self.state = EngineState::Stopped;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        debug!("snow engine stopped");
    }

    /// Host callback for a frame requested by this engine.
    ///
    /// `elapsed_ms` is the host's monotonic clock. Returns whether a tick ran;
    /// callbacks for stale or cancelled handles, or while stopped, are
    /// ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, elapsed_ms: u64) -> bool {
        if self.state != EngineState::Running || self.pending != Some(handle) {
            trace!(frame = handle.id(), "ignoring stale frame");
            return false;
        }
        self.pending = None;

        let delta_ms = self
            .last_frame_ms
            .map_or(0, |last| elapsed_ms.saturating_sub(last));
        self.last_frame_ms = Some(elapsed_ms);

        let delta_ms = if delta_ms > MAX_FRAME_DELTA_MS {
            debug!(delta_ms, "clamping long frame gap");
            MAX_FRAME_DELTA_MS
        } else {
            delta_ms
        };

        self.tick(delta_ms as f32 / 1000.0);
        self.pending = Some(self.scheduler.request_frame());
        true
    }

    /// Advance every flake, recycle the ones that left the surface, render.
    fn tick(&mut self, delta_secs: f32) {
        let mut recycled = 0usize;
        for particle in &mut self.particles {
            particle.advance(delta_secs);
            if particle.is_offscreen(self.height) {
                particle.respawn(&mut self.rng, self.width, self.height, &self.particle_config);
                recycled += 1;
            }
        }
        trace!(delta_secs, "tick");
        if recycled > 0 {
            debug!(recycled, "recycled flakes");
        }

        self.backend.render(&self.particles);
    }

    /// Render the flakes where they are, without advancing or scheduling.
    ///
    /// Lets a host show a paused or not yet started engine.
    pub fn redraw(&mut self) {
        self.backend.render(&self.particles);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// The backend, for presenting what it last rendered.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: RenderBackend, S: FrameScheduler> Drop for Engine<B, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
