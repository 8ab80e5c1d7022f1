//! Render backends: paint particles onto a [`PixelSurface`].

use snowmachine_core::{BlurRegion, ConfigError, Rgba, SnowConfig};
use tracing::debug;

use crate::blur::BlurFilter;
use crate::particle::Particle;
use crate::surface::PixelSurface;

/// Something the engine can hand a particle snapshot to once per frame.
pub trait RenderBackend {
    /// Draw `particles` in order. The slice is only borrowed for the call.
    fn render(&mut self, particles: &[Particle]);
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    fn render(&mut self, particles: &[Particle]) {
        (**self).render(particles);
    }
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn render(&mut self, particles: &[Particle]) {
        (**self).render(particles);
    }
}

/// Clears the surface and paints every flake as a filled circle.
#[derive(Debug, Clone)]
pub struct BaseRenderBackend {
    surface: PixelSurface,
    background: Rgba,
    flake_color: Rgba,
}

impl BaseRenderBackend {
    /// Backend with the default palette.
    pub fn new(surface: PixelSurface) -> Self {
        let defaults = SnowConfig::default();
        Self::with_colors(surface, defaults.background, defaults.flake_color)
    }

    pub fn with_colors(surface: PixelSurface, background: Rgba, flake_color: Rgba) -> Self {
        Self {
            surface,
            background,
            flake_color,
        }
    }

    pub fn from_config(surface: PixelSurface, config: &SnowConfig) -> Self {
        Self::with_colors(surface, config.background, config.flake_color)
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn into_surface(self) -> PixelSurface {
        self.surface
    }

    fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }
}

impl RenderBackend for BaseRenderBackend {
    fn render(&mut self, particles: &[Particle]) {
        self.surface.clear(self.background);
        for p in particles {
            self.surface
                .fill_circle(p.x(), p.y(), p.radius(), self.flake_color);
        }
    }
}

/// Renders through a [`BaseRenderBackend`], then blurs fixed regions.
///
/// Regions are blurred one after another in place, so a later region sees
/// the result of an earlier overlapping one.
#[derive(Debug, Clone)]
pub struct BlurringRenderBackend {
    base: BaseRenderBackend,
    regions: Vec<BlurRegion>,
    filter: BlurFilter,
}

impl BlurringRenderBackend {
    /// Wrap `base`, blurring each region with the given radius.
    ///
    /// Fails when the radius is out of range or a region starts outside the
    /// surface.
    pub fn new(
        base: BaseRenderBackend,
        regions: Vec<BlurRegion>,
        blur_radius: u32,
    ) -> Result<Self, ConfigError> {
        let filter = BlurFilter::new(blur_radius)?;
        let (width, height) = (base.surface().width(), base.surface().height());
        for region in &regions {
            region.validate_within(width, height)?;
        }
        debug!(
            regions = regions.len(),
            blur_radius, "configured blurring backend"
        );

        Ok(Self {
            base,
            regions,
            filter,
        })
    }

    /// Build from configuration, blurring the configured regions plus `extra`.
    pub fn from_config(
        surface: PixelSurface,
        config: &SnowConfig,
        extra: impl IntoIterator<Item = BlurRegion>,
    ) -> Result<Self, ConfigError> {
        let regions = config.blur_regions.iter().copied().chain(extra).collect();
        Self::new(
            BaseRenderBackend::from_config(surface, config),
            regions,
            config.blur_radius,
        )
    }

    pub fn surface(&self) -> &PixelSurface {
        self.base.surface()
    }

    pub fn regions(&self) -> &[BlurRegion] {
        &self.regions
    }
}

impl RenderBackend for BlurringRenderBackend {
    fn render(&mut self, particles: &[Particle]) {
        self.base.render(particles);
        let surface = self.base.surface_mut();
        for region in &self.regions {
            self.filter.apply(surface, region);
        }
    }
}
