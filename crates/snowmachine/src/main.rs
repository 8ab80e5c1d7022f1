use std::time::{Duration, Instant};

use chrono::Local;
use color_eyre::eyre::WrapErr;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::Rect,
    style::Stylize,
    text::Line,
};
use snowmachine_core::SnowConfig;
use snowmachine_render::{BlurringRenderBackend, Engine, EngineConfig, FrameQueue, PixelSurface};
use tracing::{info, warn};

mod config;
mod logging;
mod panel;
mod widget;

use widget::SurfaceWidget;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init();
    let config = config::load().wrap_err("failed to load configuration")?;
    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    config: SnowConfig,
    /// Is the snow paused?
    paused: bool,
    /// Blur the area behind the panel.
    blur_panel: bool,
    /// Frame requests from the engine, drained once per refresh.
    frames: FrameQueue,
    /// Engine for the current terminal size; `None` if it could not be built.
    engine: Option<Engine<BlurringRenderBackend>>,
    /// Terminal area the engine was built for.
    screen: Rect,
    /// Settings changed since the engine was built.
    stale: bool,
    /// Origin of the clock handed to the engine.
    started: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: SnowConfig) -> Self {
        Self {
            running: false,
            paused: false,
            blur_panel: config.blur_panel,
            config,
            frames: FrameQueue::new(),
            engine: None,
            screen: Rect::default(),
            stale: true,
            started: Instant::now(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let frame_interval = Duration::from_secs_f64(1.0 / self.config.fps as f64);
        self.running = true;
        while self.running {
            let size = terminal.size()?;
            self.ensure_engine(Rect::new(0, 0, size.width, size.height));
            self.deliver_frames();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(frame_interval)?;
        }
        Ok(())
    }

    /// Build backend and engine for `screen` unless they already match it.
    ///
    /// A failed build leaves the screen without snow; the panel still draws.
    fn ensure_engine(&mut self, screen: Rect) {
        if !self.stale && self.screen == screen {
            return;
        }
        self.screen = screen;
        self.stale = false;
        self.engine = None;

        match self.build_engine(screen) {
            Ok(mut engine) => {
                // Show the initial flakes even while paused.
                engine.redraw();
                if !self.paused {
                    engine.start();
                }
                self.engine = Some(engine);
            }
            Err(err) => warn!(%err, "snow disabled for this terminal size"),
        }
    }

    fn build_engine(
        &self,
        screen: Rect,
    ) -> Result<Engine<BlurringRenderBackend>, snowmachine_core::ConfigError> {
        let (width, height) = (screen.width as u32, screen.height as u32 * 2);
        let surface = PixelSurface::new(width, height)?;

        let (panel, _) = panel::layout(screen);
        let panel_region = self
            .blur_panel
            .then(|| panel::blur_region(screen, panel));
        let backend = BlurringRenderBackend::from_config(surface, &self.config, panel_region)?;

        info!(width, height, blur_panel = self.blur_panel, "building snow engine");
        let engine_config = EngineConfig::from_snow_config(&self.config, width, height);
        Engine::new(engine_config, backend, self.frames.clone())
    }

    /// Hand every frame the engine asked for back to it.
    fn deliver_frames(&mut self) {
        let now_ms = self.started.elapsed().as_millis() as u64;
        let due = self.frames.take_due();
        if let Some(engine) = self.engine.as_mut() {
            for handle in due {
                engine.on_frame(handle, now_ms);
            }
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let backdrop = self.config.background;

        if let Some(engine) = &self.engine {
            frame.render_widget(SurfaceWidget::new(engine.backend().surface(), backdrop), area);
        }

        let (panel, help_area) = panel::layout(area);
        let date_str = Local::now().format("%A, %B %d, %Y").to_string();
        let card = panel::card(&self.config.title, date_str, self.config.flake_color);
        frame.render_widget(card, panel);

        let pause_label = if self.paused { " resume  " } else { " pause  " };
        let help = Line::from(vec![
            "q".bold(),
            " quit  ".dark_gray(),
            "space".bold(),
            pause_label.dark_gray(),
            "b".bold(),
            " toggle blur".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, help_area);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most one frame interval so the snow keeps moving.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                // Picked up by the size check at the top of the loop.
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char(' ')) => self.toggle_pause(),
            (_, KeyCode::Char('b')) => self.toggle_blur(),
            _ => {}
        }
    }

    /// Stop or restart the snow.
    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if let Some(engine) = self.engine.as_mut() {
            if self.paused {
                engine.stop();
            } else {
                engine.start();
            }
        }
    }

    /// Switch the panel blur; the backend is rebuilt on the next loop.
    fn toggle_blur(&mut self) {
        self.blur_panel = !self.blur_panel;
        self.stale = true;
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
