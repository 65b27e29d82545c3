use crate::config::DisplayConfig;
use crate::icon::window_icon;
use crate::keys::map_key;
use ab_glyph::FontVec;
use anyhow::{Context, Result, anyhow};
use cogex_core::{Key, ParticipantId, SessionPhase, Stimulus};
use cogex_experiment::{FileSink, PersistReport, Session, SessionConfig, SessionEvent, Task};
use cogex_render::{FrameView, RENDER_STAGES, SkiaRenderer, StimulusView};
use cogex_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

/// How the window loop ended
#[derive(Debug)]
pub enum RunOutcome {
    Completed(PersistReport),
    /// Quit before the trial log was written.
    Quit { unsaved: usize },
}

pub struct App<K: Task> {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: Session<K, HighPrecisionTimer, ThreadRng>,
    sink: FileSink,
    renderer: Option<SkiaRenderer>,
    font: Option<FontVec>,
    display: DisplayConfig,
    instructions: Vec<String>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    refresh_rate: Option<f64>,

    outcome: Option<RunOutcome>,
    failure: Option<anyhow::Error>,
}

impl<K: Task> App<K> {
    pub fn new(
        task: K,
        config: SessionConfig,
        participant: ParticipantId,
        sink: FileSink,
        font: FontVec,
        display: DisplayConfig,
    ) -> Self {
        let session = Session::new(task, config, HighPrecisionTimer::new(), rand::rng())
            .with_participant(participant);
        let instructions = session.instructions();

        Self {
            window: None,
            pixels: None,
            session,
            sink,
            renderer: None,
            font: Some(font),
            display,
            instructions,
            current_size: None,
            scale_factor: 1.0,
            refresh_rate: None,
            outcome: None,
            failure: None,
        }
    }

    pub fn run(mut self) -> Result<RunOutcome> {
        let event_loop = EventLoop::new()?;
        let task = <K::Stimulus as Stimulus>::TASK;
        println!("=== COGEX: {} ===", task.as_str().to_uppercase());
        println!("Platform: {}", std::env::consts::OS);
        println!("Architecture: {}", std::env::consts::ARCH);
        println!("Press SPACE to start or ESC to exit.\n");

        event_loop.run_app(&mut self)?;
        self.log_frame_timing();

        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        self.outcome
            .take()
            .ok_or_else(|| anyhow!("window closed before the session finished"))
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        self.refresh_rate = monitor
            .as_ref()
            .and_then(|m| m.refresh_rate_millihertz())
            .map(|rate| rate as f64 / 1000.0);

        let mut attributes = Window::default_attributes()
            .with_title(self.display.title.clone())
            .with_resizable(false)
            .with_window_icon(window_icon());
        attributes = if self.display.fullscreen {
            let monitor = monitor.ok_or_else(|| anyhow!("no monitor available"))?;
            attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
        } else {
            attributes.with_inner_size(PhysicalSize::new(self.display.width, self.display.height))
        };

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        self.current_size = Some(size);
        self.scale_factor = window.scale_factor();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = self.scale_factor,
            refresh_hz = ?self.refresh_rate,
            "display configured"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);

        let font = self
            .font
            .take()
            .context("renderer was already created")?;
        self.renderer = Some(SkiaRenderer::new(
            size.width,
            size.height,
            font,
            self.display.colors(),
            self.session.config.trial_count,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let view = FrameView {
            phase: self.session.phase(),
            instructions: &self.instructions,
            stimulus: self.session.current_stimulus().map(|s| StimulusView {
                label: s.label(),
                ink: s.ink(),
            }),
            progress: self.session.trial_progress(),
        };
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let stats = renderer.render_frame(&view, pixels.frame_mut(), &mut self.session.timer)?;
        let t = self.session.timer.now();
        pixels.render()?;
        let present = self.session.timer.elapsed(t);

        debug!(
            present_ms = present.as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            phase_ms = stats.phase.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            dirty = stats.dirty_count,
            "frame"
        );
        Ok(())
    }

    /// One pass of the loop: draw, report the onset, then advance timed phases.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.render()?;

        match self.session.phase() {
            SessionPhase::Presenting => {
                self.session.handle_event(SessionEvent::StimulusShown);
            }
            SessionPhase::Persisting => {
                // "Saving..." is on screen while the files are written.
                let report = self.session.persist(&mut self.sink)?;
                for file in &report.files {
                    println!("Saved {}", file.display());
                }
                self.outcome = Some(RunOutcome::Completed(report));
            }
            SessionPhase::Done => {
                // "Thank you!" was just presented.
                self.session.hold_farewell();
                self.cleanup_and_exit(event_loop);
                return Ok(());
            }
            _ => {}
        }

        for event in self.session.update() {
            self.session.handle_event(event);
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn handle_key(&mut self, key: Key, event_loop: &ActiveEventLoop) {
        if key.is_quit() {
            self.quit(event_loop);
            return;
        }
        if self.session.handle_event(SessionEvent::KeyPressed(key)) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize canvas");
            }
        }
        info!(width = new_size.width, height = new_size.height, "display resized");
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        let unsaved = self.session.abort();
        if self.outcome.is_none() {
            self.outcome = Some(RunOutcome::Quit { unsaved });
        }
        self.cleanup_and_exit(event_loop);
    }

    fn fail(&mut self, err: anyhow::Error, event_loop: &ActiveEventLoop) {
        error!(error = %err, phase = %self.session.phase(), "session aborted");
        self.failure = Some(err);
        self.cleanup_and_exit(event_loop);
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        event_loop.exit();
    }

    fn log_frame_timing(&self) {
        let summary = self.session.timer.frame_summary();
        debug!(
            samples = summary.samples,
            mean_ms = summary.average_frame_time_ns / 1e6,
            jitter_ms = summary.jitter_ns / 1e6,
            min_ms = summary.min_frame_time_ns / 1e6,
            max_ms = summary.max_frame_time_ns / 1e6,
            fps = summary.effective_fps,
            "frame timing"
        );
        let Some(renderer) = &self.renderer else {
            return;
        };
        for stage in RENDER_STAGES {
            if let Some(s) = renderer.component_summary(stage) {
                debug!(
                    stage,
                    mean_ms = s.average_frame_time_ns / 1e6,
                    max_ms = s.max_frame_time_ns / 1e6,
                    "render stage timing"
                );
            }
        }
        debug!(cached_texts = renderer.cached_texts(), "glyph cache");
    }
}

impl<K: Task> ApplicationHandler for App<K> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(e.context("creating window and surface"), event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(event_loop) {
                    self.fail(e, event_loop);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_key(map_key(event.physical_key), event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }
}
