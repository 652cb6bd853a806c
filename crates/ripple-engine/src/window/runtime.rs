use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::engine::{EngineControl, FrameEngine, Simulation};
use crate::input::PointerEvent;

/// Window and event-loop configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "ripple".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime: one window, one simulation, driven until
/// the window closes or the engine stops.
pub struct Runtime;

impl Runtime {
    /// Runs the simulation to completion on the calling thread.
    ///
    /// Startup failures inside the loop (window, GPU context, pipelines)
    /// are returned from here once the loop has wound down.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, sim: Simulation) -> Result<()> {
        let event_loop = EventLoop::new().context("creating the event loop")?;
        let mut state = AppState::new(config, gpu_init, sim);

        event_loop
            .run_app(&mut state)
            .context("event loop terminated abnormally")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    sim: Simulation,

    entry: Option<WindowEntry>,
    engine: Option<FrameEngine>,
    started: Instant,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, sim: Simulation) -> Self {
        Self {
            config,
            gpu_init,
            sim,
            entry: None,
            engine: None,
            started: Instant::now(),
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("creating the window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |window| pollster::block_on(Gpu::new(window, gpu_init)),
        }
        .try_build()
        .context("failed to initialize the GPU context")?;

        let engine = entry
            .with_gpu(|gpu| FrameEngine::new(gpu, &self.sim))
            .context("failed to start the frame engine")?;

        entry.with_window(|w| w.request_redraw());

        self.entry = Some(entry);
        self.engine = Some(engine);
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Some platforms resume more than once; the window is created once.
        if self.entry.is_some() {
            return;
        }

        if let Err(err) = self.init_window(event_loop) {
            log::error!("startup failed: {err:#}");
            self.failure = Some(err);
            self.request_exit();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // One redraw per presented frame; FIFO presentation paces the loop.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let owns_event = self
            .entry
            .as_ref()
            .is_some_and(|entry| entry.with_window(|w| w.id()) == window_id);
        if !owns_event {
            return;
        }

        if let Some(pointer) = translate_pointer_event(&event) {
            if let (Some(entry), Some(engine)) = (&self.entry, &mut self.engine) {
                entry.with_gpu(|gpu| engine.pointer_event(gpu.queue(), pointer));
            }
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.request_exit();
                event_loop.exit();
            }

            // The surface follows the window; the simulation grid does not.
            WindowEvent::Resized(new_size) => {
                if let Some(entry) = &mut self.entry {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = &mut self.entry {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                let now = self.started.elapsed().as_secs_f64();
                let mut control = EngineControl::Continue;

                if let (Some(entry), Some(engine)) = (&mut self.entry, &mut self.engine) {
                    control = entry.with_gpu_mut(|gpu| engine.tick(gpu, now));
                }

                if control == EngineControl::Exit {
                    log::error!("frame engine stopped; shutting down");
                    self.request_exit();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

/// Reduces window events to the pointer events the engine consumes.
/// Positions stay in physical pixels; the engine's tracker converts them to
/// cell coordinates.
fn translate_pointer_event(event: &WindowEvent) -> Option<PointerEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some(PointerEvent::Moved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput {
            state: ElementState::Pressed,
            ..
        } => Some(PointerEvent::Pressed),
        WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } => Some(PointerEvent::Released),
        _ => None,
    }
}
