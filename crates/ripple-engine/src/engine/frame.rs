use anyhow::{Context, Result};

use crate::binding::{BindingKind, ResourceBinder, ResourceHandle};
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputTracker, PointerEvent};
use crate::pipeline::PipelineSet;
use crate::time::SimClock;

use super::sim::{Simulation, state_byte_len};
use super::uniforms::{
    CANVAS_SLOT, CLOCK_SLOT, CONTRACT_VISIBILITY, CanvasUniform, ClockUniform, POINTER_SLOT,
    PointerUniform, STATE_SLOT, WORKGROUP_SIZE,
};

/// Outcome of one scheduler callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineControl {
    Continue,
    Exit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    AwaitFirstFrame,
    SteadyState,
}

/// Workgroup counts for one dispatch: one invocation per cell, rounded up
/// to whole workgroups, with the X extent multiplied by the speed factor.
pub(crate) fn dispatch_extent(width: u32, height: u32, speed: u32) -> (u32, u32) {
    (
        speed * width.div_ceil(WORKGROUP_SIZE),
        height.div_ceil(WORKGROUP_SIZE),
    )
}

/// Owns everything one simulation needs per frame: the binding registry,
/// the pipelines, the clock and the pointer mirror.
///
/// The engine is driven by two calls: [`FrameEngine::tick`] once per
/// scheduler callback and [`FrameEngine::pointer_event`] for input as it
/// arrives. It holds no window or device; both are borrowed per call.
pub struct FrameEngine {
    binder: ResourceBinder,
    pipelines: PipelineSet,
    tracker: InputTracker,
    clock: SimClock,
    speed: u32,
    grid: CanvasUniform,
    pointer: PointerUniform,
    clock_handle: ResourceHandle,
    pointer_handle: ResourceHandle,
    phase: Phase,
}

impl FrameEngine {
    /// Registers the four contract buffers against `gpu` and builds the
    /// pipelines for `sim`'s artifacts.
    ///
    /// The grid is sized from the surface's physical extent at call time
    /// and stays fixed; later resizes stretch the rendered quad instead of
    /// reallocating state.
    pub fn new(gpu: &Gpu<'_>, sim: &Simulation) -> Result<Self> {
        let size = gpu.size();
        let (width, height) = sim.config.grid_for(size.width, size.height);
        let grid = CanvasUniform { width, height };

        let device = gpu.device();
        let queue = gpu.queue();
        let mut binder = ResourceBinder::new();

        let state = vec![0u8; state_byte_len(width, height)];
        binder
            .register(
                device,
                queue,
                "state",
                STATE_SLOT,
                &state,
                BindingKind::Storage,
                CONTRACT_VISIBILITY,
            )
            .context("registering the state buffer")?;

        let clock_handle = binder
            .register(
                device,
                queue,
                "clock",
                CLOCK_SLOT,
                bytemuck::bytes_of(&ClockUniform::default()),
                BindingKind::Uniform,
                CONTRACT_VISIBILITY,
            )
            .context("registering the clock buffer")?;

        binder
            .register(
                device,
                queue,
                "canvas",
                CANVAS_SLOT,
                bytemuck::bytes_of(&grid),
                BindingKind::Uniform,
                CONTRACT_VISIBILITY,
            )
            .context("registering the canvas buffer")?;

        let pointer = PointerUniform::default();
        let pointer_handle = binder
            .register(
                device,
                queue,
                "pointer",
                POINTER_SLOT,
                bytemuck::bytes_of(&pointer),
                BindingKind::Uniform,
                CONTRACT_VISIBILITY,
            )
            .context("registering the pointer buffer")?;

        let pipelines = PipelineSet::build(device, &binder, &sim.shaders, gpu.surface_format())
            .context("building the simulation pipelines")?;

        log::info!(
            "simulation grid {width}x{height} over a {}x{} px surface",
            size.width,
            size.height
        );

        Ok(Self {
            binder,
            pipelines,
            tracker: InputTracker::new(sim.config.downscale),
            clock: SimClock::new(),
            speed: sim.config.speed.max(1),
            grid,
            pointer,
            clock_handle,
            pointer_handle,
            phase: Phase::AwaitFirstFrame,
        })
    }

    /// Advances one scheduler callback.
    ///
    /// The first callback only records the wall-clock baseline, so the
    /// opening frame cannot absorb startup latency as simulated time. Every
    /// later callback uploads the clock, dispatches compute over the grid,
    /// draws the quad, and folds the pointer position forward.
    ///
    /// Compute and render ride one submission: queue submission order is
    /// what makes the step's writes visible to the draw; there is no other
    /// synchronization, and the host never waits on GPU completion.
    pub fn tick(&mut self, gpu: &mut Gpu<'_>, now: f64) -> EngineControl {
        if self.phase == Phase::AwaitFirstFrame {
            self.clock.reset(now);
            self.phase = Phase::SteadyState;
            return EngineControl::Continue;
        }

        let sample = self.clock.tick(now);
        let clock = ClockUniform {
            time: sample.time as f32,
            dt: sample.dt as f32,
        };
        if !self.upload(gpu.queue(), self.clock_handle, bytemuck::bytes_of(&clock)) {
            return EngineControl::Exit;
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("no surface texture this frame: {err}");
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => EngineControl::Exit,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        EngineControl::Continue
                    }
                };
            }
        };

        let (groups_x, groups_y) = dispatch_extent(self.grid.width, self.grid.height, self.speed);
        {
            let mut pass = frame
                .encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("simulation step"),
                    timestamp_writes: None,
                });
            pass.set_pipeline(self.pipelines.compute());
            pass.set_bind_group(0, self.pipelines.bind_group(), &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present quad"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(self.pipelines.render());
            pass.set_bind_group(0, self.pipelines.bind_group(), &[]);
            pass.draw(0..4, 0..1);
        }

        gpu.submit(frame);

        // The position this frame consumed becomes the previous one for the
        // next frame.
        self.pointer.carry();
        let pointer = self.pointer;
        if !self.upload(gpu.queue(), self.pointer_handle, bytemuck::bytes_of(&pointer)) {
            return EngineControl::Exit;
        }

        EngineControl::Continue
    }

    /// Applies a host pointer event and uploads the new pointer state ahead
    /// of the next frame. Previous-position fields are untouched; only the
    /// frame loop folds those forward.
    pub fn pointer_event(&mut self, queue: &wgpu::Queue, event: PointerEvent) {
        self.tracker.apply(event, &mut self.pointer);
        let pointer = self.pointer;
        self.upload(queue, self.pointer_handle, bytemuck::bytes_of(&pointer));
    }

    /// Grid extent in cells, fixed at construction.
    pub fn grid(&self) -> (u32, u32) {
        (self.grid.width, self.grid.height)
    }

    fn upload(&mut self, queue: &wgpu::Queue, handle: ResourceHandle, bytes: &[u8]) -> bool {
        match self.binder.update(queue, handle, bytes) {
            Ok(()) => true,
            Err(err) => {
                log::error!("buffer update failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_rounds_partial_workgroups_up() {
        assert_eq!(dispatch_extent(160, 90, 1), (20, 12));
        assert_eq!(dispatch_extent(161, 89, 1), (21, 12));
    }

    #[test]
    fn exact_multiples_do_not_over_dispatch() {
        assert_eq!(dispatch_extent(8, 8, 1), (1, 1));
        assert_eq!(dispatch_extent(64, 16, 1), (8, 2));
    }

    #[test]
    fn speed_multiplies_only_the_x_extent() {
        assert_eq!(dispatch_extent(160, 90, 4), (80, 12));
    }
}
