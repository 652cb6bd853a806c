use bytemuck::{Pod, Zeroable};

/// Invocations per workgroup axis. Compute artifacts must declare
/// `@workgroup_size(8, 8)`; dispatch extents are sized against this.
pub const WORKGROUP_SIZE: u32 = 8;

/// Binding slots fixed by the shader contract.
pub const STATE_SLOT: u32 = 0;
pub const CLOCK_SLOT: u32 = 1;
pub const CANVAS_SLOT: u32 = 2;
pub const POINTER_SLOT: u32 = 3;

/// Stage visibility shared by every contract slot. The vertex stage only
/// unfolds the quad and reads nothing.
pub const CONTRACT_VISIBILITY: wgpu::ShaderStages =
    wgpu::ShaderStages::COMPUTE.union(wgpu::ShaderStages::FRAGMENT);

/// Slot 1: simulation clock, seconds.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ClockUniform {
    pub time: f32,
    pub dt: f32,
}

/// Slot 2: simulation grid extent in cells. Written once at startup; the
/// grid does not follow window resizes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct CanvasUniform {
    pub width: u32,
    pub height: u32,
}

/// Slot 3: pointer state in cell coordinates.
///
/// `prev_x`/`prev_y` trail the current position by exactly one rendered
/// frame: they are overwritten by [`PointerUniform::carry`] after each
/// submission, never by input events. `down` is 1.0 while any button is
/// held. The trailing pad keeps the struct at a vec2-aligned 24 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PointerUniform {
    pub x: f32,
    pub y: f32,
    pub prev_x: f32,
    pub prev_y: f32,
    pub down: f32,
    pub pad: f32,
}

impl PointerUniform {
    /// Folds the current position into the previous one. Called once per
    /// rendered frame, after submission.
    pub fn carry(&mut self) {
        self.prev_x = self.x;
        self.prev_y = self.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn uniform_sizes_match_the_shader_structs() {
        assert_eq!(mem::size_of::<ClockUniform>(), 8);
        assert_eq!(mem::size_of::<CanvasUniform>(), 8);
        assert_eq!(mem::size_of::<PointerUniform>(), 24);
    }

    #[test]
    fn carry_folds_the_current_position_into_the_previous() {
        let mut pointer = PointerUniform {
            x: 12.5,
            y: 3.0,
            ..Default::default()
        };

        pointer.carry();
        assert_eq!((pointer.prev_x, pointer.prev_y), (12.5, 3.0));
    }

    #[test]
    fn previous_position_survives_moves_between_carries() {
        let mut pointer = PointerUniform::default();
        pointer.x = 4.0;
        pointer.y = 4.0;
        pointer.carry();

        pointer.x = 9.0;
        pointer.y = 1.0;
        assert_eq!((pointer.prev_x, pointer.prev_y), (4.0, 4.0));
    }
}
