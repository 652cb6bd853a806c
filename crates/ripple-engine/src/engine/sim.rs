use std::collections::BTreeMap;
use std::mem;

use crate::binding::BindingKind;
use crate::pipeline::validate::{self, SlotInfo};
use crate::pipeline::{PipelineError, ShaderSources};

use super::uniforms::{
    CANVAS_SLOT, CLOCK_SLOT, CONTRACT_VISIBILITY, CanvasUniform, ClockUniform, POINTER_SLOT,
    PointerUniform, STATE_SLOT,
};

/// Tunables for a simulation instance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimConfig {
    /// Physical pixels per simulation cell along each axis.
    pub downscale: u32,
    /// Multiplies the X dispatch extent. Shaders that substep consume the
    /// extra columns; the bundled artifacts run at 1.
    pub speed: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            downscale: 8,
            speed: 1,
        }
    }
}

impl SimConfig {
    /// Grid extent in cells for a surface of the given physical size.
    /// Truncating division, clamped so neither axis reaches zero.
    pub fn grid_for(&self, physical_width: u32, physical_height: u32) -> (u32, u32) {
        let downscale = self.downscale.max(1);
        (
            (physical_width / downscale).max(1),
            (physical_height / downscale).max(1),
        )
    }
}

/// A simulation: three WGSL artifacts plus the tunables they run under.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub shaders: ShaderSources,
    pub config: SimConfig,
}

impl Simulation {
    /// Checks the artifacts against the binding contract without touching
    /// a device.
    ///
    /// Uses a one-cell nominal grid, which is exact for the runtime-sized
    /// state array the contract names. The same checks run again during
    /// pipeline construction against the real grid.
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate::validate_sources(&contract_slots(1, 1), &self.shaders)
    }
}

/// Byte length of the state buffer for a grid of the given extent: one
/// vec4<f32> per cell.
pub(crate) fn state_byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * mem::size_of::<[f32; 4]>()
}

pub(crate) fn contract_slots(width: u32, height: u32) -> BTreeMap<u32, SlotInfo> {
    BTreeMap::from([
        (
            STATE_SLOT,
            SlotInfo {
                name: "state".to_owned(),
                kind: BindingKind::Storage,
                visibility: CONTRACT_VISIBILITY,
                byte_len: state_byte_len(width, height),
            },
        ),
        (
            CLOCK_SLOT,
            SlotInfo {
                name: "clock".to_owned(),
                kind: BindingKind::Uniform,
                visibility: CONTRACT_VISIBILITY,
                byte_len: mem::size_of::<ClockUniform>(),
            },
        ),
        (
            CANVAS_SLOT,
            SlotInfo {
                name: "canvas".to_owned(),
                kind: BindingKind::Uniform,
                visibility: CONTRACT_VISIBILITY,
                byte_len: mem::size_of::<CanvasUniform>(),
            },
        ),
        (
            POINTER_SLOT,
            SlotInfo {
                name: "pointer".to_owned(),
                kind: BindingKind::Uniform,
                visibility: CONTRACT_VISIBILITY,
                byte_len: mem::size_of::<PointerUniform>(),
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;

    #[test]
    fn grid_truncates_toward_zero() {
        let config = SimConfig::default();
        assert_eq!(config.grid_for(1280, 720), (160, 90));
        assert_eq!(config.grid_for(1287, 725), (160, 90));
    }

    #[test]
    fn tiny_surfaces_still_get_one_cell() {
        let config = SimConfig::default();
        assert_eq!(config.grid_for(4, 4), (1, 1));
        assert_eq!(config.grid_for(0, 720), (1, 90));
    }

    #[test]
    fn zero_downscale_is_treated_as_one() {
        let config = SimConfig {
            downscale: 0,
            speed: 1,
        };
        assert_eq!(config.grid_for(100, 50), (100, 50));
    }

    #[test]
    fn contract_covers_the_four_fixed_slots() {
        let slots = contract_slots(3, 2);
        assert_eq!(
            slots.keys().copied().collect::<Vec<_>>(),
            vec![STATE_SLOT, CLOCK_SLOT, CANVAS_SLOT, POINTER_SLOT]
        );
        assert_eq!(slots[&STATE_SLOT].byte_len, 96);
        assert_eq!(slots[&POINTER_SLOT].byte_len, 24);
    }

    fn trio(vertex_entry: &str) -> ShaderSources {
        ShaderSources {
            compute: "@compute @workgroup_size(8, 8) fn compute() {}".to_owned(),
            vertex: format!(
                "@vertex fn {vertex_entry}() -> @builtin(position) vec4f {{ return vec4f(0.0); }}"
            ),
            fragment: "@fragment fn fragment() -> @location(0) vec4f { return vec4f(0.0); }"
                .to_owned(),
        }
    }

    #[test]
    fn validate_accepts_a_minimal_conforming_trio() {
        let sim = Simulation {
            shaders: trio("vertex"),
            config: SimConfig::default(),
        };
        sim.validate().unwrap();
    }

    #[test]
    fn validate_rejects_artifacts_that_break_the_contract() {
        let sim = Simulation {
            shaders: trio("main"),
            config: SimConfig::default(),
        };
        let err = sim.validate().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShaderCompile {
                stage: Stage::Vertex,
                ..
            }
        ));
    }
}
