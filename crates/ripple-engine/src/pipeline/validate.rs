//! Static checks of the three WGSL artifacts against the registered
//! bindings. Runs naga's front end ahead of module creation so interface
//! disagreements surface as typed errors instead of device-level faults.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Write;

use wgpu::naga;

use crate::binding::BindingKind;
use crate::engine::WORKGROUP_SIZE;

use super::error::{PipelineError, Stage};
use super::set::ShaderSources;

/// Shape of one registered slot, decoupled from the live buffer so the
/// checks run without a device.
pub(crate) struct SlotInfo {
    pub name: String,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
    pub byte_len: usize,
}

pub(crate) fn validate_sources(
    slots: &BTreeMap<u32, SlotInfo>,
    shaders: &ShaderSources,
) -> Result<(), PipelineError> {
    check_artifact(Stage::Compute, &shaders.compute, slots)?;
    check_artifact(Stage::Vertex, &shaders.vertex, slots)?;
    check_artifact(Stage::Fragment, &shaders.fragment, slots)?;
    Ok(())
}

fn check_artifact(
    stage: Stage,
    source: &str,
    slots: &BTreeMap<u32, SlotInfo>,
) -> Result<(), PipelineError> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|err| PipelineError::ShaderCompile {
            stage,
            message: err.emit_to_string(source),
        })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let info = validator
        .validate(&module)
        .map_err(|err| PipelineError::ShaderCompile {
            stage,
            message: error_chain(&err),
        })?;

    let entry = stage.entry_point();
    let index = module
        .entry_points
        .iter()
        .position(|point| point.stage == naga_stage(stage) && point.name == entry)
        .ok_or_else(|| PipelineError::ShaderCompile {
            stage,
            message: format!("missing entry point `{entry}`"),
        })?;

    if stage == Stage::Compute {
        let declared = module.entry_points[index].workgroup_size;
        let expected = [WORKGROUP_SIZE, WORKGROUP_SIZE, 1];
        if declared != expected {
            return Err(mismatch(
                stage,
                format!(
                    "entry point `{entry}` declares workgroup size {declared:?}; dispatch sizing assumes {expected:?}"
                ),
            ));
        }
    }

    // Declarations the entry point never touches are legal; only resources
    // the stage actually uses have to agree with the registry.
    let usage = info.get_entry_point(index);
    for (handle, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else {
            continue;
        };
        if usage[handle].is_empty() {
            continue;
        }
        check_resource(stage, slots, &module, var, binding)?;
    }

    Ok(())
}

fn check_resource(
    stage: Stage,
    slots: &BTreeMap<u32, SlotInfo>,
    module: &naga::Module,
    var: &naga::GlobalVariable,
    binding: &naga::ResourceBinding,
) -> Result<(), PipelineError> {
    let name = var.name.as_deref().unwrap_or("<unnamed>");

    if binding.group != 0 {
        return Err(mismatch(
            stage,
            format!(
                "`{name}` is bound at group {}; all contract resources live in group 0",
                binding.group
            ),
        ));
    }

    let Some(slot) = slots.get(&binding.binding) else {
        return Err(mismatch(
            stage,
            format!(
                "`{name}` references slot {}, which has no registered resource",
                binding.binding
            ),
        ));
    };

    let declared = match var.space {
        naga::AddressSpace::Uniform => BindingKind::Uniform,
        naga::AddressSpace::Storage { access } => {
            if access.contains(naga::StorageAccess::STORE) {
                BindingKind::Storage
            } else {
                BindingKind::ReadOnlyStorage
            }
        }
        other => {
            return Err(mismatch(
                stage,
                format!("`{name}` lives in address space {other:?}, which cannot bind a buffer"),
            ));
        }
    };
    if declared != slot.kind {
        return Err(mismatch(
            stage,
            format!(
                "`{name}` declares slot {} as {declared} but `{}` was registered as {}",
                binding.binding, slot.name, slot.kind
            ),
        ));
    }

    if !slot.visibility.contains(stage_bit(stage)) {
        return Err(mismatch(
            stage,
            format!(
                "`{}` at slot {} is not visible to the {stage} stage",
                slot.name, binding.binding
            ),
        ));
    }

    // For runtime-sized arrays this is the minimum (one element); fixed-size
    // declarations must fit in the registered allocation outright.
    let min_size = module.types[var.ty].inner.size(module.to_ctx()) as usize;
    if slot.byte_len < min_size {
        return Err(mismatch(
            stage,
            format!(
                "`{}` at slot {} holds {} bytes but `{name}` needs at least {min_size}",
                slot.name, binding.binding, slot.byte_len
            ),
        ));
    }

    Ok(())
}

fn naga_stage(stage: Stage) -> naga::ShaderStage {
    match stage {
        Stage::Compute => naga::ShaderStage::Compute,
        Stage::Vertex => naga::ShaderStage::Vertex,
        Stage::Fragment => naga::ShaderStage::Fragment,
    }
}

fn stage_bit(stage: Stage) -> wgpu::ShaderStages {
    match stage {
        Stage::Compute => wgpu::ShaderStages::COMPUTE,
        Stage::Vertex => wgpu::ShaderStages::VERTEX,
        Stage::Fragment => wgpu::ShaderStages::FRAGMENT,
    }
}

fn mismatch(stage: Stage, message: String) -> PipelineError {
    PipelineError::LayoutMismatch { stage, message }
}

fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_COMPUTE: &str = r#"
        struct Clock { time: f32, dt: f32 }

        @group(0) @binding(0) var<storage, read_write> cells: array<vec4f>;
        @group(0) @binding(1) var<uniform> clock: Clock;

        @compute @workgroup_size(8, 8)
        fn compute(@builtin(global_invocation_id) gid: vec3u) {
            if (gid.x == 0u && gid.y == 0u) {
                cells[0] = vec4f(clock.time * clock.dt);
            }
        }
    "#;

    const GOOD_VERTEX: &str = r#"
        @vertex
        fn vertex(@builtin(vertex_index) index: u32) -> @builtin(position) vec4f {
            let x = f32(index & 1u) * 4.0 - 1.0;
            let y = f32(index >> 1u) * 4.0 - 1.0;
            return vec4f(x, y, 0.0, 1.0);
        }
    "#;

    const GOOD_FRAGMENT: &str = r#"
        @group(0) @binding(0) var<storage, read_write> cells: array<vec4f>;

        @fragment
        fn fragment(@builtin(position) pos: vec4f) -> @location(0) vec4f {
            return cells[u32(pos.x)];
        }
    "#;

    fn both_stages() -> wgpu::ShaderStages {
        wgpu::ShaderStages::COMPUTE | wgpu::ShaderStages::FRAGMENT
    }

    fn contract() -> BTreeMap<u32, SlotInfo> {
        BTreeMap::from([
            (
                0,
                SlotInfo {
                    name: "state".to_owned(),
                    kind: BindingKind::Storage,
                    visibility: both_stages(),
                    byte_len: 4096,
                },
            ),
            (
                1,
                SlotInfo {
                    name: "clock".to_owned(),
                    kind: BindingKind::Uniform,
                    visibility: both_stages(),
                    byte_len: 8,
                },
            ),
        ])
    }

    #[test]
    fn conforming_artifacts_validate() {
        let shaders = ShaderSources {
            compute: GOOD_COMPUTE.to_owned(),
            vertex: GOOD_VERTEX.to_owned(),
            fragment: GOOD_FRAGMENT.to_owned(),
        };
        validate_sources(&contract(), &shaders).unwrap();
    }

    #[test]
    fn malformed_wgsl_is_a_compile_error() {
        let err = check_artifact(Stage::Compute, "@compute fn {", &contract()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShaderCompile {
                stage: Stage::Compute,
                ..
            }
        ));
    }

    #[test]
    fn missing_contract_entry_point_is_a_compile_error() {
        let source = r#"
            @compute @workgroup_size(8, 8)
            fn main() {}
        "#;
        let err = check_artifact(Stage::Compute, source, &contract()).unwrap_err();
        assert!(err.to_string().contains("missing entry point `compute`"));
    }

    #[test]
    fn workgroup_size_must_match_dispatch_sizing() {
        let source = r#"
            @compute @workgroup_size(4, 4)
            fn compute() {}
        "#;
        let err = check_artifact(Stage::Compute, source, &contract()).unwrap_err();
        assert!(matches!(err, PipelineError::LayoutMismatch { .. }));
        assert!(err.to_string().contains("workgroup size"));
    }

    #[test]
    fn unregistered_slot_is_a_layout_mismatch() {
        let source = r#"
            @group(0) @binding(5) var<uniform> stray: vec4f;

            @compute @workgroup_size(8, 8)
            fn compute() {
                let v = stray;
            }
        "#;
        let err = check_artifact(Stage::Compute, source, &contract()).unwrap_err();
        assert!(err.to_string().contains("slot 5"));
    }

    #[test]
    fn unused_declarations_are_ignored() {
        let source = r#"
            @group(0) @binding(5) var<uniform> stray: vec4f;

            @compute @workgroup_size(8, 8)
            fn compute() {}
        "#;
        check_artifact(Stage::Compute, source, &contract()).unwrap();
    }

    #[test]
    fn access_mode_must_match_the_registered_kind() {
        let source = r#"
            @group(0) @binding(0) var<storage, read> cells: array<vec4f>;

            @compute @workgroup_size(8, 8)
            fn compute() {
                let v = cells[0];
            }
        "#;
        let err = check_artifact(Stage::Compute, source, &contract()).unwrap_err();
        assert!(err.to_string().contains("read-only storage"));
    }

    #[test]
    fn resources_outside_group_zero_are_rejected() {
        let source = r#"
            struct Clock { time: f32, dt: f32 }
            @group(1) @binding(1) var<uniform> clock: Clock;

            @compute @workgroup_size(8, 8)
            fn compute() {
                let t = clock.time;
            }
        "#;
        let err = check_artifact(Stage::Compute, source, &contract()).unwrap_err();
        assert!(err.to_string().contains("group 1"));
    }

    #[test]
    fn visibility_must_include_the_consuming_stage() {
        let source = r#"
            struct Clock { time: f32, dt: f32 }
            @group(0) @binding(1) var<uniform> clock: Clock;

            @vertex
            fn vertex() -> @builtin(position) vec4f {
                return vec4f(clock.time, clock.dt, 0.0, 1.0);
            }
        "#;
        let err = check_artifact(Stage::Vertex, source, &contract()).unwrap_err();
        assert!(err.to_string().contains("not visible to the vertex stage"));
    }

    #[test]
    fn registered_buffer_must_cover_the_declared_type() {
        let source = r#"
            struct Clock { time: f32, dt: f32, speed: f32 }
            @group(0) @binding(1) var<uniform> clock: Clock;

            @compute @workgroup_size(8, 8)
            fn compute() {
                let t = clock.speed;
            }
        "#;
        let err = check_artifact(Stage::Compute, source, &contract()).unwrap_err();
        assert!(err.to_string().contains("needs at least 12"));
    }
}
