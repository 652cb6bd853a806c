use std::collections::BTreeMap;

use crate::binding::ResourceBinder;

use super::error::{PipelineError, Stage};
use super::validate::{self, SlotInfo};

/// WGSL source for the three artifacts the engine consumes.
///
/// Entry points are fixed by name: `compute`, `vertex` and `fragment`. The
/// compute artifact must declare an 8x8 workgroup; the render pair draws a
/// four-vertex triangle strip with no vertex buffers.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub compute: String,
    pub vertex: String,
    pub fragment: String,
}

/// Everything needed to encode one frame: the shared bind group plus the
/// compute and render pipelines built over the same layout.
#[derive(Debug)]
pub struct PipelineSet {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
    compute: wgpu::ComputePipeline,
    render: wgpu::RenderPipeline,
}

impl PipelineSet {
    /// Checks the artifacts against `binder`'s registry, then builds the
    /// shared layout, the bind group and both pipelines.
    ///
    /// All registered slots land in bind group 0, in slot order. Because
    /// the sources were validated first, device-side creation is not
    /// expected to fail for interface reasons.
    pub fn build(
        device: &wgpu::Device,
        binder: &ResourceBinder,
        shaders: &ShaderSources,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, PipelineError> {
        let slots: BTreeMap<u32, SlotInfo> = binder
            .iter()
            .map(|(slot, binding)| {
                (
                    slot,
                    SlotInfo {
                        name: binding.name().to_owned(),
                        kind: binding.kind(),
                        visibility: binding.visibility(),
                        byte_len: binding.byte_len(),
                    },
                )
            })
            .collect();
        validate::validate_sources(&slots, shaders)?;

        let compute_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("compute shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.compute.as_str().into()),
        });
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vertex shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.vertex.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fragment shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.fragment.as_str().into()),
        });

        let slot_bindings = binder.slot_bindings();
        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> =
            slot_bindings.iter().map(|slot| slot.layout_entry).collect();
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("simulation bind group layout"),
            entries: &layout_entries,
        });

        let group_entries: Vec<wgpu::BindGroupEntry<'_>> = slot_bindings
            .into_iter()
            .map(|slot| slot.bind_group_entry)
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("simulation bind group"),
            layout: &bind_group_layout,
            entries: &group_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("simulation pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let compute = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("simulation compute pipeline"),
            layout: Some(&pipeline_layout),
            module: &compute_module,
            entry_point: Some(Stage::Compute.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });

        let render = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("simulation render pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(Stage::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(Stage::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "pipelines built over {} binding slots, target {surface_format:?}",
            layout_entries.len()
        );

        Ok(Self {
            bind_group_layout,
            bind_group,
            pipeline_layout,
            compute,
            render,
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn pipeline_layout(&self) -> &wgpu::PipelineLayout {
        &self.pipeline_layout
    }

    pub fn compute(&self) -> &wgpu::ComputePipeline {
        &self.compute
    }

    pub fn render(&self) -> &wgpu::RenderPipeline {
        &self.render
    }
}
