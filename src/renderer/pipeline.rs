use crate::gpu::{AttribSlots, Primitive, VertexAttrib};
use crate::mesh::MeshVertex;

/// Shader locations of the mesh pipeline's vertex inputs.
pub const MESH_SLOTS: AttribSlots = AttribSlots {
    position: Some(0),
    color: Some(1),
    tex_coord: Some(2),
    normal: Some(3),
};

const MESH_ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,  // position
    1 => Float32x3,  // color
    2 => Float32x2,  // tex_coord
    3 => Float32x3,  // normal
];

pub fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: MeshVertex::STRIDE as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &MESH_ATTRIBS,
    }
}

/// The interleaved attribute the pipeline reads at shader `slot`, if any.
pub fn expected_attrib(slot: u32) -> Option<VertexAttrib> {
    match slot {
        0 => Some(MeshVertex::POSITION),
        1 => Some(MeshVertex::COLOR),
        2 => Some(MeshVertex::TEX_COORD),
        3 => Some(MeshVertex::NORMAL),
        _ => None,
    }
}

/// Append triangle-list indices for `count` vertices starting at `first`.
///
/// Strips alternate winding per triangle so every triangle keeps the
/// orientation of the first; fans pivot on `first`. Trailing vertices that
/// don't complete a triangle are ignored.
pub fn triangulate(primitive: Primitive, first: u32, count: u32, out: &mut Vec<u32>) {
    match primitive {
        Primitive::TriangleList => {
            out.extend(first..first + count / 3 * 3);
        }
        Primitive::TriangleStrip => {
            for i in 0..count.saturating_sub(2) {
                let v = first + i;
                if i % 2 == 0 {
                    out.extend([v, v + 1, v + 2]);
                } else {
                    out.extend([v + 1, v, v + 2]);
                }
            }
        }
        Primitive::TriangleFan => {
            for i in 1..count.saturating_sub(1) {
                out.extend([first, first + i, first + i + 1]);
            }
        }
    }
}

pub struct MeshPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
}

pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> MeshPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
    });

    let camera_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let texture_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh_pipeline_layout"),
        bind_group_layouts: &[&camera_bind_group_layout, &texture_bind_group_layout],
        ..Default::default()
    });

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[mesh_vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    MeshPipeline {
        render_pipeline,
        camera_bind_group_layout,
        texture_bind_group_layout,
    }
}
