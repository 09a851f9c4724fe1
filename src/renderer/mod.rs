pub mod atlas;
pub mod pipeline;

use std::sync::Arc;

use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use pipeline::{MeshPipeline, create_mesh_pipeline, expected_attrib, triangulate};

use crate::camera::CameraUniform;
use crate::gpu::{
    BufferId, DrawSurface, FilterMode, Primitive, TextureId, TextureParams, VertexAttrib, WrapMode,
};

struct GpuTexture {
    bind_group: wgpu::BindGroup,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    /// Bytes written by the last upload.
    len: u64,
}

/// One recorded `draw_arrays`, already triangulated into the frame's
/// index list.
struct DrawCall {
    texture: TextureId,
    buffer: BufferId,
    first_index: u32,
    index_count: u32,
}

/// wgpu backend for [`DrawSurface`].
///
/// Draw calls are recorded between [`Renderer::begin_frame`] and
/// [`Renderer::render_frame`] and replayed in one render pass. Fans and
/// strips are expanded to an index list since wgpu only rasterises lists
/// and strips without primitive restart.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    mesh_pipeline: MeshPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    textures: Vec<GpuTexture>,
    buffers: Vec<GpuBuffer>,
    // ── Per-frame state ─────────────────────────────────────────────────────
    bound_texture: Option<TextureId>,
    bound_buffer: Option<BufferId>,
    /// Shader slots enabled through `vertex_attrib` with a matching layout.
    enabled_slots: u32,
    indices: Vec<u32>,
    draws: Vec<DrawCall>,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .expect("failed to create window surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .expect("no suitable GPU adapter found");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mesh_pipeline = create_mesh_pipeline(&device, format);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::identity()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &mesh_pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Self {
            window,
            surface,
            device,
            queue,
            config,
            mesh_pipeline,
            camera_buffer,
            camera_bind_group,
            textures: Vec::new(),
            buffers: Vec::new(),
            bound_texture: None,
            bound_buffer: None,
            enabled_slots: 0,
            indices: Vec::new(),
            draws: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64) {
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
    }

    /// Forget the previous frame's draw calls and bindings.
    pub fn begin_frame(&mut self) {
        self.bound_texture = None;
        self.bound_buffer = None;
        self.enabled_slots = 0;
        self.indices.clear();
        self.draws.clear();
    }

    /// Replay every draw recorded since `begin_frame` through `camera`.
    pub fn render_frame(&mut self, camera: &CameraUniform) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(std::slice::from_ref(camera)),
        );

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let index_buffer = (!self.indices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame_index_buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("world_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(index_buffer) = &index_buffer {
                pass.set_pipeline(&self.mesh_pipeline.render_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for draw in &self.draws {
                    let (Some(texture), Some(buffer)) = (
                        self.textures.get(draw.texture.0 as usize),
                        self.buffers.get(draw.buffer.0 as usize),
                    ) else {
                        continue;
                    };
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                    pass.set_vertex_buffer(0, buffer.buffer.slice(..buffer.len));
                    let range = draw.first_index..draw.first_index + draw.index_count;
                    pass.draw_indexed(range, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn create_sampler(&self, params: TextureParams) -> wgpu::Sampler {
        let filter = match params.filter {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Bilinear => wgpu::FilterMode::Linear,
        };
        let address_mode = match params.wrap {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        };
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        })
    }
}

impl DrawSurface for Renderer {
    fn create_texture(&mut self, image: &RgbaImage, params: TextureParams) -> Option<TextureId> {
        let (w, h) = image.dimensions();
        let max = self.device.limits().max_texture_dimension_2d;
        if w == 0 || h == 0 || w > max || h > max {
            log::warn!("cannot create a {w}x{h} texture (limit {max})");
            return None;
        }

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("sprite_tex"),
                size: wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.create_sampler(params);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_tex_bg"),
            layout: &self.mesh_pipeline.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        self.textures.push(GpuTexture { bind_group });
        Some(TextureId(self.textures.len() as u32 - 1))
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        if unit != 0 {
            log::trace!("texture unit {unit} is not sampled by the mesh pipeline");
            return;
        }
        self.bound_texture = Some(texture);
    }

    fn upload_vertices(&mut self, buffer: Option<BufferId>, bytes: &[u8]) -> Option<BufferId> {
        let len = bytes.len() as u64;
        if let Some(id) = buffer
            && let Some(slot) = self.buffers.get_mut(id.0 as usize)
            && slot.buffer.size() >= len
        {
            self.queue.write_buffer(&slot.buffer, 0, bytes);
            slot.len = len;
            return Some(id);
        }

        let fresh = GpuBuffer {
            buffer: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }),
            len,
        };
        match buffer.filter(|id| (id.0 as usize) < self.buffers.len()) {
            Some(id) => {
                self.buffers[id.0 as usize] = fresh;
                Some(id)
            }
            None => {
                self.buffers.push(fresh);
                Some(BufferId(self.buffers.len() as u32 - 1))
            }
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId) {
        self.bound_buffer = Some(buffer);
    }

    fn vertex_attrib(&mut self, slot: u32, attrib: VertexAttrib) {
        if expected_attrib(slot) == Some(attrib) {
            self.enabled_slots |= 1 << slot;
        } else {
            log::warn!("vertex attribute {attrib:?} at slot {slot} does not match the mesh layout");
        }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        let (Some(texture), Some(buffer)) = (self.bound_texture, self.bound_buffer) else {
            log::trace!("draw without a bound texture or vertex buffer; skipped");
            return;
        };
        if self.enabled_slots & 1 == 0 {
            log::trace!("draw without a position attribute; skipped");
            return;
        }
        let first_index = self.indices.len() as u32;
        triangulate(primitive, first, count, &mut self.indices);
        let index_count = self.indices.len() as u32 - first_index;
        if index_count > 0 {
            self.draws.push(DrawCall { texture, buffer, first_index, index_count });
        }
    }
}
