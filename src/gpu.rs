//! The narrow drawing interface the tile world renders through.
//!
//! It mirrors a retained-buffer, immediate-submission style: upload a vertex
//! buffer, point attribute slots into it, issue non-indexed draws by
//! primitive type. [`crate::renderer::Renderer`] implements it on wgpu; tests
//! implement it with a recorder.

use image::RgbaImage;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// How the vertices of one surface are assembled into triangles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Nearest,
    Bilinear,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    #[default]
    ClampToEdge,
    MirroredRepeat,
}

/// Sampling parameters for a texture. Nearest + clamp by default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureParams {
    pub filter: FilterMode,
    pub wrap: WrapMode,
}

/// Where one float attribute lives inside an interleaved vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttrib {
    pub components: u32,
    pub offset: u64,
    pub stride: u64,
}

/// Attribute slot per vertex channel; `None` leaves the channel unbound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AttribSlots {
    pub position: Option<u32>,
    pub color: Option<u32>,
    pub tex_coord: Option<u32>,
    pub normal: Option<u32>,
}

impl AttribSlots {
    pub fn new(position: u32, color: u32, tex_coord: u32) -> Self {
        Self {
            position: Some(position),
            color: Some(color),
            tex_coord: Some(tex_coord),
            normal: None,
        }
    }

    pub fn with_normal(mut self, slot: u32) -> Self {
        self.normal = Some(slot);
        self
    }
}

pub trait DrawSurface {
    /// Upload an RGBA image. `None` when the backend can't allocate one.
    fn create_texture(&mut self, image: &RgbaImage, params: TextureParams) -> Option<TextureId>;

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    /// Replace the contents of `buffer`, or allocate a new buffer when
    /// `buffer` is `None`. Returns the handle now holding `bytes`.
    fn upload_vertices(&mut self, buffer: Option<BufferId>, bytes: &[u8]) -> Option<BufferId>;

    fn bind_vertex_buffer(&mut self, buffer: BufferId);

    fn vertex_attrib(&mut self, slot: u32, attrib: VertexAttrib);

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);
}
