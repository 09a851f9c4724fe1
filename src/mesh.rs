use std::mem::{offset_of, size_of};

use glam::{Vec2, Vec3};

use crate::gpu::{AttribSlots, BufferId, DrawSurface, Primitive, VertexAttrib};

// ── Vertex ───────────────────────────────────────────────────────────────────

/// One interleaved vertex: 11 floats, 44 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub tex_coord: [f32; 2],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub const STRIDE: u64 = size_of::<MeshVertex>() as u64;

    pub const POSITION: VertexAttrib = Self::attrib(3, offset_of!(MeshVertex, position));
    pub const COLOR: VertexAttrib = Self::attrib(3, offset_of!(MeshVertex, color));
    pub const TEX_COORD: VertexAttrib = Self::attrib(2, offset_of!(MeshVertex, tex_coord));
    pub const NORMAL: VertexAttrib = Self::attrib(3, offset_of!(MeshVertex, normal));

    const fn attrib(components: u32, offset: usize) -> VertexAttrib {
        VertexAttrib { components, offset: offset as u64, stride: Self::STRIDE }
    }
}

// ── AttribCursor ─────────────────────────────────────────────────────────────

/// Sticky per-vertex state: set once, stamped onto every following vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttribCursor {
    pub color: Vec3,
    pub tex_coord: Vec2,
    pub normal: Vec3,
}

impl Default for AttribCursor {
    fn default() -> Self {
        Self { color: Vec3::ONE, tex_coord: Vec2::ZERO, normal: Vec3::Z }
    }
}

impl AttribCursor {
    fn stamp(&self, position: Vec3) -> MeshVertex {
        MeshVertex {
            position: position.to_array(),
            color: self.color.to_array(),
            tex_coord: self.tex_coord.to_array(),
            normal: self.normal.to_array(),
        }
    }
}

// ── Surface ──────────────────────────────────────────────────────────────────

/// A contiguous run of vertices drawn with one primitive type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub primitive: Primitive,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

// ── Mesh ─────────────────────────────────────────────────────────────────────

/// CPU-side vertex arena plus its lazily uploaded GPU copy.
///
/// Rebuilt wholesale: `clear` keeps the allocations so a rebuild of the same
/// size doesn't reallocate, and the GPU buffer handle is reused on upload.
#[derive(Debug)]
pub struct Mesh {
    cursor: AttribCursor,
    vertices: Vec<MeshVertex>,
    surfaces: Vec<Surface>,
    /// GPU copy is stale.
    dirty: bool,
    buffer: Option<BufferId>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            cursor: AttribCursor::default(),
            vertices: Vec::new(),
            surfaces: Vec::new(),
            dirty: true,
            buffer: None,
        }
    }

    pub fn vertices(&self) -> &[MeshVertex] { &self.vertices }
    pub fn surfaces(&self) -> &[Surface] { &self.surfaces }
    pub fn vertex_count(&self) -> u32 { self.vertices.len() as u32 }
    pub fn is_dirty(&self) -> bool { self.dirty }
    pub fn cursor(&self) -> &AttribCursor { &self.cursor }
    pub fn buffer(&self) -> Option<BufferId> { self.buffer }

    pub fn color(&mut self, r: f32, g: f32, b: f32) {
        self.cursor.color = Vec3::new(r, g, b);
    }

    pub fn tex_coord(&mut self, s: f32, t: f32) {
        self.cursor.tex_coord = Vec2::new(s, t);
    }

    pub fn normal(&mut self, x: f32, y: f32, z: f32) {
        self.cursor.normal = Vec3::new(x, y, z);
    }

    /// Emit a vertex into the last surface. Dropped when no surface exists.
    pub fn vertex(&mut self, x: f32, y: f32, z: f32) {
        let Some(surface) = self.surfaces.last_mut() else { return };
        surface.vertex_count += 1;
        self.vertices.push(self.cursor.stamp(Vec3::new(x, y, z)));
        self.dirty = true;
    }

    /// Open a new surface starting at the current end of the vertex arena.
    pub fn new_surface(&mut self, primitive: Primitive) {
        self.surfaces.push(Surface {
            primitive,
            first_vertex: self.vertex_count(),
            vertex_count: 0,
        });
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.surfaces.clear();
        self.dirty = true;
    }

    /// Upload if stale, bind the given attribute slots, then issue one draw
    /// per non-empty surface. An empty mesh draws nothing.
    pub fn draw<S: DrawSurface + ?Sized>(&mut self, gpu: &mut S, slots: AttribSlots) {
        if self.vertices.is_empty() {
            return;
        }
        if self.dirty || self.buffer.is_none() {
            self.buffer = gpu.upload_vertices(self.buffer, bytemuck::cast_slice(&self.vertices));
            self.dirty = false;
        }
        let Some(buffer) = self.buffer else {
            log::warn!("mesh: vertex upload failed; skipping draw");
            return;
        };

        gpu.bind_vertex_buffer(buffer);
        let channels = [
            (slots.position, MeshVertex::POSITION),
            (slots.color, MeshVertex::COLOR),
            (slots.tex_coord, MeshVertex::TEX_COORD),
            (slots.normal, MeshVertex::NORMAL),
        ];
        for (slot, attrib) in channels {
            if let Some(slot) = slot {
                gpu.vertex_attrib(slot, attrib);
            }
        }
        for surface in self.surfaces.iter().filter(|s| s.vertex_count > 0) {
            gpu.draw_arrays(surface.primitive, surface.first_vertex, surface.vertex_count);
        }
    }
}
