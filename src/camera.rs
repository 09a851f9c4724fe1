use glam::{IVec2, Mat4, UVec2, Vec2, Vec3};

/// Camera uniform uploaded to the GPU: the matrix applied to the world's
/// NDC-space meshes.
///
/// Layout (column-major, matching WGSL `mat4x4<f32>`):
/// ```text
/// col0: [sx,     0,      0, 0]
/// col1: [0,      sy,     0, 0]
/// col2: [0,      0,      1, 0]
/// col3: [sx*tx,  sy*ty,  0, 1]
/// ```
/// i.e. `scale(s) * translate(t)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Whole world stretched over the window.
    pub fn identity() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }

    pub fn from_mat4(m: Mat4) -> Self {
        Self { view_proj: m.to_cols_array_2d() }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }
}

/// Follows one grid cell, showing a `visible`-sized window onto a
/// `world`-sized grid.
///
/// The world meshes span the whole of NDC; the camera zooms in by
/// `world / visible` and pans so the focus sits at screen centre, except
/// near the edges, where the pan is clamped so no space outside the world
/// shows.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Grid-space point at screen centre (cell centres sit at `+0.5`).
    pub position: Vec2,
    target: Vec2,
    /// Fraction of the remaining distance covered per second; `0` snaps.
    pub follow_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self { position: Vec2::ZERO, target: Vec2::ZERO, follow_speed: 0.0 }
    }

    pub fn with_follow_speed(mut self, speed: f32) -> Self {
        self.follow_speed = speed;
        self
    }

    /// Focus on `cell`, easing there over the next ticks.
    pub fn follow(&mut self, cell: IVec2) {
        self.target = cell.as_vec2() + Vec2::splat(0.5);
        if self.follow_speed <= 0.0 {
            self.position = self.target;
        }
    }

    /// Jump straight to `cell`.
    pub fn snap_to(&mut self, cell: IVec2) {
        self.target = cell.as_vec2() + Vec2::splat(0.5);
        self.position = self.target;
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Advance the follow easing by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.follow_speed <= 0.0 {
            self.position = self.target;
            return;
        }
        let t = (self.follow_speed * dt).min(1.0);
        self.position += (self.target - self.position) * t;
    }

    pub fn build_view_proj(&self, visible: UVec2, world: UVec2) -> CameraUniform {
        if visible.x == 0 || visible.y == 0 || world.x == 0 || world.y == 0 {
            return CameraUniform::identity();
        }
        let world_f = world.as_vec2();
        let scale = (world_f / visible.as_vec2()).max(Vec2::ONE);

        // Focus in NDC, y flipped.
        let focus = Vec2::new(
            2.0 * self.position.x / world_f.x - 1.0,
            1.0 - 2.0 * self.position.y / world_f.y,
        );
        let limit = Vec2::ONE - Vec2::ONE / scale;
        let pan = (-focus).clamp(-limit, limit);

        let m = Mat4::from_scale(Vec3::new(scale.x, scale.y, 1.0))
            * Mat4::from_translation(Vec3::new(pan.x, pan.y, 0.0));
        CameraUniform::from_mat4(m)
    }
}
