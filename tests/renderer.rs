use crawler::camera::{Camera, CameraUniform};
use crawler::gpu::Primitive;
use crawler::renderer::pipeline::{MESH_SLOTS, expected_attrib, triangulate};
use glam::{IVec2, UVec2, Vec4};

fn tris(primitive: Primitive, first: u32, count: u32) -> Vec<u32> {
    let mut out = Vec::new();
    triangulate(primitive, first, count, &mut out);
    out
}

// ── Triangulation ────────────────────────────────────────────────────────────

#[test]
fn fan_quad_becomes_two_triangles_around_first_vertex() {
    assert_eq!(tris(Primitive::TriangleFan, 8, 4), vec![8, 9, 10, 8, 10, 11]);
}

#[test]
fn strip_alternates_winding() {
    assert_eq!(tris(Primitive::TriangleStrip, 0, 5), vec![0, 1, 2, 2, 1, 3, 2, 3, 4]);
}

#[test]
fn list_drops_incomplete_triangle() {
    assert_eq!(tris(Primitive::TriangleList, 3, 7), vec![3, 4, 5, 6, 7, 8]);
}

#[test]
fn degenerate_counts_emit_nothing() {
    for primitive in [Primitive::TriangleFan, Primitive::TriangleStrip, Primitive::TriangleList] {
        for count in 0..3 {
            assert!(tris(primitive, 0, count).is_empty(), "{primitive:?} with {count}");
        }
    }
}

#[test]
fn indices_append_to_existing_list() {
    let mut out = vec![42];
    triangulate(Primitive::TriangleFan, 0, 3, &mut out);
    assert_eq!(out, vec![42, 0, 1, 2]);
}

// ── Vertex layout ────────────────────────────────────────────────────────────

#[test]
fn every_mesh_slot_has_a_layout() {
    for slot in [MESH_SLOTS.position, MESH_SLOTS.color, MESH_SLOTS.tex_coord, MESH_SLOTS.normal] {
        assert!(expected_attrib(slot.unwrap()).is_some());
    }
    assert!(expected_attrib(4).is_none());
}

// ── Camera ───────────────────────────────────────────────────────────────────

#[test]
fn camera_degrades_to_identity_for_empty_world() {
    let cam = Camera::new();
    assert_eq!(cam.build_view_proj(UVec2::ZERO, UVec2::new(4, 4)), CameraUniform::identity());
    assert_eq!(cam.build_view_proj(UVec2::new(4, 4), UVec2::ZERO), CameraUniform::identity());
}

#[test]
fn camera_keeps_far_corner_on_screen() {
    let mut cam = Camera::new();
    cam.snap_to(IVec2::new(23, 15));
    let u = cam.build_view_proj(UVec2::new(12, 9), UVec2::new(24, 16));
    let corner = u.to_mat4() * Vec4::new(1.0, -1.0, 0.0, 1.0);
    assert!((corner.x - 1.0).abs() < 1e-5 && (corner.y + 1.0).abs() < 1e-5, "{corner:?}");
}
