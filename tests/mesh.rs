mod common;

use common::{Call, RecordingSurface};
use crawler::gpu::{AttribSlots, Primitive};
use crawler::mesh::{Mesh, MeshVertex};

#[test]
fn vertex_without_surface_is_dropped() {
    let mut mesh = Mesh::new();
    mesh.vertex(1.0, 2.0, 3.0);
    assert_eq!(mesh.vertex_count(), 0);
    assert!(mesh.surfaces().is_empty());
}

#[test]
fn cursor_is_sticky_across_vertices() {
    let mut mesh = Mesh::new();
    mesh.new_surface(Primitive::TriangleStrip);
    mesh.color(1.0, 0.0, 0.0);
    mesh.tex_coord(0.5, 0.25);
    mesh.vertex(0.0, 0.0, 0.0);
    mesh.normal(0.0, 1.0, 0.0);
    mesh.vertex(1.0, 0.0, 0.0);

    let v = mesh.vertices();
    assert_eq!(v[0].color, [1.0, 0.0, 0.0]);
    assert_eq!(v[0].normal, [0.0, 0.0, 1.0]);
    assert_eq!(v[1].color, [1.0, 0.0, 0.0]);
    assert_eq!(v[1].tex_coord, [0.5, 0.25]);
    assert_eq!(v[1].normal, [0.0, 1.0, 0.0]);
}

#[test]
fn surfaces_track_first_vertex_and_count() {
    let mut mesh = Mesh::new();
    mesh.new_surface(Primitive::TriangleFan);
    for _ in 0..4 {
        mesh.vertex(0.0, 0.0, 0.0);
    }
    mesh.new_surface(Primitive::TriangleStrip);
    mesh.new_surface(Primitive::TriangleList);
    for _ in 0..3 {
        mesh.vertex(0.0, 0.0, 0.0);
    }

    let s = mesh.surfaces();
    assert_eq!((s[0].first_vertex, s[0].vertex_count), (0, 4));
    assert_eq!((s[1].first_vertex, s[1].vertex_count), (4, 0));
    assert_eq!((s[2].first_vertex, s[2].vertex_count), (4, 3));
    assert_eq!(mesh.vertex_count(), 7);
}

#[test]
fn clear_drops_everything_and_marks_dirty() {
    let mut mesh = Mesh::new();
    mesh.new_surface(Primitive::TriangleFan);
    mesh.vertex(0.0, 0.0, 0.0);
    let mut gpu = RecordingSurface::new();
    mesh.draw(&mut gpu, AttribSlots::new(0, 1, 2));
    assert!(!mesh.is_dirty());

    mesh.clear();
    assert!(mesh.is_dirty());
    assert_eq!(mesh.vertex_count(), 0);
    assert!(mesh.surfaces().is_empty());
}

#[test]
fn draw_uploads_binds_and_issues_one_call_per_surface() {
    let mut mesh = Mesh::new();
    mesh.new_surface(Primitive::TriangleFan);
    for _ in 0..4 {
        mesh.vertex(0.0, 0.0, 0.0);
    }
    mesh.new_surface(Primitive::TriangleStrip);
    mesh.new_surface(Primitive::TriangleStrip);
    for _ in 0..5 {
        mesh.vertex(1.0, 1.0, 1.0);
    }

    let mut gpu = RecordingSurface::new();
    mesh.draw(&mut gpu, AttribSlots::new(0, 1, 2).with_normal(3));

    let buffer = mesh.buffer().unwrap();
    assert_eq!(gpu.calls[0], Call::Upload { buffer: None, len: 9 * 44 });
    assert_eq!(gpu.calls[1], Call::BindVertexBuffer(buffer));
    assert_eq!(gpu.calls[2], Call::Attrib { slot: 0, attrib: MeshVertex::POSITION });
    assert_eq!(gpu.calls[3], Call::Attrib { slot: 1, attrib: MeshVertex::COLOR });
    assert_eq!(gpu.calls[4], Call::Attrib { slot: 2, attrib: MeshVertex::TEX_COORD });
    assert_eq!(gpu.calls[5], Call::Attrib { slot: 3, attrib: MeshVertex::NORMAL });
    assert_eq!(
        gpu.draws(),
        vec![(Primitive::TriangleFan, 0, 4), (Primitive::TriangleStrip, 4, 5)]
    );
    assert_eq!(gpu.buffer_bytes(buffer), bytemuck::cast_slice::<MeshVertex, u8>(mesh.vertices()));
}

#[test]
fn clean_mesh_reuses_its_buffer() {
    let mut mesh = Mesh::new();
    mesh.new_surface(Primitive::TriangleList);
    for _ in 0..3 {
        mesh.vertex(0.0, 0.0, 0.0);
    }
    let mut gpu = RecordingSurface::new();
    let slots = AttribSlots::new(0, 1, 2);
    mesh.draw(&mut gpu, slots);
    mesh.draw(&mut gpu, slots);
    assert_eq!(gpu.uploads(), 1);

    let first = mesh.buffer();
    mesh.clear();
    mesh.new_surface(Primitive::TriangleList);
    mesh.vertex(0.0, 0.0, 0.0);
    mesh.draw(&mut gpu, slots);
    assert_eq!(gpu.uploads(), 2);
    assert_eq!(mesh.buffer(), first, "rebuilds write into the same buffer");
    assert_eq!(gpu.calls.iter().rev().find(|c| matches!(c, Call::Upload { .. })), Some(&Call::Upload { buffer: first, len: 44 }));
}

#[test]
fn empty_mesh_draws_nothing() {
    let mut mesh = Mesh::new();
    mesh.new_surface(Primitive::TriangleFan);
    let mut gpu = RecordingSurface::new();
    mesh.draw(&mut gpu, AttribSlots::new(0, 1, 2));
    assert!(gpu.calls.is_empty());
}
