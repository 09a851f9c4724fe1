use crawler::text::{Records, parse_face, parse_face_indices, parse_matrix, parse_vector};
use glam::{Mat4, Vec3, Vec4};

fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_owned).collect()
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let r = Records::parse("# header\n\n  \nentity a\n  # indented comment\nalive 1\n");
    assert_eq!(r.len(), 2);
    let first: Vec<&[String]> = r.iter().collect();
    assert_eq!(first[0], toks("entity a").as_slice());
}

#[test]
fn empty_input_has_no_records() {
    assert!(Records::parse("").is_empty());
    assert!(Records::parse("\n\r\n# only a comment").is_empty());
}

#[test]
fn vector_defaults_missing_components() {
    assert_eq!(parse_vector(&toks("position 3 4")), Vec3::new(3.0, 4.0, 0.0));
    assert_eq!(parse_vector(&toks("position")), Vec3::ZERO);
    assert_eq!(parse_vector(&toks("position x 2 y")), Vec3::new(0.0, 2.0, 0.0));
}

#[test]
fn matrix_is_read_row_by_row() {
    let m = parse_matrix(&toks("transform 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16"));
    assert_eq!(m.row(0), Vec4::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(m.row(3), Vec4::new(13.0, 14.0, 15.0, 16.0));
    assert_eq!(m.x_axis, Vec4::new(1.0, 5.0, 9.0, 13.0));
}

#[test]
fn malformed_matrix_is_zero() {
    assert_eq!(parse_matrix(&toks("transform 1 2 3")), Mat4::ZERO);
    assert_eq!(parse_matrix(&toks("matrix 1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1")), Mat4::ZERO);
}

#[test]
fn face_indices_are_zero_based() {
    assert_eq!(parse_face_indices("3/2/1"), [2, 1, 0]);
    assert_eq!(parse_face_indices("3//5"), [2, -1, 4]);
    assert_eq!(parse_face_indices("3/5"), [2, -1, 4]);
    assert_eq!(parse_face_indices("7"), [6, -1, -1]);
}

#[test]
fn face_record_needs_three_corners() {
    assert_eq!(parse_face(&toks("f 1/1/1 2/2/2 3/3/3")), [0, 0, 0, 1, 1, 1, 2, 2, 2]);
    assert_eq!(parse_face(&toks("f 1 2")), [0; 9]);
}
