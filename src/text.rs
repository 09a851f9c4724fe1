//! Line-oriented record parsing for the flat-text level files.
//!
//! Input is split into lines on runs of `\n` / `\r`; every line is split on
//! whitespace. Lines whose first token starts with `#` are comments, lines
//! without tokens are dropped. Nothing here ever fails: short or malformed
//! records decode to zeros / sentinels and the consumer carries on.

use glam::{Mat4, Vec3};

// ── Records ──────────────────────────────────────────────────────────────────

/// Ordered token records of a text file, one per non-comment, non-empty line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Records {
    lines: Vec<Vec<String>>,
}

impl Records {
    pub fn parse(data: &str) -> Self {
        let lines = data
            .split(['\n', '\r'])
            .filter_map(|line| {
                let tokens: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
                match tokens.first() {
                    None => None,
                    Some(first) if first.starts_with('#') => None,
                    Some(_) => Some(tokens),
                }
            })
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.lines.iter().map(Vec::as_slice)
    }
}

// ── Token decoding ───────────────────────────────────────────────────────────

/// Integer value of the token's leading `[+-]digits`, `0` when there are none.
///
/// Trailing text is ignored, so `"3.9"` and `"3abc"` both read as `3`.
pub fn parse_int(token: &str) -> i32 {
    let token = token.trim_start();
    let sign = usize::from(token.starts_with(['+', '-']));
    let digits = token[sign..].bytes().take_while(u8::is_ascii_digit).count();
    token[..sign + digits].parse().unwrap_or(0)
}

/// Float value of a token, `0.0` when it doesn't parse.
pub fn parse_float(token: &str) -> f32 {
    token.parse().unwrap_or(0.0)
}

/// `tokens[1..=3]` as a vector; missing components are `0.0`.
pub fn parse_vector(tokens: &[String]) -> Vec3 {
    let at = |i: usize| tokens.get(i).map_or(0.0, |t| parse_float(t));
    Vec3::new(at(1), at(2), at(3))
}

/// A `transform m11 m12 .. m44` record: sixteen values written row by row.
///
/// Anything else (wrong keyword, fewer than sixteen values) is the zero matrix.
pub fn parse_matrix(tokens: &[String]) -> Mat4 {
    if tokens.len() <= 16 || tokens[0] != "transform" {
        return Mat4::ZERO;
    }
    let mut rows = [0.0f32; 16];
    for (slot, token) in rows.iter_mut().zip(&tokens[1..17]) {
        *slot = parse_float(token);
    }
    // glam is column-major; reading the row-major values as columns and
    // transposing yields the matrix the file describes.
    Mat4::from_cols_array(&rows).transpose()
}

/// Zero-based `[position, texcoord, normal]` indices of an OBJ `v/t/n` token.
///
/// `v//n` skips the texcoord. Absent components are `-1`.
pub fn parse_face_indices(token: &str) -> [i32; 3] {
    let mut indices = [-1, -1, -1];
    let token = token.replace("//", "/0/");
    let parts: Vec<&str> = token.split('/').collect();
    if let Some(v) = parts.first() {
        indices[0] = parse_int(v) - 1;
    }
    match parts.len() {
        2 => indices[2] = parse_int(parts[1]) - 1,
        3 => {
            indices[1] = parse_int(parts[1]) - 1;
            indices[2] = parse_int(parts[2]) - 1;
        }
        _ => {}
    }
    indices
}

/// A triangle `f a b c` record as nine indices (three `v/t/n` triplets).
///
/// Records with fewer than three corners decode to all zeros.
pub fn parse_face(tokens: &[String]) -> [i32; 9] {
    let mut out = [0; 9];
    if tokens.len() < 4 {
        return out;
    }
    for (corner, token) in tokens[1..4].iter().enumerate() {
        out[corner * 3..corner * 3 + 3].copy_from_slice(&parse_face_indices(token));
    }
    out
}
