//! Wavefront OBJ mesh loading
//!
//! Parses the subset of the OBJ format needed to display a shaded model:
//! vertex positions (`v`), vertex normals (`vn`) and faces (`f`). Texture
//! coordinates, materials and group structure are skipped. Polygonal faces
//! are triangulated as a fan around their first vertex. When the file carries
//! no usable normals, smooth area-weighted vertex normals are computed from
//! the face geometry instead.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use crate::scene::mesh::{MeshData, MeshVertex};

/// Errors produced while loading an OBJ file
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read OBJ file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed `{keyword}` statement")]
    Malformed { line: usize, keyword: String },
    #[error("line {line}: index {index} out of range (file has {count} entries)")]
    IndexOutOfRange {
        line: usize,
        index: i64,
        count: usize,
    },
    #[error("OBJ contains no faces")]
    Empty,
    #[error("mesh has zero spatial extent")]
    Degenerate,
}

/// One corner of a face: resolved 0-based position index plus an optional
/// 0-based normal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: usize,
    normal: Option<usize>,
}

/// Load an OBJ file from disk
pub fn load_obj_file(path: &Path) -> Result<MeshData, ObjError> {
    let source = std::fs::read_to_string(path)?;
    load_obj_from_str(&source)
}

/// Parse OBJ source text into mesh data
pub fn load_obj_from_str(source: &str) -> Result<MeshData, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut triangles: Vec<[Corner; 3]> = Vec::new();

    for (line_idx, raw_line) in source.lines().enumerate() {
        let line_no = line_idx + 1;
        // Strip trailing comments
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or("");
        match keyword {
            "v" => positions.push(parse_vec3(tokens, line_no, "v")?),
            "vn" => normals.push(parse_vec3(tokens, line_no, "vn")?),
            "f" => {
                let corners: Vec<Corner> = tokens
                    .map(|token| parse_corner(token, positions.len(), normals.len(), line_no))
                    .collect::<Result<_, _>>()?;
                if corners.len() < 3 {
                    return Err(ObjError::Malformed {
                        line: line_no,
                        keyword: "f".into(),
                    });
                }
                // Fan triangulation around the first corner
                for i in 1..corners.len() - 1 {
                    triangles.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            // vt, usemtl, mtllib, o, g, s and anything else: not needed for
            // an untextured shaded view
            _ => {}
        }
    }

    if triangles.is_empty() {
        return Err(ObjError::Empty);
    }

    // Fall back to computed smooth normals unless every corner references one
    let all_have_normals = triangles
        .iter()
        .all(|tri| tri.iter().all(|c| c.normal.is_some()));
    let computed_normals = if all_have_normals {
        Vec::new()
    } else {
        smooth_normals(&positions, &triangles)
    };

    // Deduplicate (position, normal) pairs into the final vertex list
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(triangles.len() * 3);
    let mut seen: HashMap<Corner, u32> = HashMap::new();

    for tri in &triangles {
        for corner in tri {
            let key = if all_have_normals {
                *corner
            } else {
                Corner {
                    position: corner.position,
                    normal: None,
                }
            };
            let index = *seen.entry(key).or_insert_with(|| {
                let normal = match key.normal {
                    Some(n) => normals[n],
                    None => computed_normals[key.position],
                };
                vertices.push(MeshVertex {
                    position: positions[key.position].to_array(),
                    normal: normal.to_array(),
                });
                (vertices.len() - 1) as u32
            });
            indices.push(index);
        }
    }

    Ok(MeshData { vertices, indices })
}

/// Parse three floats from the remaining tokens of a `v`/`vn` statement
fn parse_vec3<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> Result<Vec3, ObjError> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| ObjError::Malformed {
            line,
            keyword: keyword.into(),
        })?;
        *slot = token.parse().map_err(|_| ObjError::Malformed {
            line,
            keyword: keyword.into(),
        })?;
    }
    Ok(Vec3::from_array(out))
}

/// Parse a face corner token (`v`, `v/vt`, `v//vn`, `v/vt/vn`).
///
/// OBJ indices are 1-based; negative indices count back from the end of the
/// list declared so far.
fn parse_corner(
    token: &str,
    position_count: usize,
    normal_count: usize,
    line: usize,
) -> Result<Corner, ObjError> {
    let mut fields = token.split('/');

    let position_field = fields.next().unwrap_or("");
    let position = resolve_index(position_field, position_count, line)?.ok_or_else(|| {
        ObjError::Malformed {
            line,
            keyword: "f".into(),
        }
    })?;

    // Skip the texture coordinate field
    let _ = fields.next();

    let normal = match fields.next() {
        Some(field) => resolve_index(field, normal_count, line)?,
        None => None,
    };

    Ok(Corner { position, normal })
}

/// Resolve a 1-based / negative OBJ index to 0-based; empty fields are `None`
fn resolve_index(field: &str, count: usize, line: usize) -> Result<Option<usize>, ObjError> {
    if field.is_empty() {
        return Ok(None);
    }
    let index: i64 = field.parse().map_err(|_| ObjError::Malformed {
        line,
        keyword: "f".into(),
    })?;

    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        count as i64 + index
    } else {
        -1
    };

    if resolved < 0 || resolved >= count as i64 {
        return Err(ObjError::IndexOutOfRange { line, index, count });
    }
    Ok(Some(resolved as usize))
}

/// Compute area-weighted smooth vertex normals from face geometry.
///
/// Cross products are summed unnormalized so larger triangles contribute
/// proportionally more, then each sum is normalized.
fn smooth_normals(positions: &[Vec3], triangles: &[[Corner; 3]]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let a = positions[tri[0].position];
        let b = positions[tri[1].position];
        let c = positions[tri[2].position];
        let face_normal = (b - a).cross(c - a);
        for corner in tri {
            sums[corner.position] += face_normal;
        }
    }
    sums.into_iter()
        .map(|n| {
            let normalized = n.normalize_or_zero();
            if normalized == Vec3::ZERO {
                Vec3::Y
            } else {
                normalized
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle_with_normals() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_quad_is_triangulated() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let mesh = load_obj_from_str(src).unwrap();
        // Fan triangulation: (1,2,3) and (1,3,4)
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.vertices.len(), 4);
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let mesh = load_obj_from_str(src).unwrap();
        // CCW triangle in the XY plane faces +Z
        for vertex in &mesh.vertices {
            assert!((Vec3::from_array(vertex.normal) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_negative_indices() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn test_texture_coordinates_ignored() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn test_shared_vertices_deduplicated() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
f 1//1 3//1 4//1
";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn test_comments_and_unknown_keywords_skipped() {
        let src = "\
# exported by some tool
o triangle
s off
usemtl none
v 0 0 0
v 1 0 0  # inline comment
v 0 1 0
f 1 2 3
";
        assert!(load_obj_from_str(src).is_ok());
    }

    #[test]
    fn test_empty_file_is_error() {
        assert!(matches!(load_obj_from_str(""), Err(ObjError::Empty)));
        assert!(matches!(
            load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\n"),
            Err(ObjError::Empty)
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let src = "\
v 0 0 0
v 1 0 0
f 1 2 7
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::IndexOutOfRange { line: 3, index: 7, .. })
        ));
    }

    #[test]
    fn test_zero_index_is_out_of_range() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 0 1 2
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_malformed_vertex() {
        let src = "v 1.0 nope 2.0\n";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn test_face_with_two_corners_is_malformed() {
        let src = "\
v 0 0 0
v 1 0 0
f 1 2
";
        assert!(matches!(
            load_obj_from_str(src),
            Err(ObjError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn test_bundled_asset_loads() {
        let mesh = load_obj_from_str(include_str!("../../assets/base.obj")).unwrap();
        // Icosahedron: 12 vertices, 20 faces
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices.len(), 60);
        assert!(mesh.bounds().is_some());
    }
}
