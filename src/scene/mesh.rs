//! Mesh data and generators
//!
//! CPU-side vertex/index containers for the displayed model, plus generators
//! for the fallback cube and the reference grid.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex for the shaded model mesh
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Normal vector (for lighting)
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Size of vertex in bytes
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Vertex buffer layout for wgpu
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Vertex for line geometry (the reference grid)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Center point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent across the three axes
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// CPU-side mesh data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Compute the bounding box, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let first = self.vertices.first()?;
        let mut min = Vec3::from_array(first.position);
        let mut max = min;
        for vertex in &self.vertices[1..] {
            let p = Vec3::from_array(vertex.position);
            min = min.min(p);
            max = max.max(p);
        }
        Some(Aabb { min, max })
    }

    /// Center the mesh at the origin and uniformly scale it so its largest
    /// bounding-box dimension equals `extent`.
    ///
    /// Returns the applied scale factor, or `None` when the mesh is empty or
    /// degenerate (zero size), in which case vertices are left untouched.
    pub fn normalize_to_extent(&mut self, extent: f32) -> Option<f32> {
        let bounds = self.bounds()?;
        let max_dim = bounds.max_dimension();
        if max_dim <= f32::EPSILON {
            return None;
        }

        let center = bounds.center();
        let scale = extent / max_dim;
        for vertex in &mut self.vertices {
            let p = (Vec3::from_array(vertex.position) - center) * scale;
            vertex.position = p.to_array();
        }
        Some(scale)
    }

    /// Generate an axis-aligned cube centered at the origin.
    ///
    /// Uses per-face normals (24 vertices, 36 indices) so the cube shades
    /// with hard edges.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;

        // One entry per face: (normal, four CCW corners viewed from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // +X
            (
                [1.0, 0.0, 0.0],
                [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
            ),
            // -X
            (
                [-1.0, 0.0, 0.0],
                [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
            ),
            // +Y
            (
                [0.0, 1.0, 0.0],
                [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
            ),
            // -Y
            (
                [0.0, -1.0, 0.0],
                [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
            ),
            // +Z
            (
                [0.0, 0.0, 1.0],
                [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
            ),
            // -Z
            (
                [0.0, 0.0, -1.0],
                [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for position in corners {
                vertices.push(MeshVertex { position, normal });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2]);
            indices.extend_from_slice(&[base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }
}

/// Generate line vertices for a square reference grid on the XZ plane.
///
/// `size` is the total edge length and `divisions` the number of cells per
/// side, so a 20x20 grid spans -10..10 with one line per unit.
pub fn grid_lines(size: f32, divisions: u32) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;

    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        // Line parallel to X
        vertices.push(LineVertex {
            position: [-half, 0.0, offset],
        });
        vertices.push(LineVertex {
            position: [half, 0.0, offset],
        });
        // Line parallel to Z
        vertices.push(LineVertex {
            position: [offset, 0.0, -half],
        });
        vertices.push(LineVertex {
            position: [offset, 0.0, half],
        });
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_mesh() {
        let mesh = MeshData::cube(2.0);
        assert_eq!(mesh.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(mesh.indices.len(), 36); // 6 faces * 2 triangles * 3

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::splat(-1.0));
        assert_eq!(bounds.max, Vec3::splat(1.0));
        assert_eq!(bounds.max_dimension(), 2.0);
    }

    #[test]
    fn test_empty_mesh_bounds() {
        let mesh = MeshData::default();
        assert!(mesh.bounds().is_none());
    }

    #[test]
    fn test_normalize_centers_and_scales() {
        // Off-center box, 4 units along X as the largest dimension
        let mut mesh = MeshData::cube(1.0);
        for vertex in &mut mesh.vertices {
            vertex.position[0] = vertex.position[0] * 4.0 + 10.0;
            vertex.position[1] += 5.0;
        }

        let scale = mesh.normalize_to_extent(3.0).unwrap();
        assert!((scale - 0.75).abs() < 1e-6);

        let bounds = mesh.bounds().unwrap();
        assert!(bounds.center().length() < 1e-4);
        assert!((bounds.max_dimension() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_degenerate_mesh() {
        let mut mesh = MeshData {
            vertices: vec![
                MeshVertex {
                    position: [1.0, 2.0, 3.0],
                    normal: [0.0, 1.0, 0.0],
                };
                3
            ],
            indices: vec![0, 1, 2],
        };
        // Zero-size bounding box must not divide by zero
        assert!(mesh.normalize_to_extent(3.0).is_none());
        assert_eq!(mesh.vertices[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_grid_lines() {
        let vertices = grid_lines(20.0, 20);
        // 21 lines per direction, 2 directions, 2 vertices per line
        assert_eq!(vertices.len(), 84);

        // All on the XZ plane within the half-extent
        for v in &vertices {
            assert_eq!(v.position[1], 0.0);
            assert!(v.position[0].abs() <= 10.0 + 1e-6);
            assert!(v.position[2].abs() <= 10.0 + 1e-6);
        }
    }
}
