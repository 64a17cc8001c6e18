//! Embedded WGSL shader sources

/// Blinn-Phong shading for the model mesh
pub const MESH_SHADER: &str = include_str!("mesh.wgsl");

/// Flat-colored lines for the reference grid
pub const GRID_SHADER: &str = include_str!("grid.wgsl");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_shader_not_empty() {
        assert!(!MESH_SHADER.is_empty());
        assert!(MESH_SHADER.contains("fn vs_main"));
        assert!(MESH_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn test_grid_shader_not_empty() {
        assert!(!GRID_SHADER.is_empty());
        assert!(GRID_SHADER.contains("fn vs_main"));
        assert!(GRID_SHADER.contains("fn fs_main"));
    }
}
