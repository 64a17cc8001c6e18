//! Light rig for the viewer scene
//!
//! A fixed set of lights tuned for a bright, evenly lit model: an ambient
//! term, four directional lights (key, fill, top, front), one point light and
//! a hemisphere term. The rig is packed into a single uniform buffer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Number of directional light slots in the uniform
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Convert a 0xRRGGBB color to linear float components
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Ambient light
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Directional light, aimed at the origin from `position`
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Point light with a finite range
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

/// Hemisphere light blending sky and ground colors by surface orientation
#[derive(Debug, Clone, Copy)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

/// The complete light rig
#[derive(Debug, Clone)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: Vec<DirectionalLight>,
    pub point: PointLight,
    pub hemisphere: HemisphereLight,
}

impl LightRig {
    /// The viewer's default rig: key/fill/top/front directionals around a
    /// white ambient base, with a point light above the model and a soft
    /// hemisphere term.
    pub fn viewer_default() -> Self {
        let white = rgb(0xffffff);
        Self {
            ambient: AmbientLight {
                color: white,
                intensity: 0.8,
            },
            directional: vec![
                // Key
                DirectionalLight {
                    position: Vec3::new(10.0, 10.0, 5.0),
                    color: white,
                    intensity: 1.2,
                },
                // Fill, from the opposite side
                DirectionalLight {
                    position: Vec3::new(-10.0, -10.0, -5.0),
                    color: white,
                    intensity: 0.6,
                },
                // Top
                DirectionalLight {
                    position: Vec3::new(0.0, 15.0, 0.0),
                    color: white,
                    intensity: 0.7,
                },
                // Front
                DirectionalLight {
                    position: Vec3::new(0.0, 0.0, 10.0),
                    color: white,
                    intensity: 0.5,
                },
            ],
            point: PointLight {
                position: Vec3::new(0.0, 5.0, 5.0),
                color: white,
                intensity: 0.8,
                range: 100.0,
            },
            hemisphere: HemisphereLight {
                sky_color: white,
                ground_color: rgb(0x444444),
                intensity: 0.6,
            },
        }
    }

    /// Pack the rig for the shader
    pub fn to_uniform(&self) -> LightsUniform {
        let mut directional = [GpuDirectionalLight::zeroed(); MAX_DIRECTIONAL_LIGHTS];
        for (slot, light) in directional.iter_mut().zip(&self.directional) {
            let dir = light.position.normalize_or_zero();
            *slot = GpuDirectionalLight {
                direction: [dir.x, dir.y, dir.z, 0.0],
                color: [
                    light.color[0],
                    light.color[1],
                    light.color[2],
                    light.intensity,
                ],
            };
        }

        LightsUniform {
            ambient: pack(self.ambient.color, self.ambient.intensity),
            hemisphere_sky: pack(self.hemisphere.sky_color, self.hemisphere.intensity),
            hemisphere_ground: pack(self.hemisphere.ground_color, 0.0),
            point_position: [
                self.point.position.x,
                self.point.position.y,
                self.point.position.z,
                self.point.intensity,
            ],
            point_color: pack(self.point.color, self.point.range),
            directional,
        }
    }
}

fn pack(color: [f32; 3], w: f32) -> [f32; 4] {
    [color[0], color[1], color[2], w]
}

/// One directional light as seen by the shader
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    /// Unit vector from the surface toward the light; w unused
    pub direction: [f32; 4],
    /// rgb color, w = intensity (zero intensity disables the slot)
    pub color: [f32; 4],
}

/// Light uniform buffer data
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightsUniform {
    /// rgb, w = intensity
    pub ambient: [f32; 4],
    /// rgb, w = intensity
    pub hemisphere_sky: [f32; 4],
    /// rgb, w unused
    pub hemisphere_ground: [f32; 4],
    /// xyz, w = intensity
    pub point_position: [f32; 4],
    /// rgb, w = range
    pub point_color: [f32; 4],
    pub directional: [GpuDirectionalLight; MAX_DIRECTIONAL_LIGHTS],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_conversion() {
        assert_eq!(rgb(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0]);
        let grey = rgb(0x444444);
        assert!((grey[0] - 0x44 as f32 / 255.0).abs() < 1e-6);
        assert_eq!(grey[0], grey[1]);
        assert_eq!(grey[1], grey[2]);
    }

    #[test]
    fn test_default_rig_shape() {
        let rig = LightRig::viewer_default();
        assert_eq!(rig.directional.len(), 4);
        assert_eq!(rig.ambient.intensity, 0.8);
        assert_eq!(rig.point.range, 100.0);
    }

    #[test]
    fn test_uniform_layout() {
        // Uniform buffers require 16-byte alignment throughout
        assert_eq!(std::mem::size_of::<GpuDirectionalLight>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }

    #[test]
    fn test_uniform_directions_normalized() {
        let uniform = LightRig::viewer_default().to_uniform();
        for light in &uniform.directional {
            if light.color[3] > 0.0 {
                let d = Vec3::new(light.direction[0], light.direction[1], light.direction[2]);
                assert!((d.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_unused_slots_disabled() {
        let mut rig = LightRig::viewer_default();
        rig.directional.truncate(2);
        let uniform = rig.to_uniform();
        assert_eq!(uniform.directional[2].color[3], 0.0);
        assert_eq!(uniform.directional[3].color[3], 0.0);
    }
}
