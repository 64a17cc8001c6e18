//! Scene building blocks: camera, lights and mesh data

pub mod camera;
pub mod lights;
pub mod mesh;

pub use camera::OrbitCamera;
pub use lights::{AmbientLight, DirectionalLight, HemisphereLight, LightRig, LightsUniform, PointLight};
pub use mesh::{Aabb, LineVertex, MeshData, MeshVertex};

/// Largest bounding-box dimension of a loaded model after normalization
pub const TARGET_EXTENT: f32 = 3.0;
