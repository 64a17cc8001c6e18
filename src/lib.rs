//! Mesh Viewer Library
//!
//! A cross-platform 3D model viewer: one window, one OBJ mesh normalized to a
//! fixed viewing scale, orbit camera controls and a fixed light rig.

pub mod app;
pub mod obj;
pub mod render;
pub mod scene;
pub mod settings;
pub mod shaders;
pub mod telemetry;
pub mod ui;
pub mod watch;

pub use app::App;
pub use obj::{load_obj_file, load_obj_from_str, ObjError};
pub use render::{GpuMesh, MaterialUniform, SceneRenderer};
pub use scene::{LightRig, MeshData, MeshVertex, OrbitCamera, TARGET_EXTENT};
pub use settings::ViewerSettings;
pub use watch::ModelWatcher;
