//! Scene renderer
//!
//! Owns the render pipelines and uniform buffers for the shaded model and the
//! reference grid, and records the scene render pass each frame.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::scene::lights::LightRig;
use crate::scene::mesh::{grid_lines, LineVertex, MeshData, MeshVertex};
use crate::scene::OrbitCamera;
use crate::shaders;

/// Scene background, matching the viewer's white page
const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Reference grid dimensions: 20x20 cells over a 20-unit square
const GRID_SIZE: f32 = 20.0;
const GRID_DIVISIONS: u32 = 20;

/// Camera uniform buffer data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w unused
    pub eye: [f32; 4],
}

/// Material uniform buffer data
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    /// rgb = specular color, w = shininess
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
}

impl MaterialUniform {
    /// Shiny neutral-grey material for loaded models
    pub fn model() -> Self {
        use crate::scene::lights::rgb;
        let base = rgb(0xcccccc);
        let specular = rgb(0x666666);
        let emissive = rgb(0x111111);
        Self {
            base_color: [base[0], base[1], base[2], 1.0],
            specular: [specular[0], specular[1], specular[2], 150.0],
            emissive: [emissive[0], emissive[1], emissive[2], 0.0],
        }
    }

    /// Plain green material for the fallback cube
    pub fn fallback() -> Self {
        use crate::scene::lights::rgb;
        let specular = rgb(0x111111);
        Self {
            base_color: [0.0, 1.0, 0.0, 1.0],
            specular: [specular[0], specular[1], specular[2], 30.0],
            emissive: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// A mesh uploaded to the GPU
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    /// Display name of the mesh source
    label: String,
    /// True for the fallback cube shown when loading fails
    fallback: bool,
}

impl GpuMesh {
    /// Upload mesh data into vertex/index buffers
    pub fn upload(device: &wgpu::Device, data: &MeshData, label: &str, fallback: bool) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            label: label.to_string(),
            fallback,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// GPU renderer for the model scene
pub struct SceneRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
}

impl SceneRenderer {
    /// Create the renderer for the given surface format
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Grid Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::GRID_SHADER.into()),
        });

        // [0] camera, [1] lights, [2] material
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                uniform_layout_entry(0),
                uniform_layout_entry(1),
                uniform_layout_entry(2),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // Double-sided: OBJ winding is not reliable
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let grid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Grid Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &grid_shader,
                entry_point: Some("vs_main"),
                buffers: &[LineVertex::buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &grid_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The light rig is fixed for the lifetime of the renderer
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::bytes_of(&LightRig::viewer_default().to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::bytes_of(&MaterialUniform::model()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: material_buffer.as_entire_binding(),
                },
            ],
        });

        let grid_vertices = grid_lines(GRID_SIZE, GRID_DIVISIONS);
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            mesh_pipeline,
            grid_pipeline,
            camera_buffer,
            material_buffer,
            bind_group,
            grid_vertex_buffer,
            grid_vertex_count: grid_vertices.len() as u32,
        }
    }

    /// Upload the current camera pose
    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &OrbitCamera) {
        let eye = camera.eye_position();
        let uniforms = CameraUniform {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 0.0],
        };
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Switch the model material (grey model vs green fallback cube)
    pub fn set_material(&self, queue: &wgpu::Queue, material: &MaterialUniform) {
        queue.write_buffer(&self.material_buffer, 0, bytemuck::bytes_of(material));
    }

    /// Record the scene render pass: clear, grid, model
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        mesh: &GpuMesh,
        show_grid: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.bind_group, &[]);

        if show_grid {
            render_pass.set_pipeline(&self.grid_pipeline);
            render_pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
            render_pass.draw(0..self.grid_vertex_count, 0..1);
        }

        render_pass.set_pipeline(&self.mesh_pipeline);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

fn uniform_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
    }

    #[test]
    fn test_material_presets() {
        let model = MaterialUniform::model();
        assert_eq!(model.specular[3], 150.0);
        assert!(model.emissive[0] > 0.0);

        let fallback = MaterialUniform::fallback();
        assert_eq!(fallback.base_color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(fallback.specular[3], 30.0);
        assert_ne!(model, fallback);
    }

    #[test]
    fn test_material_uniform_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }
}
