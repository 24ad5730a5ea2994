//! Configurator renderer
//!
//! Draws the assembled straw and the ground platform with one lit, textured
//! pipeline (plus an alpha-blended variant for film wrappers and the contact
//! shadow laid over the platform). The display
//! and snapshot captures render into separate targets, so a capture never
//! shows up on screen.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use straw_core::{
    CaptureRequest, Material, MeshData, MeshKey, PartLibrary, SceneSubgraph, SnapshotImage,
    TextureKind,
};

use crate::auto_rotate::{AutoRotate, FloatAnimator};
use crate::camera::OrbitCamera;
use crate::config::{LightingConfig, RendererConfig};
use crate::scene::{
    DrawItem, ScenePlacement, draw_list, ground_mesh, mesh_for_source, shadow_mesh,
};
use crate::snapshot::{
    CaptureError, CapturePoll, ContextLossFlag, PendingCapture, ReadbackLayout,
    ScopedCameraOverride, ViewState,
};
use crate::vertex::MeshVertex;

/// Depth buffer format
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    fill_dir: [f32; 4],
    ambient: [f32; 4],
    options: [f32; 4],
}

impl FrameUniform {
    fn new(camera: &OrbitCamera, lighting: &LightingConfig, encode_srgb: bool) -> Self {
        let camera = camera.uniform();
        let [kx, ky, kz] = lighting.key_direction;
        let [fx, fy, fz] = lighting.fill_direction;
        let [kr, kg, kb] = lighting.key_color;
        let [ar, ag, ab] = lighting.ambient_color;
        let strength = lighting.ambient_strength;
        Self {
            view_proj: camera.view_proj,
            eye: camera.eye,
            key_dir: [kx, ky, kz, lighting.key_intensity],
            key_color: [kr, kg, kb, 1.0],
            fill_dir: [fx, fy, fz, lighting.fill_intensity],
            ambient: [ar * strength, ag * strength, ab * strength, 1.0],
            options: [if encode_srgb { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
    params: [f32; 4],
}

impl MaterialUniform {
    fn new(material: &Material) -> Self {
        let detail = matches!(material.texture, Some(TextureKind::BrushedMetal));
        let unlit = matches!(material.texture, Some(TextureKind::ContactShadow));
        Self {
            base_color: material.base_color,
            params: [
                material.roughness,
                material.metalness,
                if detail { 1.0 } else { 0.0 },
                if unlit { 1.0 } else { 0.0 },
            ],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl DrawUniform {
    fn new(model: Mat4) -> Self {
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

/// GPU buffers of one mesh
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let vertices = MeshVertex::from_mesh(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }
}

struct GpuTexture {
    #[allow(dead_code)] // Held for GPU resource lifetime
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Material uniform and bind group
struct GpuMaterial {
    #[allow(dead_code)] // Held for GPU resource lifetime
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// One draw with its transform uniform
struct GpuDraw {
    item: DrawItem,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Depth and MSAA attachments for a given size
struct RenderTarget {
    width: u32,
    height: u32,
    #[allow(dead_code)] // Held for GPU resource lifetime
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    #[allow(dead_code)] // Held for GPU resource lifetime
    msaa_texture: Option<wgpu::Texture>,
    msaa_view: Option<wgpu::TextureView>,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} Depth Texture", label)),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let msaa_texture = (sample_count > 1).then(|| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("{} MSAA Texture", label)),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });
        let msaa_view = msaa_texture
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));

        Self {
            width: size.width,
            height: size.height,
            depth_texture,
            depth_view,
            msaa_texture,
            msaa_view,
        }
    }
}

/// Offscreen color target for snapshots
struct CaptureTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    attachments: RenderTarget,
}

impl CaptureTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let attachments = RenderTarget::new(device, format, sample_count, width, height, "Capture");
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Color Texture"),
            size: wgpu::Extent3d {
                width: attachments.width,
                height: attachments.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            color,
            color_view,
            attachments,
        }
    }
}

/// Layout, sampler and textures shared by all materials
struct MaterialResources {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    textures: HashMap<TextureKind, GpuTexture>,
}

impl MaterialResources {
    fn create(&self, device: &wgpu::Device, material: &Material) -> GpuMaterial {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", material.name)),
            contents: bytemuck::cast_slice(&[MaterialUniform::new(material)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        // Untextured materials sample white
        let texture = material
            .texture
            .and_then(|kind| self.textures.get(&kind))
            .unwrap_or(&self.white);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Material Bind Group", material.name)),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        GpuMaterial { buffer, bind_group }
    }
}

/// Pipelines, shared resources and the uploaded scene
struct GpuScene {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    draw_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_resources: MaterialResources,
    meshes: HashMap<MeshKey, GpuMesh>,
    materials: Vec<GpuMaterial>,
    draws: Vec<GpuDraw>,
    ground_mesh: Option<GpuMesh>,
    ground_material: GpuMaterial,
    ground_draw: (wgpu::Buffer, wgpu::BindGroup),
    shadow_mesh: Option<GpuMesh>,
    shadow_material: GpuMaterial,
    shadow_draw: (wgpu::Buffer, wgpu::BindGroup),
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

impl GpuScene {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        sample_count: u32,
        config: &RendererConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_layout_entry(0)],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                uniform_layout_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[uniform_layout_entry(0)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, blend: Option<wgpu::BlendState>, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None, // Straws are open tubes
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };
        let opaque_pipeline = create_pipeline("Mesh Pipeline", None, true);
        let translucent_pipeline = create_pipeline(
            "Translucent Mesh Pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = GpuTexture::from_rgba(device, queue, "White Texture", 1, 1, &[255; 4]);
        let textures: HashMap<TextureKind, GpuTexture> = TextureKind::all()
            .iter()
            .map(|&kind| {
                let image = kind.generate_default();
                let texture = GpuTexture::from_rgba(
                    device,
                    queue,
                    &format!("{:?} Texture", kind),
                    image.width(),
                    image.height(),
                    image.as_raw(),
                );
                (kind, texture)
            })
            .collect();
        tracing::debug!("Uploaded {} procedural textures", textures.len());

        let scene = &config.scene;
        let ground_mesh = GpuMesh::new(
            device,
            "Ground",
            &ground_mesh(scene.ground_radius, scene.ground_height, scene.ground_bevel),
        );
        let shadow_mesh = GpuMesh::new(device, "Contact Shadow", &shadow_mesh(scene.shadow_radius));

        let material_resources = MaterialResources {
            layout: material_layout,
            sampler,
            white,
            textures,
        };
        let ground_material = material_resources.create(device, &ground_material());
        let shadow_material = material_resources.create(device, &shadow_material());

        Self {
            opaque_pipeline,
            translucent_pipeline,
            ground_draw: Self::create_draw_uniform(device, &draw_layout, "Ground"),
            shadow_draw: Self::create_draw_uniform(device, &draw_layout, "Contact Shadow"),
            draw_layout,
            frame_buffer,
            frame_bind_group,
            material_resources,
            meshes: HashMap::new(),
            materials: Vec::new(),
            draws: Vec::new(),
            ground_mesh,
            ground_material,
            shadow_mesh,
            shadow_material,
        }
    }

    fn create_draw_uniform(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Draw Buffer", label)),
            contents: bytemuck::cast_slice(&[DrawUniform::new(Mat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Draw Bind Group", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        (buffer, bind_group)
    }

    /// Replace the uploaded straw. Meshes still in use stay cached.
    fn set_scene(
        &mut self,
        device: &wgpu::Device,
        subgraph: Option<&SceneSubgraph>,
        library: &PartLibrary,
    ) {
        let Some(subgraph) = subgraph else {
            self.draws.clear();
            self.materials.clear();
            return;
        };

        let items = draw_list(subgraph);
        self.meshes
            .retain(|key, _| items.iter().any(|item| item.mesh == *key));

        for node in &subgraph.nodes {
            let key = node.mesh.key();
            if self.meshes.contains_key(&key) {
                continue;
            }
            let Some(mesh) = mesh_for_source(&node.mesh, library) else {
                tracing::warn!("No mesh for {:?}, skipping", node.kind);
                continue;
            };
            if let Some(gpu_mesh) = GpuMesh::new(device, &format!("{:?}", node.kind), &mesh) {
                self.meshes.insert(key, gpu_mesh);
            }
        }

        self.materials = subgraph
            .materials
            .iter()
            .map(|material| self.material_resources.create(device, material))
            .collect();

        self.draws = items
            .into_iter()
            .map(|item| {
                let (buffer, bind_group) =
                    Self::create_draw_uniform(device, &self.draw_layout, "Straw");
                GpuDraw {
                    item,
                    buffer,
                    bind_group,
                }
            })
            .collect();

        tracing::debug!(
            "Scene uploaded: {} draws, {} cached meshes",
            self.draws.len(),
            self.meshes.len()
        );
    }

    /// Write per-frame uniforms for a view
    fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        view: &ViewState,
        placement: &ScenePlacement,
        lighting: &LightingConfig,
        encode_srgb: bool,
    ) {
        let frame = FrameUniform::new(&view.camera, lighting, encode_srgb);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        let model = placement.model_matrix(view.float.offset);
        for draw in &self.draws {
            let uniform = DrawUniform::new(model * draw.item.transform);
            queue.write_buffer(&draw.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }

        let ground = DrawUniform::new(placement.ground_matrix());
        queue.write_buffer(&self.ground_draw.0, 0, bytemuck::cast_slice(&[ground]));

        let shadow = DrawUniform::new(placement.shadow_matrix(view.float.offset));
        queue.write_buffer(&self.shadow_draw.0, 0, bytemuck::cast_slice(&[shadow]));
    }

    /// Record the scene pass
    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        attachments: &RenderTarget,
        clear_color: wgpu::Color,
        label: &str,
    ) {
        let color_attachment = match &attachments.msaa_view {
            // MSAA enabled: render to multisample texture, resolve to output
            Some(msaa_view) => wgpu::RenderPassColorAttachment {
                view: msaa_view,
                resolve_target: Some(target),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            },
            None => wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            },
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &attachments.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.opaque_pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        if let Some(ground) = &self.ground_mesh {
            pass.set_bind_group(1, &self.ground_material.bind_group, &[]);
            pass.set_bind_group(2, &self.ground_draw.1, &[]);
            pass.set_vertex_buffer(0, ground.vertex_buffer.slice(..));
            pass.set_index_buffer(ground.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..ground.index_count, 0, 0..1);
        }

        // Blended onto the platform without writing depth, so the straw
        // drawn next still covers it
        if let Some(shadow) = &self.shadow_mesh {
            pass.set_pipeline(&self.translucent_pipeline);
            pass.set_bind_group(1, &self.shadow_material.bind_group, &[]);
            pass.set_bind_group(2, &self.shadow_draw.1, &[]);
            pass.set_vertex_buffer(0, shadow.vertex_buffer.slice(..));
            pass.set_index_buffer(shadow.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..shadow.index_count, 0, 0..1);
            pass.set_pipeline(&self.opaque_pipeline);
        }

        let mut translucent = false;
        for draw in &self.draws {
            let (Some(mesh), Some(material)) = (
                self.meshes.get(&draw.item.mesh),
                self.materials.get(draw.item.material),
            ) else {
                continue;
            };
            if draw.item.translucent && !translucent {
                pass.set_pipeline(&self.translucent_pipeline);
                translucent = true;
            }
            pass.set_bind_group(1, &material.bind_group, &[]);
            pass.set_bind_group(2, &draw.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

/// Concrete platform under the straw
fn ground_material() -> Material {
    Material {
        name: "ground",
        base_color: [0.85, 0.85, 0.85, 1.0],
        roughness: 0.9,
        metalness: 0.0,
        texture: Some(TextureKind::Concrete),
        translucent: false,
    }
}

/// Soft dark disc under the straw
fn shadow_material() -> Material {
    Material {
        name: "contact shadow",
        base_color: [1.0, 1.0, 1.0, 1.0],
        roughness: 1.0,
        metalness: 0.0,
        texture: Some(TextureKind::ContactShadow),
        translucent: true,
    }
}

/// Clear color for a target; non-sRGB targets get encoded values
fn clear_color(rgba: [f32; 4], encode_srgb: bool) -> wgpu::Color {
    let channel = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        let encoded = if !encode_srgb {
            c
        } else if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        f64::from(encoded)
    };
    wgpu::Color {
        r: channel(rgba[0]),
        g: channel(rgba[1]),
        b: channel(rgba[2]),
        a: f64::from(rgba[3]),
    }
}

/// Whether a device-lost reason ends snapshot capture for the session.
/// `Destroyed` follows our own teardown and is not a loss.
fn is_context_loss(reason: wgpu::DeviceLostReason) -> bool {
    reason != wgpu::DeviceLostReason::Destroyed
}

/// Install a device-lost callback that raises `flag`
pub fn watch_device_loss(device: &wgpu::Device, flag: ContextLossFlag) {
    device.set_device_lost_callback(move |reason, message| {
        if is_context_loss(reason) {
            flag.mark_lost();
            tracing::warn!("Rendering context lost ({:?}): {}", reason, message);
        } else {
            tracing::debug!("Device destroyed: {}", message);
        }
    });
}

/// Main configurator renderer
pub struct Renderer {
    config: RendererConfig,
    format: wgpu::TextureFormat,
    sample_count: u32,
    encode_srgb: bool,
    view: ViewState,
    auto_rotate: AutoRotate,
    placement: ScenePlacement,
    gpu: GpuScene,
    display: RenderTarget,
    capture: Option<CaptureTarget>,
    pending: Option<PendingCapture>,
    context_loss: ContextLossFlag,
    has_model: bool,
}

impl Renderer {
    /// Creates a renderer drawing into targets of `format`
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Self {
        let sample_count = config.sample_count();
        let gpu = GpuScene::new(device, queue, format, sample_count, &config);
        let display = RenderTarget::new(device, format, sample_count, width, height, "Display");

        let rotate = &config.auto_rotate;
        let view = ViewState {
            camera: OrbitCamera::new(&config.camera, width.max(1) as f32 / height.max(1) as f32),
            float: FloatAnimator::new(
                rotate.float_amplitude,
                rotate.float_frequency,
                rotate.float_lerp,
                rotate.settle_lerp,
            ),
        };

        let context_loss = ContextLossFlag::new();
        watch_device_loss(device, context_loss.clone());

        tracing::info!(
            "Renderer created: {:?}, {}x{}, {}x MSAA",
            format,
            width,
            height,
            sample_count
        );

        Self {
            auto_rotate: AutoRotate::new(rotate.idle_delay_secs),
            placement: ScenePlacement::from_config(&config.scene),
            encode_srgb: !format.is_srgb(),
            config,
            format,
            sample_count,
            view,
            gpu,
            display,
            capture: None,
            pending: None,
            context_loss,
            has_model: false,
        }
    }

    /// Color format of the targets
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Resize the display attachments
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.display.width == width && self.display.height == height {
            return;
        }
        self.display =
            RenderTarget::new(device, self.format, self.sample_count, width, height, "Display");
        self.view
            .camera
            .update_aspect(width as f32 / height as f32);
    }

    /// Orbit camera
    pub fn camera(&self) -> &OrbitCamera {
        &self.view.camera
    }

    /// Auto-rotate state machine
    pub fn auto_rotate(&self) -> &AutoRotate {
        &self.auto_rotate
    }

    /// Current model float offset
    pub fn float_offset(&self) -> f32 {
        self.view.float.offset
    }

    /// Scene shown: arm the auto-rotate timer
    pub fn mount(&mut self, now: f64) {
        if self.config.auto_rotate.enabled {
            self.auto_rotate.mount(now);
        }
    }

    /// Scene hidden: cancel pending timers
    pub fn teardown(&mut self) {
        self.auto_rotate.teardown();
    }

    /// Pointer pressed on the viewport
    pub fn begin_interaction(&mut self) {
        self.auto_rotate.begin_interaction();
    }

    /// Pointer released
    pub fn end_interaction(&mut self, now: f64) {
        if self.config.auto_rotate.enabled {
            self.auto_rotate.end_interaction(now);
        } else {
            self.auto_rotate.teardown();
        }
    }

    /// Orbit from a pointer drag in pixels
    pub fn orbit_drag(&mut self, delta_x: f32, delta_y: f32) {
        self.view.camera.orbit_drag(delta_x, delta_y);
    }

    /// Advance timers and animation. `now` is the frame time in seconds,
    /// `dt` the time since the previous frame.
    pub fn update(&mut self, now: f64, dt: f32) {
        self.auto_rotate.update(now);
        let rotating = self.auto_rotate.is_rotating();
        if rotating {
            self.view
                .camera
                .auto_rotate(dt, self.config.auto_rotate.speed);
        }
        self.view.float.update(rotating, now);
    }

    /// Whether a straw is uploaded
    pub fn has_model(&self) -> bool {
        self.has_model
    }

    /// Upload a new straw, or clear it with `None`
    pub fn set_scene(
        &mut self,
        device: &wgpu::Device,
        subgraph: Option<&SceneSubgraph>,
        library: &PartLibrary,
    ) {
        self.gpu.set_scene(device, subgraph, library);
        self.has_model = subgraph.is_some();
    }

    /// Render the scene to the display target
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        queue: &wgpu::Queue,
    ) {
        self.gpu.write_uniforms(
            queue,
            &self.view,
            &self.placement,
            &self.config.lighting,
            self.encode_srgb,
        );
        self.gpu.encode(
            encoder,
            target,
            &self.display,
            clear_color(self.config.viewport.background_color, self.encode_srgb),
            "Main Render Pass",
        );
    }

    /// Flag raised by the device-lost callback
    pub fn context_loss(&self) -> ContextLossFlag {
        self.context_loss.clone()
    }

    /// Render the canonical view offscreen and start reading it back.
    ///
    /// The camera and float offset are overridden only for the duration of
    /// this call and the work is submitted before it returns, so the display
    /// never renders the canonical pose. Poll the result with
    /// [`Renderer::poll_capture`].
    pub fn capture_snapshot(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        request: CaptureRequest,
    ) -> Result<(), CaptureError> {
        if self.context_loss.is_lost() {
            return Err(CaptureError::ContextLost);
        }
        if self.pending.is_some() {
            return Err(CaptureError::Busy);
        }
        let bgra = match self.format {
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => false,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => true,
            other => return Err(CaptureError::UnsupportedFormat(other)),
        };

        let snapshot = &self.config.snapshot;
        let (width, height) = (snapshot.width.max(1), snapshot.height.max(1));
        let target = match self.capture.take() {
            Some(target)
                if target.attachments.width == width && target.attachments.height == height =>
            {
                target
            }
            _ => CaptureTarget::new(device, self.format, self.sample_count, width, height),
        };

        let layout = ReadbackLayout::rgba8(width, height);
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Staging Buffer"),
            size: layout.buffer_size(),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        {
            let view = ScopedCameraOverride::apply(&mut self.view, width as f32 / height as f32);
            self.gpu.write_uniforms(
                queue,
                &view,
                &self.placement,
                &self.config.lighting,
                self.encode_srgb,
            );
            self.gpu.encode(
                &mut encoder,
                &target.color_view,
                &target.attachments,
                clear_color(snapshot.background_color, self.encode_srgb),
                "Capture Render Pass",
            );
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(layout.padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        self.pending = Some(PendingCapture::start(request, staging, layout, bgra));
        self.capture = Some(target);
        tracing::debug!("Snapshot {} submitted ({}x{})", request.0, width, height);
        Ok(())
    }

    /// Check the pending capture. Returns its request and image once done;
    /// a failed capture yields `None` for the image.
    pub fn poll_capture(
        &mut self,
        device: &wgpu::Device,
    ) -> Option<(CaptureRequest, Option<SnapshotImage>)> {
        let pending = self.pending.as_ref()?;
        if self.context_loss.is_lost() {
            let request = pending.request();
            self.pending = None;
            tracing::warn!("Dropping snapshot {}: rendering context lost", request.0);
            return Some((request, None));
        }

        match pending.poll(device) {
            CapturePoll::Pending => None,
            CapturePoll::Done(request, result) => {
                self.pending = None;
                match result {
                    Ok(image) => {
                        tracing::info!(
                            "Snapshot {} captured: {} bytes PNG",
                            request.0,
                            image.png.len()
                        );
                        Some((request, Some(image)))
                    }
                    Err(e) => {
                        tracing::warn!("Snapshot {} failed: {}", request.0, e);
                        Some((request, None))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 160);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 128);
    }

    #[test]
    fn test_destroyed_device_is_not_context_loss() {
        assert!(!is_context_loss(wgpu::DeviceLostReason::Destroyed));
        assert!(is_context_loss(wgpu::DeviceLostReason::Unknown));
    }

    #[test]
    fn test_clear_color_encoding() {
        let linear = clear_color([0.5, 0.0, 1.0, 1.0], false);
        assert_eq!(linear.r, 0.5);

        let encoded = clear_color([0.5, 0.0, 1.0, 1.0], true);
        assert!((encoded.r - 0.7354).abs() < 1e-3);
        assert_eq!(encoded.g, 0.0);
        assert!((encoded.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_brushed_metal_is_detail_texture() {
        let scoop = Material::scoop(straw_core::StrawColor::RED);
        assert_eq!(MaterialUniform::new(&scoop).params[2], 1.0);
        assert_eq!(MaterialUniform::new(&Material::paper()).params[2], 0.0);
    }

    #[test]
    fn test_contact_shadow_is_unlit() {
        let shadow = MaterialUniform::new(&shadow_material());
        assert_eq!(shadow.params[3], 1.0);
        assert!(shadow_material().translucent);
        assert_eq!(MaterialUniform::new(&ground_material()).params[3], 0.0);
    }

    #[test]
    fn test_normal_matrix_of_degenerate_model() {
        let uniform = DrawUniform::new(Mat4::from_scale(glam::Vec3::ZERO));
        assert_eq!(uniform.normal, Mat4::IDENTITY.to_cols_array_2d());
    }
}
