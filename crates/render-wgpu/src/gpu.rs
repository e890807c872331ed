use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::collections::BTreeMap;
use torusfield_assets::{CubeImage, ImageData, LoadedTexture};
use torusfield_common::{ColorSpace, NodeId, TextureHandle};
use torusfield_render::MeshData;
use torusfield_scene::{MaterialId, NodeKind, Scene, SceneError, StandardMaterial};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    inv_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MaterialUniforms {
    color: [f32; 4],
    params: [f32; 4],
    flags: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
    tangent: [f32; 4],
}

fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    (0..mesh.vertex_count())
        .map(|i| Vertex {
            position: mesh.positions[i],
            normal: mesh.normals[i],
            uv: mesh.uvs[i],
            tangent: mesh.tangents[i],
        })
        .collect()
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

fn material_uniforms(
    material: &StandardMaterial,
    textures: &BTreeMap<TextureHandle, GpuTexture>,
) -> MaterialUniforms {
    let loaded = |h: Option<TextureHandle>| h.is_some_and(|h| textures.contains_key(&h));
    let [r, g, b] = material.color.to_linear();
    MaterialUniforms {
        color: [r, g, b, 1.0],
        params: [
            material.metalness,
            material.roughness,
            material.normal_scale.x,
            material.normal_scale.y,
        ],
        flags: [
            flag(loaded(material.map)),
            flag(loaded(material.normal_map)),
            flag(material.env_map.is_some()),
            0.0,
        ],
    }
}

struct GpuTexture {
    view: wgpu::TextureView,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Texture set version the bind group was built against.
    version: u64,
}

struct Defaults {
    white: wgpu::TextureView,
    flat_normal: wgpu::TextureView,
    black_cube: wgpu::TextureView,
}

/// wgpu renderer for a [`Scene`]: skybox background plus metal/rough meshes.
///
/// Mesh buffers are created the first time a node is seen. Textures arrive
/// through [`upload_texture`](Self::upload_texture); until then materials
/// sample neutral defaults.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sky_layout: wgpu::BindGroupLayout,
    sky_bind_group: Option<(wgpu::BindGroup, u64)>,
    sampler: wgpu::Sampler,
    defaults: Defaults,
    textures: BTreeMap<TextureHandle, GpuTexture>,
    texture_version: u64,
    meshes: BTreeMap<NodeId, GpuMesh>,
    materials: BTreeMap<MaterialId, GpuMaterial>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(
    binding: u32,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                texture_entry(3, wgpu::TextureViewDimension::Cube),
                sampler_entry(4),
            ],
        });
        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky_layout"),
            entries: &[texture_entry(0, wgpu::TextureViewDimension::Cube), sampler_entry(1)],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &sky_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("standard_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::standard_shader().into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::skybox_shader().into()),
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&mesh_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                        3 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Thin rings are visible from both sides while tumbling.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sky_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky_pipeline"),
            layout: Some(&sky_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sky_shader,
                entry_point: Some("vs_sky"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &sky_shader,
                entry_point: Some("fs_sky"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let defaults = Defaults {
            white: Self::create_flat(
                device,
                queue,
                &ImageData::solid([255, 255, 255, 255]),
                ColorSpace::Srgb,
            ),
            flat_normal: Self::create_flat(
                device,
                queue,
                &ImageData::solid([128, 128, 255, 255]),
                ColorSpace::Linear,
            ),
            black_cube: Self::create_cube(
                device,
                queue,
                &CubeImage {
                    size: 1,
                    faces: std::array::from_fn(|_| ImageData::solid([0, 0, 0, 255])),
                },
            ),
        };

        Self {
            mesh_pipeline,
            sky_pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            material_layout,
            sky_layout,
            sky_bind_group: None,
            sampler,
            defaults,
            textures: BTreeMap::new(),
            texture_version: 0,
            meshes: BTreeMap::new(),
            materials: BTreeMap::new(),
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Make a finished texture available to materials and the background.
    pub fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
        texture: &LoadedTexture,
    ) {
        let view = match texture {
            LoadedTexture::Flat { image, color_space } => {
                Self::create_flat(device, queue, image, *color_space)
            }
            LoadedTexture::Cube(cube) => Self::create_cube(device, queue, cube),
        };
        self.textures.insert(handle, GpuTexture { view });
        self.texture_version += 1;
        tracing::debug!(handle = handle.0, kind = texture.kind(), "texture uploaded");
    }

    fn texture_view<'a>(
        &'a self,
        handle: Option<TextureHandle>,
        fallback: &'a wgpu::TextureView,
    ) -> &'a wgpu::TextureView {
        handle
            .and_then(|h| self.textures.get(&h))
            .map(|t| &t.view)
            .unwrap_or(fallback)
    }

    fn sync_meshes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
    ) -> Result<(), SceneError> {
        for (id, _, geometry, _) in scene.graph.meshes() {
            let model = scene.graph.world_matrix(id)?;
            let uniforms = ObjectUniforms {
                model: model.to_cols_array_2d(),
                normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            };
            if let Some(mesh) = self.meshes.get(&id) {
                queue.write_buffer(&mesh.object_buffer, 0, bytemuck::bytes_of(&uniforms));
                continue;
            }

            let data = MeshData::from_geometry(&geometry);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&interleave(&data)),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("object_uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("object_bind_group"),
                layout: &self.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                }],
            });
            self.meshes.insert(
                id,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: data.indices.len() as u32,
                    object_buffer,
                    object_bind_group,
                },
            );
        }
        Ok(())
    }

    fn sync_materials(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        for (id, material) in scene.materials.iter() {
            let uniforms = material_uniforms(material, &self.textures);
            let stale = self
                .materials
                .get(&id)
                .is_none_or(|m| m.version != self.texture_version);
            if !stale {
                if let Some(gpu) = self.materials.get(&id) {
                    queue.write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&uniforms));
                }
                continue;
            }

            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("material_uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("material_bind_group"),
                layout: &self.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            self.texture_view(material.map, &self.defaults.white),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            self.texture_view(material.normal_map, &self.defaults.flat_normal),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(
                            self.texture_view(material.env_map, &self.defaults.black_cube),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.materials.insert(
                id,
                GpuMaterial {
                    buffer,
                    bind_group,
                    version: self.texture_version,
                },
            );
        }
    }

    fn sync_sky(&mut self, device: &wgpu::Device, scene: &Scene) {
        if self
            .sky_bind_group
            .as_ref()
            .is_some_and(|(_, v)| *v == self.texture_version)
        {
            return;
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky_bind_group"),
            layout: &self.sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        self.texture_view(scene.graph.background(), &self.defaults.black_cube),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.sky_bind_group = Some((bind_group, self.texture_version));
    }

    fn frame_uniforms(scene: &Scene) -> Result<FrameUniforms, SceneError> {
        let camera = scene.handles.camera;
        let (eye, _) = scene.graph.camera_view(camera)?;
        let view_proj: Mat4 = scene.graph.view_projection(camera)?;

        let mut ambient = [0.0; 4];
        let mut light_pos = [0.0; 4];
        let mut light_color = [0.0; 4];
        for (id, node) in scene.graph.lights() {
            match &node.kind {
                NodeKind::AmbientLight { color, intensity } => {
                    let [r, g, b] = color.to_linear();
                    ambient = [r * intensity, g * intensity, b * intensity, 1.0];
                }
                NodeKind::PointLight { color, intensity } => {
                    let [r, g, b] = color.to_linear();
                    light_color = [r * intensity, g * intensity, b * intensity, 1.0];
                    light_pos = scene.graph.world_position(id)?.extend(1.0).to_array();
                }
                _ => {}
            }
        }

        Ok(FrameUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: eye.extend(1.0).to_array(),
            ambient,
            light_pos,
            light_color,
        })
    }

    /// Render one frame: background, then every mesh node.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
    ) -> Result<(), SceneError> {
        let frame = Self::frame_uniforms(scene)?;
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        self.sync_meshes(device, queue, scene)?;
        self.sync_materials(device, queue, scene);
        self.sync_sky(device, scene);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some((sky, _)) = &self.sky_bind_group {
                pass.set_pipeline(&self.sky_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_bind_group(1, sky, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (id, _, _, material) in scene.graph.meshes() {
                let (Some(mesh), Some(material)) =
                    (self.meshes.get(&id), self.materials.get(&material))
                else {
                    continue;
                };
                pass.set_bind_group(1, &mesh.object_bind_group, &[]);
                pass.set_bind_group(2, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn create_flat(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        color_space: ColorSpace,
    ) -> wgpu::TextureView {
        let format = match color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("flat_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        Self::write_layer(queue, &texture, image, 0);
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_cube(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cube: &CubeImage,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cube_texture"),
            size: wgpu::Extent3d {
                width: cube.size,
                height: cube.size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in cube.faces.iter().enumerate() {
            Self::write_layer(queue, &texture, face, layer as u32);
        }
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("cube_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        })
    }

    fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &ImageData, layer: u32) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use torusfield_common::Color;
    use torusfield_scene::Geometry;

    #[test]
    fn gpu_structs_are_std140_sized() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 64 * 2 + 16 * 4);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48);
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
    }

    #[test]
    fn interleave_keeps_attributes() {
        let mesh = MeshData::from_geometry(&Geometry::torus(1.0, 0.1, 4, 8));
        let verts = interleave(&mesh);
        assert_eq!(verts.len(), mesh.vertex_count());
        assert_eq!(verts[3].position, mesh.positions[3]);
        assert_eq!(verts[3].tangent, mesh.tangents[3]);
    }

    #[test]
    fn material_flags_follow_loaded_textures() {
        let material = StandardMaterial {
            color: Color::WHITE,
            metalness: 0.25,
            roughness: 0.5,
            normal_map: Some(TextureHandle(0)),
            normal_scale: Vec2::splat(1.5),
            env_map: Some(TextureHandle(1)),
            ..StandardMaterial::new("knot")
        };
        let u = material_uniforms(&material, &BTreeMap::new());
        assert_eq!(u.params, [0.25, 0.5, 1.5, 1.5]);
        // Nothing uploaded yet: the normal map falls back to flat.
        assert_eq!(u.flags, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(u.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
