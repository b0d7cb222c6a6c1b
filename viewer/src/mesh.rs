//! GPU preparation of meshes.
//!
//! Each primitive gets its own vertex array. Vertex buffers map to glTF
//! buffer views: accessors interleaved in one view share one GPU buffer,
//! and attributes select their data through the view stride and the
//! accessor offset. A buffer view is uploaded at most once per mesh, except
//! for sparse accessors, whose content is specific to the accessor.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use arte_core::gltf::{
    self, buffer, Accessor, BufferTarget, BufferView, ComponentType, Index, Member, Owned,
    PrimitiveMode,
};
use arte_core::math::{mat4_to_cols_array_2d, BoundingBox, Mat4, Vec3};
use arte_graphics::{
    write_pod, BufferDescriptor, BufferUsage, GpuBackend, GpuBuffer, GpuVertexArray, IndexFormat,
    PrimitiveTopology, VertexAttribute, VertexComponent,
};
use bytemuck::{Pod, Zeroable};

use crate::error::{Result, ViewerError};
use crate::logging::PREPARE;
use crate::material::{Material, TextureRepository};

/// Attribute location of each recognized semantic in the shaders.
pub const SEMANTIC_LOCATIONS: [(&str, u32); 6] = [
    ("POSITION", 0),
    ("NORMAL", 1),
    ("TEXCOORD_0", 2),
    ("COLOR_0", 3),
    ("JOINTS_0", 4),
    ("WEIGHTS_0", 5),
];

/// First attribute location of the per-instance model matrix, which
/// occupies four consecutive locations.
pub const INSTANCE_ATTRIBUTE_LOCATION: u32 = 8;

/// Shader location of `semantic`, if the viewer uses it.
pub fn semantic_location(semantic: &str) -> Option<u32> {
    SEMANTIC_LOCATIONS
        .iter()
        .find(|(name, _)| *name == semantic)
        .map(|&(_, location)| location)
}

fn topology(mode: PrimitiveMode) -> PrimitiveTopology {
    match mode {
        PrimitiveMode::Points => PrimitiveTopology::Points,
        PrimitiveMode::Lines => PrimitiveTopology::Lines,
        PrimitiveMode::LineLoop => PrimitiveTopology::LineLoop,
        PrimitiveMode::LineStrip => PrimitiveTopology::LineStrip,
        PrimitiveMode::Triangles => PrimitiveTopology::Triangles,
        PrimitiveMode::TriangleStrip => PrimitiveTopology::TriangleStrip,
        PrimitiveMode::TriangleFan => PrimitiveTopology::TriangleFan,
    }
}

fn vertex_component(component_type: ComponentType) -> VertexComponent {
    match component_type {
        ComponentType::Byte => VertexComponent::I8,
        ComponentType::UnsignedByte => VertexComponent::U8,
        ComponentType::Short => VertexComponent::I16,
        ComponentType::UnsignedShort => VertexComponent::U16,
        ComponentType::UnsignedInt => VertexComponent::U32,
        ComponentType::Float => VertexComponent::F32,
    }
}

/// Uploads the buffer view of `accessor`, sparse values applied.
fn prepare_buffer(
    backend: &dyn GpuBackend,
    accessor: Owned<'_, Accessor>,
    target: BufferTarget,
) -> Result<GpuBuffer> {
    let view = buffer::checked_buffer_view(accessor)?;
    match view.target {
        None => log::warn!(
            target: PREPARE,
            "Buffer view {} does not have target defined. Inferring {}.",
            view.id(),
            target.to_gl()
        ),
        Some(declared) if declared != target => {
            return Err(ViewerError::Format(format!(
                "buffer view {} has target {} but accessor {} uses it as {}",
                view.id(),
                declared.to_gl(),
                accessor.id(),
                target.to_gl()
            )))
        }
        Some(_) => {}
    }

    let data = buffer::load_accessor_data(accessor)?;
    let range = buffer::buffer_view_range(view, data.len())?;
    let usage = match target {
        BufferTarget::Array => BufferUsage::VERTEX,
        BufferTarget::ElementArray => BufferUsage::INDEX,
    };
    let gpu_buffer = backend.create_buffer(
        &BufferDescriptor::new(view.byte_length as u64, usage | BufferUsage::COPY_DST)
            .with_label(format!("buffer view {}", view.id())),
    )?;
    backend.write_buffer(gpu_buffer, &data[range])?;

    log::debug!(
        target: PREPARE,
        "Loaded {} bytes in target {}, offset in source buffer is {} bytes.",
        view.byte_length,
        target.to_gl(),
        view.byte_offset
    );
    Ok(gpu_buffer)
}

/// Cache key of a vertex buffer.
///
/// Sparse accessors are keyed by their own index as well, so they never
/// share a buffer with another accessor of the same view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId {
    pub buffer_view: Index<BufferView>,
    pub sparse_accessor: Option<Index<Accessor>>,
}

impl BufferId {
    pub fn new(buffer_view: Index<BufferView>, accessor: Owned<'_, Accessor>) -> Self {
        Self {
            buffer_view,
            sparse_accessor: accessor.sparse.as_ref().map(|_| accessor.id()),
        }
    }
}

/// A GPU buffer holding the bytes of one buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBuffer {
    pub buffer: GpuBuffer,
    /// Byte stride of the view, 0 when tightly packed.
    pub stride: u32,
}

/// Vertex buffers of a mesh, by [`BufferId`].
pub type VertexBufferCache = BTreeMap<BufferId, VertexBuffer>;

/// Index buffer of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indices {
    pub buffer: GpuBuffer,
    pub format: IndexFormat,
    /// Offset of the first index inside the buffer.
    pub byte_offset: u64,
}

impl Indices {
    pub fn prepare(backend: &dyn GpuBackend, accessor: Owned<'_, Accessor>) -> Result<Self> {
        let format = match accessor.component_type {
            ComponentType::UnsignedByte => IndexFormat::U8,
            ComponentType::UnsignedShort => IndexFormat::U16,
            ComponentType::UnsignedInt => IndexFormat::U32,
            other => {
                return Err(ViewerError::Format(format!(
                    "index accessor {} has component type {}",
                    accessor.id(),
                    other
                )))
            }
        };
        Ok(Self {
            buffer: prepare_buffer(backend, accessor, BufferTarget::ElementArray)?,
            format,
            byte_offset: accessor.byte_offset as u64,
        })
    }
}

/// Per-instance data, read by the vertex shader as a `mat4`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Instance {
    /// Column-major model transform.
    pub model_transform: [[f32; 4]; 4],
}

impl Instance {
    pub fn new(model_transform: &Mat4) -> Self {
        Self {
            model_transform: mat4_to_cols_array_2d(model_transform),
        }
    }
}

/// GPU buffer of instances drawn by a mesh.
///
/// Holds a single identity instance until the first [`InstanceList::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceList {
    buffer: GpuBuffer,
    count: u32,
}

impl InstanceList {
    pub fn new(backend: &dyn GpuBackend) -> Result<Self> {
        let buffer = backend.create_buffer(
            &BufferDescriptor::new(0, BufferUsage::VERTEX | BufferUsage::COPY_DST)
                .with_label("instances"),
        )?;
        let mut list = Self { buffer, count: 0 };
        list.update(backend, &[Instance::new(&Mat4::identity())])?;
        Ok(list)
    }

    /// Replaces all the instances.
    pub fn update(&mut self, backend: &dyn GpuBackend, instances: &[Instance]) -> Result<()> {
        write_pod(backend, self.buffer, instances)?;
        self.count = instances.len() as u32;
        Ok(())
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn buffer(&self) -> GpuBuffer {
        self.buffer
    }

    /// Binds the model matrix columns to the instance locations of `vertex_array`.
    pub fn associate(&self, backend: &dyn GpuBackend, vertex_array: GpuVertexArray) -> Result<()> {
        let stride = std::mem::size_of::<Instance>() as u32;
        for column in 0..4 {
            backend.set_vertex_attribute(
                vertex_array,
                &VertexAttribute {
                    location: INSTANCE_ATTRIBUTE_LOCATION + column,
                    buffer: self.buffer,
                    components: 4,
                    component: VertexComponent::F32,
                    normalized: false,
                    stride,
                    offset: u64::from(column) * 16,
                    divisor: 1,
                },
            )?;
        }
        Ok(())
    }
}

fn position_bounds(accessor: Owned<'_, Accessor>) -> Result<BoundingBox> {
    let missing = || {
        ViewerError::Format(format!(
            "POSITION accessor {} must have float min and max bounds",
            accessor.id()
        ))
    };
    match &accessor.bounds {
        Some(gltf::Bounds::Float(bounds)) if bounds.min.len() >= 3 && bounds.max.len() >= 3 => {
            Ok(BoundingBox::from_min_max(
                Vec3::new(bounds.min[0], bounds.min[1], bounds.min[2]),
                Vec3::new(bounds.max[0], bounds.max[1], bounds.max[2]),
            ))
        }
        _ => Err(missing()),
    }
}

/// A primitive ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPrimitive {
    pub topology: PrimitiveTopology,
    /// Vertices, or indices when indexed.
    pub count: u32,
    pub vertex_array: GpuVertexArray,
    pub indices: Option<Indices>,
    /// Attribute locations with data.
    pub provided_locations: BTreeSet<u32>,
    pub material: Material,
    pub bounding_box: BoundingBox,
}

impl MeshPrimitive {
    /// Binds every recognized attribute of `primitive`, its indices and the
    /// instance buffer.
    ///
    /// Vertex buffers are looked up in and added to `vertex_buffers`.
    pub fn prepare(
        backend: &dyn GpuBackend,
        primitive: Member<'_, gltf::Primitive>,
        vertex_buffers: &mut VertexBufferCache,
        instances: &InstanceList,
        textures: &mut TextureRepository,
    ) -> Result<Self> {
        let vertex_array =
            backend.create_vertex_array(Some(&format!("primitive {}", primitive.position())))?;
        let mut vertex_count = None;
        let mut bounding_box = None;
        let mut provided_locations = BTreeSet::new();

        for (semantic, &accessor_index) in &primitive.attributes {
            log::debug!(
                target: PREPARE,
                "Semantic '{}' is associated to accessor {}.",
                semantic,
                accessor_index
            );
            let accessor = primitive.get(|_| accessor_index);

            match vertex_count {
                Some(count) if count != accessor.count => {
                    return Err(ViewerError::Format(format!(
                        "primitive {}: accessor {} has {} elements, previous attributes have {}",
                        primitive.position(),
                        accessor.id(),
                        accessor.count,
                        count
                    )))
                }
                _ => vertex_count = Some(accessor.count),
            }

            // Unknown semantics are dropped whatever their element type.
            let Some(location) = semantic_location(semantic) else {
                log::warn!(target: PREPARE, "Semantic '{}' is ignored.", semantic);
                continue;
            };

            let layout = accessor.element_type.layout();
            if layout.occupied_attributes != 1 {
                return Err(ViewerError::unsupported(format!(
                    "matrix attributes not implemented ({} accessor {} bound to '{}')",
                    accessor.element_type,
                    accessor.id(),
                    semantic
                )));
            }

            let view = buffer::checked_buffer_view(accessor)?;
            let id = BufferId::new(view.id(), accessor);
            let vertex_buffer = match vertex_buffers.get(&id) {
                Some(cached) => *cached,
                None => {
                    let prepared = VertexBuffer {
                        buffer: prepare_buffer(backend, accessor, BufferTarget::Array)?,
                        stride: view.byte_stride.unwrap_or(0) as u32,
                    };
                    vertex_buffers.insert(id, prepared);
                    prepared
                }
            };

            let attribute = VertexAttribute {
                location,
                buffer: vertex_buffer.buffer,
                components: layout.components_per_attribute as u32,
                component: vertex_component(accessor.component_type),
                normalized: accessor.normalized,
                stride: vertex_buffer.stride,
                // The view offset is applied when uploading.
                offset: accessor.byte_offset as u64,
                divisor: 0,
            };
            backend.set_vertex_attribute(vertex_array, &attribute)?;
            provided_locations.insert(location);

            if semantic == "POSITION" {
                let bounds = position_bounds(accessor)?;
                log::debug!(
                    target: PREPARE,
                    "Mesh primitive {} has bounding box {:?}..{:?}.",
                    primitive.position(),
                    bounds.min.as_slice(),
                    bounds.max.as_slice()
                );
                bounding_box = Some(bounds);
            }

            log::debug!(
                target: PREPARE,
                "Attached semantic '{}' to vertex attribute {}. Source data elements have {} components of type {}. Buffer {}, stride is {}, offset is {}.",
                semantic,
                location,
                layout.components_per_attribute,
                accessor.component_type,
                vertex_buffer.buffer.id(),
                vertex_buffer.stride,
                accessor.byte_offset
            );
        }

        let Some(bounding_box) = bounding_box else {
            return Err(ViewerError::Format(format!(
                "primitive {} does not have a POSITION attribute",
                primitive.position()
            )));
        };

        let mut count = vertex_count.unwrap_or(0);
        let indices = match primitive.get_optional(|p| p.indices) {
            Some(accessor) => {
                let indices = Indices::prepare(backend, accessor)?;
                backend.set_index_buffer(vertex_array, indices.buffer)?;
                count = accessor.count;
                Some(indices)
            }
            None => None,
        };

        instances.associate(backend, vertex_array)?;
        let material =
            Material::prepare(backend, primitive.get_optional(|p| p.material), textures)?;

        Ok(Self {
            topology: topology(primitive.mode),
            count: count as u32,
            vertex_array,
            indices,
            provided_locations,
            material,
            bounding_box,
        })
    }

    /// Whether the primitive has vertex colors.
    pub fn provides_color(&self) -> bool {
        semantic_location("COLOR_0").is_some_and(|location| self.provided_locations.contains(&location))
    }
}

impl fmt::Display for MeshPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<MeshPrimitive> {} {:?} of {} elements",
            if self.indices.is_some() { "indexed" } else { "non-indexed" },
            self.topology,
            self.count
        )
    }
}

/// A mesh ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub primitives: Vec<MeshPrimitive>,
    /// Union of the primitive boxes.
    pub bounding_box: BoundingBox,
    pub instances: InstanceList,
    pub vertex_buffers: VertexBufferCache,
}

impl Mesh {
    /// Uploads every primitive of `mesh`.
    pub fn prepare(
        backend: &dyn GpuBackend,
        mesh: Owned<'_, gltf::Mesh>,
        textures: &mut TextureRepository,
    ) -> Result<Self> {
        let instances = InstanceList::new(backend)?;
        let mut vertex_buffers = VertexBufferCache::new();
        let primitives = mesh
            .members(|m| m.primitives.as_slice())
            .map(|primitive| {
                MeshPrimitive::prepare(backend, primitive, &mut vertex_buffers, &instances, textures)
            })
            .collect::<Result<Vec<_>>>()?;

        // Seeded from the first primitive rather than from the origin.
        let mut boxes = primitives.iter().map(|primitive| primitive.bounding_box);
        let Some(first) = boxes.next() else {
            return Err(ViewerError::Format(format!(
                "mesh {} does not have any primitive",
                mesh.id()
            )));
        };
        let bounding_box = boxes.fold(first, |united, other| united.united(&other));

        Ok(Self {
            primitives,
            bounding_box,
            instances,
            vertex_buffers,
        })
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Mesh> with {} primitives:", self.primitives.len())?;
        for primitive in &self.primitives {
            write!(f, "\n\t* {primitive}")?;
        }
        Ok(())
    }
}
