//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It keeps every
//! created resource, every upload and every draw in memory so that callers
//! can run headless and tests can inspect what would have reached the GPU.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::error::GraphicsError;
use crate::types::{
    BufferDescriptor, BufferUsage, DrawCommand, SamplerDescriptor, TextureDescriptor,
    VertexAttribute,
};

use super::{GpuBackend, GpuBuffer, GpuSampler, GpuTexture, GpuVertexArray};

/// Recorded state of a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    pub descriptor: BufferDescriptor,
    /// Content after the last upload, zeroed at creation.
    pub data: Vec<u8>,
    /// Number of `write_buffer` calls.
    pub uploads: usize,
}

/// Recorded state of a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub descriptor: TextureDescriptor,
    pub data: Vec<u8>,
    pub uploads: usize,
}

/// Recorded bindings of a vertex array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexArrayRecord {
    pub label: Option<String>,
    /// Attribute bindings by location.
    pub attributes: BTreeMap<u32, VertexAttribute>,
    pub index_buffer: Option<GpuBuffer>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    buffers: BTreeMap<u64, BufferRecord>,
    textures: BTreeMap<u64, TextureRecord>,
    samplers: BTreeMap<u64, SamplerDescriptor>,
    vertex_arrays: BTreeMap<u64, VertexArrayRecord>,
    draws: Vec<DrawCommand>,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_buffer(&self, buffer: GpuBuffer) -> Result<&BufferRecord, GraphicsError> {
        self.buffers.get(&buffer.id()).ok_or_else(|| buffer.unknown())
    }
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    state: Mutex<State>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a buffer.
    pub fn buffer(&self, buffer: GpuBuffer) -> Option<BufferRecord> {
        self.state.lock().buffers.get(&buffer.id()).cloned()
    }

    /// Current content of a buffer.
    pub fn buffer_data(&self, buffer: GpuBuffer) -> Option<Vec<u8>> {
        self.state
            .lock()
            .buffers
            .get(&buffer.id())
            .map(|record| record.data.clone())
    }

    /// Number of uploads a buffer received.
    pub fn buffer_uploads(&self, buffer: GpuBuffer) -> usize {
        self.state
            .lock()
            .buffers
            .get(&buffer.id())
            .map_or(0, |record| record.uploads)
    }

    /// Number of buffers created.
    pub fn buffer_count(&self) -> usize {
        self.state.lock().buffers.len()
    }

    /// Buffers created with all the flags of `usage`, in creation order.
    pub fn buffers_with_usage(&self, usage: BufferUsage) -> Vec<GpuBuffer> {
        self.state
            .lock()
            .buffers
            .iter()
            .filter(|(_, record)| record.descriptor.usage.contains(usage))
            .map(|(&id, _)| GpuBuffer::from_raw(id))
            .collect()
    }

    /// Snapshot of a texture.
    pub fn texture(&self, texture: GpuTexture) -> Option<TextureRecord> {
        self.state.lock().textures.get(&texture.id()).cloned()
    }

    /// Number of textures created.
    pub fn texture_count(&self) -> usize {
        self.state.lock().textures.len()
    }

    /// Descriptor a sampler was created with.
    pub fn sampler(&self, sampler: GpuSampler) -> Option<SamplerDescriptor> {
        self.state.lock().samplers.get(&sampler.id()).cloned()
    }

    /// Number of samplers created.
    pub fn sampler_count(&self) -> usize {
        self.state.lock().samplers.len()
    }

    /// Snapshot of a vertex array.
    pub fn vertex_array(&self, vertex_array: GpuVertexArray) -> Option<VertexArrayRecord> {
        self.state
            .lock()
            .vertex_arrays
            .get(&vertex_array.id())
            .cloned()
    }

    /// Draws issued so far.
    pub fn draws(&self) -> Vec<DrawCommand> {
        self.state.lock().draws.clone()
    }

    /// Returns and forgets the draws issued so far.
    pub fn take_draws(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.state.lock().draws)
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        let size = usize::try_from(descriptor.size).map_err(|_| {
            GraphicsError::ResourceCreationFailed(format!("buffer size {} too large", descriptor.size))
        })?;
        let mut state = self.state.lock();
        let id = state.allocate_id();
        state.buffers.insert(
            id,
            BufferRecord {
                descriptor: descriptor.clone(),
                data: vec![0; size],
                uploads: 0,
            },
        );
        Ok(GpuBuffer::from_raw(id))
    }

    fn write_buffer(&self, buffer: GpuBuffer, data: &[u8]) -> Result<(), GraphicsError> {
        log::trace!("DummyBackend: write_buffer {} len={}", buffer.id(), data.len());
        let mut state = self.state.lock();
        let record = state
            .buffers
            .get_mut(&buffer.id())
            .ok_or_else(|| buffer.unknown())?;
        record.data.clear();
        record.data.extend_from_slice(data);
        record.descriptor.size = data.len() as u64;
        record.uploads += 1;
        Ok(())
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, GraphicsError> {
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{})",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(GraphicsError::ResourceCreationFailed(format!(
                "texture {:?} has an empty extent",
                descriptor.label
            )));
        }
        let mut state = self.state.lock();
        let id = state.allocate_id();
        state.textures.insert(
            id,
            TextureRecord {
                descriptor: descriptor.clone(),
                data: Vec::new(),
                uploads: 0,
            },
        );
        Ok(GpuTexture::from_raw(id))
    }

    fn write_texture(&self, texture: GpuTexture, data: &[u8]) -> Result<(), GraphicsError> {
        let mut state = self.state.lock();
        let record = state
            .textures
            .get_mut(&texture.id())
            .ok_or_else(|| texture.unknown())?;
        log::trace!(
            "DummyBackend: write_texture {:?} ({}x{}) len={}",
            record.descriptor.label,
            record.descriptor.width,
            record.descriptor.height,
            data.len()
        );
        let expected = record.descriptor.byte_size();
        if data.len() != expected {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture upload of {} bytes, expected {expected}",
                data.len()
            )));
        }
        record.data = data.to_vec();
        record.uploads += 1;
        Ok(())
    }

    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<GpuSampler, GraphicsError> {
        log::trace!("DummyBackend: creating sampler {:?}", descriptor.label);
        let mut state = self.state.lock();
        let id = state.allocate_id();
        state.samplers.insert(id, descriptor.clone());
        Ok(GpuSampler::from_raw(id))
    }

    fn create_vertex_array(&self, label: Option<&str>) -> Result<GpuVertexArray, GraphicsError> {
        log::trace!("DummyBackend: creating vertex array {:?}", label);
        let mut state = self.state.lock();
        let id = state.allocate_id();
        state.vertex_arrays.insert(
            id,
            VertexArrayRecord {
                label: label.map(str::to_string),
                ..Default::default()
            },
        );
        Ok(GpuVertexArray::from_raw(id))
    }

    fn set_vertex_attribute(
        &self,
        vertex_array: GpuVertexArray,
        attribute: &VertexAttribute,
    ) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyBackend: vertex array {} location {} <- buffer {} ({}x{:?}{}, stride {}, offset {}, divisor {})",
            vertex_array.id(),
            attribute.location,
            attribute.buffer.id(),
            attribute.components,
            attribute.component,
            if attribute.component.is_integer() && !attribute.normalized { " int" } else { "" },
            attribute.effective_stride(),
            attribute.offset,
            attribute.divisor
        );
        if !(1..=4).contains(&attribute.components) {
            return Err(GraphicsError::InvalidParameter(format!(
                "vertex attribute with {} components",
                attribute.components
            )));
        }
        let mut state = self.state.lock();
        state.check_buffer(attribute.buffer)?;
        let record = state
            .vertex_arrays
            .get_mut(&vertex_array.id())
            .ok_or_else(|| vertex_array.unknown())?;
        record.attributes.insert(attribute.location, *attribute);
        Ok(())
    }

    fn set_index_buffer(
        &self,
        vertex_array: GpuVertexArray,
        buffer: GpuBuffer,
    ) -> Result<(), GraphicsError> {
        let mut state = self.state.lock();
        state.check_buffer(buffer)?;
        let record = state
            .vertex_arrays
            .get_mut(&vertex_array.id())
            .ok_or_else(|| vertex_array.unknown())?;
        record.index_buffer = Some(buffer);
        Ok(())
    }

    fn draw(&self, command: &DrawCommand) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyBackend: draw {:?} count={} instances={} indexed={}",
            command.topology,
            command.count,
            command.instance_count,
            command.is_indexed()
        );
        let mut state = self.state.lock();
        let vertex_array = state
            .vertex_arrays
            .get(&command.vertex_array.id())
            .ok_or_else(|| command.vertex_array.unknown())?;
        if command.is_indexed() && vertex_array.index_buffer.is_none() {
            return Err(GraphicsError::InvalidParameter(format!(
                "indexed draw with vertex array {} lacking an index buffer",
                command.vertex_array.id()
            )));
        }
        for binding in &command.textures {
            if !state.textures.contains_key(&binding.texture.id()) {
                return Err(binding.texture.unknown());
            }
            if !state.samplers.contains_key(&binding.sampler.id()) {
                return Err(binding.sampler.unknown());
            }
        }
        for binding in &command.uniforms {
            state.check_buffer(binding.buffer)?;
        }
        state.draws.push(command.clone());
        Ok(())
    }
}
