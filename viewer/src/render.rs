//! Draw submission.

use arte_graphics::{DrawCommand, GpuBackend, IndexBinding};

use crate::error::Result;
use crate::logging::DRAW;
use crate::material::BASE_COLOR_TEXTURE_UNIT;
use crate::mesh::{Mesh, MeshPrimitive};
use crate::skeleton::{Skeleton, PALETTE_BLOCK_BINDING};

/// Issues one draw per primitive.
#[derive(Debug, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    fn command(primitive: &MeshPrimitive, instance_count: u32) -> DrawCommand {
        let texture = primitive.material.base_color_texture;
        DrawCommand::new(primitive.vertex_array, primitive.topology, primitive.count)
            .with_instances(instance_count)
            .with_index(primitive.indices.map(|indices| IndexBinding {
                format: indices.format,
                byte_offset: indices.byte_offset,
            }))
            .with_texture(BASE_COLOR_TEXTURE_UNIT, texture.texture, texture.sampler)
    }

    /// Draws every instance of `mesh` listed in its instance buffer.
    ///
    /// Returns the number of draws issued.
    pub fn render(&self, backend: &dyn GpuBackend, mesh: &Mesh) -> Result<usize> {
        let instance_count = mesh.instances.len();
        for primitive in &mesh.primitives {
            log::trace!(
                target: DRAW,
                "{} rendering of {} instance(s) of {} elements with mode {:?}.",
                if primitive.indices.is_some() { "Indexed" } else { "Array" },
                instance_count,
                primitive.count,
                primitive.topology
            );
            backend.draw(&Self::command(primitive, instance_count))?;
        }
        Ok(mesh.primitives.len())
    }

    /// Draws `mesh` once, deformed by the matrix palette of `skeleton`.
    pub fn render_skinned(
        &self,
        backend: &dyn GpuBackend,
        mesh: &Mesh,
        skeleton: &Skeleton,
    ) -> Result<usize> {
        for primitive in &mesh.primitives {
            log::trace!(
                target: DRAW,
                "Skinned rendering of {} elements with {} joints.",
                primitive.count,
                skeleton.joints.len()
            );
            backend.draw(
                &Self::command(primitive, 1)
                    .with_uniform(PALETTE_BLOCK_BINDING, skeleton.palette.buffer),
            )?;
        }
        Ok(mesh.primitives.len())
    }
}
