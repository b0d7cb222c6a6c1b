//! Skeletal skinning: inverse bind matrices and the joint matrix palette.

use std::collections::BTreeMap;

use arte_core::gltf::{buffer, ComponentType, ElementType, Index, Node, Owned, Skin};
use arte_core::math::{mat4_to_cols_array_2d, Mat4};
use arte_graphics::{write_pod, BufferDescriptor, BufferUsage, GpuBackend, GpuBuffer};

use crate::error::{Result, ViewerError};
use crate::logging::PREPARE;

/// Capacity of the matrix palette declared by the skinning vertex shader.
pub const MAX_JOINTS: usize = 64;

/// Uniform block binding of the matrix palette.
pub const PALETTE_BLOCK_BINDING: u32 = 3;

const MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Current state of a node used as a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub world_transform: Mat4,
}

/// World transforms of the joint nodes, filled by scene traversal.
pub type JointRepository = BTreeMap<Index<Node>, Joint>;

/// GPU uniform buffer holding one skinning matrix per joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointMatrixPalette {
    pub buffer: GpuBuffer,
    pub matrix_count: usize,
}

impl JointMatrixPalette {
    pub fn new(backend: &dyn GpuBackend, matrix_count: usize) -> Result<Self> {
        let buffer = backend.create_buffer(
            &BufferDescriptor::new(
                MATRIX_SIZE * matrix_count as u64,
                BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            )
            .with_label("joint matrix palette"),
        )?;
        Ok(Self {
            buffer,
            matrix_count,
        })
    }

    /// Replaces the palette content, column-major.
    pub fn update(&self, backend: &dyn GpuBackend, matrices: &[Mat4]) -> Result<()> {
        let columns: Vec<[[f32; 4]; 4]> = matrices.iter().map(mat4_to_cols_array_2d).collect();
        write_pod(backend, self.buffer, &columns)?;
        Ok(())
    }
}

/// A skin prepared for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// One per joint, identity when the skin declares none.
    pub inverse_bind_matrices: Vec<Mat4>,
    pub joints: Vec<Index<Node>>,
    pub palette: JointMatrixPalette,
}

impl Skeleton {
    /// Loads the inverse bind matrices of `skin` and allocates its palette.
    pub fn prepare(backend: &dyn GpuBackend, skin: Owned<'_, Skin>) -> Result<Self> {
        let joints = skin.joints.clone();
        if joints.len() > MAX_JOINTS {
            log::error!(
                target: PREPARE,
                "Skin {} has {} joints, more than the {} supported.",
                skin.id(),
                joints.len(),
                MAX_JOINTS
            );
            return Err(ViewerError::TooManyJoints {
                skin: skin.id().value(),
                joints: joints.len(),
                limit: MAX_JOINTS,
            });
        }

        let inverse_bind_matrices = match skin.get_optional(|s| s.inverse_bind_matrices) {
            Some(accessor) => {
                if accessor.element_type != ElementType::Mat4
                    || accessor.component_type != ComponentType::Float
                {
                    return Err(ViewerError::unsupported(format!(
                        "inverse bind matrices accessor {} is {} of component type {}",
                        accessor.id(),
                        accessor.element_type,
                        accessor.component_type
                    )));
                }
                if accessor.count < joints.len() {
                    return Err(ViewerError::Format(format!(
                        "skin {} has {} joints but only {} inverse bind matrices",
                        skin.id(),
                        joints.len(),
                        accessor.count
                    )));
                }
                buffer::load_accessor_elements::<[f32; 16]>(accessor)?
                    .iter()
                    .take(joints.len())
                    .map(|columns| Mat4::from_column_slice(columns))
                    .collect()
            }
            None => vec![Mat4::identity(); joints.len()],
        };

        let palette = JointMatrixPalette::new(backend, joints.len())?;
        log::debug!(target: PREPARE, "Loaded skeleton for skin {} ({} joints).", skin.id(), joints.len());
        Ok(Self {
            inverse_bind_matrices,
            joints,
            palette,
        })
    }

    /// Skinning matrices, `world(joint) * inverse_bind(joint)` in joint order.
    pub fn compute_palette(&self, joints: &JointRepository) -> Result<Vec<Mat4>> {
        self.joints
            .iter()
            .zip(&self.inverse_bind_matrices)
            .map(|(node, inverse_bind)| {
                joints
                    .get(node)
                    .map(|joint| joint.world_transform * inverse_bind)
                    .ok_or(ViewerError::MissingJointTransform(node.value()))
            })
            .collect()
    }

    /// Recomputes the palette from the current joint transforms and uploads it.
    pub fn update_palette(&self, backend: &dyn GpuBackend, joints: &JointRepository) -> Result<()> {
        let matrices = self.compute_palette(joints)?;
        self.palette.update(backend, &matrices)
    }
}
