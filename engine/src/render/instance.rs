//! Body instance data for the external renderer
//!
//! One [`BodyInstance`] per visible body, laid out so a whole slice can be
//! uploaded to a GPU instance buffer as raw bytes.

use bytemuck::{Pod, Zeroable};

use crate::physics::{ColliderKind, PhysicsBody};

/// Shape tag stored in [`BodyInstance::shape`] for boxes.
pub const SHAPE_BOX: u32 = 0;
/// Shape tag stored in [`BodyInstance::shape`] for spheres.
pub const SHAPE_SPHERE: u32 = 1;

/// GPU instance data for a single physics body.
///
/// Layout (80 bytes total, 16-byte multiple):
/// - model:     mat4x4<f32> (64 bytes) - Column-major model matrix
/// - user_data: u32 (4 bytes) - Low 32 bits of the body's user data
/// - shape:     u32 (4 bytes) - [`SHAPE_BOX`] or [`SHAPE_SPHERE`]
/// - _pad:      [u32; 2] (8 bytes) - Padding to a 16-byte multiple
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    /// Column-major model matrix - 64 bytes
    pub model: [[f32; 4]; 4],
    /// Gameplay entity id (truncated) - 4 bytes
    pub user_data: u32,
    /// Shape tag - 4 bytes
    pub shape: u32,
    pub _pad: [u32; 2],
}

static_assertions::assert_eq_size!(BodyInstance, [u8; 80]);

impl Default for BodyInstance {
    fn default() -> Self {
        Self {
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            user_data: 0,
            shape: SHAPE_BOX,
            _pad: [0; 2],
        }
    }
}

impl BodyInstance {
    /// Snapshot of a body's current transform.
    ///
    /// A body without a collider is tagged as a box.
    pub fn from_body(body: &PhysicsBody) -> Self {
        let shape = match body.collider().map(|collider| collider.kind()) {
            Some(ColliderKind::Sphere) => SHAPE_SPHERE,
            _ => SHAPE_BOX,
        };
        Self {
            model: body.transform.matrix().to_cols_array_2d(),
            // Entity ids fit in 32 bits on the GPU side
            user_data: body.user_data as u32,
            shape,
            _pad: [0; 2],
        }
    }

    /// Model matrix as a glam type.
    pub fn model_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_cols_array_2d(&self.model)
    }
}

/// Views a slice of instances as bytes for a buffer upload.
pub fn as_bytes(instances: &[BodyInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
