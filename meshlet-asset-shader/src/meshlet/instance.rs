use crate::transform::RigidInstanceTransform;
use core::mem;
use glam::{Quat, Vec3};
use static_assertions::const_assert_eq;

/// An entry of the instance buffer read by instance culling.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct MeshInstance {
	pub position: [f32; 3],
	pub scale: f32,
	/// quaternion as `[x, y, z, w]`
	pub rotation: [f32; 4],
	pub mesh_idx: u32,
	pub _pad: [u32; 3],
}
// std430 rounds the struct up to its 16 byte alignment
const_assert_eq!(mem::size_of::<MeshInstance>(), 12 * 4);

impl MeshInstance {
	pub fn new(position: Vec3, scale: f32, rotation: Quat, mesh_idx: u32) -> Self {
		Self {
			position: position.to_array(),
			scale,
			rotation: rotation.to_array(),
			mesh_idx,
			_pad: [0; 3],
		}
	}

	pub fn position(&self) -> Vec3 {
		Vec3::from_array(self.position)
	}

	pub fn rotation(&self) -> Quat {
		Quat::from_array(self.rotation)
	}

	pub fn transform(&self) -> RigidInstanceTransform {
		RigidInstanceTransform::new(self.position(), self.scale, self.rotation())
	}
}

impl Default for MeshInstance {
	fn default() -> Self {
		Self::new(Vec3::ZERO, 1., Quat::IDENTITY, 0)
	}
}

/// An entry of the list instance culling appends to: the instance that passed and its selected level of detail.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct VisibleInstance {
	pub index: u32,
	pub level: u32,
}
const_assert_eq!(mem::size_of::<VisibleInstance>(), 2 * 4);

/// Per draw push constants: the rigid transform of the drawn instance and which mesh level to draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
pub struct DrawParams {
	pub translation: [f32; 3],
	pub scale: f32,
	pub rotation: [f32; 4],
	pub mesh_idx: u32,
	pub level_idx: u32,
}
const_assert_eq!(mem::size_of::<DrawParams>(), 10 * 4);

impl DrawParams {
	pub fn new(transform: RigidInstanceTransform, mesh_idx: u32, level_idx: u32) -> Self {
		Self {
			translation: transform.translation.to_array(),
			scale: transform.scale,
			rotation: transform.rotation.to_array(),
			mesh_idx,
			level_idx,
		}
	}

	pub fn from_instance(instance: &MeshInstance, visible: VisibleInstance) -> Self {
		Self::new(instance.transform(), instance.mesh_idx, visible.level)
	}

	pub fn transform(&self) -> RigidInstanceTransform {
		RigidInstanceTransform::new(
			Vec3::from_array(self.translation),
			self.scale,
			Quat::from_array(self.rotation),
		)
	}
}
