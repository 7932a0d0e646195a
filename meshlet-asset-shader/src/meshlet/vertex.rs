use core::mem;
use glam::{Vec2, Vec3};
use static_assertions::const_assert_eq;

/// A mesh vertex. Every component is its own scalar field, so the 32 byte layout does not depend on how vector types
/// are aligned on a particular platform.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct Vertex {
	pub position_x: f32,
	pub position_y: f32,
	pub position_z: f32,
	pub tex_coord_u: f32,
	pub tex_coord_v: f32,
	pub normal_x: f32,
	pub normal_y: f32,
	pub normal_z: f32,
}
const_assert_eq!(mem::size_of::<Vertex>(), 8 * 4);

impl Vertex {
	pub fn new(position: Vec3, tex_coord: Vec2, normal: Vec3) -> Self {
		Self {
			position_x: position.x,
			position_y: position.y,
			position_z: position.z,
			tex_coord_u: tex_coord.x,
			tex_coord_v: tex_coord.y,
			normal_x: normal.x,
			normal_y: normal.y,
			normal_z: normal.z,
		}
	}

	pub fn position(&self) -> Vec3 {
		Vec3::new(self.position_x, self.position_y, self.position_z)
	}

	pub fn tex_coord(&self) -> Vec2 {
		Vec2::new(self.tex_coord_u, self.tex_coord_v)
	}

	pub fn normal(&self) -> Vec3 {
		Vec3::new(self.normal_x, self.normal_y, self.normal_z)
	}
}
