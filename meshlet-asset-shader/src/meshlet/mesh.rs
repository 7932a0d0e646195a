use crate::meshlet::indices::{packed_indices_write_capacity, triangle_indices_load};
use crate::meshlet::vertex::Vertex;
use crate::shape::aabb::Aabb;
use core::mem;
use glam::UVec3;
use static_assertions::const_assert_eq;

/// A meshlet record. The data blob at `data_offset` contains `vertex_count` global vertex indices, immediately followed
/// by `triangle_count * 3` local vertex indices packed 4 per word.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct MeshletData {
	pub data_offset: u32,
	pub vertex_count: u32,
	pub triangle_count: u32,
}
const_assert_eq!(mem::size_of::<MeshletData>(), 3 * 4);

impl MeshletData {
	pub const fn new(data_offset: u32, vertex_count: u32, triangle_count: u32) -> Self {
		Self {
			data_offset,
			vertex_count,
			triangle_count,
		}
	}

	#[inline]
	pub fn vertices(&self) -> usize {
		self.vertex_count as usize
	}

	#[inline]
	pub fn triangles(&self) -> usize {
		self.triangle_count as usize
	}

	/// word offset of the packed triangle indices within the data blob
	#[inline]
	pub fn index_offset(&self) -> usize {
		self.data_offset as usize + self.vertices()
	}

	#[inline]
	pub fn packed_index_words(&self) -> usize {
		packed_indices_write_capacity(self.triangles() * 3)
	}

	/// One past the last word of the data blob this meshlet reads.
	#[inline]
	pub fn data_end(&self) -> usize {
		self.index_offset() + self.packed_index_words()
	}
}

impl AsRef<MeshletData> for MeshletData {
	fn as_ref(&self) -> &MeshletData {
		self
	}
}

/// Meshlet record of the level of detail aware layout, prefixed with the bounds of all its vertices.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct BoundedMeshletData {
	pub bounds: Aabb,
	pub meshlet: MeshletData,
}
const_assert_eq!(mem::size_of::<BoundedMeshletData>(), 9 * 4);

impl AsRef<MeshletData> for BoundedMeshletData {
	fn as_ref(&self) -> &MeshletData {
		&self.meshlet
	}
}

/// The three buffers of a single level of detail, the way a mesh shader sees them.
#[derive(Debug)]
pub struct MeshLevelSlices<'a, M> {
	pub vertices: &'a [Vertex],
	pub meshlets: &'a [M],
	pub data: &'a [u32],
}

// derive would require `M: Copy`
impl<M> Copy for MeshLevelSlices<'_, M> {}

impl<M> Clone for MeshLevelSlices<'_, M> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<'a, M: Copy + AsRef<MeshletData>> MeshLevelSlices<'a, M> {
	pub fn num_meshlets(&self) -> usize {
		self.meshlets.len()
	}

	pub fn meshlet(&self, index: usize) -> Meshlet<'a, M> {
		let len = self.meshlets.len();
		assert!(
			index < len,
			"meshlet index out of bounds: the len is {len} but the index is {index}"
		);
		Meshlet {
			data: self.meshlets[index],
			level: *self,
		}
	}
}

/// not a buffer struct as this should never be read or written, only constructed when querying meshlets
#[derive(Copy, Clone, Debug)]
pub struct Meshlet<'a, M> {
	pub data: M,
	pub level: MeshLevelSlices<'a, M>,
}

impl<M: AsRef<MeshletData>> AsRef<MeshletData> for Meshlet<'_, M> {
	fn as_ref(&self) -> &MeshletData {
		self.data.as_ref()
	}
}

impl<M: AsRef<MeshletData>> Meshlet<'_, M> {
	pub fn vertices(&self) -> usize {
		self.as_ref().vertices()
	}

	pub fn triangles(&self) -> usize {
		self.as_ref().triangles()
	}

	/// Index into the vertex table of local vertex `index`.
	pub fn load_global_index(&self, index: usize) -> u32 {
		let len = self.vertices();
		assert!(
			index < len,
			"index out of bounds: the len is {len} but the index is {index}"
		);
		self.level.data[self.as_ref().data_offset as usize + index]
	}

	pub fn load_vertex(&self, index: usize) -> Vertex {
		self.level.vertices[self.load_global_index(index) as usize]
	}

	/// Local vertex indices of a triangle, as stored in the data blob without any remapping.
	pub fn load_triangle(&self, triangle: usize) -> UVec3 {
		let len = self.triangles();
		assert!(
			triangle < len,
			"index out of bounds: the len is {len} but the index is {triangle}"
		);
		triangle_indices_load(self, &self.level.data, triangle, |data, i| data[i])
	}
}
