use crate::meshlet::{MESHLET_MAX_TRIANGLES, MESHLET_MAX_VERTICES};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The hardware emission maxima a meshlet has to fit into. Different mesh shader pipelines declare different maximum
/// primitive counts.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MeshletLimits {
	/// 64 vertices, 126 triangles
	#[default]
	Standard,
	/// 64 vertices, 124 triangles, as preferred by some vendors
	Conservative,
	/// a single triangle, for pipeline smoke tests
	Demo,
}

impl MeshletLimits {
	pub const MAX_VALUE: MeshletLimits = MeshletLimits::Demo;
	pub const LEN: u32 = Self::MAX_VALUE as u32 + 1;

	pub const fn max_vertices(&self) -> u32 {
		MESHLET_MAX_VERTICES
	}

	pub const fn max_triangles(&self) -> u32 {
		match self {
			MeshletLimits::Standard => MESHLET_MAX_TRIANGLES,
			MeshletLimits::Conservative => 124,
			MeshletLimits::Demo => 1,
		}
	}

	/// Whether a meshlet with these counts may be emitted. Empty meshlets are never allowed.
	pub const fn allows(&self, vertex_count: u32, triangle_count: u32) -> bool {
		1 <= vertex_count
			&& vertex_count <= self.max_vertices()
			&& 1 <= triangle_count
			&& triangle_count <= self.max_triangles()
	}
}
