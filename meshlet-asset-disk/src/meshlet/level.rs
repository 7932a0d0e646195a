use crate::error::ValidationError;
use crate::meshlet::mesh::{BoundedMeshletData, MeshLevelSlices, Meshlet, MeshletId};
use meshlet_asset_shader::meshlet::vertex::Vertex;
use meshlet_asset_shader::shape::aabb::Aabb;
use rkyv::{Archive, Deserialize, Serialize};

/// A single level of detail: the vertex table, the meshlet table and the data blob the meshlets point into.
///
/// For every meshlet, the data blob holds `vertex_count` indices into `vertices` at `data_offset`, followed by its
/// packed triangle indices. Build one with [`MeshLevelBuilder`](crate::meshlet::builder::MeshLevelBuilder) and check
/// foreign ones with [`MeshLevel::validate`].
#[derive(Clone, Debug, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct MeshLevel {
	pub vertices: Vec<Vertex>,
	pub meshlets: Vec<BoundedMeshletData>,
	pub data: Vec<u32>,
}

impl MeshLevel {
	pub fn num_meshlets(&self) -> u32 {
		self.meshlets.len() as u32
	}

	pub fn meshlet_ids(&self) -> impl Iterator<Item = MeshletId> + use<> {
		(0..self.num_meshlets()).map(MeshletId)
	}

	pub fn slices(&self) -> MeshLevelSlices<'_, BoundedMeshletData> {
		MeshLevelSlices {
			vertices: &self.vertices,
			meshlets: &self.meshlets,
			data: &self.data,
		}
	}

	pub fn meshlet(&self, meshlet: MeshletId) -> Meshlet<'_, BoundedMeshletData> {
		self.slices().meshlet(meshlet.0 as usize)
	}

	pub fn try_meshlet(&self, meshlet: MeshletId) -> Result<Meshlet<'_, BoundedMeshletData>, ValidationError> {
		if meshlet.0 < self.num_meshlets() {
			Ok(self.meshlet(meshlet))
		} else {
			Err(ValidationError::InvalidMeshletIndex {
				meshlet: meshlet.0,
				len: self.meshlets.len(),
			})
		}
	}

	/// Union of the bounds of all meshlets, `None` if there are no meshlets.
	pub fn bounds(&self) -> Option<Aabb> {
		self.meshlets
			.iter()
			.map(|m| m.bounds)
			.reduce(|a, b| a.union(&b))
	}
}
