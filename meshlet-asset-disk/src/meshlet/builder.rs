use crate::error::ValidationError;
use crate::meshlet::level::MeshLevel;
use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::{BoundedMeshletData, MeshletData, MeshletId};
use crate::meshlet::validate::check_counts;
use meshlet_asset_shader::meshlet::indices::{packed_indices_write, packed_indices_write_capacity};
use meshlet_asset_shader::meshlet::vertex::Vertex;
use meshlet_asset_shader::shape::aabb::Aabb;

/// Appends pre-clustered meshlets to a [`MeshLevel`], packing their triangles into the data blob.
#[derive(Clone, Debug)]
pub struct MeshLevelBuilder {
	level: MeshLevel,
	limits: MeshletLimits,
}

impl MeshLevelBuilder {
	pub fn new(vertices: Vec<Vertex>, limits: MeshletLimits) -> Self {
		Self {
			level: MeshLevel {
				vertices,
				..MeshLevel::default()
			},
			limits,
		}
	}

	pub fn limits(&self) -> MeshletLimits {
		self.limits
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.level.vertices
	}

	/// Appends a meshlet made of `global_indices` into the vertex table and `triangles` indexing into
	/// `global_indices`. Nothing is written if the meshlet is rejected.
	pub fn push_meshlet(&mut self, global_indices: &[u32], triangles: &[[u8; 3]]) -> Result<MeshletId, ValidationError> {
		let meshlet = self.level.num_meshlets();
		let vertex_count = global_indices.len() as u32;
		let triangle_count = triangles.len() as u32;
		check_counts(meshlet, vertex_count, triangle_count, self.limits)?;

		let vertices = &self.level.vertices;
		if let Some((local, &global)) = global_indices
			.iter()
			.enumerate()
			.find(|(_, global)| **global as usize >= vertices.len())
		{
			return Err(ValidationError::VertexIndexOutOfBounds {
				meshlet,
				local: local as u32,
				global,
				len: vertices.len(),
			});
		}
		for (triangle, indices) in triangles.iter().enumerate() {
			if let Some(&index) = indices.iter().find(|index| **index as u32 >= vertex_count) {
				return Err(ValidationError::LocalIndexOutOfBounds {
					meshlet,
					triangle: triangle as u32,
					index: index as u32,
					vertex_count,
				});
			}
		}

		let bounds = Aabb::from_positions(global_indices.iter().map(|i| vertices[*i as usize].position()))
			.unwrap_or_default();
		let data_offset = self.level.data.len();
		self.level.data.extend_from_slice(global_indices);
		let index_offset = self.level.data.len();
		let index_cnt = triangles.len() * 3;
		self.level
			.data
			.resize(index_offset + packed_indices_write_capacity(index_cnt), 0);
		packed_indices_write(
			(0..index_cnt).map(|i| triangles[i / 3][i % 3] as u32),
			&mut self.level.data[index_offset..],
		);

		self.level.meshlets.push(BoundedMeshletData {
			bounds,
			meshlet: MeshletData::new(data_offset as u32, vertex_count, triangle_count),
		});
		Ok(MeshletId(meshlet))
	}

	pub fn build(self) -> MeshLevel {
		log::debug!(
			"built level with {} meshlets, {} vertices and {} data words",
			self.level.meshlets.len(),
			self.level.vertices.len(),
			self.level.data.len()
		);
		self.level
	}
}
