use crate::error::ValidationError;
use crate::meshlet::level::MeshLevel;
use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::{Mesh, MeshId, MeshStore, MeshletId};
use rayon::prelude::*;

/// Checks the vertex and triangle counts of meshlet `meshlet` against `limits`.
pub fn check_counts(
	meshlet: u32,
	vertex_count: u32,
	triangle_count: u32,
	limits: MeshletLimits,
) -> Result<(), ValidationError> {
	if vertex_count == 0 || triangle_count == 0 {
		Err(ValidationError::EmptyMeshlet {
			meshlet,
			vertex_count,
			triangle_count,
		})
	} else if vertex_count > limits.max_vertices() {
		Err(ValidationError::TooManyVertices {
			meshlet,
			vertex_count,
			max: limits.max_vertices(),
		})
	} else if triangle_count > limits.max_triangles() {
		Err(ValidationError::TooManyTriangles {
			meshlet,
			triangle_count,
			max: limits.max_triangles(),
		})
	} else {
		Ok(())
	}
}

impl MeshLevel {
	/// Checks that the meshlet only reads within the data blob and the vertex table, and that it fits `limits`.
	pub fn validate_meshlet(&self, meshlet: MeshletId, limits: MeshletLimits) -> Result<(), ValidationError> {
		let reader = self.try_meshlet(meshlet)?;
		let data = reader.data.meshlet;
		check_counts(meshlet.0, data.vertex_count, data.triangle_count, limits)?;

		if data.data_end() > self.data.len() {
			return Err(ValidationError::DataOutOfBounds {
				meshlet: meshlet.0,
				start: data.data_offset as usize,
				end: data.data_end(),
				len: self.data.len(),
			});
		}

		for local in 0..data.vertices() {
			let global = reader.load_global_index(local);
			if global as usize >= self.vertices.len() {
				return Err(ValidationError::VertexIndexOutOfBounds {
					meshlet: meshlet.0,
					local: local as u32,
					global,
					len: self.vertices.len(),
				});
			}
		}

		for triangle in 0..data.triangles() {
			let indices = reader.load_triangle(triangle);
			if let Some(index) = indices.to_array().into_iter().find(|i| *i >= data.vertex_count) {
				return Err(ValidationError::LocalIndexOutOfBounds {
					meshlet: meshlet.0,
					triangle: triangle as u32,
					index,
					vertex_count: data.vertex_count,
				});
			}
		}
		Ok(())
	}

	#[profiling::function]
	pub fn validate(&self, limits: MeshletLimits) -> Result<(), ValidationError> {
		(0..self.num_meshlets())
			.into_par_iter()
			.map(MeshletId)
			.try_for_each(|meshlet| self.validate_meshlet(meshlet, limits))
	}
}

impl Mesh {
	pub fn validate(&self, limits: MeshletLimits) -> Result<(), ValidationError> {
		self.levels.iter().try_for_each(|level| level.validate(limits))
	}
}

impl MeshStore {
	/// Validates every level of every mesh, logging which level failed.
	#[profiling::function]
	pub fn validate(&self, limits: MeshletLimits) -> Result<(), ValidationError> {
		for mesh in self.mesh_ids() {
			for level in self.mesh(mesh).level_ids() {
				self.level(mesh, level).validate(limits).inspect_err(|err| {
					log::warn!("mesh {} level {} is invalid: {err}", *mesh, *level);
				})?;
			}
		}
		log::debug!("validated {} meshes", self.num_meshes());
		Ok(())
	}

	/// Like [`MeshStore::validate`], but only for the levels of one mesh.
	pub fn validate_mesh(&self, mesh: MeshId, limits: MeshletLimits) -> Result<(), ValidationError> {
		self.try_mesh(mesh)?.validate(limits)
	}
}
