use crate::meshlet::level::MeshLevel;
use crate::meshlet::mesh::{Mesh, MeshStore};
use glam::Vec3;
use meshlet_asset_shader::shape::aabb::Aabb;
use rayon::prelude::*;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshStats {
	pub meshes: u32,
	pub levels: u32,
	pub meshlets: u32,
	/// entries of the vertex tables
	pub vertices: u32,
	/// vertices may be referenced by multiple meshlets
	pub meshlet_vertices: u32,
	pub triangles: u32,
	pub data_words: u32,
	pub bounds_min: Vec3,
	pub bounds_max: Vec3,
}

impl Default for MeshStats {
	fn default() -> Self {
		Self {
			meshes: 0,
			levels: 0,
			meshlets: 0,
			vertices: 0,
			meshlet_vertices: 0,
			triangles: 0,
			data_words: 0,
			bounds_min: Vec3::INFINITY,
			bounds_max: Vec3::NEG_INFINITY,
		}
	}
}

impl MeshStats {
	/// `None` if nothing with a position was counted.
	pub fn bounds(&self) -> Option<Aabb> {
		if self.bounds_min.cmple(self.bounds_max).all() {
			Some(Aabb::new(self.bounds_min, self.bounds_max))
		} else {
			None
		}
	}
}

impl Add for MeshStats {
	type Output = MeshStats;

	fn add(self, rhs: Self) -> Self::Output {
		Self {
			meshes: self.meshes + rhs.meshes,
			levels: self.levels + rhs.levels,
			meshlets: self.meshlets + rhs.meshlets,
			vertices: self.vertices + rhs.vertices,
			meshlet_vertices: self.meshlet_vertices + rhs.meshlet_vertices,
			triangles: self.triangles + rhs.triangles,
			data_words: self.data_words + rhs.data_words,
			bounds_min: self.bounds_min.min(rhs.bounds_min),
			bounds_max: self.bounds_max.max(rhs.bounds_max),
		}
	}
}

impl AddAssign for MeshStats {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl Sum for MeshStats {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Self::default(), |acc, x| acc + x)
	}
}

impl MeshLevel {
	pub fn stats(&self) -> MeshStats {
		let (bounds_min, bounds_max) = match self.bounds() {
			Some(bounds) => (bounds.min(), bounds.max()),
			None => (Vec3::INFINITY, Vec3::NEG_INFINITY),
		};
		MeshStats {
			meshes: 0,
			levels: 1,
			meshlets: self.num_meshlets(),
			vertices: self.vertices.len() as u32,
			meshlet_vertices: self.meshlets.iter().map(|m| m.meshlet.vertex_count).sum(),
			triangles: self.meshlets.iter().map(|m| m.meshlet.triangle_count).sum(),
			data_words: self.data.len() as u32,
			bounds_min,
			bounds_max,
		}
	}
}

impl Mesh {
	pub fn stats(&self) -> MeshStats {
		MeshStats {
			meshes: 1,
			..Default::default()
		} + self.levels.iter().map(MeshLevel::stats).sum()
	}
}

impl MeshStore {
	#[profiling::function]
	pub fn stats(&self) -> MeshStats {
		self.meshes.par_iter().map(Mesh::stats).sum()
	}
}
