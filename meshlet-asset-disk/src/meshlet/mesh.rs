use crate::error::ValidationError;
use crate::meshlet::level::MeshLevel;
use rkyv::{Archive, Deserialize, Serialize};
use std::ops::Deref;

pub use meshlet_asset_shader::meshlet::mesh::*;

/// Index of a [`Mesh`] within a [`MeshStore`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Archive, Serialize, Deserialize)]
pub struct MeshId(pub u32);

impl Deref for MeshId {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Index of a [`MeshLevel`] within a [`Mesh`], 0 being the most detailed one.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Archive, Serialize, Deserialize)]
pub struct LodLevel(pub u32);

impl Deref for LodLevel {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Index of a meshlet within a [`MeshLevel`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Archive, Serialize, Deserialize)]
pub struct MeshletId(pub u32);

impl Deref for MeshletId {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// A logical mesh, as an ordered list of alternative representations.
#[derive(Clone, Debug, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct Mesh {
	pub levels: Vec<MeshLevel>,
}

impl Mesh {
	pub fn new(levels: Vec<MeshLevel>) -> Self {
		Self { levels }
	}

	pub fn num_levels(&self) -> u32 {
		self.levels.len() as u32
	}

	pub fn level(&self, level: LodLevel) -> &MeshLevel {
		&self.levels[level.0 as usize]
	}

	pub fn level_ids(&self) -> impl Iterator<Item = LodLevel> + use<> {
		(0..self.num_levels()).map(LodLevel)
	}
}

/// Owns all meshes, resolving `(mesh, level)` in two hops.
#[derive(Clone, Debug, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct MeshStore {
	pub meshes: Vec<Mesh>,
}

impl MeshStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, mesh: Mesh) -> MeshId {
		let id = MeshId(self.meshes.len() as u32);
		self.meshes.push(mesh);
		id
	}

	pub fn num_meshes(&self) -> u32 {
		self.meshes.len() as u32
	}

	pub fn mesh_ids(&self) -> impl Iterator<Item = MeshId> + use<> {
		(0..self.num_meshes()).map(MeshId)
	}

	pub fn mesh(&self, mesh: MeshId) -> &Mesh {
		&self.meshes[mesh.0 as usize]
	}

	/// Resolves a level without any validation, out of range indices panic like slice indexing.
	#[inline]
	pub fn level(&self, mesh: MeshId, level: LodLevel) -> &MeshLevel {
		self.mesh(mesh).level(level)
	}

	pub fn try_mesh(&self, mesh: MeshId) -> Result<&Mesh, ValidationError> {
		self.meshes.get(mesh.0 as usize).ok_or(ValidationError::InvalidMeshIndex {
			mesh: mesh.0,
			len: self.meshes.len(),
		})
	}

	pub fn try_level(&self, mesh: MeshId, level: LodLevel) -> Result<&MeshLevel, ValidationError> {
		let levels = &self.try_mesh(mesh)?.levels;
		levels.get(level.0 as usize).ok_or(ValidationError::InvalidLevelIndex {
			mesh: mesh.0,
			level: level.0,
			len: levels.len(),
		})
	}
}
