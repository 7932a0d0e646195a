use crate::error::{SceneFileError, ValidationError};
use crate::meshlet::instance::MeshInstance;
use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::{MeshId, MeshStore};
use crate::meshlet::stats::MeshStats;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// zstd's default level
pub const SCENE_COMPRESSION_LEVEL: i32 = 3;

/// Everything needed to draw a scene: the meshes and the instances referencing them.
#[derive(Clone, Debug, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct SceneDisk {
	pub store: MeshStore,
	pub instances: Vec<MeshInstance>,
}

impl SceneDisk {
	pub fn stats(&self) -> MeshStats {
		self.store.stats()
	}

	/// Validates all meshes and that every instance references a mesh with at least one level.
	pub fn validate(&self, limits: MeshletLimits) -> Result<(), ValidationError> {
		self.store.validate(limits)?;
		for instance in &self.instances {
			let mesh = MeshId(instance.mesh_idx);
			if self.store.try_mesh(mesh)?.num_levels() == 0 {
				return Err(ValidationError::InvalidLevelIndex {
					mesh: mesh.0,
					level: 0,
					len: 0,
				});
			}
		}
		Ok(())
	}

	/// Writes this scene as a zstd compressed rkyv archive.
	pub fn serialize_to(&self, write: impl Write) -> Result<(), SceneFileError> {
		profiling::function_scope!();
		let bytes = {
			profiling::scope!("serializing");
			rkyv::to_bytes::<rkyv::rancor::Error>(self)?
		};
		{
			profiling::scope!("zstd stream");
			let mut encoder = zstd::Encoder::new(BufWriter::with_capacity(128 * 1024, write), SCENE_COMPRESSION_LEVEL)?;
			encoder.write_all(&bytes)?;
			encoder.finish()?.flush()?;
		}
		log::debug!("serialized scene archive of {} bytes", bytes.len());
		Ok(())
	}

	/// Reads a scene written by [`SceneDisk::serialize_to`], checking the archive before deserializing it.
	pub fn deserialize_from(read: impl Read) -> Result<Self, SceneFileError> {
		profiling::function_scope!();
		let mut bytes = AlignedVec::<16>::new();
		{
			profiling::scope!("zstd stream");
			let mut decoder = zstd::Decoder::new(read)?;
			bytes.extend_from_reader(&mut decoder)?;
		}
		profiling::scope!("deserializing");
		Ok(rkyv::from_bytes::<Self, rkyv::rancor::Error>(&bytes)?)
	}

	pub fn save(&self, path: &Path) -> Result<(), SceneFileError> {
		self.serialize_to(File::create(path)?)?;
		log::info!("saved scene to {}", path.display());
		Ok(())
	}

	/// Loads and validates a scene file.
	pub fn load(path: &Path, limits: MeshletLimits) -> Result<Self, SceneFileError> {
		let scene = Self::deserialize_from(BufReader::new(File::open(path)?))?;
		scene.validate(limits)?;
		log::info!(
			"loaded scene from {} with {} meshes and {} instances",
			path.display(),
			scene.store.num_meshes(),
			scene.instances.len()
		);
		Ok(scene)
	}
}
