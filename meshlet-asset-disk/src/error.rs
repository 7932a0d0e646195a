use std::io;

/// A violated invariant of the packed meshlet representation, found by host tooling before anything is handed to the
/// decoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
	#[error("mesh index {mesh} is out of range, the store has {len} meshes")]
	InvalidMeshIndex { mesh: u32, len: usize },
	#[error("level {level} of mesh {mesh} is out of range, the mesh has {len} levels")]
	InvalidLevelIndex { mesh: u32, level: u32, len: usize },
	#[error("meshlet index {meshlet} is out of range, the level has {len} meshlets")]
	InvalidMeshletIndex { meshlet: u32, len: usize },
	#[error("meshlet {meshlet} is empty with {vertex_count} vertices and {triangle_count} triangles")]
	EmptyMeshlet {
		meshlet: u32,
		vertex_count: u32,
		triangle_count: u32,
	},
	#[error("meshlet {meshlet} has {vertex_count} vertices, exceeding the maximum of {max}")]
	TooManyVertices { meshlet: u32, vertex_count: u32, max: u32 },
	#[error("meshlet {meshlet} has {triangle_count} triangles, exceeding the maximum of {max}")]
	TooManyTriangles { meshlet: u32, triangle_count: u32, max: u32 },
	#[error("meshlet {meshlet} reads data words {start}..{end}, but the data blob only has {len} words")]
	DataOutOfBounds {
		meshlet: u32,
		start: usize,
		end: usize,
		len: usize,
	},
	#[error("local vertex {local} of meshlet {meshlet} references vertex {global}, but there are only {len} vertices")]
	VertexIndexOutOfBounds {
		meshlet: u32,
		local: u32,
		global: u32,
		len: usize,
	},
	#[error(
		"triangle {triangle} of meshlet {meshlet} references local vertex {index}, but the meshlet only has {vertex_count} vertices"
	)]
	LocalIndexOutOfBounds {
		meshlet: u32,
		triangle: u32,
		index: u32,
		vertex_count: u32,
	},
	#[error("meshlet {meshlet} was written to before its output counts were declared")]
	OutputsNotDeclared { meshlet: u32 },
	#[error("meshlet {meshlet} declared its output counts more than once")]
	OutputsDeclaredTwice { meshlet: u32 },
	#[error("meshlet {meshlet} wrote element {index} beyond its declared count of {len}")]
	OutputOutOfBounds { meshlet: u32, index: usize, len: usize },
}

/// Failure to save or load a [`SceneDisk`](crate::meshlet::scene::SceneDisk).
#[derive(Debug, thiserror::Error)]
pub enum SceneFileError {
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("archive error: {0}")]
	Archive(#[from] rkyv::rancor::Error),
	#[error("invalid scene: {0}")]
	Validation(#[from] ValidationError),
}

/// Parameters of a [`SampleGrid`](crate::sample::SampleGrid) or sample scene that cannot be generated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SampleError {
	#[error("sample resolution {resolution} exceeds the maximum of {max}")]
	ResolutionTooLarge { resolution: u32, max: u32 },
	#[error("{instances_per_side} instances per side exceed the maximum of {max}")]
	TooManyInstances { instances_per_side: u32, max: u32 },
	#[error("invalid sample mesh: {0}")]
	Validation(#[from] ValidationError),
}
