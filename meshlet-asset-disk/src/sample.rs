use crate::error::{SampleError, ValidationError};
use crate::meshlet::builder::MeshLevelBuilder;
use crate::meshlet::instance::MeshInstance;
use crate::meshlet::level::MeshLevel;
use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::{Mesh, MeshStore};
use crate::meshlet::scene::SceneDisk;
use crate::meshlet::vertex::Vertex;
use core::f32::consts::TAU;
use glam::{Quat, Vec3, vec2, vec3};
use rayon::prelude::*;

/// Quads along each side of a tile. A full tile of 7x7 quads has 64 vertices and 98 triangles.
const TILE_QUADS: u32 = 7;

/// Largest supported [`SampleGrid::resolution`], keeping every vertex index well within `u32`.
pub const MAX_SAMPLE_RESOLUTION: u32 = 4096;
pub const MAX_SAMPLE_INSTANCES_PER_SIDE: u32 = 256;

/// A square, gently rolling height field on the XZ plane, centered on the origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampleGrid {
	/// quads along each side of the most detailed level
	pub resolution: u32,
	pub size: f32,
	pub amplitude: f32,
	/// every level halves the resolution of the previous one, down to a single quad
	pub levels: u32,
}

impl Default for SampleGrid {
	fn default() -> Self {
		Self {
			resolution: 64,
			size: 32.,
			amplitude: 1.5,
			levels: 4,
		}
	}
}

impl SampleGrid {
	pub fn check(&self) -> Result<(), SampleError> {
		if self.resolution > MAX_SAMPLE_RESOLUTION {
			return Err(SampleError::ResolutionTooLarge {
				resolution: self.resolution,
				max: MAX_SAMPLE_RESOLUTION,
			});
		}
		Ok(())
	}

	pub fn level_resolution(&self, level: u32) -> u32 {
		self.resolution.checked_shr(level).unwrap_or(0).max(1)
	}

	fn frequency(&self) -> f32 {
		TAU / self.size
	}

	pub fn height(&self, x: f32, z: f32) -> f32 {
		let f = self.frequency();
		self.amplitude * (x * f).sin() * (z * f).cos()
	}

	pub fn normal(&self, x: f32, z: f32) -> Vec3 {
		let f = self.frequency();
		let dx = self.amplitude * f * (x * f).cos() * (z * f).cos();
		let dz = -self.amplitude * f * (x * f).sin() * (z * f).sin();
		vec3(-dx, 1., -dz).normalize()
	}

	pub fn vertices(&self, resolution: u32) -> Vec<Vertex> {
		let side = resolution as usize + 1;
		(0..side * side)
			.map(|i| {
				let uv = vec2((i % side) as f32, (i / side) as f32) / resolution as f32;
				let x = (uv.x - 0.5) * self.size;
				let z = (uv.y - 0.5) * self.size;
				Vertex::new(vec3(x, self.height(x, z), z), uv, self.normal(x, z))
			})
			.collect()
	}

	/// Builds a single level, with triangles grouped into square tiles that are then split into meshlets.
	pub fn build_level(&self, level: u32, limits: MeshletLimits) -> Result<MeshLevel, SampleError> {
		profiling::function_scope!();
		self.check()?;
		let resolution = self.level_resolution(level);
		let side = resolution + 1;
		let mut builder = MeshLevelBuilder::new(self.vertices(resolution), limits);

		let mut tile = Vec::new();
		for tile_z in (0..resolution).step_by(TILE_QUADS as usize) {
			for tile_x in (0..resolution).step_by(TILE_QUADS as usize) {
				tile.clear();
				for z in tile_z..(tile_z + TILE_QUADS).min(resolution) {
					for x in tile_x..(tile_x + TILE_QUADS).min(resolution) {
						let i0 = z * side + x;
						let i1 = i0 + 1;
						let i2 = i0 + side;
						let i3 = i2 + 1;
						tile.push([i0, i2, i1]);
						tile.push([i1, i2, i3]);
					}
				}
				push_triangles(&mut builder, &tile)?;
			}
		}
		Ok(builder.build())
	}

	/// Builds all levels in parallel.
	#[profiling::function]
	pub fn build_mesh(&self, limits: MeshletLimits) -> Result<Mesh, SampleError> {
		let levels = (0..self.levels.max(1))
			.into_par_iter()
			.map(|level| self.build_level(level, limits))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Mesh::new(levels))
	}
}

/// Splits `triangles` into meshlets in order, starting a new meshlet whenever the next triangle would exceed the
/// limits of `builder`.
pub fn push_triangles(builder: &mut MeshLevelBuilder, triangles: &[[u32; 3]]) -> Result<(), ValidationError> {
	let limits = builder.limits();
	let mut globals: Vec<u32> = Vec::new();
	let mut locals: Vec<[u8; 3]> = Vec::new();
	for triangle in triangles {
		let mut added = 0;
		for (i, global) in triangle.iter().enumerate() {
			if !globals.contains(global) && !triangle[..i].contains(global) {
				added += 1;
			}
		}
		let full = globals.len() + added > limits.max_vertices() as usize
			|| locals.len() + 1 > limits.max_triangles() as usize;
		if full && !locals.is_empty() {
			builder.push_meshlet(&globals, &locals)?;
			globals.clear();
			locals.clear();
		}

		locals.push(triangle.map(|global| match globals.iter().position(|g| *g == global) {
			Some(local) => local as u8,
			None => {
				globals.push(global);
				(globals.len() - 1) as u8
			}
		}));
	}
	if !locals.is_empty() {
		builder.push_meshlet(&globals, &locals)?;
	}
	Ok(())
}

/// A scene of `instances_per_side * instances_per_side` grid instances, with varying scale and rotation.
#[profiling::function]
pub fn sample_scene(
	grid: &SampleGrid,
	instances_per_side: u32,
	limits: MeshletLimits,
) -> Result<SceneDisk, SampleError> {
	if instances_per_side > MAX_SAMPLE_INSTANCES_PER_SIDE {
		return Err(SampleError::TooManyInstances {
			instances_per_side,
			max: MAX_SAMPLE_INSTANCES_PER_SIDE,
		});
	}
	let mut store = MeshStore::new();
	let mesh = store.push(grid.build_mesh(limits)?);

	let spacing = grid.size * 1.25;
	let offset = (instances_per_side as f32 - 1.) * 0.5;
	let instances = (0..instances_per_side * instances_per_side)
		.map(|i| {
			let x = (i % instances_per_side) as f32 - offset;
			let z = (i / instances_per_side) as f32 - offset;
			let scale = 1. + (i % 3) as f32 * 0.25;
			let rotation = Quat::from_rotation_y(i as f32 * 0.4);
			MeshInstance::new(vec3(x, 0., z) * spacing, scale, rotation, mesh.0)
		})
		.collect();

	let scene = SceneDisk { store, instances };
	log::info!("generated sample scene: {:?}", scene.stats());
	Ok(scene)
}
