use crate::error::ValidationError;
use crate::meshlet::level::MeshLevel;
use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::MeshletId;
use crate::meshlet::MESHLET_WG_SIZE;
use glam::{Mat4, UVec3};
use meshlet_asset_shader::transform::VertexTransform;
use rayon::prelude::*;
use std::mem;

pub use meshlet_asset_shader::meshlet::decode::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecodeSettings {
	pub limits: MeshletLimits,
	/// amount of lanes cooperatively decoding a single meshlet
	pub lane_width: usize,
}

impl Default for DecodeSettings {
	fn default() -> Self {
		Self {
			limits: MeshletLimits::default(),
			lane_width: MESHLET_WG_SIZE,
		}
	}
}

/// A [`MeshletOutput`] writing into preallocated slices. Unlike the fixed arrays of the shader, it does not panic on a
/// broken output contract but remembers the first violation, to be reported by [`CheckedOutput::finish`].
#[derive(Debug)]
pub struct CheckedOutput<'a> {
	meshlet: u32,
	vertices: &'a mut [OutputVertex],
	triangles: &'a mut [UVec3],
	declared: Option<(u32, u32)>,
	error: Option<ValidationError>,
}

impl<'a> CheckedOutput<'a> {
	pub fn new(meshlet: u32, vertices: &'a mut [OutputVertex], triangles: &'a mut [UVec3]) -> Self {
		Self {
			meshlet,
			vertices,
			triangles,
			declared: None,
			error: None,
		}
	}

	fn fail(&mut self, error: ValidationError) {
		self.error.get_or_insert(error);
	}

	/// The declared counts, if the output contract was honored.
	pub fn finish(self) -> Result<(u32, u32), ValidationError> {
		match (self.error, self.declared) {
			(Some(error), _) => Err(error),
			(None, None) => Err(ValidationError::OutputsNotDeclared { meshlet: self.meshlet }),
			(None, Some(declared)) => Ok(declared),
		}
	}

	fn check_write(&mut self, index: usize, pick: impl Fn((u32, u32)) -> u32) -> bool {
		match self.declared {
			None => {
				self.fail(ValidationError::OutputsNotDeclared { meshlet: self.meshlet });
				false
			}
			Some(declared) if index >= pick(declared) as usize => {
				self.fail(ValidationError::OutputOutOfBounds {
					meshlet: self.meshlet,
					index,
					len: pick(declared) as usize,
				});
				false
			}
			Some(_) => true,
		}
	}
}

impl MeshletOutput for CheckedOutput<'_> {
	fn set_outputs(&mut self, vertex_count: u32, triangle_count: u32) {
		if self.declared.is_some() {
			self.fail(ValidationError::OutputsDeclaredTwice { meshlet: self.meshlet });
		} else if vertex_count as usize > self.vertices.len() {
			self.fail(ValidationError::OutputOutOfBounds {
				meshlet: self.meshlet,
				index: vertex_count as usize,
				len: self.vertices.len(),
			});
		} else if triangle_count as usize > self.triangles.len() {
			self.fail(ValidationError::OutputOutOfBounds {
				meshlet: self.meshlet,
				index: triangle_count as usize,
				len: self.triangles.len(),
			});
		} else {
			self.declared = Some((vertex_count, triangle_count));
		}
	}

	fn write_vertex(&mut self, index: usize, vertex: OutputVertex) {
		if self.check_write(index, |(vertices, _)| vertices) {
			self.vertices[index] = vertex;
		}
	}

	fn write_triangle(&mut self, index: usize, triangle: UVec3) {
		if self.check_write(index, |(_, triangles)| triangles) {
			self.triangles[index] = triangle;
		}
	}
}

/// The decoded vertices and local triangles of a single meshlet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedMeshlet {
	pub vertices: Vec<OutputVertex>,
	pub triangles: Vec<UVec3>,
}

/// Validates and decodes a single meshlet of `level`.
pub fn decode_meshlet(
	level: &MeshLevel,
	meshlet: MeshletId,
	view_projection: Mat4,
	transform: impl VertexTransform,
	settings: DecodeSettings,
) -> Result<DecodedMeshlet, ValidationError> {
	level.validate_meshlet(meshlet, settings.limits)?;
	let reader = level.meshlet(meshlet);
	let mut out = DecodedMeshlet {
		vertices: vec![OutputVertex::ZERO; reader.vertices()],
		triangles: vec![UVec3::ZERO; reader.triangles()],
	};
	let mut sink = CheckedOutput::new(meshlet.0, &mut out.vertices, &mut out.triangles);
	MeshletDecoder::new(view_projection, transform)
		.with_limits(settings.limits)
		.with_lane_width(settings.lane_width)
		.decode(&reader, meshlet.0, &mut sink);
	sink.finish()?;
	Ok(out)
}

/// Where the outputs of a meshlet are within a [`DecodedLevel`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MeshletOutputRange {
	pub vertex_offset: u32,
	pub vertex_count: u32,
	pub triangle_offset: u32,
	pub triangle_count: u32,
}

/// All meshlets of a level decoded back to back, like a single draw would emit them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedLevel {
	pub vertices: Vec<OutputVertex>,
	/// local to the meshlet the triangle belongs to
	pub triangles: Vec<UVec3>,
	pub ranges: Vec<MeshletOutputRange>,
}

impl DecodedLevel {
	pub fn meshlet_vertices(&self, meshlet: MeshletId) -> &[OutputVertex] {
		let range = self.ranges[meshlet.0 as usize];
		&self.vertices[range.vertex_offset as usize..][..range.vertex_count as usize]
	}

	pub fn meshlet_triangles(&self, meshlet: MeshletId) -> &[UVec3] {
		let range = self.ranges[meshlet.0 as usize];
		&self.triangles[range.triangle_offset as usize..][..range.triangle_count as usize]
	}

	/// Triangles indexing into [`DecodedLevel::vertices`] instead of their meshlet's vertices.
	pub fn global_triangles(&self) -> impl Iterator<Item = UVec3> + '_ {
		self.ranges.iter().flat_map(|range| {
			self.triangles[range.triangle_offset as usize..][..range.triangle_count as usize]
				.iter()
				.map(|t| *t + UVec3::splat(range.vertex_offset))
		})
	}
}

/// Output ranges of all meshlets, as an exclusive prefix sum over their declared counts.
pub fn output_ranges(level: &MeshLevel) -> Vec<MeshletOutputRange> {
	let mut vertex_offset = 0;
	let mut triangle_offset = 0;
	level
		.meshlets
		.iter()
		.map(|m| {
			let range = MeshletOutputRange {
				vertex_offset,
				vertex_count: m.meshlet.vertex_count,
				triangle_offset,
				triangle_count: m.meshlet.triangle_count,
			};
			vertex_offset += m.meshlet.vertex_count;
			triangle_offset += m.meshlet.triangle_count;
			range
		})
		.collect()
}

/// Validates and decodes every meshlet of `level`, with meshlets running in parallel on the rayon thread pool. Each
/// meshlet writes its own disjoint range of the outputs.
#[profiling::function]
pub fn decode_level(
	level: &MeshLevel,
	view_projection: Mat4,
	transform: impl VertexTransform + Sync,
	settings: DecodeSettings,
) -> Result<DecodedLevel, ValidationError> {
	decode_level_impl(level, view_projection, transform, settings, true)
}

/// Like [`decode_level`], but decodes one meshlet after another on the current thread.
#[profiling::function]
pub fn decode_level_sequential(
	level: &MeshLevel,
	view_projection: Mat4,
	transform: impl VertexTransform + Sync,
	settings: DecodeSettings,
) -> Result<DecodedLevel, ValidationError> {
	decode_level_impl(level, view_projection, transform, settings, false)
}

fn decode_level_impl(
	level: &MeshLevel,
	view_projection: Mat4,
	transform: impl VertexTransform + Sync,
	settings: DecodeSettings,
	parallel: bool,
) -> Result<DecodedLevel, ValidationError> {
	level.validate(settings.limits)?;

	let ranges = output_ranges(level);
	let (vertex_total, triangle_total) = ranges.last().map_or((0, 0), |r| {
		(
			(r.vertex_offset + r.vertex_count) as usize,
			(r.triangle_offset + r.triangle_count) as usize,
		)
	});
	let mut vertices = vec![OutputVertex::ZERO; vertex_total];
	let mut triangles = vec![UVec3::ZERO; triangle_total];

	let sinks = {
		profiling::scope!("split outputs");
		let mut vertices_rest = &mut vertices[..];
		let mut triangles_rest = &mut triangles[..];
		ranges
			.iter()
			.enumerate()
			.map(|(i, range)| {
				let (v, rest) = mem::take(&mut vertices_rest).split_at_mut(range.vertex_count as usize);
				vertices_rest = rest;
				let (t, rest) = mem::take(&mut triangles_rest).split_at_mut(range.triangle_count as usize);
				triangles_rest = rest;
				CheckedOutput::new(i as u32, v, t)
			})
			.collect::<Vec<_>>()
	};

	let decoder = MeshletDecoder::new(view_projection, transform)
		.with_limits(settings.limits)
		.with_lane_width(settings.lane_width);
	let decode = |(i, mut sink): (usize, CheckedOutput<'_>)| {
		let meshlet = i as u32;
		decoder.decode(&level.meshlet(MeshletId(meshlet)), meshlet, &mut sink);
		sink.finish().map(|_| ())
	};
	if parallel {
		sinks.into_par_iter().enumerate().map(decode).collect::<Result<(), _>>()?;
	} else {
		sinks.into_iter().enumerate().map(decode).collect::<Result<(), _>>()?;
	}

	log::debug!(
		"decoded {} meshlets into {} vertices and {} triangles",
		ranges.len(),
		vertices.len(),
		triangles.len()
	);
	Ok(DecodedLevel {
		vertices,
		triangles,
		ranges,
	})
}
