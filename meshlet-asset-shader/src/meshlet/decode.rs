use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::{Meshlet, MeshletData};
use crate::meshlet::{MESHLET_MAX_TRIANGLES, MESHLET_MAX_VERTICES, MESHLET_WG_SIZE};
use crate::transform::VertexTransform;
use glam::{Mat4, UVec3, Vec2, Vec3, Vec4};

/// A decoded vertex, as emitted by the mesh shader.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OutputVertex {
	pub position: Vec4,
	pub tex_coord: Vec2,
	pub normal: Vec3,
	pub color: Vec3,
}

impl OutputVertex {
	pub const ZERO: Self = Self {
		position: Vec4::ZERO,
		tex_coord: Vec2::ZERO,
		normal: Vec3::ZERO,
		color: Vec3::ZERO,
	};
}

/// Where a meshlet is decoded to. `set_outputs` must be called exactly once, before any vertex or triangle is written.
pub trait MeshletOutput {
	fn set_outputs(&mut self, vertex_count: u32, triangle_count: u32);

	fn write_vertex(&mut self, index: usize, vertex: OutputVertex);

	fn write_triangle(&mut self, index: usize, triangle: UVec3);
}

impl<O: MeshletOutput + ?Sized> MeshletOutput for &mut O {
	fn set_outputs(&mut self, vertex_count: u32, triangle_count: u32) {
		O::set_outputs(self, vertex_count, triangle_count)
	}

	fn write_vertex(&mut self, index: usize, vertex: OutputVertex) {
		O::write_vertex(self, index, vertex)
	}

	fn write_triangle(&mut self, index: usize, triangle: UVec3) {
		O::write_triangle(self, index, triangle)
	}
}

/// Expands a single meshlet into its vertices and triangles, the same way a mesh shader workgroup of `lane_width`
/// invocations would: lane `l` processes the elements `l`, `l + lane_width`, `l + 2 * lane_width` and so on.
#[derive(Copy, Clone, Debug)]
pub struct MeshletDecoder<T> {
	pub view_projection: Mat4,
	pub transform: T,
	/// the maxima of the pipeline the outputs are emitted into
	pub limits: MeshletLimits,
	lane_width: usize,
}

impl<T: VertexTransform> MeshletDecoder<T> {
	pub fn new(view_projection: Mat4, transform: T) -> Self {
		Self {
			view_projection,
			transform,
			limits: MeshletLimits::Standard,
			lane_width: MESHLET_WG_SIZE,
		}
	}

	pub fn with_limits(mut self, limits: MeshletLimits) -> Self {
		self.limits = limits;
		self
	}

	pub fn with_lane_width(mut self, lane_width: usize) -> Self {
		assert!(lane_width > 0, "lane width must be at least 1");
		self.lane_width = lane_width;
		self
	}

	pub fn lane_width(&self) -> usize {
		self.lane_width
	}

	/// Decodes meshlet `meshlet_idx` into `out`, running all lanes one after another.
	pub fn decode<M, O>(&self, meshlet: &Meshlet<'_, M>, meshlet_idx: u32, out: &mut O)
	where
		M: AsRef<MeshletData>,
		O: MeshletOutput + ?Sized,
	{
		self.declare_outputs(meshlet, out);
		for lane in 0..self.lane_width {
			self.decode_lane(meshlet, meshlet_idx, lane, out);
		}
	}

	/// Declares the output counts of `meshlet`, which has to happen before any lane writes.
	pub fn declare_outputs<M, O>(&self, meshlet: &Meshlet<'_, M>, out: &mut O)
	where
		M: AsRef<MeshletData>,
		O: MeshletOutput + ?Sized,
	{
		let vertex_count = meshlet.vertices() as u32;
		let triangle_count = meshlet.triangles() as u32;
		assert!(
			self.limits.allows(vertex_count, triangle_count),
			"meshlet of {vertex_count} vertices and {triangle_count} triangles does not fit the {:?} limits",
			self.limits
		);
		out.set_outputs(vertex_count, triangle_count);
	}

	/// The share of work of a single lane. Lanes write disjoint elements, so they may run in any order.
	pub fn decode_lane<M, O>(&self, meshlet: &Meshlet<'_, M>, meshlet_idx: u32, lane: usize, out: &mut O)
	where
		M: AsRef<MeshletData>,
		O: MeshletOutput + ?Sized,
	{
		let width = self.lane_width;
		let vertex_count = meshlet.vertices();
		let triangle_count = meshlet.triangles();

		// process vertices
		let color = self.transform.meshlet_color(meshlet_idx);
		for iter in 0..vertex_count.div_ceil(width) {
			let i = iter * width + lane;
			if i < vertex_count {
				out.write_vertex(i, self.decode_vertex(meshlet, color, i));
			}
		}

		// process primitives
		for iter in 0..triangle_count.div_ceil(width) {
			let i = iter * width + lane;
			if i < triangle_count {
				out.write_triangle(i, meshlet.load_triangle(i));
			}
		}
	}

	#[inline]
	pub fn decode_vertex<M: AsRef<MeshletData>>(&self, meshlet: &Meshlet<'_, M>, color: Vec3, i: usize) -> OutputVertex {
		let vertex = meshlet.load_vertex(i);
		OutputVertex {
			position: self
				.transform
				.transform_position(self.view_projection, vertex.position()),
			tex_coord: vertex.tex_coord(),
			normal: vertex.normal(),
			color,
		}
	}
}

/// Fixed size output arrays sized for the largest meshlet, like the outputs of a mesh shader.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshletOutputArrays {
	declared: bool,
	vertex_count: u32,
	triangle_count: u32,
	vertices: [OutputVertex; MESHLET_MAX_VERTICES as usize],
	triangles: [UVec3; MESHLET_MAX_TRIANGLES as usize],
}

impl Default for MeshletOutputArrays {
	fn default() -> Self {
		Self {
			declared: false,
			vertex_count: 0,
			triangle_count: 0,
			vertices: [OutputVertex::ZERO; MESHLET_MAX_VERTICES as usize],
			triangles: [UVec3::ZERO; MESHLET_MAX_TRIANGLES as usize],
		}
	}
}

impl MeshletOutputArrays {
	pub fn vertices(&self) -> &[OutputVertex] {
		&self.vertices[..self.vertex_count as usize]
	}

	pub fn triangles(&self) -> &[UVec3] {
		&self.triangles[..self.triangle_count as usize]
	}
}

impl MeshletOutput for MeshletOutputArrays {
	fn set_outputs(&mut self, vertex_count: u32, triangle_count: u32) {
		assert!(!self.declared, "mesh outputs were already declared");
		assert!(
			vertex_count <= MESHLET_MAX_VERTICES && triangle_count <= MESHLET_MAX_TRIANGLES,
			"mesh outputs of {vertex_count} vertices and {triangle_count} triangles exceed the maxima"
		);
		self.declared = true;
		self.vertex_count = vertex_count;
		self.triangle_count = triangle_count;
	}

	fn write_vertex(&mut self, index: usize, vertex: OutputVertex) {
		let len = self.vertex_count as usize;
		assert!(self.declared, "mesh outputs must be declared before writing");
		assert!(
			index < len,
			"index out of bounds: the len is {len} but the index is {index}"
		);
		self.vertices[index] = vertex;
	}

	fn write_triangle(&mut self, index: usize, triangle: UVec3) {
		let len = self.triangle_count as usize;
		assert!(self.declared, "mesh outputs must be declared before writing");
		assert!(
			index < len,
			"index out of bounds: the len is {len} but the index is {index}"
		);
		self.triangles[index] = triangle;
	}
}
