use core::mem;
use glam::{Mat4, Vec3, Vec4};
use static_assertions::const_assert_eq;

/// Per frame constants shared by instance culling and meshlet decoding.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
pub struct FrameGlobals {
	pub view_projection: Mat4,
	/// left, right, bottom, top, near, far; normals point inwards and are normalized
	pub frustum_planes: [Vec4; 6],
	pub camera_pos: Vec3,
	pub time: f32,
}
const_assert_eq!(mem::size_of::<FrameGlobals>(), 44 * 4);

impl FrameGlobals {
	pub fn new(view_projection: Mat4, camera_pos: Vec3, time: f32) -> Self {
		Self {
			view_projection,
			frustum_planes: frustum_planes(view_projection),
			camera_pos,
			time,
		}
	}

	/// Whether a sphere is at least partially inside all frustum planes.
	pub fn sphere_visible(&self, center: Vec3, radius: f32) -> bool {
		self.frustum_planes
			.iter()
			.all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
	}
}

/// Extracts the planes of a frustum from the rows of a view projection matrix with a depth range of `[0, 1]`.
pub fn frustum_planes(view_projection: Mat4) -> [Vec4; 6] {
	let r0 = view_projection.row(0);
	let r1 = view_projection.row(1);
	let r2 = view_projection.row(2);
	let r3 = view_projection.row(3);
	let normalize = |plane: Vec4| {
		let len = plane.truncate().length();
		if len > 0. { plane / len } else { plane }
	};
	[
		normalize(r3 + r0),
		normalize(r3 - r0),
		normalize(r3 + r1),
		normalize(r3 - r1),
		normalize(r2),
		normalize(r3 - r2),
	]
}

/// Left handed view projection of a camera at `position` looking along `forward`, with the y axis flipped to match
/// Vulkan's framebuffer coordinates.
pub fn camera_view_projection(
	position: Vec3,
	forward: Vec3,
	up: Vec3,
	fov_y_radians: f32,
	aspect_ratio: f32,
	z_near: f32,
	z_far: f32,
) -> Mat4 {
	let mut projection = Mat4::perspective_lh(fov_y_radians, aspect_ratio, z_near, z_far);
	projection.y_axis.y *= -1.;
	projection * Mat4::look_at_lh(position, position + forward, up)
}
