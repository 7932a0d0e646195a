use crate::debug_color::{instance_meshlet_debug_color, meshlet_debug_color};
use glam::{Mat4, Quat, Vec3, Vec4};

/// How a vertex position of a meshlet is moved into clip space.
pub trait VertexTransform {
	fn transform_position(&self, view_projection: Mat4, position: Vec3) -> Vec4;

	/// Debug color all vertices of meshlet `meshlet_idx` are tagged with.
	#[inline]
	fn meshlet_color(&self, meshlet_idx: u32) -> Vec3 {
		meshlet_debug_color(meshlet_idx)
	}
}

/// Meshes that are already authored in their final world space position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StaticTransform;

impl VertexTransform for StaticTransform {
	#[inline]
	fn transform_position(&self, view_projection: Mat4, position: Vec3) -> Vec4 {
		view_projection * Vec4::from((position, 1.))
	}
}

/// Uniform scale, translation and rotation of a mesh instance.
///
/// Note that the rotation is applied *after* the translation, so instances rotate around the world origin and not
/// around their own pivot.
// TODO confirm with the asset authors whether rotate-after-translate is intended, before switching to a model matrix
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidInstanceTransform {
	pub translation: Vec3,
	pub scale: f32,
	/// must be normalized
	pub rotation: Quat,
}

impl RigidInstanceTransform {
	pub const IDENTITY: Self = Self {
		translation: Vec3::ZERO,
		scale: 1.,
		rotation: Quat::IDENTITY,
	};

	pub fn new(translation: Vec3, scale: f32, rotation: Quat) -> Self {
		Self {
			translation,
			scale,
			rotation,
		}
	}

	/// Position after scale, translation and rotation, before the view projection.
	#[inline]
	pub fn transform_point(&self, position: Vec3) -> Vec3 {
		let p = self.scale * position + self.translation;
		let q = Vec3::new(self.rotation.x, self.rotation.y, self.rotation.z);
		p + 2. * q.cross(q.cross(p) + self.rotation.w * p)
	}
}

impl Default for RigidInstanceTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl VertexTransform for RigidInstanceTransform {
	#[inline]
	fn transform_position(&self, view_projection: Mat4, position: Vec3) -> Vec4 {
		view_projection * Vec4::from((self.transform_point(position), 1.))
	}

	#[inline]
	fn meshlet_color(&self, meshlet_idx: u32) -> Vec3 {
		instance_meshlet_debug_color(meshlet_idx, self.translation)
	}
}

/// Runtime selection between the transform policies.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum TransformPolicy {
	#[default]
	Static,
	RigidInstance(RigidInstanceTransform),
}

impl VertexTransform for TransformPolicy {
	#[inline]
	fn transform_position(&self, view_projection: Mat4, position: Vec3) -> Vec4 {
		match self {
			TransformPolicy::Static => StaticTransform.transform_position(view_projection, position),
			TransformPolicy::RigidInstance(rigid) => rigid.transform_position(view_projection, position),
		}
	}

	#[inline]
	fn meshlet_color(&self, meshlet_idx: u32) -> Vec3 {
		match self {
			TransformPolicy::Static => StaticTransform.meshlet_color(meshlet_idx),
			TransformPolicy::RigidInstance(rigid) => rigid.meshlet_color(meshlet_idx),
		}
	}
}

impl<T: VertexTransform> VertexTransform for &T {
	#[inline]
	fn transform_position(&self, view_projection: Mat4, position: Vec3) -> Vec4 {
		T::transform_position(self, view_projection, position)
	}

	#[inline]
	fn meshlet_color(&self, meshlet_idx: u32) -> Vec3 {
		T::meshlet_color(self, meshlet_idx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use core::f32::consts::FRAC_PI_2;
	use glam::{vec3, vec4};

	const POSITIONS: [Vec3; 4] = [
		Vec3::ZERO,
		Vec3::new(1., 2., 3.),
		Vec3::new(-0.5, 100., 7.25),
		Vec3::new(1e-3, -4e3, 0.),
	];

	fn view_projection() -> Mat4 {
		Mat4::perspective_lh(1.2, 16. / 9., 0.1, 1000.) * Mat4::look_at_lh(vec3(3., 4., -10.), Vec3::ZERO, Vec3::Y)
	}

	#[test]
	fn static_identity() {
		for p in POSITIONS {
			assert_eq!(StaticTransform.transform_position(Mat4::IDENTITY, p), Vec4::from((p, 1.)));
		}
	}

	#[test]
	fn rigid_identity_is_static() {
		let vp = view_projection();
		for p in POSITIONS {
			assert_eq!(
				RigidInstanceTransform::IDENTITY.transform_position(vp, p),
				StaticTransform.transform_position(vp, p)
			);
		}
	}

	#[test]
	fn rigid_scale_translate() {
		let rigid = RigidInstanceTransform::new(vec3(10., 0., -1.), 2., Quat::IDENTITY);
		assert_eq!(
			rigid.transform_position(Mat4::IDENTITY, vec3(1., 2., 3.)),
			vec4(12., 4., 5., 1.)
		);
	}

	#[test]
	fn rotation_after_translation() {
		// rotating 90° around Y after translating along X moves the point onto the -Z axis
		let rigid = RigidInstanceTransform::new(vec3(5., 0., 0.), 1., Quat::from_rotation_y(FRAC_PI_2));
		let p = rigid.transform_point(Vec3::ZERO);
		assert_relative_eq!(p.x, 0., epsilon = 1e-5);
		assert_relative_eq!(p.y, 0., epsilon = 1e-5);
		assert_relative_eq!(p.z, -5., epsilon = 1e-5);
	}

	#[test]
	fn rotation_matches_quat() {
		let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.);
		let rigid = RigidInstanceTransform::new(vec3(1., -2., 3.), 0.5, rotation);
		for p in POSITIONS {
			let expect = rotation * (0.5 * p + vec3(1., -2., 3.));
			let actual = rigid.transform_point(p);
			let tolerance = expect.length().max(1.) * 1e-5;
			assert!(actual.abs_diff_eq(expect, tolerance), "{actual} != {expect}");
		}
	}

	#[test]
	fn policy_dispatch() {
		let vp = view_projection();
		let rigid = RigidInstanceTransform::new(vec3(1., 2., 3.), 3., Quat::from_rotation_x(0.5));
		let p = vec3(0.25, 0.5, 1.);
		assert_eq!(TransformPolicy::Static.transform_position(vp, p), StaticTransform.transform_position(vp, p));
		assert_eq!(
			TransformPolicy::RigidInstance(rigid).transform_position(vp, p),
			rigid.transform_position(vp, p)
		);
		assert_eq!(TransformPolicy::Static.meshlet_color(3), meshlet_debug_color(3));
		assert_eq!(
			TransformPolicy::RigidInstance(rigid).meshlet_color(3),
			instance_meshlet_debug_color(3, vec3(1., 2., 3.))
		);
	}
}
