use crate::append::AppendBuffer;
use crate::error::ValidationError;
use crate::meshlet::instance::{MeshInstance, VisibleInstance};
use crate::meshlet::mesh::{LodLevel, MeshId, MeshStore};
use glam::Vec3;
use meshlet_asset_shader::frame::FrameGlobals;
use rayon::prelude::*;

pub const DEFAULT_LOD_DISTANCE_SCALE: f32 = 0.08;

/// Picks coarser levels of detail the further away an instance is from the camera: every `1 / distance_scale` units
/// of distance select the next level, up to the coarsest one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LodSelector {
	pub distance_scale: f32,
}

impl Default for LodSelector {
	fn default() -> Self {
		Self::new(DEFAULT_LOD_DISTANCE_SCALE)
	}
}

impl LodSelector {
	pub fn new(distance_scale: f32) -> Self {
		Self { distance_scale }
	}

	#[inline]
	pub fn select(&self, camera_pos: Vec3, instance_pos: Vec3, num_levels: u32) -> LodLevel {
		assert!(num_levels > 0, "a mesh must have at least one level");
		// float to int casts saturate, negative and NaN distances select level 0
		let level = (camera_pos.distance(instance_pos) * self.distance_scale) as u32;
		LodLevel(level.min(num_levels - 1))
	}

	/// Host version of instance culling: appends every instance whose mesh bounds intersect the view frustum to `out`,
	/// together with its level of detail.
	#[profiling::function]
	pub fn select_instances(
		&self,
		globals: &FrameGlobals,
		store: &MeshStore,
		instances: &[MeshInstance],
		out: &AppendBuffer<VisibleInstance>,
	) -> Result<(), ValidationError> {
		instances
			.par_iter()
			.enumerate()
			.try_for_each(|(index, instance)| {
				let mesh_id = MeshId(instance.mesh_idx);
				let mesh = store.try_mesh(mesh_id)?;
				if mesh.num_levels() == 0 {
					return Err(ValidationError::InvalidLevelIndex {
						mesh: mesh_id.0,
						level: 0,
						len: 0,
					});
				}

				if let Some(bounds) = mesh.level(LodLevel(0)).bounds() {
					let transform = instance.transform();
					let center = transform.transform_point(bounds.center());
					let radius = bounds.range() * 0.5 * 3f32.sqrt() * transform.scale.abs();
					if !globals.sphere_visible(center, radius) {
						return Ok(());
					}
				}

				let level = self.select(globals.camera_pos, instance.position(), mesh.num_levels());
				// overflow is reported once below
				let _ = out.push(VisibleInstance {
					index: index as u32,
					level: level.0,
				});
				Ok(())
			})?;

		if out.overflowed() {
			log::warn!(
				"visible instance buffer overflowed, {} instances did not fit into the capacity of {}",
				out.attempted() as usize - out.capacity(),
				out.capacity()
			);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::meshlet::builder::MeshLevelBuilder;
	use crate::meshlet::level::MeshLevel;
	use crate::meshlet::limits::MeshletLimits;
	use crate::meshlet::mesh::Mesh;
	use crate::meshlet::vertex::Vertex;
	use glam::{Quat, Vec2, vec3};
	use meshlet_asset_shader::frame::camera_view_projection;

	#[test]
	fn select_levels() {
		let selector = LodSelector::default();
		let camera = Vec3::ZERO;
		assert_eq!(selector.select(camera, Vec3::ZERO, 4), LodLevel(0));
		assert_eq!(selector.select(camera, vec3(12., 0., 0.), 4), LodLevel(0));
		assert_eq!(selector.select(camera, vec3(13., 0., 0.), 4), LodLevel(1));
		assert_eq!(selector.select(camera, vec3(0., 0., -26.), 4), LodLevel(2));
	}

	#[test]
	fn select_clamps_to_last_level() {
		let selector = LodSelector::default();
		assert_eq!(selector.select(Vec3::ZERO, vec3(1000., 0., 0.), 4), LodLevel(3));
		assert_eq!(selector.select(Vec3::ZERO, vec3(1000., 0., 0.), 1), LodLevel(0));
		assert_eq!(LodSelector::new(f32::NAN).select(Vec3::ZERO, Vec3::X, 3), LodLevel(0));
		assert_eq!(LodSelector::new(f32::INFINITY).select(Vec3::ZERO, Vec3::X, 3), LodLevel(2));
	}

	#[test]
	#[should_panic(expected = "at least one level")]
	fn select_without_levels() {
		LodSelector::default().select(Vec3::ZERO, Vec3::ZERO, 0);
	}

	fn unit_triangle_level() -> MeshLevel {
		let vertices = [vec3(-1., -1., 0.), vec3(1., -1., 0.), vec3(0., 1., 0.)]
			.into_iter()
			.map(|p| Vertex::new(p, Vec2::ZERO, Vec3::Z))
			.collect();
		let mut builder = MeshLevelBuilder::new(vertices, MeshletLimits::Standard);
		builder.push_meshlet(&[0, 1, 2], &[[0, 1, 2]]).unwrap();
		builder.build()
	}

	#[test]
	fn select_instances() {
		let mut store = MeshStore::new();
		let mesh = store.push(Mesh::new(vec![unit_triangle_level(); 3]));
		let instance = |x: f32, z: f32| MeshInstance::new(vec3(x, 0., z), 1., Quat::IDENTITY, mesh.0);
		let instances = [
			instance(0., 5.),
			// behind the camera
			instance(0., -20.),
			instance(2., 20.),
			instance(0., 60.),
		];
		let eye = vec3(0., 0., -5.);
		let vp = camera_view_projection(eye, Vec3::Z, Vec3::Y, 90f32.to_radians(), 1., 0.1, 1000.);
		let globals = FrameGlobals::new(vp, eye, 0.);

		let out = AppendBuffer::new(instances.len());
		LodSelector::default()
			.select_instances(&globals, &store, &instances, &out)
			.unwrap();
		let mut visible = out.into_vec();
		visible.sort_by_key(|v| v.index);
		assert_eq!(
			visible,
			[
				VisibleInstance { index: 0, level: 0 },
				VisibleInstance { index: 2, level: 2 },
				VisibleInstance { index: 3, level: 2 },
			]
		);
	}

	#[test]
	fn select_instances_invalid_mesh() {
		let store = MeshStore::new();
		let instances = [MeshInstance::default()];
		let globals = FrameGlobals::new(glam::Mat4::IDENTITY, Vec3::ZERO, 0.);
		let out = AppendBuffer::new(1);
		assert_eq!(
			LodSelector::default().select_instances(&globals, &store, &instances, &out),
			Err(ValidationError::InvalidMeshIndex { mesh: 0, len: 0 })
		);
	}
}
