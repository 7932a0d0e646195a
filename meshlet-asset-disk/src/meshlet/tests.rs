use crate::error::{SceneFileError, ValidationError};
use crate::meshlet::decode::*;
use crate::meshlet::indices::PackedIndices;
use crate::meshlet::instance::MeshInstance;
use crate::meshlet::level::MeshLevel;
use crate::meshlet::limits::MeshletLimits;
use crate::meshlet::mesh::{BoundedMeshletData, LodLevel, Mesh, MeshId, MeshStore, MeshletData, MeshletId};
use crate::meshlet::scene::SceneDisk;
use crate::meshlet::vertex::Vertex;
use crate::sample::{SampleGrid, sample_scene};
use glam::{Mat4, Quat, UVec3, Vec2, Vec3, Vec4, uvec3, vec3};
use meshlet_asset_shader::debug_color::meshlet_debug_color;
use meshlet_asset_shader::shape::aabb::Aabb;
use meshlet_asset_shader::transform::{RigidInstanceTransform, StaticTransform, TransformPolicy};

fn vertex(i: u32) -> Vertex {
	let f = i as f32;
	Vertex::new(vec3(f, -f, f * 0.5), Vec2::splat(f), Vec3::Y)
}

/// A level with a single meshlet, bypassing the builder so that broken records can be constructed.
fn raw_level(vertices: u32, meshlet: MeshletData, data: Vec<u32>) -> MeshLevel {
	MeshLevel {
		vertices: (0..vertices).map(vertex).collect(),
		meshlets: vec![BoundedMeshletData {
			bounds: Aabb::default(),
			meshlet,
		}],
		data,
	}
}

fn triangle_level() -> MeshLevel {
	raw_level(
		3,
		MeshletData::new(0, 3, 1),
		vec![0, 1, 2, PackedIndices::from_values([0, 1, 2, 0]).0],
	)
}

fn small_grid() -> SampleGrid {
	SampleGrid {
		resolution: 20,
		size: 10.,
		amplitude: 1.,
		levels: 3,
	}
}

#[test]
fn decode_single_triangle() {
	let level = triangle_level();
	let decoded = decode_meshlet(
		&level,
		MeshletId(0),
		Mat4::IDENTITY,
		StaticTransform,
		DecodeSettings::default(),
	)
	.unwrap();

	assert_eq!(decoded.vertices.len(), 3);
	for (i, v) in decoded.vertices.iter().enumerate() {
		assert_eq!(v.position, Vec4::from((vertex(i as u32).position(), 1.)));
		assert_eq!(v.tex_coord, vertex(i as u32).tex_coord());
		assert_eq!(v.normal, Vec3::Y);
		assert_eq!(v.color, meshlet_debug_color(0));
	}
	assert_eq!(decoded.triangles, [uvec3(0, 1, 2)]);
}

#[test]
fn decode_triangles_not_remapped() {
	// global indices in reverse, triangles must still come out as local indices
	let level = raw_level(
		4,
		MeshletData::new(1, 3, 2),
		vec![
			0xDEAD,
			3,
			2,
			1,
			PackedIndices::from_values([2, 1, 0, 0]).0,
			PackedIndices::from_values([1, 2, 0, 0]).0,
		],
	);
	let decoded = decode_meshlet(
		&level,
		MeshletId(0),
		Mat4::IDENTITY,
		StaticTransform,
		DecodeSettings::default(),
	)
	.unwrap();
	assert_eq!(decoded.vertices[0].position.truncate(), vertex(3).position());
	assert_eq!(decoded.vertices[2].position.truncate(), vertex(1).position());
	assert_eq!(decoded.triangles, [uvec3(2, 1, 0), uvec3(0, 1, 2)]);
}

#[test]
fn decode_lane_width_independent() {
	let level = small_grid().build_level(0, MeshletLimits::Standard).unwrap();
	let vp = Mat4::perspective_lh(1., 1., 0.1, 100.) * Mat4::from_translation(vec3(0., -2., 20.));
	let transform = TransformPolicy::RigidInstance(RigidInstanceTransform::new(
		vec3(1., 0., 2.),
		1.5,
		Quat::from_rotation_y(0.3),
	));
	let expect = decode_level(&level, vp, transform, DecodeSettings::default()).unwrap();
	for lane_width in [1, 5, 32, 64, 97] {
		let settings = DecodeSettings {
			lane_width,
			..DecodeSettings::default()
		};
		assert_eq!(decode_level(&level, vp, transform, settings).unwrap(), expect);
		assert_eq!(
			decode_meshlet(&level, MeshletId(4), vp, transform, settings).unwrap(),
			DecodedMeshlet {
				vertices: expect.meshlet_vertices(MeshletId(4)).to_vec(),
				triangles: expect.meshlet_triangles(MeshletId(4)).to_vec(),
			}
		);
	}
}

#[test]
fn decode_parallel_matches_sequential() {
	let level = small_grid().build_level(0, MeshletLimits::Conservative).unwrap();
	let vp = Mat4::perspective_lh(1., 1., 0.1, 100.) * Mat4::from_translation(vec3(0., 0., 15.));
	let settings = DecodeSettings {
		limits: MeshletLimits::Conservative,
		..DecodeSettings::default()
	};
	let parallel = decode_level(&level, vp, StaticTransform, settings).unwrap();
	let sequential = decode_level_sequential(&level, vp, StaticTransform, settings).unwrap();
	assert_eq!(parallel, sequential);

	let stats = level.stats();
	assert_eq!(parallel.vertices.len() as u32, stats.meshlet_vertices);
	assert_eq!(parallel.triangles.len() as u32, stats.triangles);
	assert_eq!(parallel.ranges.len() as u32, level.num_meshlets());
}

#[test]
fn decode_level_global_triangles() {
	let level = small_grid().build_level(1, MeshletLimits::Standard).unwrap();
	let decoded = decode_level(&level, Mat4::IDENTITY, StaticTransform, DecodeSettings::default()).unwrap();
	let positions: Vec<Vec3> = decoded.vertices.iter().map(|v| v.position.truncate()).collect();

	let mut expect = Vec::new();
	for meshlet in level.meshlet_ids() {
		let reader = level.meshlet(meshlet);
		for t in 0..reader.triangles() {
			let triangle = reader.load_triangle(t);
			expect.push(triangle.to_array().map(|i| reader.load_vertex(i as usize).position()));
		}
	}
	let actual: Vec<[Vec3; 3]> = decoded
		.global_triangles()
		.map(|t| t.to_array().map(|i| positions[i as usize]))
		.collect();
	assert_eq!(actual, expect);

	for meshlet in level.meshlet_ids() {
		let color = meshlet_debug_color(meshlet.0);
		assert!(decoded.meshlet_vertices(meshlet).iter().all(|v| v.color == color));
	}
}

#[test]
fn validate_counts() {
	let empty = raw_level(3, MeshletData::new(0, 0, 0), vec![0; 4]);
	assert_eq!(
		empty.validate(MeshletLimits::Standard),
		Err(ValidationError::EmptyMeshlet {
			meshlet: 0,
			vertex_count: 0,
			triangle_count: 0
		})
	);

	let no_triangles = raw_level(3, MeshletData::new(0, 3, 0), vec![0; 4]);
	assert!(matches!(
		no_triangles.validate(MeshletLimits::Standard),
		Err(ValidationError::EmptyMeshlet { .. })
	));

	let vertices = raw_level(65, MeshletData::new(0, 65, 1), vec![0; 66]);
	assert_eq!(
		vertices.validate(MeshletLimits::Standard),
		Err(ValidationError::TooManyVertices {
			meshlet: 0,
			vertex_count: 65,
			max: 64
		})
	);

	let triangles = raw_level(3, MeshletData::new(0, 3, 125), vec![0; 3 + 94]);
	assert_eq!(triangles.validate(MeshletLimits::Standard), Ok(()));
	assert_eq!(
		triangles.validate(MeshletLimits::Conservative),
		Err(ValidationError::TooManyTriangles {
			meshlet: 0,
			triangle_count: 125,
			max: 124
		})
	);

	let level = triangle_level();
	assert_eq!(level.validate(MeshletLimits::Demo), Ok(()));
	let two = raw_level(3, MeshletData::new(0, 3, 2), vec![0, 1, 2, 0x00_01_02_00, 0]);
	assert!(matches!(
		two.validate(MeshletLimits::Demo),
		Err(ValidationError::TooManyTriangles { max: 1, .. })
	));
}

#[test]
fn validate_data_out_of_bounds() {
	// the packed word of the only triangle is missing
	let level = raw_level(3, MeshletData::new(0, 3, 1), vec![0, 1, 2]);
	assert_eq!(
		level.validate(MeshletLimits::Standard),
		Err(ValidationError::DataOutOfBounds {
			meshlet: 0,
			start: 0,
			end: 4,
			len: 3
		})
	);

	let level = raw_level(3, MeshletData::new(u32::MAX - 2, 3, 1), vec![0, 1, 2, 0]);
	assert!(matches!(
		level.validate(MeshletLimits::Standard),
		Err(ValidationError::DataOutOfBounds { .. })
	));
}

#[test]
fn validate_vertex_index() {
	let level = raw_level(3, MeshletData::new(0, 3, 1), vec![0, 3, 2, 0x00_01_02_00]);
	assert_eq!(
		level.validate(MeshletLimits::Standard),
		Err(ValidationError::VertexIndexOutOfBounds {
			meshlet: 0,
			local: 1,
			global: 3,
			len: 3
		})
	);
}

#[test]
fn validate_local_index() {
	let level = raw_level(3, MeshletData::new(0, 3, 1), vec![0, 1, 2, 0x00_03_02_00]);
	assert_eq!(
		level.validate(MeshletLimits::Standard),
		Err(ValidationError::LocalIndexOutOfBounds {
			meshlet: 0,
			triangle: 0,
			index: 3,
			vertex_count: 3
		})
	);
	// decoding validates first
	assert!(matches!(
		decode_meshlet(
			&level,
			MeshletId(0),
			Mat4::IDENTITY,
			StaticTransform,
			DecodeSettings::default()
		),
		Err(ValidationError::LocalIndexOutOfBounds { .. })
	));
	assert!(decode_level(&level, Mat4::IDENTITY, StaticTransform, DecodeSettings::default()).is_err());
}

#[test]
fn validate_meshlet_index() {
	let level = triangle_level();
	assert_eq!(
		level.validate_meshlet(MeshletId(1), MeshletLimits::Standard),
		Err(ValidationError::InvalidMeshletIndex { meshlet: 1, len: 1 })
	);
}

#[test]
fn validate_store() {
	let mut store = MeshStore::new();
	store.push(Mesh::new(vec![triangle_level()]));
	store.push(Mesh::new(vec![
		triangle_level(),
		raw_level(3, MeshletData::new(0, 3, 1), vec![0, 1]),
	]));
	assert_eq!(store.validate_mesh(MeshId(0), MeshletLimits::Standard), Ok(()));
	assert!(matches!(
		store.validate(MeshletLimits::Standard),
		Err(ValidationError::DataOutOfBounds { .. })
	));
	assert_eq!(
		store.validate_mesh(MeshId(2), MeshletLimits::Standard),
		Err(ValidationError::InvalidMeshIndex { mesh: 2, len: 2 })
	);
}

#[test]
fn output_contract() {
	let mut vertices = [OutputVertex::ZERO; 3];
	let mut triangles = [UVec3::ZERO; 1];

	let mut out = CheckedOutput::new(7, &mut vertices, &mut triangles);
	out.write_vertex(0, OutputVertex::default());
	out.set_outputs(3, 1);
	assert_eq!(out.finish(), Err(ValidationError::OutputsNotDeclared { meshlet: 7 }));

	let out = CheckedOutput::new(7, &mut vertices, &mut triangles);
	assert_eq!(out.finish(), Err(ValidationError::OutputsNotDeclared { meshlet: 7 }));

	let mut out = CheckedOutput::new(7, &mut vertices, &mut triangles);
	out.set_outputs(3, 1);
	out.set_outputs(3, 1);
	assert_eq!(out.finish(), Err(ValidationError::OutputsDeclaredTwice { meshlet: 7 }));

	let mut out = CheckedOutput::new(7, &mut vertices, &mut triangles);
	out.set_outputs(2, 1);
	out.write_vertex(2, OutputVertex::default());
	assert_eq!(
		out.finish(),
		Err(ValidationError::OutputOutOfBounds {
			meshlet: 7,
			index: 2,
			len: 2
		})
	);

	let mut out = CheckedOutput::new(7, &mut vertices, &mut triangles);
	out.set_outputs(4, 1);
	assert!(matches!(out.finish(), Err(ValidationError::OutputOutOfBounds { .. })));

	let mut out = CheckedOutput::new(7, &mut vertices, &mut triangles);
	out.set_outputs(3, 1);
	out.write_triangle(0, uvec3(0, 1, 2));
	assert_eq!(out.finish(), Ok((3, 1)));
	assert_eq!(triangles[0], uvec3(0, 1, 2));
}

#[test]
fn scene_roundtrip() {
	let scene = sample_scene(&small_grid(), 2, MeshletLimits::Standard).unwrap();
	let mut bytes = Vec::new();
	scene.serialize_to(&mut bytes).unwrap();
	let loaded = SceneDisk::deserialize_from(bytes.as_slice()).unwrap();
	assert_eq!(loaded, scene);
	assert_eq!(loaded.stats(), scene.stats());
}

#[test]
fn scene_file_roundtrip() {
	let scene = SceneDisk {
		store: MeshStore {
			meshes: vec![Mesh::new(vec![triangle_level(), triangle_level()])],
		},
		instances: vec![MeshInstance::new(vec3(1., 2., 3.), 2., Quat::from_rotation_x(1.), 0)],
	};
	let path = std::env::temp_dir().join(format!("meshlet-asset-disk-{}.scene", std::process::id()));
	scene.save(&path).unwrap();
	let loaded = SceneDisk::load(&path, MeshletLimits::Demo);
	std::fs::remove_file(&path).unwrap();
	assert_eq!(loaded.unwrap(), scene);
}

#[test]
fn scene_invalid_instance() {
	let scene = SceneDisk {
		store: MeshStore {
			meshes: vec![Mesh::new(vec![triangle_level()]), Mesh::default()],
		},
		instances: vec![MeshInstance::new(Vec3::ZERO, 1., Quat::IDENTITY, 0)],
	};
	assert_eq!(scene.validate(MeshletLimits::Standard), Ok(()));

	let mut invalid = scene.clone();
	invalid.instances[0].mesh_idx = 2;
	assert_eq!(
		invalid.validate(MeshletLimits::Standard),
		Err(ValidationError::InvalidMeshIndex { mesh: 2, len: 2 })
	);

	let mut no_levels = scene;
	no_levels.instances[0].mesh_idx = 1;
	assert!(matches!(
		no_levels.validate(MeshletLimits::Standard),
		Err(ValidationError::InvalidLevelIndex { mesh: 1, .. })
	));
}

#[test]
fn scene_corrupted() {
	let scene = sample_scene(&small_grid(), 1, MeshletLimits::Standard).unwrap();
	let mut bytes = Vec::new();
	scene.serialize_to(&mut bytes).unwrap();

	let truncated = &bytes[..bytes.len() / 2];
	assert!(SceneDisk::deserialize_from(truncated).is_err());
	assert!(matches!(
		SceneDisk::deserialize_from(&b"not a scene"[..]),
		Err(SceneFileError::Io(_))
	));
}

#[test]
fn resolve_sample_levels() {
	let scene = sample_scene(&small_grid(), 1, MeshletLimits::Standard).unwrap();
	let mesh = MeshId(scene.instances[0].mesh_idx);
	for level in scene.store.mesh(mesh).level_ids() {
		let resolved = scene.store.try_level(mesh, level).unwrap();
		assert!(std::ptr::eq(resolved, scene.store.level(mesh, level)));
	}
	assert_eq!(
		scene.store.try_level(mesh, LodLevel(3)),
		Err(ValidationError::InvalidLevelIndex {
			mesh: 0,
			level: 3,
			len: 3
		})
	);
}
