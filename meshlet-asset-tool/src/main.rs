use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::{Vec2, Vec3, Vec3Swizzles, Vec4Swizzles};
use meshlet_asset_disk::lod_selection::LodSelector;
use meshlet_asset_disk::meshlet::decode::{DecodeSettings, OutputVertex, decode_level, decode_meshlet};
use meshlet_asset_disk::meshlet::instance::{DrawParams, VisibleInstance};
use meshlet_asset_disk::meshlet::limits::MeshletLimits;
use meshlet_asset_disk::meshlet::mesh::{LodLevel, MeshId, MeshletId};
use meshlet_asset_disk::meshlet::scene::SceneDisk;
use meshlet_asset_disk::sample::{SampleGrid, sample_scene};
use meshlet_asset_disk::shader::frame::{FrameGlobals, camera_view_projection};
use meshlet_asset_disk::shader::transform::TransformPolicy;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
	#[command(subcommand)]
	command: Command,

	/// The meshlet size limits meshes must fit into
	#[arg(long, value_enum, default_value_t = Limits::Standard, global = true)]
	limits: Limits,

	/// The amount of threads to use
	#[arg(long, short = 'j', global = true)]
	threads: Option<usize>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Limits {
	Standard,
	Conservative,
	Demo,
}

impl From<Limits> for MeshletLimits {
	fn from(value: Limits) -> Self {
		match value {
			Limits::Standard => MeshletLimits::Standard,
			Limits::Conservative => MeshletLimits::Conservative,
			Limits::Demo => MeshletLimits::Demo,
		}
	}
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Generate a scene of height field instances
	Sample {
		/// The output path
		out: PathBuf,
		/// Quads along each side of the most detailed level
		#[arg(long, default_value_t = 64)]
		resolution: u32,
		#[arg(long, default_value_t = 4)]
		levels: u32,
		/// Instances along each side of the instance grid
		#[arg(long, default_value_t = 4)]
		instances: u32,
	},
	/// Load a scene and validate all of its meshes and instances
	Validate { path: PathBuf },
	/// Print statistics of a scene
	Stats {
		path: PathBuf,
		/// Also print the statistics of every mesh
		#[arg(long)]
		per_mesh: bool,
	},
	/// Decode a level of a mesh the same way a draw would
	Decode {
		path: PathBuf,
		#[arg(long, default_value_t = 0)]
		mesh: u32,
		/// Defaults to the level selected by distance when drawing an instance, otherwise 0
		#[arg(long)]
		level: Option<u32>,
		/// Draw the mesh of this instance with its transform, instead of untransformed
		#[arg(long)]
		instance: Option<u32>,
		/// Only decode and print this meshlet
		#[arg(long)]
		meshlet: Option<u32>,
		/// Lanes cooperatively decoding a single meshlet
		#[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u32).range(1..))]
		workers: u32,
	},
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	#[cfg(feature = "profile-with-puffin")]
	let _puffin_server = {
		profiling::puffin::set_scopes_on(true);
		let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
		puffin_http::Server::new(&server_addr).context("starting puffin server")?
	};

	let result = inner_main();
	profiling::finish_frame!();
	result
}

#[profiling::function]
fn inner_main() -> anyhow::Result<()> {
	let args = Args::parse();
	rayon::ThreadPoolBuilder::new()
		.num_threads(args.threads.unwrap_or(0))
		.thread_name(|id| format!("Rayon-{}", id))
		.build_global()
		.context("building rayon thread pool")?;
	let limits = MeshletLimits::from(args.limits);

	match args.command {
		Command::Sample {
			out,
			resolution,
			levels,
			instances,
		} => {
			let grid = SampleGrid {
				resolution,
				levels,
				..SampleGrid::default()
			};
			let scene = sample_scene(&grid, instances, limits).context("generating sample scene")?;
			scene
				.save(&out)
				.with_context(|| format!("writing scene to {}", out.display()))?;
			log::info!("wrote sample scene to {}", out.display());
			println!("{:#?}", scene.stats());
		}
		Command::Validate { path } => {
			let scene = load(&path, limits)?;
			log::info!(
				"{} is valid: {} meshes, {} instances",
				path.display(),
				scene.store.num_meshes(),
				scene.instances.len()
			);
		}
		Command::Stats { path, per_mesh } => {
			let scene = load(&path, limits)?;
			if per_mesh {
				for mesh in scene.store.mesh_ids() {
					println!("mesh {}: {:#?}", *mesh, scene.store.mesh(mesh).stats());
				}
			}
			println!("{:#?}", scene.stats());
		}
		Command::Decode {
			path,
			mesh,
			level,
			instance,
			meshlet,
			workers,
		} => {
			let scene = load(&path, limits)?;
			let settings = DecodeSettings {
				limits,
				lane_width: workers as usize,
			};
			let globals = overview_camera(&scene);

			let (mesh, level, transform) = match instance {
				Some(index) => {
					let instance = scene
						.instances
						.get(index as usize)
						.with_context(|| format!("instance {index} out of range, there are {}", scene.instances.len()))?;
					let level = match level {
						Some(level) => level,
						None => {
							let num_levels = scene.store.try_mesh(MeshId(instance.mesh_idx))?.num_levels();
							*LodSelector::default().select(globals.camera_pos, instance.position(), num_levels)
						}
					};
					let draw = DrawParams::from_instance(instance, VisibleInstance { index, level });
					(
						MeshId(draw.mesh_idx),
						LodLevel(draw.level_idx),
						TransformPolicy::RigidInstance(draw.transform()),
					)
				}
				None => (MeshId(mesh), LodLevel(level.unwrap_or(0)), TransformPolicy::Static),
			};
			let mesh_level = scene.store.try_level(mesh, level)?;

			match meshlet {
				Some(meshlet) => {
					let decoded = decode_meshlet(
						mesh_level,
						MeshletId(meshlet),
						globals.view_projection,
						transform,
						settings,
					)?;
					println!("{:#?}", decoded);
				}
				None => {
					let decoded = decode_level(mesh_level, globals.view_projection, transform, settings)?;
					let on_screen = decoded.vertices.iter().filter(|v| on_screen(v)).count();
					println!(
						"mesh {} level {}: {} meshlets, {} vertices ({} on screen), {} triangles",
						*mesh,
						*level,
						decoded.ranges.len(),
						decoded.vertices.len(),
						on_screen,
						decoded.triangles.len()
					);
				}
			}
		}
	}
	Ok(())
}

/// Whether the clip space position of `vertex` lies in front of the camera and within the screen's bounds.
fn on_screen(vertex: &OutputVertex) -> bool {
	let position = vertex.position;
	let ndc = position.xyz() / position.w;
	position.w > 0. && ndc.xy().abs().cmple(Vec2::ONE).all()
}

fn load(path: &Path, limits: MeshletLimits) -> anyhow::Result<SceneDisk> {
	SceneDisk::load(path, limits).with_context(|| format!("loading scene {}", path.display()))
}

/// A camera above the scene, looking down onto its center at an angle.
fn overview_camera(scene: &SceneDisk) -> FrameGlobals {
	let stats = scene.stats();
	let (center, extent) = match stats.bounds() {
		Some(bounds) => {
			let instance_extent = scene
				.instances
				.iter()
				.map(|i| i.position().length())
				.fold(0., f32::max);
			(bounds.center(), bounds.range() + instance_extent * 2.)
		}
		None => (Vec3::ZERO, 1.),
	};
	let eye = center + Vec3::new(0., extent, -extent);
	let view_projection = camera_view_projection(
		eye,
		(center - eye).normalize(),
		Vec3::Y,
		60f32.to_radians(),
		16. / 9.,
		0.1,
		extent * 10.,
	);
	FrameGlobals::new(view_projection, eye, 0.)
}
