pub mod builder;
pub mod decode;
pub mod level;
pub mod mesh;
pub mod scene;
pub mod stats;
pub mod validate;

#[cfg(test)]
mod tests;

pub use meshlet_asset_shader::meshlet::{
	MESHLET_MAX_TRIANGLES, MESHLET_MAX_VERTICES, MESHLET_WG_SIZE, indices, instance, limits, vertex,
};
