pub mod append;
pub mod error;
pub mod lod_selection;
pub mod meshlet;
pub mod sample;

pub use meshlet_asset_shader as shader;
