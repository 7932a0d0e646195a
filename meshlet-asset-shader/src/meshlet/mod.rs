use static_assertions::const_assert;

pub mod decode;
pub mod indices;
pub mod instance;
pub mod limits;
pub mod mesh;
pub mod vertex;

/// Packed triangle indices are a single byte each.
pub const MESHLET_INDICES_BITS: u32 = 8;

pub const MESHLET_MAX_VERTICES: u32 = 64;
const_assert!(MESHLET_MAX_VERTICES <= 1 << MESHLET_INDICES_BITS);

pub const MESHLET_TRIANGLES_BITS: u32 = 7;
pub const MESHLET_MAX_TRIANGLES: u32 = 126;
const_assert!(MESHLET_MAX_TRIANGLES <= 1 << MESHLET_TRIANGLES_BITS);

/// Amount of workers cooperatively decoding a single meshlet.
pub const MESHLET_WG_SIZE: usize = 32;
