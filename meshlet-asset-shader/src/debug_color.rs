use glam::{Vec3, vec3};

const MURMUR_M: u32 = 0x5bd1e995;
const MURMUR_SEED: u32 = 1190494759;

/// Single word murmur2 mix with a fixed seed. A bijection on `u32`, so distinct inputs never share a hash.
#[inline]
pub fn murmur_hash(src: u32) -> u32 {
	let mut src = src.wrapping_mul(MURMUR_M);
	src ^= src >> 24;
	src = src.wrapping_mul(MURMUR_M);

	let mut h = MURMUR_SEED.wrapping_mul(MURMUR_M);
	h ^= src;
	h ^= h >> 13;
	h = h.wrapping_mul(MURMUR_M);
	h ^= h >> 15;
	h
}

/// Bytes 2, 1 and 0 of `hash` as red, green and blue in `[0, 1)`.
#[inline]
pub fn hash_color(hash: u32) -> Vec3 {
	let channel = |shift: u32| ((hash >> shift) & 0xFF) as f32 / 256.;
	vec3(channel(16), channel(8), channel(0))
}

/// Color every vertex of a meshlet is tagged with.
#[inline]
pub fn meshlet_debug_color(meshlet_idx: u32) -> Vec3 {
	hash_color(murmur_hash(meshlet_idx))
}

/// Like [`meshlet_debug_color`], but also varies between instances of the same mesh that sit at different distances
/// from the origin.
#[inline]
pub fn instance_meshlet_debug_color(meshlet_idx: u32, translation: Vec3) -> Vec3 {
	meshlet_debug_color(meshlet_idx ^ translation.length().to_bits())
}
