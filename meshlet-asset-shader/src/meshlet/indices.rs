use crate::meshlet::MESHLET_INDICES_BITS;
use crate::meshlet::mesh::MeshletData;
use core::fmt::Debug;
use core::fmt::Formatter;
use glam::UVec3;

/// A single word of packed triangle indices. The first index occupies the most significant byte, the last index the
/// least significant one, so the byte order within a word is reversed compared to a little-endian byte array.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct PackedIndices(pub u32);

impl PackedIndices {
	pub fn to_values(&self) -> [u32; INDICES_PER_WORD] {
		let f = |i| (self.0 >> index_shift(i)) & INDICES_MASK;
		[f(0), f(1), f(2), f(3)]
	}

	#[allow(clippy::needless_range_loop)]
	pub fn from_values(values: [u32; INDICES_PER_WORD]) -> Self {
		let mut out = 0;
		for i in 0..INDICES_PER_WORD {
			out |= (values[i] & INDICES_MASK) << index_shift(i);
		}
		Self(out)
	}
}

impl Debug for PackedIndices {
	fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
		for i in self.to_values() {
			write!(f, "{:4}", i)?;
		}
		Ok(())
	}
}

pub const INDICES_PER_WORD: usize = 32 / MESHLET_INDICES_BITS as usize;
pub const INDICES_MASK: u32 = (1 << MESHLET_INDICES_BITS) - 1;

/// Bit offset of packed index `i` within its word: `(3 - (i & 3)) * 8`
#[inline]
pub const fn index_shift(i: usize) -> u32 {
	(INDICES_PER_WORD as u32 - 1 - (i as u32 & (INDICES_PER_WORD as u32 - 1))) * MESHLET_INDICES_BITS
}

/// Loads packed index `i` of a meshlet whose packed indices start at word `index_offset` of the data blob.
///
/// `t: T` is passed though to `read_fn` so buffer descriptors can be passed through, as they can't be put in a closure
/// without rust-gpu compiling them as illegal function pointers.
#[inline]
pub fn packed_index_load<T>(t: &T, index_offset: usize, i: usize, read_fn: impl Fn(&T, usize) -> u32) -> u32 {
	(read_fn(t, index_offset + (i >> 2)) >> index_shift(i)) & INDICES_MASK
}

/// Loads the three local vertex indices of a triangle, reading each packed word at most once.
pub fn triangle_indices_load_gpu<T>(
	meshlet: impl AsRef<MeshletData>,
	t: &T,
	triangle: usize,
	read_fn: impl Fn(&T, usize) -> u32,
) -> UVec3 {
	let first = triangle * 3;
	let mut index = meshlet.as_ref().index_offset() + first / INDICES_PER_WORD;
	let mut rem = first % INDICES_PER_WORD;
	let mut load = read_fn(t, index);
	let load0 = (rem, load);
	let mut load_next = || {
		rem += 1;
		if rem == INDICES_PER_WORD {
			rem = 0;
			index += 1;
			load = read_fn(t, index);
		}
		(rem, load)
	};
	let loads = [load0, load_next(), load_next()];

	let f = |(rem, load): (usize, u32)| (load >> index_shift(rem)) & INDICES_MASK;
	UVec3::new(f(loads[0]), f(loads[1]), f(loads[2]))
}

pub fn triangle_indices_load_cpu<T>(
	meshlet: impl AsRef<MeshletData>,
	t: &T,
	triangle: usize,
	read_fn: impl Fn(&T, usize) -> u32,
) -> UVec3 {
	let index_offset = meshlet.as_ref().index_offset();
	let f = |i| packed_index_load(t, index_offset, triangle * 3 + i, &read_fn);
	UVec3::from_array([f(0), f(1), f(2)])
}

// optimal default
#[cfg(target_arch = "spirv")]
#[inline]
pub fn triangle_indices_load<T>(
	meshlet: impl AsRef<MeshletData>,
	t: &T,
	triangle: usize,
	read_fn: impl Fn(&T, usize) -> u32,
) -> UVec3 {
	triangle_indices_load_gpu(meshlet, t, triangle, read_fn)
}

#[cfg(not(target_arch = "spirv"))]
#[inline]
pub fn triangle_indices_load<T>(
	meshlet: impl AsRef<MeshletData>,
	t: &T,
	triangle: usize,
	read_fn: impl Fn(&T, usize) -> u32,
) -> UVec3 {
	triangle_indices_load_cpu(meshlet, t, triangle, read_fn)
}

// write
/// Words required to store `indices_cnt` packed indices, which is `(indices_cnt + 3) >> 2`.
pub const fn packed_indices_write_capacity(indices_cnt: usize) -> usize {
	indices_cnt.div_ceil(INDICES_PER_WORD)
}

/// Packs local triangle indices into `dst`. The trailing bytes of the last word are zeroed.
pub fn packed_indices_write<Iter>(src: Iter, dst: &mut [u32])
where
	Iter: ExactSizeIterator<Item = u32>,
{
	assert_eq!(src.len() % 3, 0, "indices must be multiple of 3");
	let req_len = packed_indices_write_capacity(src.len());
	assert_eq!(
		dst.len(),
		req_len,
		"dst array was length {} instead of required length {}",
		dst.len(),
		req_len
	);

	dst.fill(0);
	for (i, s) in src.enumerate() {
		let sm = s & INDICES_MASK;
		assert_eq!(s, sm, "src index {} is too large for {} bits", s, MESHLET_INDICES_BITS);
		dst[i / INDICES_PER_WORD] |= sm << index_shift(i);
	}
}

#[cfg(feature = "disk")]
pub fn packed_indices_write_vec<Iter>(src: Iter) -> std::vec::Vec<u32>
where
	Iter: ExactSizeIterator<Item = u32>,
{
	let mut vec = std::vec![0; packed_indices_write_capacity(src.len())];
	packed_indices_write(src, &mut vec);
	vec
}
