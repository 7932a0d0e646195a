use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

/// A fixed capacity list that many threads may append to at once. Every append claims the next slot by incrementing an
/// atomic counter, so the written values are compacted without any "holes" in between.
///
/// Appends beyond the capacity are dropped, but the counter keeps counting them so an overflow can be detected and
/// the buffer resized for the next run.
#[derive(Debug)]
pub struct AppendBuffer<T> {
	slots: Box<[OnceLock<T>]>,
	counter: AtomicU32,
}

impl<T> AppendBuffer<T> {
	pub fn new(capacity: usize) -> Self {
		Self {
			slots: (0..capacity).map(|_| OnceLock::new()).collect(),
			counter: AtomicU32::new(0),
		}
	}

	/// Returns true if successful, false if the buffer ran out of capacity.
	#[must_use]
	pub fn push(&self, t: T) -> bool {
		let index = self.counter.fetch_add(1, Ordering::Relaxed) as usize;
		match self.slots.get(index) {
			Some(slot) => {
				let result = slot.set(t);
				debug_assert!(result.is_ok(), "slot {index} was claimed twice");
				true
			}
			None => false,
		}
	}

	pub fn capacity(&self) -> usize {
		self.slots.len()
	}

	/// Amount of appends attempted so far, including the dropped ones.
	pub fn attempted(&self) -> u32 {
		self.counter.load(Ordering::Relaxed)
	}

	pub fn len(&self) -> usize {
		(self.attempted() as usize).min(self.capacity())
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn overflowed(&self) -> bool {
		self.attempted() as usize > self.capacity()
	}

	/// The written values in the order their slots were claimed.
	pub fn into_vec(self) -> Vec<T> {
		let len = self.len();
		self.slots
			.into_vec()
			.into_iter()
			.take(len)
			.filter_map(OnceLock::into_inner)
			.collect()
	}
}
