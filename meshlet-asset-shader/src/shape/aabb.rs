use glam::Vec3;

/// Axis aligned bounding box, stored as plain float arrays to keep the byte layout explicit.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck_derive::Zeroable, bytemuck_derive::Pod)]
#[cfg_attr(feature = "disk", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
pub struct Aabb {
	pub min: [f32; 3],
	pub max: [f32; 3],
}

impl Aabb {
	pub fn new(min: Vec3, max: Vec3) -> Self {
		Self {
			min: min.to_array(),
			max: max.to_array(),
		}
	}

	/// Returns `None` if `iter` is empty.
	#[profiling::function]
	pub fn from_positions(iter: impl Iterator<Item = Vec3>) -> Option<Self> {
		let (min, max) = iter.fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |a, b| (a.0.min(b), a.1.max(b)));
		if min != Vec3::INFINITY {
			Some(Self::new(min, max))
		} else {
			None
		}
	}

	pub fn min(&self) -> Vec3 {
		Vec3::from_array(self.min)
	}

	pub fn max(&self) -> Vec3 {
		Vec3::from_array(self.max)
	}

	pub fn center(&self) -> Vec3 {
		(self.min() + self.max()) * 0.5
	}

	/// The largest extent along any axis.
	pub fn range(&self) -> f32 {
		(self.max() - self.min()).max_element()
	}

	pub fn union(&self, other: &Self) -> Self {
		Self::new(self.min().min(other.min()), self.max().max(other.max()))
	}

	pub fn contains(&self, point: Vec3) -> bool {
		point.cmpge(self.min()).all() && point.cmple(self.max()).all()
	}
}
