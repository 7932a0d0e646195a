#![cfg_attr(not(any(feature = "disk", test)), no_std)]
// otherwise you won't see any warnings
#![cfg_attr(target_arch = "spirv", deny(warnings))]

pub mod debug_color;
pub mod frame;
pub mod meshlet;
pub mod shape;
pub mod transform;
