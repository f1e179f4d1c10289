//! Memory model primitives: the flat byte store, access policy and image region.

/// Bounds and alignment policy for data accesses and instruction fetch.
pub mod access;
/// Loaded-image region bookkeeping used by instruction fetch.
pub mod map;

pub use access::{
    read_u32_le, read_u64_le, validate_data_access, validate_fetch_access, write_u64_le,
    AlignmentPolicy, INSTRUCTION_BYTES, WORD_ACCESS_BYTES,
};
pub use map::ImageRegion;

/// Size in bytes of the canonical machine memory (512 KiB).
pub const MEMORY_CAPACITY: usize = 512 * 1024;

/// Canonical address at which program images are loaded.
pub const DEFAULT_LOAD_BASE: u64 = 0x1000;

/// Allocates a zeroed backing store of `bytes` length.
#[must_use]
pub fn new_memory(bytes: usize) -> Box<[u8]> {
    vec![0; bytes].into_boxed_slice()
}
