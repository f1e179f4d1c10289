//! Deterministic data-access and fetch legality policy.

use crate::memory::ImageRegion;
use crate::FaultCode;

/// Byte width of every data load, store, call push and return pop.
pub const WORD_ACCESS_BYTES: u64 = 8;

/// Byte width of one instruction word.
pub const INSTRUCTION_BYTES: u64 = 4;

/// Alignment rule applied uniformly to 8-byte data accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AlignmentPolicy {
    /// Only `0 <= address` and `address + width <= capacity` are enforced.
    #[default]
    BoundsOnly,
    /// Accesses must additionally be aligned to their width.
    Natural,
}

/// Validates an 8-byte data access at a signed effective address.
///
/// Returns the byte index into memory on success.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] when the access does not lie
/// entirely inside `[0, capacity)`, and [`FaultCode::MisalignedAccess`] when
/// `policy` is [`AlignmentPolicy::Natural`] and `addr` is not 8-byte aligned.
pub fn validate_data_access(
    addr: i64,
    policy: AlignmentPolicy,
    capacity: usize,
) -> Result<usize, FaultCode> {
    let addr = u64::try_from(addr).map_err(|_| FaultCode::AddressOutOfBounds)?;
    let end = addr
        .checked_add(WORD_ACCESS_BYTES)
        .ok_or(FaultCode::AddressOutOfBounds)?;
    if end > capacity as u64 {
        return Err(FaultCode::AddressOutOfBounds);
    }
    if policy == AlignmentPolicy::Natural && addr % WORD_ACCESS_BYTES != 0 {
        return Err(FaultCode::MisalignedAccess);
    }
    usize::try_from(addr).map_err(|_| FaultCode::AddressOutOfBounds)
}

/// Validates instruction fetch at `pc` against the loaded image.
///
/// # Errors
///
/// Returns [`FaultCode::ExecutionOutOfImage`] when the 4-byte word at `pc` is
/// not inside `image`, and [`FaultCode::MisalignedAccess`] when `pc` is not
/// 4-byte aligned.
pub fn validate_fetch_access(pc: u64, image: ImageRegion) -> Result<usize, FaultCode> {
    if !image.contains_span(pc, INSTRUCTION_BYTES) {
        return Err(FaultCode::ExecutionOutOfImage);
    }
    if pc % INSTRUCTION_BYTES != 0 {
        return Err(FaultCode::MisalignedAccess);
    }
    usize::try_from(pc).map_err(|_| FaultCode::ExecutionOutOfImage)
}

/// Reads a little-endian 64-bit value at byte index `addr`.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] when the 8 bytes are not inside `memory`.
pub fn read_u64_le(memory: &[u8], addr: usize) -> Result<u64, FaultCode> {
    let end = addr.checked_add(8).ok_or(FaultCode::AddressOutOfBounds)?;
    let bytes: [u8; 8] = memory
        .get(addr..end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(FaultCode::AddressOutOfBounds)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Writes a little-endian 64-bit value at byte index `addr`.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] when the 8 bytes are not inside `memory`.
pub fn write_u64_le(memory: &mut [u8], addr: usize, value: u64) -> Result<(), FaultCode> {
    let end = addr.checked_add(8).ok_or(FaultCode::AddressOutOfBounds)?;
    let slot = memory
        .get_mut(addr..end)
        .ok_or(FaultCode::AddressOutOfBounds)?;
    slot.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Reads a little-endian instruction word at byte index `addr`.
///
/// # Errors
///
/// Returns [`FaultCode::ExecutionOutOfImage`] when the 4 bytes are not inside `memory`.
pub fn read_u32_le(memory: &[u8], addr: usize) -> Result<u32, FaultCode> {
    let end = addr.checked_add(4).ok_or(FaultCode::ExecutionOutOfImage)?;
    let bytes: [u8; 4] = memory
        .get(addr..end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(FaultCode::ExecutionOutOfImage)?;
    Ok(u32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        read_u32_le, read_u64_le, validate_data_access, validate_fetch_access, write_u64_le,
        AlignmentPolicy,
    };
    use crate::memory::{ImageRegion, MEMORY_CAPACITY};
    use crate::FaultCode;

    #[rstest]
    #[case(0, Ok(0))]
    #[case(8, Ok(8))]
    #[case(3, Ok(3))]
    #[case(524_280, Ok(524_280))]
    #[case(524_281, Err(FaultCode::AddressOutOfBounds))]
    #[case(524_288, Err(FaultCode::AddressOutOfBounds))]
    #[case(-1, Err(FaultCode::AddressOutOfBounds))]
    #[case(i64::MIN, Err(FaultCode::AddressOutOfBounds))]
    #[case(i64::MAX, Err(FaultCode::AddressOutOfBounds))]
    fn bounds_only_policy_checks_full_width(
        #[case] addr: i64,
        #[case] expected: Result<usize, FaultCode>,
    ) {
        assert_eq!(
            validate_data_access(addr, AlignmentPolicy::BoundsOnly, MEMORY_CAPACITY),
            expected
        );
    }

    #[test]
    fn natural_policy_rejects_unaligned_in_bounds_access() {
        assert_eq!(
            validate_data_access(12, AlignmentPolicy::Natural, MEMORY_CAPACITY),
            Err(FaultCode::MisalignedAccess)
        );
        assert_eq!(
            validate_data_access(16, AlignmentPolicy::Natural, MEMORY_CAPACITY),
            Ok(16)
        );
    }

    #[test]
    fn natural_policy_reports_bounds_before_alignment() {
        assert_eq!(
            validate_data_access(-3, AlignmentPolicy::Natural, MEMORY_CAPACITY),
            Err(FaultCode::AddressOutOfBounds)
        );
    }

    #[test]
    fn fetch_requires_word_inside_image_and_alignment() {
        let image = ImageRegion::new(0x1000, 12);
        assert_eq!(validate_fetch_access(0x1000, image), Ok(0x1000));
        assert_eq!(validate_fetch_access(0x1008, image), Ok(0x1008));
        assert_eq!(
            validate_fetch_access(0x100C, image),
            Err(FaultCode::ExecutionOutOfImage)
        );
        assert_eq!(
            validate_fetch_access(0x0FFC, image),
            Err(FaultCode::ExecutionOutOfImage)
        );
        assert_eq!(
            validate_fetch_access(0x1002, image),
            Err(FaultCode::MisalignedAccess)
        );
    }

    #[test]
    fn u64_accessors_are_little_endian() {
        let mut memory = [0u8; 16];
        write_u64_le(&mut memory, 4, 0x0102_0304_0506_0708).expect("in range");
        assert_eq!(&memory[4..12], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(read_u64_le(&memory, 4), Ok(0x0102_0304_0506_0708));
        assert_eq!(read_u32_le(&memory, 4), Ok(0x0506_0708));
    }

    #[test]
    fn accessors_reject_spans_past_the_end() {
        let mut memory = [0u8; 16];
        assert_eq!(read_u64_le(&memory, 9), Err(FaultCode::AddressOutOfBounds));
        assert_eq!(
            write_u64_le(&mut memory, 9, 1),
            Err(FaultCode::AddressOutOfBounds)
        );
        assert_eq!(read_u32_le(&memory, 13), Err(FaultCode::ExecutionOutOfImage));
        assert!(memory.iter().all(|byte| *byte == 0));
    }
}
