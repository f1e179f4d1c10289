//! Helper functions for instruction execution.

use crate::memory::{validate_data_access, AlignmentPolicy, INSTRUCTION_BYTES};
use crate::state::GeneralRegister;
use crate::FaultCode;

/// Computes `base + offset` with both interpreted as signed 64-bit values.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] when the sum overflows; such an
/// address can never be inside memory.
#[allow(clippy::cast_possible_wrap)]
pub fn effective_address(base: u64, offset: i64) -> Result<i64, FaultCode> {
    (base as i64)
        .checked_add(offset)
        .ok_or(FaultCode::AddressOutOfBounds)
}

/// Validates an 8-byte access at `base + offset` and returns its memory index.
///
/// # Errors
///
/// Returns the bounds or alignment fault raised by the access policy.
pub fn data_address(
    base: u64,
    offset: i64,
    policy: AlignmentPolicy,
    capacity: usize,
) -> Result<usize, FaultCode> {
    validate_data_access(effective_address(base, offset)?, policy, capacity)
}

/// Address of the instruction following the one at `pc`.
#[must_use]
pub const fn fallthrough(pc: u64) -> u64 {
    pc.wrapping_add(INSTRUCTION_BYTES)
}

/// Pending effects of one instruction, committed only if it retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Register write to apply at commit.
    pub dest: Option<(GeneralRegister, u64)>,
    /// 8-byte little-endian memory write `(index, value)` to apply at commit.
    pub memory_write: Option<(usize, u64)>,
    /// New program counter. `None` leaves the PC untouched (halt).
    pub next_pc: Option<u64>,
    /// Privilege-mode change to apply at commit.
    pub privilege: Option<crate::PrivilegeMode>,
    /// Whether the instruction requested a successful halt.
    pub halt: bool,
}

impl ExecuteState {
    /// Schedules a register write.
    pub const fn write_register(&mut self, reg: GeneralRegister, value: u64) {
        self.dest = Some((reg, value));
    }

    /// Schedules sequential advance past the instruction at `pc`.
    pub const fn advance(&mut self, pc: u64) {
        self.next_pc = Some(fallthrough(pc));
    }

    /// Schedules a control transfer to `target`.
    pub const fn jump(&mut self, target: u64) {
        self.next_pc = Some(target);
    }
}

#[cfg(test)]
mod tests {
    use super::{data_address, effective_address, fallthrough, ExecuteState};
    use crate::memory::{AlignmentPolicy, MEMORY_CAPACITY};
    use crate::{FaultCode, GeneralRegister};

    #[test]
    fn effective_address_is_signed_sum() {
        assert_eq!(effective_address(0x2000, -8), Ok(0x1FF8));
        assert_eq!(effective_address(u64::MAX, 1), Ok(0));
        assert_eq!(
            effective_address(i64::MAX as u64, 1),
            Err(FaultCode::AddressOutOfBounds)
        );
    }

    #[test]
    fn data_address_applies_policy() {
        assert_eq!(
            data_address(0x10, -0x10, AlignmentPolicy::BoundsOnly, MEMORY_CAPACITY),
            Ok(0)
        );
        assert_eq!(
            data_address(0x10, -0x11, AlignmentPolicy::BoundsOnly, MEMORY_CAPACITY),
            Err(FaultCode::AddressOutOfBounds)
        );
        assert_eq!(
            data_address(0x10, 1, AlignmentPolicy::Natural, MEMORY_CAPACITY),
            Err(FaultCode::MisalignedAccess)
        );
    }

    #[test]
    fn fallthrough_is_one_word() {
        assert_eq!(fallthrough(0x1000), 0x1004);
    }

    #[test]
    fn pending_effects_start_empty() {
        let mut exec = ExecuteState::default();
        assert_eq!(exec.next_pc, None);
        exec.write_register(GeneralRegister::SP, 8);
        exec.advance(0x1000);
        assert_eq!(exec.dest, Some((GeneralRegister::SP, 8)));
        assert_eq!(exec.next_pc, Some(0x1004));
    }
}
