//! Loads, stores and register moves.

use super::helpers::data_address;
use super::ExecuteState;
use crate::decoder::DecodedInstruction;
use crate::memory::read_u64_le;
use crate::{CoreConfig, FaultCode, Machine};

/// Bits 52..64 written by the narrow high-field immediate load.
pub const HIGH_FIELD_SHIFT: u32 = 52;
/// Mask of the 12-bit high field once shifted into place.
pub const HIGH_FIELD_MASK: u64 = 0xFFF << HIGH_FIELD_SHIFT;

/// Replaces bits 52..64 of `value` with the low 12 bits of `literal`.
#[must_use]
pub const fn insert_high_field(value: u64, literal: u64) -> u64 {
    (value & !HIGH_FIELD_MASK) | ((literal & 0xFFF) << HIGH_FIELD_SHIFT)
}

pub(super) fn execute_load(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), FaultCode> {
    let addr = data_address(
        machine.arch.gpr(instr.rs),
        instr.signed_literal(),
        config.alignment,
        machine.capacity(),
    )?;
    let value = read_u64_le(&machine.memory, addr)?;
    exec.write_register(instr.rd, value);
    exec.advance(machine.arch.pc());
    Ok(())
}

pub(super) fn execute_move(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    exec.write_register(instr.rd, machine.arch.gpr(instr.rs));
    exec.advance(machine.arch.pc());
    Ok(())
}

/// Writes only the top twelve bits of `rd`; the low 52 bits are preserved.
pub(super) fn execute_load_high(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let value = insert_high_field(machine.arch.gpr(instr.rd), instr.literal);
    exec.write_register(instr.rd, value);
    exec.advance(machine.arch.pc());
    Ok(())
}

pub(super) fn execute_store(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), FaultCode> {
    let addr = data_address(
        machine.arch.gpr(instr.rd),
        instr.signed_literal(),
        config.alignment,
        machine.capacity(),
    )?;
    exec.memory_write = Some((addr, machine.arch.gpr(instr.rs)));
    exec.advance(machine.arch.pc());
    Ok(())
}
