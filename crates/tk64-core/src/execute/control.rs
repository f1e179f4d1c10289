//! Jumps, conditional branches, call and return.
//!
//! None of these advance the PC on their own: the new PC is the result,
//! except on the not-taken path of a conditional branch.

use super::helpers::{data_address, fallthrough};
use super::ExecuteState;
use crate::decoder::DecodedInstruction;
use crate::memory::{read_u64_le, WORD_ACCESS_BYTES};
use crate::{CoreConfig, FaultCode, GeneralRegister, Machine};

pub(super) fn execute_branch(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    exec.jump(machine.arch.gpr(instr.rd));
    Ok(())
}

/// Target is relative to the branch itself, not to the next instruction.
pub(super) fn execute_branch_relative(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let pc = machine.arch.pc();
    exec.jump(pc.wrapping_add(machine.arch.gpr(instr.rd)));
    Ok(())
}

pub(super) fn execute_branch_relative_literal(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let pc = machine.arch.pc();
    exec.jump(pc.wrapping_add(instr.literal));
    Ok(())
}

pub(super) fn execute_branch_nonzero(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    if machine.arch.gpr(instr.rs) == 0 {
        exec.advance(machine.arch.pc());
    } else {
        exec.jump(machine.arch.gpr(instr.rd));
    }
    Ok(())
}

pub(super) fn execute_branch_greater(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    if machine.arch.gpr_signed(instr.rs) > machine.arch.gpr_signed(instr.rt) {
        exec.jump(machine.arch.gpr(instr.rd));
    } else {
        exec.advance(machine.arch.pc());
    }
    Ok(())
}

/// Pre-decrements r31 by 8, stores `pc + 4` there, then jumps to `rd`.
///
/// The target is read before r31 changes, so `call r31` jumps to the old
/// stack pointer value.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub(super) fn execute_call(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), FaultCode> {
    let pc = machine.arch.pc();
    let target = machine.arch.gpr(instr.rd);
    let sp = machine.arch.gpr(GeneralRegister::SP);
    let slot = data_address(
        sp,
        -(WORD_ACCESS_BYTES as i64),
        config.alignment,
        machine.capacity(),
    )?;

    exec.memory_write = Some((slot, fallthrough(pc)));
    exec.write_register(GeneralRegister::SP, slot as u64);
    exec.jump(target);
    Ok(())
}

/// Loads the return address at r31, post-increments r31 by 8, then jumps.
pub(super) fn execute_return(
    machine: &Machine,
    exec: &mut ExecuteState,
    config: &CoreConfig,
) -> Result<(), FaultCode> {
    let sp = machine.arch.gpr(GeneralRegister::SP);
    let slot = data_address(sp, 0, config.alignment, machine.capacity())?;
    let return_address = read_u64_le(&machine.memory, slot)?;

    exec.write_register(GeneralRegister::SP, slot as u64 + WORD_ACCESS_BYTES);
    exec.jump(return_address);
    Ok(())
}
