//! Bitwise logic and shifts.

use super::ExecuteState;
use crate::decoder::DecodedInstruction;
use crate::{FaultCode, Machine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LogicOp {
    And,
    Or,
    Xor,
    ShiftRight,
    ShiftLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ShiftImmOp {
    Right,
    Left,
}

/// Right shifts are arithmetic; register shift amounts use their low six bits.
#[allow(clippy::cast_possible_truncation)]
pub(super) fn logic_op(op: LogicOp, lhs: u64, rhs: u64) -> u64 {
    match op {
        LogicOp::And => lhs & rhs,
        LogicOp::Or => lhs | rhs,
        LogicOp::Xor => lhs ^ rhs,
        LogicOp::ShiftRight => (lhs as i64).wrapping_shr(rhs as u32) as u64,
        LogicOp::ShiftLeft => lhs.wrapping_shl(rhs as u32),
    }
}

pub(super) fn execute_logic(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    op: LogicOp,
) -> Result<(), FaultCode> {
    let result = logic_op(op, machine.arch.gpr(instr.rs), machine.arch.gpr(instr.rt));
    exec.write_register(instr.rd, result);
    exec.advance(machine.arch.pc());
    Ok(())
}

pub(super) fn execute_not(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    exec.write_register(instr.rd, !machine.arch.gpr(instr.rs));
    exec.advance(machine.arch.pc());
    Ok(())
}

pub(super) fn execute_shift_immediate(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    op: ShiftImmOp,
) -> Result<(), FaultCode> {
    let amount = (instr.literal & 63) as u32;
    let value = machine.arch.gpr(instr.rd);
    let result = match op {
        ShiftImmOp::Right => ((value as i64) >> amount) as u64,
        ShiftImmOp::Left => value << amount,
    };
    exec.write_register(instr.rd, result);
    exec.advance(machine.arch.pc());
    Ok(())
}
