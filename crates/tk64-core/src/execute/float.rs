//! Double-precision arithmetic over register bit patterns.

use super::ExecuteState;
use crate::decoder::DecodedInstruction;
use crate::{FaultCode, Machine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Applies `op` to two doubles read from register bit patterns.
///
/// Results, including infinities and NaNs, are returned as raw bits.
pub(super) fn float_op(op: FloatOp, lhs: f64, rhs: f64) -> Result<u64, FaultCode> {
    let result = match op {
        FloatOp::Add => lhs + rhs,
        FloatOp::Sub => lhs - rhs,
        FloatOp::Mul => lhs * rhs,
        FloatOp::Div => {
            // Matches both +0.0 and -0.0.
            if rhs == 0.0 {
                return Err(FaultCode::DivideByZero);
            }
            lhs / rhs
        }
    };
    Ok(result.to_bits())
}

pub(super) fn execute_float(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    op: FloatOp,
) -> Result<(), FaultCode> {
    let lhs = machine.arch.gpr_f64(instr.rs);
    let rhs = machine.arch.gpr_f64(instr.rt);
    let result = float_op(op, lhs, rhs)?;
    exec.write_register(instr.rd, result);
    exec.advance(machine.arch.pc());
    Ok(())
}
