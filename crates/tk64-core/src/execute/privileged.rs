//! Privileged group: halt, trap, return-from-exception, port input and output.

use super::ExecuteState;
use crate::decoder::DecodedInstruction;
use crate::encoding::{PrivilegedOp, PRIVILEGED_SELECTOR_MASK};
use crate::ports::{PortIo, INPUT_PORT, OUTPUT_PORT};
use crate::{FaultCode, Machine, PrivilegeMode};

/// Splits the privileged literal into its sub-operation.
///
/// # Errors
///
/// [`FaultCode::NonZeroLiteral`] when bits above the selector are set,
/// [`FaultCode::IllegalInstruction`] when the selector names no sub-operation.
pub(super) fn privileged_op(literal: u64) -> Result<PrivilegedOp, FaultCode> {
    let selector_mask = u64::from(PRIVILEGED_SELECTOR_MASK);
    if literal & !selector_mask != 0 {
        return Err(FaultCode::NonZeroLiteral);
    }
    #[allow(clippy::cast_possible_truncation)]
    let selector = (literal & selector_mask) as u16;
    PrivilegedOp::from_selector(selector).ok_or(FaultCode::IllegalInstruction)
}

pub(super) fn execute_privileged(
    instr: &DecodedInstruction,
    machine: &Machine,
    ports: &mut dyn PortIo,
    exec: &mut ExecuteState,
) -> Result<(), FaultCode> {
    let pc = machine.arch.pc();

    match privileged_op(instr.literal)? {
        PrivilegedOp::Halt => {
            exec.halt = true;
        }
        PrivilegedOp::Trap => {
            exec.privilege = Some(PrivilegeMode::Supervisor);
            exec.advance(pc);
        }
        PrivilegedOp::ReturnFromException => {
            exec.privilege = Some(PrivilegeMode::User);
            exec.advance(pc);
        }
        PrivilegedOp::Input => {
            if machine.arch.gpr(instr.rs) != INPUT_PORT {
                return Err(FaultCode::UnsupportedPort);
            }
            let value = ports.read_input().map_err(|err| {
                tracing::warn!(%err, "input port read failed");
                FaultCode::PortFailure
            })?;
            exec.write_register(instr.rd, value as u64);
            exec.advance(pc);
        }
        PrivilegedOp::Output => {
            if machine.arch.gpr(instr.rd) != OUTPUT_PORT {
                return Err(FaultCode::UnsupportedPort);
            }
            ports
                .write_output(machine.arch.gpr(instr.rs))
                .map_err(|err| {
                    tracing::warn!(%err, "output port write failed");
                    FaultCode::PortFailure
                })?;
            exec.advance(pc);
        }
    }

    Ok(())
}
