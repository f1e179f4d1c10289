//! Instruction execution pipeline for the TK64 machine.
//!
//! Each instruction runs in two phases:
//! 1. Read operands, compute results and validate every memory access,
//!    recording the effects in an [`ExecuteState`].
//! 2. Commit: memory write, destination register, privilege mode, PC.
//!
//! A fault in phase 1 leaves the machine exactly as it was before the
//! instruction, so faults are precise.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::similar_names,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    unknown_lints
)]

mod control;
mod data;
mod float;
mod helpers;
mod integer;
mod logic;
mod privileged;

pub use data::{insert_high_field, HIGH_FIELD_MASK, HIGH_FIELD_SHIFT};
pub use helpers::{data_address, effective_address, fallthrough, ExecuteState};

use float::FloatOp;
use integer::{ImmOp, IntOp};
use logic::{LogicOp, ShiftImmOp};

use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::Opcode;
use crate::memory::{read_u32_le, validate_fetch_access, write_u64_le};
use crate::ports::PortIo;
use crate::{CoreConfig, FaultCode, Machine, RunOutcome, RunState, RunStop, StepOutcome};

/// Outcome of executing a single decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Instruction completed; its effects are ready to commit.
    Retired,
    /// Halt completed; commit and stop.
    Halted,
    /// Fault was raised during execution.
    Fault {
        /// Fault code.
        cause: FaultCode,
    },
}

/// Executes one decoded instruction against `machine` without mutating it.
///
/// Returns both the execution outcome and the pending effects. On success the
/// caller applies them with [`commit_execution`]. On fault they must be
/// discarded.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    machine: &Machine,
    ports: &mut dyn PortIo,
    config: &CoreConfig,
) -> (ExecuteOutcome, ExecuteState) {
    let mut exec = ExecuteState::default();
    let m = machine;
    let e = &mut exec;

    let result = match instr.opcode {
        Opcode::And => logic::execute_logic(instr, m, e, LogicOp::And),
        Opcode::Or => logic::execute_logic(instr, m, e, LogicOp::Or),
        Opcode::Xor => logic::execute_logic(instr, m, e, LogicOp::Xor),
        Opcode::Not => logic::execute_not(instr, m, e),
        Opcode::ShiftRight => logic::execute_logic(instr, m, e, LogicOp::ShiftRight),
        Opcode::ShiftRightImmediate => {
            logic::execute_shift_immediate(instr, m, e, ShiftImmOp::Right)
        }
        Opcode::ShiftLeft => logic::execute_logic(instr, m, e, LogicOp::ShiftLeft),
        Opcode::ShiftLeftImmediate => logic::execute_shift_immediate(instr, m, e, ShiftImmOp::Left),
        Opcode::Branch => control::execute_branch(instr, m, e),
        Opcode::BranchRelative => control::execute_branch_relative(instr, m, e),
        Opcode::BranchRelativeLiteral => control::execute_branch_relative_literal(instr, m, e),
        Opcode::BranchNonZero => control::execute_branch_nonzero(instr, m, e),
        Opcode::Call => control::execute_call(instr, m, e, config),
        Opcode::Return => control::execute_return(m, e, config),
        Opcode::BranchGreater => control::execute_branch_greater(instr, m, e),
        Opcode::Privileged => privileged::execute_privileged(instr, m, ports, e),
        Opcode::Load => data::execute_load(instr, m, e, config),
        Opcode::Move => data::execute_move(instr, m, e),
        Opcode::LoadHigh => data::execute_load_high(instr, m, e),
        Opcode::Store => data::execute_store(instr, m, e, config),
        Opcode::AddFloat => float::execute_float(instr, m, e, FloatOp::Add),
        Opcode::SubFloat => float::execute_float(instr, m, e, FloatOp::Sub),
        Opcode::MulFloat => float::execute_float(instr, m, e, FloatOp::Mul),
        Opcode::DivFloat => float::execute_float(instr, m, e, FloatOp::Div),
        Opcode::Add => integer::execute_integer(instr, m, e, IntOp::Add),
        Opcode::AddImmediate => integer::execute_immediate(instr, m, e, ImmOp::Add),
        Opcode::Sub => integer::execute_integer(instr, m, e, IntOp::Sub),
        Opcode::SubImmediate => integer::execute_immediate(instr, m, e, ImmOp::Sub),
        Opcode::Mul => integer::execute_integer(instr, m, e, IntOp::Mul),
        Opcode::Div => integer::execute_integer(instr, m, e, IntOp::Div),
    };

    match result {
        Err(cause) => (ExecuteOutcome::Fault { cause }, ExecuteState::default()),
        Ok(()) if exec.halt => (ExecuteOutcome::Halted, exec),
        Ok(()) => (ExecuteOutcome::Retired, exec),
    }
}

/// Applies the pending effects of a completed instruction to `machine`.
///
/// The memory write goes first; it was validated during execution, so a
/// failure here leaves the machine untouched.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] if the pending memory write does
/// not fit in memory.
pub fn commit_execution(machine: &mut Machine, exec: &ExecuteState) -> Result<(), FaultCode> {
    if let Some((addr, value)) = exec.memory_write {
        write_u64_le(&mut machine.memory, addr, value)?;
    }

    if let Some((reg, value)) = exec.dest {
        machine.arch.set_gpr(reg, value);
    }

    if let Some(mode) = exec.privilege {
        machine.arch.set_privilege(mode);
    }

    if let Some(pc) = exec.next_pc {
        machine.arch.set_pc(pc);
    }

    machine.retired += 1;
    Ok(())
}

fn fetch_and_decode(machine: &Machine) -> Result<DecodedInstruction, FaultCode> {
    let addr = validate_fetch_access(machine.arch.pc(), machine.image)?;
    let word = read_u32_le(&machine.memory, addr)?;
    Decoder::decode(word).into()
}

fn latch_fault(machine: &mut Machine, cause: FaultCode) -> StepOutcome {
    tracing::debug!(
        pc = format_args!("{:#x}", machine.arch.pc()),
        code = cause.as_u8(),
        %cause,
        "machine faulted"
    );
    machine.run_state = RunState::Faulted(cause);
    StepOutcome::Fault { cause }
}

/// Fetches, decodes, executes and commits one instruction.
///
/// A machine in a terminal state is left untouched and reports that state
/// again.
pub fn step_one(machine: &mut Machine, ports: &mut dyn PortIo, config: &CoreConfig) -> StepOutcome {
    if machine.run_state.is_terminal() {
        return machine
            .run_state
            .fault()
            .map_or(StepOutcome::Halted, |cause| StepOutcome::Fault { cause });
    }

    let instruction = match fetch_and_decode(machine) {
        Ok(instr) => instr,
        Err(cause) => return latch_fault(machine, cause),
    };

    tracing::trace!(
        pc = format_args!("{:#x}", machine.arch.pc()),
        op = instruction.opcode.mnemonic(),
        rd = %instruction.rd,
        rs = %instruction.rs,
        rt = %instruction.rt,
        literal = instruction.literal,
        "execute"
    );

    let (outcome, exec_state) = execute_instruction(&instruction, machine, ports, config);

    match outcome {
        ExecuteOutcome::Retired => match commit_execution(machine, &exec_state) {
            Ok(()) => StepOutcome::Retired,
            Err(cause) => latch_fault(machine, cause),
        },
        ExecuteOutcome::Halted => match commit_execution(machine, &exec_state) {
            Ok(()) => {
                tracing::debug!(
                    pc = format_args!("{:#x}", machine.arch.pc()),
                    retired = machine.retired,
                    "machine halted"
                );
                machine.run_state = RunState::Halted;
                StepOutcome::Halted
            }
            Err(cause) => latch_fault(machine, cause),
        },
        ExecuteOutcome::Fault { cause } => latch_fault(machine, cause),
    }
}

/// Steps `machine` until it halts, faults or retires
/// [`CoreConfig::step_limit`] instructions.
pub fn run(machine: &mut Machine, ports: &mut dyn PortIo, config: &CoreConfig) -> RunOutcome {
    let start = machine.retired;

    let stop = loop {
        if let Some(limit) = config.step_limit {
            if !machine.run_state.is_terminal() && machine.retired - start >= limit {
                tracing::debug!(limit, "step limit reached");
                break RunStop::StepLimit;
            }
        }

        match step_one(machine, ports, config) {
            StepOutcome::Retired => {}
            StepOutcome::Halted => break RunStop::Halted,
            StepOutcome::Fault { cause } => {
                break RunStop::Fault {
                    cause,
                    pc: machine.arch.pc(),
                }
            }
        }
    };

    RunOutcome {
        steps: machine.retired - start,
        stop,
    }
}
