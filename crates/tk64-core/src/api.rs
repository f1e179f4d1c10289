//! Public host-facing API contracts for embedding the engine.

use crate::memory::{new_memory, AlignmentPolicy, ImageRegion, DEFAULT_LOAD_BASE, MEMORY_CAPACITY};
use crate::{ArchitecturalState, FaultCode, RunState};

/// Top-level immutable configuration for a machine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    /// Memory capacity in bytes; also the initial stack pointer.
    pub memory_bytes: usize,
    /// Address at which the program image is loaded and execution starts.
    pub load_base: u64,
    /// Alignment rule for 8-byte loads, stores, calls and returns.
    pub alignment: AlignmentPolicy,
    /// Upper bound on retired instructions per [`crate::run`] call.
    pub step_limit: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            memory_bytes: MEMORY_CAPACITY,
            load_base: DEFAULT_LOAD_BASE,
            alignment: AlignmentPolicy::BoundsOnly,
            step_limit: None,
        }
    }
}

/// The complete machine: registers, memory, loaded image and run state.
///
/// One instance per run, exclusively owned by the driver and passed by
/// reference into every step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    /// Register file, program counter and privilege mode.
    pub arch: ArchitecturalState,
    /// Flat byte-addressable memory.
    pub memory: Box<[u8]>,
    /// Region occupied by the loaded program image.
    pub image: ImageRegion,
    /// Current execution state.
    pub run_state: RunState,
    /// Number of instructions retired so far.
    pub retired: u64,
}

impl Default for Machine {
    fn default() -> Self {
        Self::with_config(&CoreConfig::default())
    }
}

impl Machine {
    /// Creates a machine with zeroed memory and no loaded image.
    ///
    /// `pc` starts at the load base and register 31 at the memory capacity
    /// (an empty descending stack). Every other register is zero.
    #[must_use]
    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            arch: ArchitecturalState::at_entry(config.load_base, config.memory_bytes as u64),
            memory: new_memory(config.memory_bytes),
            image: ImageRegion::new(config.load_base, 0),
            run_state: RunState::Running,
            retired: 0,
        }
    }

    /// Memory capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.memory.len()
    }
}

/// Outcome of a single fetch/decode/execute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired; the machine keeps running.
    Retired,
    /// The halt sub-operation retired; the run succeeded.
    Halted,
    /// A fault was raised; no state from the faulting instruction was committed.
    Fault {
        /// Raised fault code.
        cause: FaultCode,
    },
}

/// Why a [`crate::run`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStop {
    /// Halt retired.
    Halted,
    /// A fault terminated the run.
    Fault {
        /// Raised fault code.
        cause: FaultCode,
        /// Program counter of the faulting instruction.
        pc: u64,
    },
    /// [`CoreConfig::step_limit`] was reached while still running.
    StepLimit,
}

/// Aggregated outcome from running until a terminal state or the step limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of instructions retired during this run call.
    pub steps: u64,
    /// Reason the run stopped.
    pub stop: RunStop,
}

impl RunOutcome {
    /// Returns `true` only for a halted run.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.stop, RunStop::Halted)
    }
}
