//! Core interpreter crate for the TK64 machine.

/// Flat memory model, access validation and image region.
pub mod memory;
pub use memory::{
    read_u32_le, read_u64_le, validate_data_access, validate_fetch_access, write_u64_le,
    AlignmentPolicy, ImageRegion, DEFAULT_LOAD_BASE, INSTRUCTION_BYTES, MEMORY_CAPACITY,
    WORD_ACCESS_BYTES,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{CoreConfig, Machine, RunOutcome, RunStop, StepOutcome};

/// Architectural machine state model primitives.
pub mod state;
pub use state::{
    ArchitecturalState, GeneralRegister, PrivilegeMode, RunState, GENERAL_REGISTER_COUNT,
};

/// Opcode numbering and instruction word layout.
pub mod encoding;
pub use encoding::{
    encode_word, split_word, ImmediatePolicy, Opcode, PrivilegedOp, OPCODE_TABLE,
    PRIVILEGED_SELECTOR_MASK,
};

/// Instruction decode with field extraction and validation.
pub mod decoder;
pub use decoder::{DecodedInstruction, DecodedOrFault, Decoder};

/// Fault taxonomy for everything that can stop a run.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Host input and output ports.
pub mod ports;
pub use ports::{PortError, PortIo, StreamPorts, INPUT_PORT, OUTPUT_PORT};

/// Program image loading.
pub mod loader;
pub use loader::{load_image, load_image_file, LoadError};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, run, step_one, ExecuteOutcome, ExecuteState,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
