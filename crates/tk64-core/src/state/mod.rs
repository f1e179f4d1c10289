//! Architectural machine state model primitives.

/// Architectural register file types and storage model.
pub mod registers;

pub use registers::{ArchitecturalState, GeneralRegister, PrivilegeMode, GENERAL_REGISTER_COUNT};
use crate::FaultCode;

/// Run-state machine for host-observable control flow.
///
/// `Halted` and `Faulted` are terminal: nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// The halt sub-operation retired; the run succeeded.
    Halted,
    /// A fault was raised; the run failed.
    Faulted(FaultCode),
}

impl RunState {
    /// Returns the latched fault, if this state is faulted.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Faulted(cause) => Some(cause),
            Self::Running | Self::Halted => None,
        }
    }

    /// Returns `true` for `Halted` and `Faulted`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}
