use std::fmt;

use thiserror::Error;

/// Fault classes used for diagnostics grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder or privileged-selector rejected an instruction word.
    Decode,
    /// Signed integer overflow or division by zero.
    Arithmetic,
    /// Data access outside memory or violating the alignment policy.
    Memory,
    /// Unsupported port number or failed port transfer.
    Port,
    /// Instruction fetch left the loaded image.
    Control,
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "decode",
            Self::Arithmetic => "arithmetic",
            Self::Memory => "memory",
            Self::Port => "port",
            Self::Control => "control",
        })
    }
}

/// Stable fault taxonomy. Every fault is terminal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Opcode field has no assigned handler.
    #[error("illegal opcode")]
    IllegalOpcode = 0x01,
    /// Privileged selector names no sub-operation.
    #[error("illegal privileged instruction selector")]
    IllegalInstruction = 0x02,
    /// Literal bits above the privileged selector are not zero.
    #[error("privileged instruction literal has nonzero reserved bits")]
    NonZeroLiteral = 0x03,
    /// Signed 64-bit result is not representable.
    #[error("signed integer overflow")]
    SignedOverflow = 0x04,
    /// Integer or floating-point division by zero.
    #[error("division by zero")]
    DivideByZero = 0x05,
    /// Data access falls outside memory.
    #[error("memory access out of bounds")]
    AddressOutOfBounds = 0x06,
    /// Data access or fetch violates the alignment policy.
    #[error("misaligned memory access")]
    MisalignedAccess = 0x07,
    /// Port number other than 0 (input) or 1 (output).
    #[error("unsupported i/o port")]
    UnsupportedPort = 0x08,
    /// Host port transfer failed (end of input, malformed input, write error).
    #[error("i/o port transfer failed")]
    PortFailure = 0x09,
    /// Program counter left the loaded image without halting.
    #[error("execution left the loaded image")]
    ExecutionOutOfImage = 0x0A,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::IllegalOpcode),
            0x02 => Some(Self::IllegalInstruction),
            0x03 => Some(Self::NonZeroLiteral),
            0x04 => Some(Self::SignedOverflow),
            0x05 => Some(Self::DivideByZero),
            0x06 => Some(Self::AddressOutOfBounds),
            0x07 => Some(Self::MisalignedAccess),
            0x08 => Some(Self::UnsupportedPort),
            0x09 => Some(Self::PortFailure),
            0x0A => Some(Self::ExecutionOutOfImage),
            _ => None,
        }
    }

    /// Returns the diagnostics class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::IllegalOpcode | Self::IllegalInstruction | Self::NonZeroLiteral => {
                FaultClass::Decode
            }
            Self::SignedOverflow | Self::DivideByZero => FaultClass::Arithmetic,
            Self::AddressOutOfBounds | Self::MisalignedAccess => FaultClass::Memory,
            Self::UnsupportedPort | Self::PortFailure => FaultClass::Port,
            Self::ExecutionOutOfImage => FaultClass::Control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultClass, FaultCode};

    #[test]
    fn stable_code_roundtrip_is_bijective_for_defined_values() {
        for code in 0x01u8..=0x0A {
            let fault = FaultCode::from_u8(code).expect("defined taxonomy code");
            assert_eq!(fault.as_u8(), code);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(FaultCode::from_u8(0x00).is_none());
        assert!(FaultCode::from_u8(0x0B).is_none());
        assert!(FaultCode::from_u8(0xFF).is_none());
    }

    #[test]
    fn class_mapping_matches_fault_taxonomy() {
        assert_eq!(FaultCode::IllegalOpcode.class(), FaultClass::Decode);
        assert_eq!(FaultCode::NonZeroLiteral.class(), FaultClass::Decode);
        assert_eq!(FaultCode::DivideByZero.class(), FaultClass::Arithmetic);
        assert_eq!(FaultCode::MisalignedAccess.class(), FaultClass::Memory);
        assert_eq!(FaultCode::UnsupportedPort.class(), FaultClass::Port);
        assert_eq!(FaultCode::ExecutionOutOfImage.class(), FaultClass::Control);
    }

    #[test]
    fn display_is_lowercase_diagnostic() {
        assert_eq!(FaultCode::SignedOverflow.to_string(), "signed integer overflow");
        assert_eq!(FaultCode::UnsupportedPort.class().to_string(), "port");
    }
}
