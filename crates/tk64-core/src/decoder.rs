//! Instruction decoder for the TK64 ISA.
//!
//! Maps a 32-bit instruction word to an opcode, three register indices and an
//! immediate widened by the opcode's extension policy.

use crate::encoding::{encode_word, extend_immediate, split_word, ImmediatePolicy, Opcode};
use crate::fault::FaultCode;
use crate::state::GeneralRegister;

/// Decoded instruction with all fields extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Assigned opcode.
    pub opcode: Opcode,
    /// Destination (or base/target) register field.
    pub rd: GeneralRegister,
    /// First source register field.
    pub rs: GeneralRegister,
    /// Second source register field.
    pub rt: GeneralRegister,
    /// Raw 12-bit immediate as it appeared in the word.
    pub raw_immediate: u16,
    /// Immediate widened per [`Opcode::immediate_policy`]; zero when unused.
    pub literal: u64,
}

impl DecodedInstruction {
    /// Re-encodes this decoded instruction back to a 32-bit word.
    #[must_use]
    pub const fn encode(self) -> u32 {
        encode_word(
            self.opcode.code(),
            self.rd.bits(),
            self.rs.bits(),
            self.rt.bits(),
            self.raw_immediate,
        )
    }

    /// Returns the widened literal reinterpreted as a signed offset.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn signed_literal(self) -> i64 {
        self.literal as i64
    }
}

/// Result of decoding an instruction word.
///
/// Either contains a decoded instruction or the fault raised by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOrFault {
    /// Successfully decoded instruction.
    Instruction(DecodedInstruction),
    /// Decoding failed with a fault.
    Fault(FaultCode),
}

impl DecodedOrFault {
    /// Returns the decoded instruction if present.
    #[must_use]
    pub const fn instruction(self) -> Option<DecodedInstruction> {
        match self {
            Self::Instruction(i) => Some(i),
            Self::Fault(_) => None,
        }
    }

    /// Returns the fault if decoding failed.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Instruction(_) => None,
            Self::Fault(f) => Some(f),
        }
    }
}

impl From<DecodedOrFault> for Result<DecodedInstruction, FaultCode> {
    fn from(value: DecodedOrFault) -> Self {
        match value {
            DecodedOrFault::Instruction(i) => Ok(i),
            DecodedOrFault::Fault(code) => Err(code),
        }
    }
}

/// Instruction decoder for the TK64 ISA.
#[derive(Debug)]
pub struct Decoder;

impl Decoder {
    /// Decodes a 32-bit instruction word.
    ///
    /// The only decode-time fault is [`FaultCode::IllegalOpcode`]; every
    /// register field is a valid register and the immediate is always
    /// extractable. Privileged selector checks happen at execute time.
    #[must_use]
    pub fn decode(word: u32) -> DecodedOrFault {
        let (code, rd, rs, rt, raw_immediate) = split_word(word);

        let Some(opcode) = Opcode::from_u5(code) else {
            return DecodedOrFault::Fault(FaultCode::IllegalOpcode);
        };

        let literal = match opcode.immediate_policy() {
            ImmediatePolicy::Unused => 0,
            policy => extend_immediate(raw_immediate, policy),
        };

        DecodedOrFault::Instruction(DecodedInstruction {
            opcode,
            rd: GeneralRegister::from_u5(rd),
            rs: GeneralRegister::from_u5(rs),
            rt: GeneralRegister::from_u5(rt),
            raw_immediate,
            literal,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::encoding::OPCODE_TABLE;

    fn decode_instr(word: u32) -> DecodedInstruction {
        Decoder::decode(word).instruction().expect("should decode")
    }

    #[test]
    fn decode_add_extracts_register_fields() {
        let instr = decode_instr(encode_word(0x18, 3, 4, 5, 0));
        assert_eq!(instr.opcode, Opcode::Add);
        assert_eq!(instr.rd, GeneralRegister::from_u5(3));
        assert_eq!(instr.rs, GeneralRegister::from_u5(4));
        assert_eq!(instr.rt, GeneralRegister::from_u5(5));
    }

    #[test]
    fn unassigned_opcodes_fault() {
        for code in [0x1Eu8, 0x1F] {
            let result = Decoder::decode(encode_word(code, 1, 2, 3, 0x123));
            assert_eq!(result.fault(), Some(FaultCode::IllegalOpcode));
        }
    }

    #[test]
    fn sign_extended_literal_for_relative_branch() {
        let instr = decode_instr(encode_word(0x0A, 0, 0, 0, 0xFFC));
        assert_eq!(instr.signed_literal(), -4);
        assert_eq!(instr.raw_immediate, 0xFFC);
    }

    #[test]
    fn sign_extended_literal_for_load_and_store() {
        assert_eq!(decode_instr(encode_word(0x10, 1, 2, 0, 0x800)).signed_literal(), -2048);
        assert_eq!(decode_instr(encode_word(0x13, 1, 2, 0, 0x7FF)).signed_literal(), 2047);
    }

    #[test]
    fn zero_extended_literal_for_add_immediate() {
        let instr = decode_instr(encode_word(0x19, 1, 0, 0, 0xFFF));
        assert_eq!(instr.literal, 0xFFF);
    }

    #[test]
    fn unused_immediate_does_not_reach_literal() {
        let instr = decode_instr(encode_word(0x18, 1, 2, 3, 0xFFF));
        assert_eq!(instr.literal, 0);
        assert_eq!(instr.raw_immediate, 0xFFF);
    }

    #[test]
    fn result_conversion_carries_fault() {
        let result: Result<DecodedInstruction, FaultCode> =
            Decoder::decode(encode_word(0x1F, 0, 0, 0, 0)).into();
        assert_eq!(result, Err(FaultCode::IllegalOpcode));
    }

    #[test]
    fn exhaustive_opcode_classification() {
        for code in 0u8..32 {
            let result = Decoder::decode(encode_word(code, 0, 0, 0, 0));
            let assigned = OPCODE_TABLE.iter().any(|(entry, ..)| *entry == code);
            assert_eq!(result.instruction().is_some(), assigned, "code {code:#04X}");
        }
    }

    proptest! {
        #[test]
        fn decode_encode_round_trip(
            index in 0usize..30,
            rd in 0u8..32,
            rs in 0u8..32,
            rt in 0u8..32,
            imm in 0u16..0x1000,
        ) {
            let (code, opcode, _, _) = OPCODE_TABLE[index];
            let word = encode_word(code, rd, rs, rt, imm);
            let instr = Decoder::decode(word).instruction().expect("assigned opcode");
            prop_assert_eq!(instr.opcode, opcode);
            prop_assert_eq!(instr.rd.bits(), rd);
            prop_assert_eq!(instr.rs.bits(), rs);
            prop_assert_eq!(instr.rt.bits(), rt);
            prop_assert_eq!(instr.raw_immediate, imm);
            prop_assert_eq!(instr.encode(), word);
        }

        #[test]
        fn any_word_decodes_or_faults_with_illegal_opcode(word in any::<u32>()) {
            match Decoder::decode(word) {
                DecodedOrFault::Instruction(instr) => prop_assert_eq!(instr.encode(), word),
                DecodedOrFault::Fault(code) => {
                    prop_assert_eq!(code, FaultCode::IllegalOpcode);
                    prop_assert!(word >> 27 >= 0x1E);
                }
            }
        }
    }
}
