//! Opcode assignment, immediate-extension policy and instruction word layout.
//!
//! Word layout (little-endian in memory):
//!
//! ```text
//!  31    27 26   22 21   17 16   12 11          0
//! +--------+-------+-------+-------+-------------+
//! | opcode |  rd   |  rs   |  rt   |  immediate  |
//! +--------+-------+-------+-------+-------------+
//! ```

/// How the 12-bit immediate is widened to 64 bits for a given opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImmediatePolicy {
    /// Bit 11 is replicated into bits 12..64.
    SignExtend,
    /// Treated as an unsigned magnitude.
    ZeroExtend,
    /// The opcode ignores the immediate.
    Unused,
}

/// Assigned opcodes (`opcode` field, bits 31..27).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    And = 0x00,
    Or = 0x01,
    Xor = 0x02,
    Not = 0x03,
    ShiftRight = 0x04,
    ShiftRightImmediate = 0x05,
    ShiftLeft = 0x06,
    ShiftLeftImmediate = 0x07,
    Branch = 0x08,
    BranchRelative = 0x09,
    BranchRelativeLiteral = 0x0A,
    BranchNonZero = 0x0B,
    Call = 0x0C,
    Return = 0x0D,
    BranchGreater = 0x0E,
    Privileged = 0x0F,
    Load = 0x10,
    Move = 0x11,
    LoadHigh = 0x12,
    Store = 0x13,
    AddFloat = 0x14,
    SubFloat = 0x15,
    MulFloat = 0x16,
    DivFloat = 0x17,
    Add = 0x18,
    AddImmediate = 0x19,
    Sub = 0x1A,
    SubImmediate = 0x1B,
    Mul = 0x1C,
    Div = 0x1D,
}

/// Single source-of-truth opcode table: `(code, opcode, mnemonic, immediate policy)`.
///
/// Any 5-bit code not present here is illegal by definition.
pub const OPCODE_TABLE: &[(u8, Opcode, &str, ImmediatePolicy)] = &[
    (0x00, Opcode::And, "and", ImmediatePolicy::Unused),
    (0x01, Opcode::Or, "or", ImmediatePolicy::Unused),
    (0x02, Opcode::Xor, "xor", ImmediatePolicy::Unused),
    (0x03, Opcode::Not, "not", ImmediatePolicy::Unused),
    (0x04, Opcode::ShiftRight, "shftr", ImmediatePolicy::Unused),
    (0x05, Opcode::ShiftRightImmediate, "shftri", ImmediatePolicy::ZeroExtend),
    (0x06, Opcode::ShiftLeft, "shftl", ImmediatePolicy::Unused),
    (0x07, Opcode::ShiftLeftImmediate, "shftli", ImmediatePolicy::ZeroExtend),
    (0x08, Opcode::Branch, "br", ImmediatePolicy::Unused),
    (0x09, Opcode::BranchRelative, "brr", ImmediatePolicy::Unused),
    (0x0A, Opcode::BranchRelativeLiteral, "brr.l", ImmediatePolicy::SignExtend),
    (0x0B, Opcode::BranchNonZero, "brnz", ImmediatePolicy::Unused),
    (0x0C, Opcode::Call, "call", ImmediatePolicy::Unused),
    (0x0D, Opcode::Return, "return", ImmediatePolicy::Unused),
    (0x0E, Opcode::BranchGreater, "brgt", ImmediatePolicy::Unused),
    (0x0F, Opcode::Privileged, "priv", ImmediatePolicy::ZeroExtend),
    (0x10, Opcode::Load, "mov.ld", ImmediatePolicy::SignExtend),
    (0x11, Opcode::Move, "mov", ImmediatePolicy::Unused),
    (0x12, Opcode::LoadHigh, "mov.hi", ImmediatePolicy::ZeroExtend),
    (0x13, Opcode::Store, "mov.st", ImmediatePolicy::SignExtend),
    (0x14, Opcode::AddFloat, "addf", ImmediatePolicy::Unused),
    (0x15, Opcode::SubFloat, "subf", ImmediatePolicy::Unused),
    (0x16, Opcode::MulFloat, "mulf", ImmediatePolicy::Unused),
    (0x17, Opcode::DivFloat, "divf", ImmediatePolicy::Unused),
    (0x18, Opcode::Add, "add", ImmediatePolicy::Unused),
    (0x19, Opcode::AddImmediate, "addi", ImmediatePolicy::ZeroExtend),
    (0x1A, Opcode::Sub, "sub", ImmediatePolicy::Unused),
    (0x1B, Opcode::SubImmediate, "subi", ImmediatePolicy::ZeroExtend),
    (0x1C, Opcode::Mul, "mul", ImmediatePolicy::Unused),
    (0x1D, Opcode::Div, "div", ImmediatePolicy::Unused),
];

impl Opcode {
    /// Converts a 5-bit opcode field into an assigned opcode.
    ///
    /// `None` means the code is unassigned (illegal opcode).
    #[must_use]
    pub fn from_u5(code: u8) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .find_map(|(entry, opcode, _, _)| (*entry == code).then_some(*opcode))
    }

    /// Returns the stable 5-bit code for this opcode.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns the immediate-extension policy for this opcode.
    #[must_use]
    pub const fn immediate_policy(self) -> ImmediatePolicy {
        match self {
            Self::BranchRelativeLiteral | Self::Load | Self::Store => ImmediatePolicy::SignExtend,
            Self::AddImmediate
            | Self::SubImmediate
            | Self::ShiftRightImmediate
            | Self::ShiftLeftImmediate
            | Self::LoadHigh
            | Self::Privileged => ImmediatePolicy::ZeroExtend,
            Self::And
            | Self::Or
            | Self::Xor
            | Self::Not
            | Self::ShiftRight
            | Self::ShiftLeft
            | Self::Branch
            | Self::BranchRelative
            | Self::BranchNonZero
            | Self::Call
            | Self::Return
            | Self::BranchGreater
            | Self::Move
            | Self::AddFloat
            | Self::SubFloat
            | Self::MulFloat
            | Self::DivFloat
            | Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div => ImmediatePolicy::Unused,
        }
    }

    /// Returns the short mnemonic used in diagnostics.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find_map(|(_, opcode, name, _)| (*opcode == self).then_some(*name))
            .unwrap_or("?")
    }
}

/// Sub-operations of the privileged opcode, selected by the low immediate bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum PrivilegedOp {
    Halt = 0,
    Trap = 1,
    ReturnFromException = 2,
    Input = 3,
    Output = 4,
}

/// Mask of the immediate bits that carry the privileged selector.
pub const PRIVILEGED_SELECTOR_MASK: u16 = 0x7;

impl PrivilegedOp {
    /// Converts a selector value into a privileged sub-operation.
    #[must_use]
    pub const fn from_selector(selector: u16) -> Option<Self> {
        match selector {
            0 => Some(Self::Halt),
            1 => Some(Self::Trap),
            2 => Some(Self::ReturnFromException),
            3 => Some(Self::Input),
            4 => Some(Self::Output),
            _ => None,
        }
    }
}

/// Mask of the 12-bit immediate field.
pub const IMMEDIATE_MASK: u32 = 0xFFF;

/// Splits an instruction word into `(opcode, rd, rs, rt, immediate)` raw fields.
#[must_use]
pub const fn split_word(word: u32) -> (u8, u8, u8, u8, u16) {
    (
        ((word >> 27) & 0x1F) as u8,
        ((word >> 22) & 0x1F) as u8,
        ((word >> 17) & 0x1F) as u8,
        ((word >> 12) & 0x1F) as u8,
        (word & IMMEDIATE_MASK) as u16,
    )
}

/// Packs raw fields into an instruction word. Out-of-range field bits are masked off.
#[must_use]
pub const fn encode_word(opcode: u8, rd: u8, rs: u8, rt: u8, immediate: u16) -> u32 {
    ((opcode as u32 & 0x1F) << 27)
        | ((rd as u32 & 0x1F) << 22)
        | ((rs as u32 & 0x1F) << 17)
        | ((rt as u32 & 0x1F) << 12)
        | (immediate as u32 & IMMEDIATE_MASK)
}

/// Widens a raw 12-bit immediate according to `policy`.
#[must_use]
pub const fn extend_immediate(raw: u16, policy: ImmediatePolicy) -> u64 {
    let raw = raw as u64 & 0xFFF;
    match policy {
        ImmediatePolicy::SignExtend => {
            if raw & 0x800 != 0 {
                raw | 0xFFFF_FFFF_FFFF_F000
            } else {
                raw
            }
        }
        ImmediatePolicy::ZeroExtend => raw,
        ImmediatePolicy::Unused => 0,
    }
}
