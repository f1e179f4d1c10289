/// Number of architecturally visible general-purpose registers (`r0..r31`).
pub const GENERAL_REGISTER_COUNT: usize = 32;

/// Architecturally visible general-purpose register identifier.
///
/// Always holds a value in `0..32`; every 5-bit register field decodes to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct GeneralRegister(u8);

impl GeneralRegister {
    /// Register 31, the stack pointer by convention.
    pub const SP: Self = Self(31);

    /// Decodes a 5-bit register field. Bits above bit 4 are ignored.
    #[must_use]
    pub const fn from_u5(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Returns the array index for this register (`0..=31`).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw 5-bit field value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for GeneralRegister {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Processor privilege mode. Tracked but not enforced against other operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PrivilegeMode {
    /// Initial mode; restored by return-from-exception.
    #[default]
    User,
    /// Entered by trap.
    Supervisor,
}

/// Full architectural register state: register file, program counter and mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [u64; GENERAL_REGISTER_COUNT],
    pc: u64,
    privilege: PrivilegeMode,
}

impl ArchitecturalState {
    /// Creates a reset state with `pc` at `entry` and the stack pointer at `stack_top`.
    #[must_use]
    pub fn at_entry(entry: u64, stack_top: u64) -> Self {
        let mut state = Self {
            pc: entry,
            ..Self::default()
        };
        state.set_gpr(GeneralRegister::SP, stack_top);
        state
    }

    /// Reads a general-purpose register as raw bits.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> u64 {
        self.gpr[reg.index()]
    }

    /// Reads a general-purpose register as a signed integer.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn gpr_signed(&self, reg: GeneralRegister) -> i64 {
        self.gpr[reg.index()] as i64
    }

    /// Reads a general-purpose register as an IEEE-754 double bit pattern.
    #[must_use]
    pub fn gpr_f64(&self, reg: GeneralRegister) -> f64 {
        f64::from_bits(self.gpr[reg.index()])
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: GeneralRegister, value: u64) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u64 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u64) {
        self.pc = value;
    }

    /// Reads the privilege mode.
    #[must_use]
    pub const fn privilege(&self) -> PrivilegeMode {
        self.privilege
    }

    /// Writes the privilege mode.
    pub const fn set_privilege(&mut self, mode: PrivilegeMode) {
        self.privilege = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchitecturalState, GeneralRegister, PrivilegeMode, GENERAL_REGISTER_COUNT};

    #[test]
    fn register_field_decode_masks_to_five_bits() {
        assert_eq!(GeneralRegister::from_u5(31), GeneralRegister::SP);
        assert_eq!(GeneralRegister::from_u5(0x20).index(), 0);
        assert_eq!(GeneralRegister::from_u5(7).to_string(), "r7");
    }

    #[test]
    fn entry_state_sets_pc_stack_pointer_and_user_mode() {
        let state = ArchitecturalState::at_entry(0x1000, 0x8_0000);
        assert_eq!(state.pc(), 0x1000);
        assert_eq!(state.gpr(GeneralRegister::SP), 0x8_0000);
        assert_eq!(state.privilege(), PrivilegeMode::User);
        for index in 0..31u8 {
            assert_eq!(state.gpr(GeneralRegister::from_u5(index)), 0);
        }
    }

    #[test]
    fn every_register_is_writable() {
        let mut state = ArchitecturalState::default();
        for index in 0..GENERAL_REGISTER_COUNT {
            let reg = GeneralRegister::from_u5(u8::try_from(index).expect("fits"));
            state.set_gpr(reg, index as u64 + 100);
        }
        assert_eq!(state.gpr(GeneralRegister::from_u5(0)), 100);
        assert_eq!(state.gpr(GeneralRegister::SP), 131);
    }

    #[test]
    fn signed_and_float_views_reinterpret_bits() {
        let mut state = ArchitecturalState::default();
        let reg = GeneralRegister::from_u5(3);
        state.set_gpr(reg, u64::MAX);
        assert_eq!(state.gpr_signed(reg), -1);

        let nan_bits = 0x7FF8_0000_0000_0ABC;
        state.set_gpr(reg, nan_bits);
        assert!(state.gpr_f64(reg).is_nan());
        assert_eq!(state.gpr_f64(reg).to_bits(), nan_bits);
    }
}
