//! Signed integer arithmetic.
//!
//! Register-register forms are overflow-checked; the immediate forms add or
//! subtract an unsigned magnitude with wrapping and no check.

use super::ExecuteState;
use crate::decoder::DecodedInstruction;
use crate::{FaultCode, Machine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum IntOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ImmOp {
    Add,
    Sub,
}

/// Applies a checked signed operation to two 64-bit operands.
///
/// # Errors
///
/// [`FaultCode::SignedOverflow`] when the exact result is not representable
/// (including `i64::MIN / -1`), [`FaultCode::DivideByZero`] for a zero divisor.
pub(super) fn checked_int_op(op: IntOp, lhs: i64, rhs: i64) -> Result<i64, FaultCode> {
    match op {
        IntOp::Add => lhs.checked_add(rhs).ok_or(FaultCode::SignedOverflow),
        IntOp::Sub => lhs.checked_sub(rhs).ok_or(FaultCode::SignedOverflow),
        IntOp::Mul => lhs.checked_mul(rhs).ok_or(FaultCode::SignedOverflow),
        IntOp::Div => {
            if rhs == 0 {
                return Err(FaultCode::DivideByZero);
            }
            lhs.checked_div(rhs).ok_or(FaultCode::SignedOverflow)
        }
    }
}

pub(super) fn execute_integer(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    op: IntOp,
) -> Result<(), FaultCode> {
    let lhs = machine.arch.gpr_signed(instr.rs);
    let rhs = machine.arch.gpr_signed(instr.rt);
    let result = checked_int_op(op, lhs, rhs)?;
    exec.write_register(instr.rd, result as u64);
    exec.advance(machine.arch.pc());
    Ok(())
}

pub(super) fn execute_immediate(
    instr: &DecodedInstruction,
    machine: &Machine,
    exec: &mut ExecuteState,
    op: ImmOp,
) -> Result<(), FaultCode> {
    let value = machine.arch.gpr(instr.rd);
    let result = match op {
        ImmOp::Add => value.wrapping_add(instr.literal),
        ImmOp::Sub => value.wrapping_sub(instr.literal),
    };
    exec.write_register(instr.rd, result);
    exec.advance(machine.arch.pc());
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::{checked_int_op, IntOp};
    use crate::FaultCode;

    #[rstest]
    #[case(IntOp::Add, 2, 3, Ok(5))]
    #[case(IntOp::Add, i64::MAX, 1, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Add, i64::MIN, -1, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Add, i64::MIN, 0, Ok(i64::MIN))]
    #[case(IntOp::Sub, i64::MIN, 1, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Sub, 0, i64::MIN, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Sub, -1, i64::MAX, Ok(i64::MIN))]
    #[case(IntOp::Mul, -3, 7, Ok(-21))]
    #[case(IntOp::Mul, i64::MAX, 2, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Mul, -1, i64::MIN, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Mul, 0, i64::MIN, Ok(0))]
    #[case(IntOp::Div, -7, 2, Ok(-3))]
    #[case(IntOp::Div, 7, -2, Ok(-3))]
    #[case(IntOp::Div, 1, 0, Err(FaultCode::DivideByZero))]
    #[case(IntOp::Div, i64::MIN, -1, Err(FaultCode::SignedOverflow))]
    #[case(IntOp::Div, i64::MIN, 1, Ok(i64::MIN))]
    fn checked_operation_edges(
        #[case] op: IntOp,
        #[case] lhs: i64,
        #[case] rhs: i64,
        #[case] expected: Result<i64, FaultCode>,
    ) {
        assert_eq!(checked_int_op(op, lhs, rhs), expected);
    }

    proptest! {
        #[test]
        fn add_faults_iff_exact_sum_out_of_range(lhs in any::<i64>(), rhs in any::<i64>()) {
            let exact = i128::from(lhs) + i128::from(rhs);
            let in_range = exact >= i128::from(i64::MIN) && exact <= i128::from(i64::MAX);
            match checked_int_op(IntOp::Add, lhs, rhs) {
                Ok(sum) => {
                    prop_assert!(in_range);
                    prop_assert_eq!(i128::from(sum), exact);
                }
                Err(code) => {
                    prop_assert!(!in_range);
                    prop_assert_eq!(code, FaultCode::SignedOverflow);
                }
            }
        }

        #[test]
        fn div_faults_iff_zero_or_min_by_minus_one(lhs in any::<i64>(), rhs in prop_oneof![
            Just(0i64), Just(-1i64), any::<i64>()
        ]) {
            match checked_int_op(IntOp::Div, lhs, rhs) {
                Ok(quotient) => {
                    prop_assert!(rhs != 0 && !(lhs == i64::MIN && rhs == -1));
                    prop_assert_eq!(quotient, lhs / rhs);
                }
                Err(FaultCode::DivideByZero) => {
                    prop_assert_eq!(rhs, 0);
                }
                Err(code) => {
                    prop_assert_eq!(code, FaultCode::SignedOverflow);
                    prop_assert!(lhs == i64::MIN && rhs == -1);
                }
            }
        }

        #[test]
        fn mul_faults_iff_exact_product_out_of_range(lhs in any::<i64>(), rhs in any::<i64>()) {
            let exact = i128::from(lhs) * i128::from(rhs);
            let in_range = exact >= i128::from(i64::MIN) && exact <= i128::from(i64::MAX);
            prop_assert_eq!(checked_int_op(IntOp::Mul, lhs, rhs).is_ok(), in_range);
        }
    }
}
