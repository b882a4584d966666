// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Operator, cast and assignment typing rules.

use lsl_ast::LslType::{self, Float, Integer, Key, List, Rotation, String, Vector, Void};
use lsl_ast::{BinaryOp, PostfixOp, PrefixOp};

/// Result type of `left op right`, or `None` if the combination is invalid.
pub fn binary_result(op: BinaryOp, left: LslType, right: LslType) -> Option<LslType> {
    if left == Void || right == Void {
        return None;
    }

    if let Some(ty) = list_rule(op, left, right) {
        return Some(ty);
    }

    use BinaryOp::*;
    let ty = match (op, left, right) {
        (Add | Sub, _, _) => match (left, right) {
            (Integer, Integer) => Integer,
            (Integer, Float) | (Float, Integer) | (Float, Float) => Float,
            (Vector, Vector) => Vector,
            (Rotation, Rotation) => Rotation,
            (String, String) if op == Add => String,
            _ => return None,
        },
        (Mul, _, _) => match (left, right) {
            (Integer, Integer) => Integer,
            (Integer, Float) | (Float, Integer) | (Float, Float) => Float,
            (Integer | Float, Vector) => Vector,
            (Vector, Integer | Float) => Vector,
            (Vector, Vector) => Float,
            (Vector, Rotation) => Vector,
            (Rotation, Rotation) => Rotation,
            _ => return None,
        },
        (Div, _, _) => match (left, right) {
            (Integer, Integer) => Integer,
            (Integer, Float) | (Float, Integer) | (Float, Float) => Float,
            (Vector, Integer | Float) => Vector,
            (Vector, Rotation) => Vector,
            (Rotation, Rotation) => Rotation,
            _ => return None,
        },
        (Mod, Integer, Integer) => Integer,
        (Mod, Vector, Vector) => Vector,
        (BitAnd | BitOr | BitXor | And | Or | Shl | Shr, Integer, Integer) => Integer,
        (Eq | Ne, _, _) if equality_comparable(left, right) => Integer,
        (Lt | Gt | Le | Ge, _, _) if left.is_numeric() && right.is_numeric() => Integer,
        (Assign, _, _) if assignable(left, right) => left,
        (AddAssign | SubAssign, Integer, Integer) => Integer,
        (AddAssign | SubAssign, Float, Integer | Float) => Float,
        (AddAssign | SubAssign, Vector, Vector) => Vector,
        (AddAssign | SubAssign, Rotation, Rotation) => Rotation,
        (AddAssign, String, String) => String,
        (MulAssign, Integer, Integer | Float) => Integer,
        (MulAssign, Float, Integer | Float) => Float,
        (MulAssign, Vector, Integer | Float | Rotation) => Vector,
        (MulAssign, Rotation, Rotation) => Rotation,
        (DivAssign, Integer, Integer) => Integer,
        (DivAssign, Float, Integer | Float) => Float,
        (DivAssign, Vector, Integer | Float | Rotation) => Vector,
        (DivAssign, Rotation, Rotation) => Rotation,
        (ModAssign, Integer, Integer) => Integer,
        (ModAssign, Vector, Vector) => Vector,
        _ => return None,
    };
    Some(ty)
}

fn list_rule(op: BinaryOp, left: LslType, right: LslType) -> Option<LslType> {
    if left != List && right != List {
        return None;
    }
    match op {
        BinaryOp::AddAssign if left == List => Some(List),
        BinaryOp::Add => Some(List),
        BinaryOp::Eq | BinaryOp::Ne if left == List && right == List => Some(Integer),
        BinaryOp::Assign if left == List && right == List => Some(List),
        _ => None,
    }
}

fn equality_comparable(left: LslType, right: LslType) -> bool {
    (left.is_numeric() && right.is_numeric())
        || (left.is_string_like() && right.is_string_like())
        || (left == right && matches!(left, Vector | Rotation))
}

/// Whether a value of type `from` may be stored in a slot of type `to`.
///
/// Used for declarations, arguments and returns. Integers widen to float and
/// string/key convert both ways.
pub fn assignable(to: LslType, from: LslType) -> bool {
    if to == Void || from == Void {
        return false;
    }
    to == from || (to == Float && from == Integer) || (to.is_string_like() && from.is_string_like())
}

pub fn prefix_result(op: PrefixOp, operand: LslType) -> Option<LslType> {
    let ok = match op {
        PrefixOp::Not | PrefixOp::BitNot => operand == Integer,
        PrefixOp::Increment | PrefixOp::Decrement => operand.is_numeric(),
        PrefixOp::Negate => matches!(operand, Integer | Float | Vector | Rotation),
        PrefixOp::Positive => matches!(operand, Integer | Float | Vector),
    };
    ok.then_some(operand)
}

pub fn postfix_result(_op: PostfixOp, operand: LslType) -> Option<LslType> {
    operand.is_numeric().then_some(operand)
}

/// Whether `(to) value_of_type_from` is a legal cast.
pub fn cast_valid(to: LslType, from: LslType) -> bool {
    if from == Void {
        return false;
    }
    match to {
        List => true,
        String => true,
        Integer => matches!(from, Integer | Float | String),
        Float => matches!(from, Integer | Float | String),
        Vector => matches!(from, Vector | String),
        Rotation => matches!(from, Rotation | String),
        Key => matches!(from, Key | String),
        Void => false,
    }
}

/// Any value type may be used as a condition.
pub fn valid_condition(ty: LslType) -> bool {
    ty != Void
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_promotes_to_float() {
        assert_eq!(binary_result(BinaryOp::Add, Integer, Integer), Some(Integer));
        assert_eq!(binary_result(BinaryOp::Add, Integer, Float), Some(Float));
        assert_eq!(binary_result(BinaryOp::Sub, Float, Integer), Some(Float));
        assert_eq!(binary_result(BinaryOp::Sub, String, String), None);
        assert_eq!(binary_result(BinaryOp::Add, String, String), Some(String));
    }

    #[test]
    fn vector_and_rotation_products() {
        assert_eq!(binary_result(BinaryOp::Mul, Vector, Vector), Some(Float));
        assert_eq!(binary_result(BinaryOp::Mul, Float, Vector), Some(Vector));
        assert_eq!(binary_result(BinaryOp::Mul, Vector, Rotation), Some(Vector));
        assert_eq!(binary_result(BinaryOp::Mul, Rotation, Vector), None);
        assert_eq!(binary_result(BinaryOp::Div, Vector, Rotation), Some(Vector));
        assert_eq!(binary_result(BinaryOp::Mod, Vector, Vector), Some(Vector));
        assert_eq!(binary_result(BinaryOp::Mod, Float, Float), None);
    }

    #[test]
    fn list_concatenation_and_comparison() {
        assert_eq!(binary_result(BinaryOp::Add, List, Integer), Some(List));
        assert_eq!(binary_result(BinaryOp::Add, Vector, List), Some(List));
        assert_eq!(binary_result(BinaryOp::AddAssign, List, Key), Some(List));
        assert_eq!(binary_result(BinaryOp::Eq, List, List), Some(Integer));
        assert_eq!(binary_result(BinaryOp::Eq, List, Integer), None);
        assert_eq!(binary_result(BinaryOp::Assign, List, Integer), None);
        assert_eq!(binary_result(BinaryOp::Sub, List, List), None);
    }

    #[test]
    fn comparisons_yield_integer() {
        assert_eq!(binary_result(BinaryOp::Eq, String, Key), Some(Integer));
        assert_eq!(binary_result(BinaryOp::Ne, Vector, Vector), Some(Integer));
        assert_eq!(binary_result(BinaryOp::Lt, Integer, Float), Some(Integer));
        assert_eq!(binary_result(BinaryOp::Lt, String, String), None);
        assert_eq!(binary_result(BinaryOp::And, Integer, Integer), Some(Integer));
        assert_eq!(binary_result(BinaryOp::And, Float, Integer), None);
    }

    #[test]
    fn assignment_rules() {
        assert_eq!(binary_result(BinaryOp::Assign, Float, Integer), Some(Float));
        assert_eq!(binary_result(BinaryOp::Assign, Integer, Float), None);
        assert_eq!(binary_result(BinaryOp::Assign, Key, String), Some(Key));
        assert_eq!(binary_result(BinaryOp::MulAssign, Integer, Float), Some(Integer));
        assert_eq!(binary_result(BinaryOp::DivAssign, Integer, Float), None);
        assert_eq!(binary_result(BinaryOp::AddAssign, Integer, Float), None);
        assert_eq!(binary_result(BinaryOp::ModAssign, Vector, Vector), Some(Vector));
    }

    #[test]
    fn void_operands_never_type() {
        assert_eq!(binary_result(BinaryOp::Add, Void, Integer), None);
        assert!(!assignable(Void, Void));
        assert!(!cast_valid(Integer, Void));
        assert!(!valid_condition(Void));
    }

    #[test]
    fn unary_rules() {
        assert_eq!(prefix_result(PrefixOp::Negate, Rotation), Some(Rotation));
        assert_eq!(prefix_result(PrefixOp::Positive, Vector), Some(Vector));
        assert_eq!(prefix_result(PrefixOp::Positive, Rotation), None);
        assert_eq!(prefix_result(PrefixOp::Not, Float), None);
        assert_eq!(prefix_result(PrefixOp::Increment, Float), Some(Float));
        assert_eq!(postfix_result(PostfixOp::Decrement, Vector), None);
    }

    #[test]
    fn cast_rules() {
        assert!(cast_valid(List, Rotation));
        assert!(cast_valid(String, List));
        assert!(cast_valid(Integer, String));
        assert!(!cast_valid(Integer, Key));
        assert!(!cast_valid(Vector, Rotation));
        assert!(cast_valid(Key, String));
        assert!(!cast_valid(Key, Integer));
    }
}
