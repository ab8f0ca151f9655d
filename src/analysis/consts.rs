//! Best-effort constant evaluation
//!
//! A [`ConstMap`] carries the statically-known integer value of each tracked
//! variable along the traversal path. The analyzer threads it sequentially
//! through statement lists and hands each branch body a copy, so folding done
//! on one control-flow path never leaks into a sibling path.
//!
//! Folding covers literals, tracked identifiers, unary negation, and the five
//! arithmetic operators. Division is floored to match the source language's
//! integer semantics; a zero divisor (or arithmetic overflow) simply folds to
//! "unknown" — reporting it is the analyzer's job.

use crate::parser::ast::{AssignOp, AstNode, BinOp, LiteralValue, UnOp};
use rustc_hash::FxHashMap;

/// Variable name → statically-known value along the current path
pub type ConstMap = FxHashMap<String, i64>;

/// Floored integer division (round toward negative infinity)
fn floor_div(l: i64, r: i64) -> Option<i64> {
    let q = l.checked_div(r)?;
    if l % r != 0 && (l < 0) != (r < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Evaluate an expression to a constant, or `None` when any part of it is
/// not statically known.
pub fn eval_const(node: &AstNode, values: &ConstMap) -> Option<i64> {
    match node {
        AstNode::Literal { value, .. } => match value {
            LiteralValue::Int(n) => Some(*n),
            // Integral floats participate so `0.0` counts as a zero divisor
            LiteralValue::Float(x) if x.fract() == 0.0 => Some(*x as i64),
            _ => None,
        },
        AstNode::Identifier { name, .. } => values.get(name).copied(),
        AstNode::UnaryExpression { op, operand, .. } => {
            let v = eval_const(operand, values)?;
            match op {
                UnOp::Neg => v.checked_neg(),
                UnOp::Not => None,
            }
        }
        AstNode::BinaryExpression { op, left, right, .. } => {
            let l = eval_const(left, values)?;
            let r = eval_const(right, values)?;
            match op {
                BinOp::Add => l.checked_add(r),
                BinOp::Sub => l.checked_sub(r),
                BinOp::Mul => l.checked_mul(r),
                BinOp::Div => {
                    if r == 0 {
                        None
                    } else {
                        floor_div(l, r)
                    }
                }
                BinOp::Mod => {
                    if r == 0 {
                        None
                    } else {
                        l.checked_rem(r)
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// True when the expression is a divisor that is provably zero: a literal
/// zero, or an identifier whose tracked value is zero.
pub fn is_known_zero(node: &AstNode, values: &ConstMap) -> bool {
    eval_const(node, values) == Some(0)
}

/// Fold a compound assignment (`x += rhs` and friends) over known values
pub fn fold_compound(op: AssignOp, old: i64, rhs: i64) -> Option<i64> {
    match op {
        AssignOp::Assign => Some(rhs),
        AssignOp::AddAssign => old.checked_add(rhs),
        AssignOp::SubAssign => old.checked_sub(rhs),
        AssignOp::MulAssign => old.checked_mul(rhs),
        AssignOp::DivAssign => {
            if rhs == 0 {
                None
            } else {
                floor_div(old, rhs)
            }
        }
        AssignOp::ModAssign => {
            if rhs == 0 {
                None
            } else {
                old.checked_rem(rhs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::SourceLocation;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    fn int(n: i64) -> AstNode {
        AstNode::Literal {
            value: LiteralValue::Int(n),
            location: loc(),
        }
    }

    fn ident(name: &str) -> AstNode {
        AstNode::Identifier {
            name: name.to_string(),
            location: loc(),
        }
    }

    fn bin(op: BinOp, l: AstNode, r: AstNode) -> AstNode {
        AstNode::BinaryExpression {
            op,
            left: Box::new(l),
            right: Box::new(r),
            location: loc(),
        }
    }

    #[test]
    fn test_literal_and_identifier() {
        let mut values = ConstMap::default();
        values.insert("n".to_string(), 5);

        assert_eq!(eval_const(&int(7), &values), Some(7));
        assert_eq!(eval_const(&ident("n"), &values), Some(5));
        assert_eq!(eval_const(&ident("m"), &values), None);
    }

    #[test]
    fn test_arithmetic_folding() {
        let values = ConstMap::default();
        assert_eq!(
            eval_const(&bin(BinOp::Add, int(2), bin(BinOp::Mul, int(3), int(4))), &values),
            Some(14)
        );
        assert_eq!(eval_const(&bin(BinOp::Div, int(7), int(2)), &values), Some(3));
        assert_eq!(eval_const(&bin(BinOp::Div, int(-7), int(2)), &values), Some(-4));
    }

    #[test]
    fn test_zero_divisor_folds_to_unknown() {
        let values = ConstMap::default();
        assert_eq!(eval_const(&bin(BinOp::Div, int(1), int(0)), &values), None);
        assert_eq!(eval_const(&bin(BinOp::Mod, int(1), int(0)), &values), None);
    }

    #[test]
    fn test_known_zero() {
        let mut values = ConstMap::default();
        values.insert("y".to_string(), 0);

        assert!(is_known_zero(&int(0), &values));
        assert!(is_known_zero(&ident("y"), &values));
        assert!(!is_known_zero(&ident("z"), &values));

        let float_zero = AstNode::Literal {
            value: LiteralValue::Float(0.0),
            location: loc(),
        };
        assert!(is_known_zero(&float_zero, &values));
    }
}
