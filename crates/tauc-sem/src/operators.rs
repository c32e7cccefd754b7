//! Operator identity, precedence, and the allowed-operator tables that
//! drive binary/unary operator resolution and untyped-literal promotion.

use crate::types::{TypeId, TypeRegistry};

/// Every operator the grammar can produce from a token literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorId {
    Negative,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Assign,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessEquals,
    GreaterEquals,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Not,
    LogicAnd,
    LogicOr,
    BinaryAnd,
    BinaryOr,
    BinaryXor,
    BinaryNot,
    LeftShift,
    RightShift,
    Dereference,
    Reference,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    Cast,
    ArrayAccess,
    Dot,
}

impl OperatorId {
    /// Binary operator for an infix literal, or `None` if the literal is
    /// never a binary operator.
    pub fn from_binary_literal(lit: &str) -> Option<OperatorId> {
        use OperatorId::*;
        Some(match lit {
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Div,
            "%" => Mod,
            "=" => Assign,
            "==" => Equals,
            "!=" => NotEquals,
            "<" => LessThan,
            ">" => GreaterThan,
            "<=" => LessEquals,
            ">=" => GreaterEquals,
            // `<<`/`>>` map to the shift they spell, unlike an earlier
            // version of this table that had the two swapped.
            "<<" => LeftShift,
            ">>" => RightShift,
            "<<=" => LeftShiftAssign,
            ">>=" => RightShiftAssign,
            "&" => BinaryAnd,
            "&&" => LogicAnd,
            "|" => BinaryOr,
            "||" => LogicOr,
            "^" => BinaryXor,
            "+=" => AddAssign,
            "-=" => SubAssign,
            "*=" => MulAssign,
            "/=" => DivAssign,
            "%=" => ModAssign,
            "&=" => AndAssign,
            "|=" => OrAssign,
            "^=" => XorAssign,
            "." => Dot,
            _ => return None,
        })
    }

    /// Unary operator for a prefix (or, for `++`/`--`, postfix) literal.
    pub fn from_unary_literal(lit: &str, prefix: bool) -> Option<OperatorId> {
        use OperatorId::*;
        Some(match lit {
            "-" => Negative,
            "*" => Dereference,
            "&" => Reference,
            "++" => {
                if prefix {
                    PreInc
                } else {
                    PostInc
                }
            }
            "--" => {
                if prefix {
                    PreDec
                } else {
                    PostDec
                }
            }
            "~" => BinaryNot,
            "!" => Not,
            "as" => Cast,
            _ => return None,
        })
    }

    /// Precedence number: smaller binds tighter. Consistent in one
    /// direction across the whole table — `Mul`/`Div`/`Mod` bind tighter
    /// than `Add`/`Sub`, unlike an earlier version of this table that had
    /// the two tiers the wrong way around relative to every other tier.
    pub fn precedence(self) -> i32 {
        use OperatorId::*;
        match self {
            Dot | PreInc | PreDec | Cast => 1,
            Negative | PostInc | PostDec | Not | BinaryNot | Reference | Dereference => 2,
            Mul | Div | Mod => 3,
            Add | Sub => 4,
            LeftShift | RightShift => 5,
            LessThan | GreaterThan | LessEquals | GreaterEquals => 6,
            Equals | NotEquals => 7,
            BinaryAnd => 8,
            BinaryXor => 9,
            BinaryOr => 10,
            LogicAnd => 11,
            LogicOr => 12,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign
            | LeftShiftAssign | RightShiftAssign | AndAssign | OrAssign | XorAssign => 14,
            ArrayAccess => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        use OperatorId::*;
        match self {
            Dot => ".",
            Add => "+",
            Negative | Sub => "-",
            Dereference | Mul => "*",
            Div => "/",
            Mod => "%",
            Assign => "=",
            Equals => "==",
            NotEquals => "!=",
            LessThan => "<",
            GreaterThan => ">",
            LessEquals => "<=",
            GreaterEquals => ">=",
            PreInc | PostInc => "++",
            PreDec | PostDec => "--",
            Not => "!",
            AndAssign => "&=",
            OrAssign => "|=",
            XorAssign => "^=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            LeftShiftAssign => "<<=",
            RightShiftAssign => ">>=",
            LeftShift => "<<",
            RightShift => ">>",
            LogicAnd => "&&",
            LogicOr => "||",
            Reference | BinaryAnd => "&",
            BinaryOr => "|",
            BinaryXor => "^",
            BinaryNot => "~",
            Cast => "as",
            ArrayAccess => "[]",
        }
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance of a binary operator implementation for a concrete pair
/// of operand types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowedBinaryOperator {
    pub operator: OperatorId,
    pub left: TypeId,
    pub right: TypeId,
    pub result: TypeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowedUnaryOperator {
    pub operator: OperatorId,
    pub operand: TypeId,
    pub result: TypeId,
}

const ARITHMETIC: &[&str] = &["u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "f32", "f64"];
const INTEGRAL: &[&str] = &["u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64"];

/// Build the table of binary operator implementations: every arithmetic
/// operator (plus plain and compound assignment) across every numeric
/// type paired with itself, comparisons across the same set plus `bool`,
/// and bitwise/shift operators (plus their compound-assign forms) across
/// the integral subset.
pub fn allowed_binary_operators(types: &TypeRegistry) -> Vec<AllowedBinaryOperator> {
    let mut ops = Vec::new();
    let lookup = |name: &str| types.lookup(name);

    for &name in ARITHMETIC {
        let t = lookup(name);
        for op in [OperatorId::Add, OperatorId::Sub, OperatorId::Mul, OperatorId::Div, OperatorId::Mod] {
            ops.push(AllowedBinaryOperator { operator: op, left: t, right: t, result: t });
        }
        for op in [
            OperatorId::Assign,
            OperatorId::AddAssign,
            OperatorId::SubAssign,
            OperatorId::MulAssign,
            OperatorId::DivAssign,
            OperatorId::ModAssign,
        ] {
            ops.push(AllowedBinaryOperator { operator: op, left: t, right: t, result: t });
        }
        for op in [
            OperatorId::Equals,
            OperatorId::NotEquals,
            OperatorId::LessThan,
            OperatorId::GreaterThan,
            OperatorId::LessEquals,
            OperatorId::GreaterEquals,
        ] {
            ops.push(AllowedBinaryOperator { operator: op, left: t, right: t, result: lookup("bool") });
        }
    }

    for &name in INTEGRAL {
        let t = lookup(name);
        for op in [
            OperatorId::BinaryAnd,
            OperatorId::BinaryOr,
            OperatorId::BinaryXor,
            OperatorId::LeftShift,
            OperatorId::RightShift,
        ] {
            ops.push(AllowedBinaryOperator { operator: op, left: t, right: t, result: t });
        }
        for op in [
            OperatorId::AndAssign,
            OperatorId::OrAssign,
            OperatorId::XorAssign,
            OperatorId::LeftShiftAssign,
            OperatorId::RightShiftAssign,
        ] {
            ops.push(AllowedBinaryOperator { operator: op, left: t, right: t, result: t });
        }
    }

    let b = lookup("bool");
    for op in [OperatorId::LogicAnd, OperatorId::LogicOr, OperatorId::Equals, OperatorId::NotEquals] {
        ops.push(AllowedBinaryOperator { operator: op, left: b, right: b, result: b });
    }

    ops
}

pub fn allowed_unary_operators(types: &TypeRegistry) -> Vec<AllowedUnaryOperator> {
    let mut ops = Vec::new();
    let lookup = |name: &str| types.lookup(name);

    for &name in ARITHMETIC {
        let t = lookup(name);
        ops.push(AllowedUnaryOperator { operator: OperatorId::Negative, operand: t, result: t });
        ops.push(AllowedUnaryOperator { operator: OperatorId::Not, operand: t, result: lookup("bool") });
    }
    for &name in INTEGRAL {
        let t = lookup(name);
        ops.push(AllowedUnaryOperator { operator: OperatorId::BinaryNot, operand: t, result: t });
        ops.push(AllowedUnaryOperator { operator: OperatorId::PreInc, operand: t, result: t });
        ops.push(AllowedUnaryOperator { operator: OperatorId::PreDec, operand: t, result: t });
        ops.push(AllowedUnaryOperator { operator: OperatorId::PostInc, operand: t, result: t });
        ops.push(AllowedUnaryOperator { operator: OperatorId::PostDec, operand: t, result: t });
    }
    let b = lookup("bool");
    ops.push(AllowedUnaryOperator { operator: OperatorId::Not, operand: b, result: b });
    ops.push(AllowedUnaryOperator { operator: OperatorId::BinaryNot, operand: b, result: b });

    ops
}

/// Resolve a binary operator application, promoting untyped integer/float
/// literal operands to whichever concrete type the other side carries
/// before searching the table — this is the only place promotion happens,
/// so `1 + x` resolves against `x`'s type regardless of table order.
pub fn resolve_binary(
    types: &TypeRegistry,
    table: &[AllowedBinaryOperator],
    op: OperatorId,
    left: TypeId,
    right: TypeId,
) -> Option<AllowedBinaryOperator> {
    let (left, right) = promote_pair(types, left, right);
    table
        .iter()
        .copied()
        .find(|entry| entry.operator == op && entry.left == left && entry.right == right)
}

pub fn resolve_unary(
    types: &TypeRegistry,
    table: &[AllowedUnaryOperator],
    op: OperatorId,
    operand: TypeId,
) -> Option<AllowedUnaryOperator> {
    table.iter().copied().find(|entry| entry.operator == op && entry.operand == operand)
}

/// Order concrete types are tried in when both operands of a binary
/// operator are untyped literals of the same family (e.g. `1 + 2`) — the
/// first entry here that is an integer type wins for two untyped integer
/// literals, the first float type for two untyped float literals. Pinned
/// so operator resolution is deterministic across runs.
const PROMOTION_ORDER: &[&str] = &["i32", "i64", "i8", "i16", "u8", "u16", "u32", "u64", "f32", "f64"];

fn promote_pair(types: &TypeRegistry, left: TypeId, right: TypeId) -> (TypeId, TypeId) {
    match (types.is_untyped_literal(left), types.is_untyped_literal(right)) {
        (true, false) => (right, right),
        (false, true) => (left, left),
        (true, true) => {
            let family_of = |id: TypeId| types.name_of(id);
            let want_float = family_of(left) == Some(crate::types::UNTYPED_FLOAT_LITERAL);
            for &name in PROMOTION_ORDER {
                let candidate = types.lookup(name);
                let is_float = matches!(name, "f32" | "f64");
                if is_float == want_float {
                    return (candidate, candidate);
                }
            }
            (left, right)
        }
        (false, false) => (left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_literals_are_not_swapped() {
        assert_eq!(OperatorId::from_binary_literal("<<"), Some(OperatorId::LeftShift));
        assert_eq!(OperatorId::from_binary_literal(">>"), Some(OperatorId::RightShift));
    }

    #[test]
    fn both_shift_assign_literals_resolve_distinctly() {
        assert_eq!(OperatorId::from_binary_literal("<<="), Some(OperatorId::LeftShiftAssign));
        assert_eq!(OperatorId::from_binary_literal(">>="), Some(OperatorId::RightShiftAssign));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert!(OperatorId::Mul.precedence() < OperatorId::Add.precedence());
    }

    #[test]
    fn assignment_binds_loosest() {
        for op in [OperatorId::Add, OperatorId::Mul, OperatorId::LogicOr, OperatorId::Equals] {
            assert!(op.precedence() < OperatorId::Assign.precedence());
        }
    }

    #[test]
    fn resolve_binary_promotes_untyped_literal_to_other_operand() {
        let types = TypeRegistry::new();
        let table = allowed_binary_operators(&types);
        let i32_id = types.lookup("i32");
        let literal_id = types.lookup(crate::types::UNTYPED_INTEGER_LITERAL);
        let resolved = resolve_binary(&types, &table, OperatorId::Add, literal_id, i32_id).unwrap();
        assert_eq!(resolved.result, i32_id);
    }

    #[test]
    fn two_untyped_integer_literals_promote_to_i32() {
        let types = TypeRegistry::new();
        let table = allowed_binary_operators(&types);
        let literal_id = types.lookup(crate::types::UNTYPED_INTEGER_LITERAL);
        let resolved = resolve_binary(&types, &table, OperatorId::Add, literal_id, literal_id).unwrap();
        assert_eq!(resolved.result, types.lookup("i32"));
    }

    #[test]
    fn resolve_binary_rejects_mismatched_concrete_types() {
        let types = TypeRegistry::new();
        let table = allowed_binary_operators(&types);
        let i32_id = types.lookup("i32");
        let f64_id = types.lookup("f64");
        assert!(resolve_binary(&types, &table, OperatorId::Add, i32_id, f64_id).is_none());
    }

    #[test]
    fn plain_assign_resolves_over_every_arithmetic_type() {
        let types = TypeRegistry::new();
        let table = allowed_binary_operators(&types);
        for name in ARITHMETIC {
            let t = types.lookup(name);
            let resolved = resolve_binary(&types, &table, OperatorId::Assign, t, t);
            assert!(resolved.is_some(), "Assign should resolve for {name}");
            assert_eq!(resolved.unwrap().result, t);
        }
    }

    #[test]
    fn compound_assign_resolves_like_its_plain_operator() {
        let types = TypeRegistry::new();
        let table = allowed_binary_operators(&types);
        let i32_id = types.lookup("i32");
        assert!(resolve_binary(&types, &table, OperatorId::AddAssign, i32_id, i32_id).is_some());

        let u8_id = types.lookup("u8");
        assert!(resolve_binary(&types, &table, OperatorId::XorAssign, u8_id, u8_id).is_some());
        assert!(resolve_binary(&types, &table, OperatorId::LeftShiftAssign, u8_id, u8_id).is_some());

        let f64_id = types.lookup("f64");
        assert!(resolve_binary(&types, &table, OperatorId::XorAssign, f64_id, f64_id).is_none());
    }

    #[test]
    fn logical_not_resolves_over_numerics_and_bool() {
        let types = TypeRegistry::new();
        let table = allowed_unary_operators(&types);
        let i32_id = types.lookup("i32");
        let bool_id = types.lookup("bool");
        let resolved = resolve_unary(&types, &table, OperatorId::Not, i32_id).unwrap();
        assert_eq!(resolved.result, bool_id);
        let resolved = resolve_unary(&types, &table, OperatorId::Not, bool_id).unwrap();
        assert_eq!(resolved.result, bool_id);
    }

    #[test]
    fn binary_not_resolves_over_bool_and_integral_types() {
        let types = TypeRegistry::new();
        let table = allowed_unary_operators(&types);
        let bool_id = types.lookup("bool");
        assert!(resolve_unary(&types, &table, OperatorId::BinaryNot, bool_id).is_some());
        let u8_id = types.lookup("u8");
        assert!(resolve_unary(&types, &table, OperatorId::BinaryNot, u8_id).is_some());
    }

    #[test]
    fn negative_resolves_over_unsigned_types() {
        let types = TypeRegistry::new();
        let table = allowed_unary_operators(&types);
        for name in ["u8", "u16", "u32", "u64"] {
            let t = types.lookup(name);
            assert!(
                resolve_unary(&types, &table, OperatorId::Negative, t).is_some(),
                "Negative should resolve for {name}"
            );
        }
    }
}
