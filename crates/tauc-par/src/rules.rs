//! The `tau` expression and statement grammar, built on the engine in
//! `crate::grammar`. Structural assembly that's pure fixed repetition
//! (a struct's member list, a block's statement list) is driven directly
//! from `crate::parser` instead of through engine alternatives — nothing
//! there needs backtracking. Everything that genuinely disambiguates
//! between shapes (a statement's five forms, an expression's precedence
//! climb) is expressed as rule alternatives here.

use crate::ast::{Expr, Stmt};
use crate::grammar::{grab_nested, kind, lit, lit_opt_flag, rule_ref, rule_ref_opt, Grammar, Rule};
use crate::node::Node;
use tauc_lex::TokenKind;
use tauc_sem::OperatorId;

fn token_literal(node: Node) -> Option<String> {
    node.as_token().map(|(lit, _)| lit.to_string())
}

/// Registers the `Value`, `Factor`, `Term`, `FunctionCall`, `Variable`,
/// and `Statement` rules into `grammar`.
pub fn install(grammar: &mut Grammar) {
    install_value(grammar);
    install_factor(grammar);
    install_term(grammar);
    install_function_call(grammar);
    install_statement(grammar);
}

fn install_value(grammar: &mut Grammar) {
    grammar.define(
        "Value",
        vec![
            Rule::new(vec![kind(TokenKind::Float, "v")], Box::new(|_, view| {
                let lit = token_literal(view.take("v")?)?;
                Some(Node::Expr(Expr::Float(lit.parse().ok()?)))
            })),
            Rule::new(vec![kind(TokenKind::Integer, "v")], Box::new(|_, view| {
                let lit = token_literal(view.take("v")?)?;
                Some(Node::Expr(Expr::Integer(lit.parse().ok()?)))
            })),
            Rule::new(vec![kind(TokenKind::String, "v")], Box::new(|_, view| {
                let lit = token_literal(view.take("v")?)?;
                Some(Node::Expr(Expr::String(lit)))
            })),
            Rule::new(vec![kind(TokenKind::Char, "v")], Box::new(|_, view| {
                let lit = token_literal(view.take("v")?)?;
                let byte = char_literal_value(&lit)?;
                Some(Node::Expr(Expr::Char(byte)))
            })),
            Rule::new(vec![lit("true")], Box::new(|_, _| Some(Node::Expr(Expr::Bool(true))))),
            Rule::new(vec![lit("false")], Box::new(|_, _| Some(Node::Expr(Expr::Bool(false))))),
            Rule::new(vec![rule_ref("FunctionCall", "call")], Box::new(|_, view| view.take("call"))),
            Rule::new(
                vec![kind(TokenKind::Identifier, "name")],
                Box::new(|_, view| {
                    let name = token_literal(view.take("name")?)?;
                    Some(Node::Expr(Expr::Variable { path: crate::ast::Path::simple(name) }))
                }),
            ),
        ],
    );
}

/// Decode a lexed char literal's content (already stripped of quotes):
/// either one plain character, or a backslash followed by two hex
/// digits.
fn char_literal_value(content: &str) -> Option<u8> {
    let bytes = content.as_bytes();
    if bytes.len() == 1 {
        Some(bytes[0])
    } else if bytes.len() == 3 && bytes[0] == b'\\' {
        u8::from_str_radix(&content[1..], 16).ok()
    } else {
        None
    }
}

fn install_factor(grammar: &mut Grammar) {
    grammar.define(
        "Factor",
        vec![
            // ( Term )
            Rule::new(
                vec![lit("("), rule_ref("Term", "value"), lit(")")],
                Box::new(|_, view| view.take("value")),
            ),
            // op Factor  (prefix unary)
            Rule::new(
                vec![kind(TokenKind::Operator, "op"), rule_ref("Factor", "value")],
                Box::new(|_, view| {
                    let op_lit = token_literal(view.take("op")?)?;
                    let value: Expr = view.take("value")?.try_into().ok()?;
                    let op = OperatorId::from_unary_literal(&op_lit, true)?;
                    Some(Node::Expr(Expr::Unary { op, child: Box::new(value), is_postfix: false }))
                }),
            ),
            // Value as TYPE  (postfix cast syntax; the target type name
            // itself is dropped per the emitted form documented for this
            // operator, see OperatorId::Cast's entry in tauc_sem::operators)
            Rule::new(
                vec![rule_ref("Value", "value"), lit("as"), kind(TokenKind::Identifier, "ty")],
                Box::new(|_, view| {
                    let value: Expr = view.take("value")?.try_into().ok()?;
                    Some(Node::Expr(Expr::Unary {
                        op: OperatorId::Cast,
                        child: Box::new(value),
                        is_postfix: false,
                    }))
                }),
            ),
            // Value
            Rule::new(vec![rule_ref("Value", "value")], Box::new(|_, view| view.take("value"))),
        ],
    );
}

fn install_term(grammar: &mut Grammar) {
    grammar.define(
        "Term",
        vec![
            // Factor op Term, with precedence-rotation over the naturally
            // right-leaning recursive-descent tree.
            Rule::new(
                vec![
                    rule_ref("Factor", "a"),
                    kind(TokenKind::Operator, "op"),
                    rule_ref("Term", "b"),
                ],
                Box::new(|_, view| {
                    let a: Expr = view.take("a")?.try_into().ok()?;
                    let op_lit = token_literal(view.take("op")?)?;
                    let b: Expr = view.take("b")?.try_into().ok()?;
                    let op = OperatorId::from_binary_literal(&op_lit)?;

                    let this_op = Expr::Binary { op, lhs: Box::new(a), rhs: Box::new(b.clone()) };

                    if let Expr::Binary { op: b_op, lhs: b_lhs, rhs: b_rhs } = b {
                        if op.precedence() < b_op.precedence() {
                            // Rotate: (a `op` (b_lhs `b_op` b_rhs))
                            //      -> ((a `op` b_lhs) `b_op` b_rhs)
                            let Expr::Binary { lhs: a_again, .. } = &this_op else { unreachable!() };
                            let rotated_left =
                                Expr::Binary { op, lhs: a_again.clone(), rhs: b_lhs };
                            return Some(Node::Expr(Expr::Binary {
                                op: b_op,
                                lhs: Box::new(rotated_left),
                                rhs: b_rhs,
                            }));
                        }
                    }
                    Some(Node::Expr(this_op))
                }),
            ),
            Rule::new(vec![rule_ref("Factor", "value")], Box::new(|_, view| view.take("value"))),
        ],
    );
}

fn install_function_call(grammar: &mut Grammar) {
    grammar.define(
        "FunctionCall",
        vec![Rule::new(
            vec![
                kind(TokenKind::Identifier, "name"),
                lit("("),
                rule_ref_opt("Arguments", "args"),
                lit(")"),
            ],
            Box::new(|_, view| {
                let name = token_literal(view.take("name")?)?;
                let args: Vec<Expr> = match view.take("args") {
                    Some(node) => node.try_into().ok()?,
                    None => Vec::new(),
                };
                Some(Node::Expr(Expr::Call { path: crate::ast::Path::simple(name), args }))
            }),
        )],
    );

    grammar.define(
        "Arguments",
        vec![
            Rule::new(
                vec![rule_ref("Term", "head"), lit(","), rule_ref("Arguments", "tail")],
                Box::new(|_, view| {
                    let head: Expr = view.take("head")?.try_into().ok()?;
                    let mut tail: Vec<Expr> = view.take("tail")?.try_into().ok()?;
                    tail.insert(0, head);
                    Some(Node::ExprList(tail))
                }),
            ),
            Rule::new(
                vec![rule_ref("Term", "only")],
                Box::new(|_, view| {
                    let only: Expr = view.take("only")?.try_into().ok()?;
                    Some(Node::ExprList(vec![only]))
                }),
            ),
        ],
    );
}

/// Registers the `Statement` rule covering every statement form *except*
/// `if`, whose body and else-branch are each a [`crate::ast::StatementBlock`]
/// — nested list assembly that `crate::parser::parse_if` drives directly
/// rather than through an engine alternative. `crate::parser::parse_statement`
/// tries `if` first and falls back to this rule for everything else.
fn install_statement(grammar: &mut Grammar) {
    grammar.define(
        "Statement",
        vec![
            Rule::new(
                vec![lit("return"), rule_ref_opt("Term", "value"), lit(";")],
                Box::new(|_, view| {
                    let value = match view.take("value") {
                        Some(node) => Some(Expr::try_from(node).ok()?),
                        None => None,
                    };
                    Some(Node::Stmt(Stmt::Return(value)))
                }),
            ),
            Rule::new(
                vec![
                    lit_opt_flag("pub", "pub"),
                    kind(TokenKind::Identifier, "ty"),
                    kind(TokenKind::Identifier, "name"),
                    rule_ref_opt("Default", "default"),
                    lit(";"),
                ],
                Box::new(|ctx, view| {
                    let is_public = ctx.take_flag("pub");
                    let ty = token_literal(view.take("ty")?)?;
                    let name = token_literal(view.take("name")?)?;
                    let default = match view.take("default") {
                        Some(node) => Some(Box::new(Expr::try_from(node).ok()?)),
                        None => None,
                    };
                    if ctx.types.try_lookup(&ty).is_none() {
                        ctx.push_error(format!("Unknown type: {ty}"));
                        return None;
                    }
                    Some(Node::Stmt(Stmt::VariableDecl(crate::ast::VariableDecl {
                        name,
                        type_name: ty,
                        default,
                        visibility: if is_public {
                            crate::ast::Visibility::Public
                        } else {
                            crate::ast::Visibility::Private
                        },
                    })))
                }),
            ),
            Rule::new(
                vec![lit("inline"), lit("_C"), grab_nested("{", "}", "body")],
                Box::new(|_, view| {
                    let orphan: crate::ast::OrphanTokens = view.take("body")?.try_into().ok()?;
                    Some(Node::Stmt(Stmt::InlineC(crate::ast::InlineCBlock { raw_tokens: orphan.tokens })))
                }),
            ),
            Rule::new(
                vec![rule_ref("Term", "expr"), lit(";")],
                Box::new(|_, view| {
                    let expr: Expr = view.take("expr")?.try_into().ok()?;
                    Some(Node::Stmt(Stmt::Expr(expr)))
                }),
            ),
        ],
    );

    grammar.define(
        "Default",
        vec![Rule::new(vec![lit("="), rule_ref("Term", "value")], Box::new(|_, view| view.take("value")))],
    );

    grammar.define(
        "IfHeader",
        vec![Rule::new(
            vec![lit("if"), lit("("), rule_ref("Term", "cond"), lit(")")],
            Box::new(|_, view| view.take("cond")),
        )],
    );
}
