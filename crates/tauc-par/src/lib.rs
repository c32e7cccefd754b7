//! Parsing for `tau` source: a declarative, table-driven backtracking
//! grammar engine (`grammar`) carries the expression and statement rule
//! set (`rules`) down to a closed AST (`ast`) rooted at a
//! [`ast::Module`].
//!
//! [`parse`] is the crate's single entry point — it owns the
//! [`tauc_sem::TypeRegistry`] and [`tauc_sem::Scope`] for the duration of
//! one module's parse, then hands the finished tree to the caller
//! (`tauc-gen`) without needing either one again until emission
//! allocates its own.

pub mod ast;
pub mod grammar;
pub mod node;
pub mod parser;
pub mod rules;

pub use parser::ParseError;

use tauc_lex::TokenStream;
use tauc_sem::{Scope, TypeRegistry};

/// Parse one module's token stream into its AST, using (and mutating)
/// the given type registry and top-level scope.
pub fn parse(
    tokens: &mut TokenStream,
    types: &mut TypeRegistry,
    scope: &mut Scope,
) -> Result<ast::Module, ParseError> {
    let mut grammar = grammar::Grammar::new();
    rules::install(&mut grammar);
    let mut ctx = grammar::ParserContext::new(types, scope);
    parser::parse_module(&grammar, &mut ctx, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauc_lex::tokenize;

    fn parse_source(src: &str) -> Result<ast::Module, ParseError> {
        let tokens = tokenize(src, "t.tau").expect("lex ok");
        let tokens: Vec<_> = tokens.into_iter().filter(|t| {
            !matches!(t.kind, tauc_lex::TokenKind::Whitespace | tauc_lex::TokenKind::Comment)
        }).collect();
        let mut stream = TokenStream::new(tokens, "t.tau");
        let mut types = TypeRegistry::new();
        let mut scope = Scope::new();
        parse(&mut stream, &mut types, &mut scope)
    }

    #[test]
    fn minimal_module_parses() {
        let module = parse_source("mod app; pub fn main() void { return; }").unwrap();
        assert_eq!(module.dotted_name(), "app");
        assert_eq!(module.body.functions.len(), 1);
        assert_eq!(module.body.functions[0].name, "main");
        assert_eq!(module.body.functions[0].return_type_name, "void");
    }

    #[test]
    fn private_and_public_structs_are_both_parsed() {
        let module = parse_source(
            "mod app; pub struct P { pub i32 x; } struct Q { i32 y; }",
        )
        .unwrap();
        assert_eq!(module.body.structs.len(), 2);
        assert_eq!(module.body.structs[0].name, "P");
        assert_eq!(module.body.structs[0].visibility, ast::Visibility::Public);
        assert_eq!(module.body.structs[1].name, "Q");
        assert_eq!(module.body.structs[1].visibility, ast::Visibility::Private);
    }

    #[test]
    fn pub_member_field_is_marked_public() {
        let module =
            parse_source("mod app; struct P { pub i32 x; i32 y; }").unwrap();
        let members = &module.body.structs[0].members;
        assert_eq!(members[0].name, "x");
        assert_eq!(members[0].visibility, ast::Visibility::Public);
        assert_eq!(members[1].name, "y");
        assert_eq!(members[1].visibility, ast::Visibility::Private);
    }

    #[test]
    fn operator_precedence_nests_multiplication_under_addition() {
        let module = parse_source("mod app; fn f() i32 { return 1 + 2 * 3; }").unwrap();
        let stmt = &module.body.functions[0].body.statements[0];
        match stmt {
            ast::Stmt::Return(Some(ast::Expr::Binary { op, rhs, .. })) => {
                assert_eq!(*op, tauc_sem::OperatorId::Add);
                assert!(matches!(**rhs, ast::Expr::Binary { op: tauc_sem::OperatorId::Mul, .. }));
            }
            other => panic!("expected a binary add statement, got {other:?}"),
        }
    }

    #[test]
    fn cast_operator_lexes_and_parses_as_an_operator() {
        let module = parse_source("mod app; fn f() i32 { return x as i32; }").unwrap();
        let stmt = &module.body.functions[0].body.statements[0];
        match stmt {
            ast::Stmt::Return(Some(ast::Expr::Unary { op, .. })) => {
                assert_eq!(*op, tauc_sem::OperatorId::Cast);
            }
            other => panic!("expected a cast unary statement, got {other:?}"),
        }
    }

    #[test]
    fn inline_c_block_collects_raw_tokens() {
        let module =
            parse_source("mod app; fn f() void { inline _C { printf(\"%d\", 1); } }").unwrap();
        let stmt = &module.body.functions[0].body.statements[0];
        match stmt {
            ast::Stmt::InlineC(block) => {
                assert!(block.raw_tokens.contains(&"printf".to_string()));
            }
            other => panic!("expected an inline C block, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_in_variable_decl_is_a_parse_error() {
        let err = parse_source("mod app; fn f() void { nosuch v; }").unwrap_err();
        assert!(err.message.contains("nosuch"));
    }

    #[test]
    fn unbalanced_inline_c_block_is_a_parse_error() {
        let result = parse_source("mod app; fn f() void { inline _C { printf(\"x\"); }");
        assert!(result.is_err());
    }
}
