//! Top-level assembly: turns the flat productions the grammar engine
//! recognizes (expressions, single statements) into the nested
//! structures — struct member lists, statement blocks, a module's three
//! item sequences — that are plain fixed repetition rather than
//! alternation, and so are walked directly instead of through another
//! rule alternative.

use crate::ast::{
    Else, FunctionDef, IfStmt, Include, Module, Parameter, StatementBlock, Stmt, StructDef,
    Visibility,
};
use crate::grammar::{Grammar, ParserContext};
use crate::node::Node;
use tauc_lex::{TokenKind, TokenStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub row: u64,
    pub col: u64,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {}, col {})", self.message, self.row, self.col)
    }
}

impl std::error::Error for ParseError {}

fn unexpected(tokens: &TokenStream) -> ParseError {
    let tok = tokens.peek();
    ParseError {
        message: format!("unexpected token '{}'", tok.literal),
        row: tok.row,
        col: tok.col,
    }
}

fn expect_literal(tokens: &mut TokenStream, literal: &str) -> Result<(), ParseError> {
    tokens.expect_literal(literal).map(|_| ()).ok_or_else(|| unexpected(tokens))
}

fn expect_ident(tokens: &mut TokenStream) -> Result<String, ParseError> {
    tokens
        .expect_kind(TokenKind::Identifier)
        .map(|t| t.literal.to_string())
        .ok_or_else(|| unexpected(tokens))
}

/// Parse a whole module: `mod <dotted.path>;` followed by its body.
pub fn parse_module<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<Module, ParseError> {
    expect_literal(tokens, "mod")?;
    let mut name_path = vec![expect_ident(tokens)?];
    while tokens.expect_literal(".").is_some() {
        name_path.push(expect_ident(tokens)?);
    }
    expect_literal(tokens, ";")?;

    let body = parse_body(grammar, ctx, tokens)?;
    Ok(Module { name_path, body })
}

fn parse_body<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<crate::ast::Body, ParseError> {
    let mut body = crate::ast::Body::default();
    while !tokens.eof() {
        if tokens.peek().literal == "include" {
            body.includes.push(parse_include(tokens)?);
        } else if is_at(tokens, "struct") || is_public_then(tokens, "struct") {
            body.structs.push(parse_struct(grammar, ctx, tokens)?);
        } else if is_at(tokens, "fn") || is_public_then(tokens, "fn") {
            body.functions.push(parse_function(grammar, ctx, tokens)?);
        } else {
            return Err(unexpected(tokens));
        }
    }
    Ok(body)
}

fn is_at(tokens: &TokenStream, literal: &str) -> bool {
    tokens.peek().literal == literal
}

/// True if the stream is at `pub <literal>` without consuming anything.
/// `TokenStream` has no native lookahead-by-two, so this peeks by saving
/// and restoring a mark.
fn is_public_then(tokens: &mut TokenStream, literal: &str) -> bool {
    if tokens.peek().literal != "pub" {
        return false;
    }
    tokens.mark();
    tokens.consume();
    let matched = tokens.peek().literal == literal;
    tokens.fail();
    matched
}

fn parse_include(tokens: &mut TokenStream) -> Result<Include, ParseError> {
    expect_literal(tokens, "include")?;
    if let Some(tok) = tokens.expect_kind(TokenKind::String) {
        let value = tok.literal.to_string();
        expect_literal(tokens, ";")?;
        return Ok(Include { is_c_include: true, value });
    }
    let mut segments = vec![expect_ident(tokens)?];
    while tokens.expect_literal(".").is_some() {
        segments.push(expect_ident(tokens)?);
    }
    expect_literal(tokens, ";")?;
    Ok(Include { is_c_include: false, value: segments.join(".") })
}

fn parse_visibility(tokens: &mut TokenStream) -> Visibility {
    if tokens.expect_literal("pub").is_some() {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

fn parse_struct<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<StructDef, ParseError> {
    let visibility = parse_visibility(tokens);
    expect_literal(tokens, "struct")?;
    let name = expect_ident(tokens)?;
    expect_literal(tokens, "{")?;
    let mut members = Vec::new();
    while tokens.peek().literal != "}" {
        match grammar.eval(ctx, tokens, "Statement") {
            Some(Node::Stmt(Stmt::VariableDecl(decl))) => members.push(decl),
            _ => return Err(unexpected(tokens)),
        }
    }
    expect_literal(tokens, "}")?;

    let fields: Vec<_> = members
        .iter()
        .map(|m| (m.name.clone(), ctx.types.lookup(&m.type_name)))
        .collect();
    if let Err(e) = ctx.types.define_struct(&name, &fields) {
        let tok = tokens.peek();
        return Err(ParseError { message: e.to_string(), row: tok.row, col: tok.col });
    }

    Ok(StructDef { name, members, template_params: Vec::new(), visibility })
}

fn parse_parameter_list(tokens: &mut TokenStream) -> Result<Vec<Parameter>, ParseError> {
    expect_literal(tokens, "(")?;
    let mut params = Vec::new();
    if tokens.peek().literal != ")" {
        loop {
            let type_name = expect_ident(tokens)?;
            let name = expect_ident(tokens)?;
            params.push(Parameter { type_name, name });
            if tokens.expect_literal(",").is_none() {
                break;
            }
        }
    }
    expect_literal(tokens, ")")?;
    Ok(params)
}

fn parse_function<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<FunctionDef, ParseError> {
    let visibility = parse_visibility(tokens);
    expect_literal(tokens, "fn")?;
    let name = expect_ident(tokens)?;
    let params = parse_parameter_list(tokens)?;
    let return_type_name = expect_ident(tokens)?;
    let body = parse_statement_block(grammar, ctx, tokens)?;
    Ok(FunctionDef { name, params, template_params: Vec::new(), return_type_name, body, visibility })
}

fn parse_statement_block<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<StatementBlock, ParseError> {
    expect_literal(tokens, "{")?;
    let mut statements = Vec::new();
    while tokens.peek().literal != "}" {
        statements.push(parse_statement(grammar, ctx, tokens)?);
    }
    expect_literal(tokens, "}")?;
    Ok(StatementBlock { statements })
}

fn parse_statement<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<Stmt, ParseError> {
    if tokens.peek().literal == "if" {
        return Ok(Stmt::If(parse_if(grammar, ctx, tokens)?));
    }
    if tokens.peek().literal == "{" {
        return Ok(Stmt::Block(parse_statement_block(grammar, ctx, tokens)?));
    }
    match grammar.eval(ctx, tokens, "Statement") {
        Some(Node::Stmt(stmt)) => Ok(stmt),
        _ => Err(unexpected(tokens)),
    }
}

fn parse_if<'a>(
    grammar: &Grammar,
    ctx: &mut ParserContext<'a>,
    tokens: &mut TokenStream,
) -> Result<IfStmt, ParseError> {
    let condition = match grammar.eval(ctx, tokens, "IfHeader") {
        Some(Node::Expr(expr)) => expr,
        _ => return Err(unexpected(tokens)),
    };
    let body = parse_statement_block(grammar, ctx, tokens)?;
    let else_branch = if tokens.expect_literal("else").is_some() {
        if tokens.peek().literal == "if" {
            Some(Else::If(Box::new(parse_if(grammar, ctx, tokens)?)))
        } else {
            Some(Else::Body(parse_statement_block(grammar, ctx, tokens)?))
        }
    } else {
        None
    };
    Ok(IfStmt { condition, body, else_branch })
}
