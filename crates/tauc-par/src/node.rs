//! [`Node`]: the single tagged type grammar actions exchange through a
//! rule's [`crate::grammar::View`].
//!
//! A real AST (rooted at [`crate::ast::Module`]) is just a `Node` that
//! happens to be the `Module` variant — there's no separate "parse tree"
//! representation to convert out of, matching the closed node set the
//! grammar can produce.

use crate::ast::{
    Else, Expr, FunctionDef, IfStmt, Include, Module, OrphanTokens, Parameter, Path, Stmt,
    StatementBlock, StructDef, VariableDecl,
};
use tauc_lex::TokenKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Placeholder for actions (and tests) with nothing to hand upward.
    Unit,
    /// A single raw token, bound by a [`crate::grammar::Step::Kind`] step
    /// before an action reshapes it into something meaningful.
    Token { literal: String, kind: TokenKind },
    OrphanTokens(OrphanTokens),
    Path(Path),
    Include(Include),
    VariableDecl(VariableDecl),
    Parameter(Parameter),
    ParameterList(Vec<Parameter>),
    StructDef(StructDef),
    FunctionDef(FunctionDef),
    StatementBlock(StatementBlock),
    Stmt(Stmt),
    StmtList(Vec<Stmt>),
    IfStmt(IfStmt),
    Else(Else),
    Expr(Expr),
    ExprList(Vec<Expr>),
    Module(Module),
}

macro_rules! node_conv {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Node {
            fn from(value: $ty) -> Self {
                Node::$variant(value)
            }
        }

        impl TryFrom<Node> for $ty {
            type Error = Node;

            fn try_from(node: Node) -> Result<Self, Node> {
                match node {
                    Node::$variant(value) => Ok(value),
                    other => Err(other),
                }
            }
        }
    };
}

node_conv!(Path, Path);
node_conv!(Include, Include);
node_conv!(VariableDecl, VariableDecl);
node_conv!(Parameter, Parameter);
node_conv!(ParameterList, Vec<Parameter>);
node_conv!(StructDef, StructDef);
node_conv!(FunctionDef, FunctionDef);
node_conv!(StatementBlock, StatementBlock);
node_conv!(Stmt, Stmt);
node_conv!(StmtList, Vec<Stmt>);
node_conv!(IfStmt, IfStmt);
node_conv!(Else, Else);
node_conv!(Expr, Expr);
node_conv!(ExprList, Vec<Expr>);
node_conv!(Module, Module);
node_conv!(OrphanTokens, OrphanTokens);

impl Node {
    pub fn as_token(&self) -> Option<(&str, TokenKind)> {
        match self {
            Node::Token { literal, kind } => Some((literal.as_str(), *kind)),
            _ => None,
        }
    }
}
