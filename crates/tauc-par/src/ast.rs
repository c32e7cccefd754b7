//! The closed AST node set a `tau` source file parses into.
//!
//! Every production the grammar can build is one variant of [`Node`].
//! Grammar actions build nodes bottom-up and move children out of the
//! rule's named-children view (see `crate::grammar`); nothing here is
//! shared or aliased, so a `Node` owns its entire subtree and drops it
//! recursively when the module root goes out of scope.

use tauc_sem::OperatorId;

#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    Public,
    Private,
}

/// One segment of a dotted path, with the template arguments/parameters
/// the grammar can attach to it. `tau` source never instantiates a
/// template in the scope this crate implements, so these are always
/// empty in practice, but the shape is part of the closed node set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathSegment {
    pub name: String,
    pub template_args: Vec<String>,
}

/// A dotted name, either at a declaration site or a use site — the
/// grammar doesn't need to distinguish the two structurally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment { name: name.into(), template_args: Vec::new() }],
        }
    }

    /// Dotted form, e.g. `a.b.c`.
    pub fn dotted(&self) -> String {
        self.segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(".")
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub is_c_include: bool,
    /// The raw include target: a bare string for a C include, a dotted
    /// module path otherwise.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub type_name: String,
    pub default: Option<Box<Expr>>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub members: Vec<VariableDecl>,
    pub template_params: Vec<String>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Parameter>,
    pub template_params: Vec<String>,
    pub return_type_name: String,
    pub body: StatementBlock,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementBlock {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    If(Box<IfStmt>),
    Body(StatementBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: StatementBlock,
    pub else_branch: Option<Else>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineCBlock {
    pub raw_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    If(IfStmt),
    Return(Option<Expr>),
    VariableDecl(VariableDecl),
    Expr(Expr),
    InlineC(InlineCBlock),
    Block(StatementBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary { op: OperatorId, lhs: Box<Expr>, rhs: Box<Expr> },
    Unary { op: OperatorId, child: Box<Expr>, is_postfix: bool },
    Call { path: Path, args: Vec<Expr> },
    Variable { path: Path },
    Integer(i64),
    Float(f64),
    Bool(bool),
    Char(u8),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub includes: Vec<Include>,
    pub structs: Vec<StructDef>,
    pub functions: Vec<FunctionDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name_path: Vec<String>,
    pub body: Body,
}

impl Module {
    pub fn dotted_name(&self) -> String {
        self.name_path.join(".")
    }
}

/// A bag of raw token literals carried across a rule boundary by a
/// grammar action — used for operator lexemes handed to an action, and
/// for the contents of an `inline _C { ... }` block before they're
/// reshaped into an [`InlineCBlock`]. Never appears in a finished
/// [`Module`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrphanTokens {
    pub tokens: Vec<String>,
}
