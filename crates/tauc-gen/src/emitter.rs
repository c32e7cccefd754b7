//! Turns a parsed [`tauc_par::ast::Module`] into C source: once for its
//! header, once for its body. Both passes share one [`EmitContext`] so
//! that scope state (functions, variables, the module itself) threaded
//! through parsing keeps being threaded through emission.

use std::fmt::Write as _;

use tauc_par::ast::{Else, Expr, FunctionDef, IfStmt, InlineCBlock, Module, Stmt, StructDef, VariableDecl};
use tauc_sem::{resolve_binary, resolve_unary, AllowedBinaryOperator, AllowedUnaryOperator, ItemInfo, Scope, TypeId, TypeRegistry};

use crate::error::{EmitError, EmitResult};

/// Shared mutable state for one module's emission: the same shape of
/// context a parse uses, since name qualification depends on exactly the
/// scope bindings parsing or a prior pass left behind.
pub struct EmitContext<'a> {
    pub types: &'a mut TypeRegistry,
    pub scope: &'a mut Scope,
    pub module_path: Vec<String>,
    pub binary_ops: Vec<AllowedBinaryOperator>,
    pub unary_ops: Vec<AllowedUnaryOperator>,
}

impl<'a> EmitContext<'a> {
    pub fn new(types: &'a mut TypeRegistry, scope: &'a mut Scope, module_path: Vec<String>) -> Self {
        let binary_ops = tauc_sem::allowed_binary_operators(types);
        let unary_ops = tauc_sem::allowed_unary_operators(types);
        Self { types, scope, module_path, binary_ops, unary_ops }
    }

    fn module_dotted(&self) -> String {
        self.module_path.join(".")
    }

    fn module_underscored(&self) -> String {
        self.module_path.join("_")
    }
}

fn c_type_name(type_name: &str, ctx: &EmitContext) -> String {
    let id = ctx.types.lookup(type_name);
    match ctx.types.name_of(id) {
        Some(name) => name.to_string(),
        None => {
            eprintln!("warning: unknown type '{type_name}'");
            type_name.to_string()
        }
    }
}

/// Resolve a (possibly dotted) reference against the scope, per the
/// name-qualification rules: a bare name is used verbatim; a dotted name
/// whose head is a struct-typed variable keeps its dots as field access;
/// a dotted name whose head is a module or another struct translates
/// dots to underscores at the crossing. Anything scope can't account for
/// is a textual warning, not a hard failure.
fn qualify(path: &tauc_par::ast::Path, ctx: &EmitContext) -> String {
    let dotted = path.dotted();
    if path.segments.len() <= 1 {
        return dotted;
    }
    let head = match path.first() {
        Some(h) => h,
        None => return dotted,
    };
    match ctx.scope.get(head) {
        Some(info) if ctx.types.is_struct(info.type_id) => dotted,
        Some(info) if info.is_module || info.is_struct || info.is_function => {
            dotted.replace('.', "_")
        }
        Some(_) => dotted,
        None => {
            eprintln!("warning: unknown symbol '{dotted}'");
            dotted
        }
    }
}

/// The type a (already-parsed, untyped) expression would carry into
/// operator resolution: literals get their untyped placeholder type,
/// names and calls resolve against the scope, everything else
/// propagates from its operand.
fn expr_type(expr: &Expr, ctx: &EmitContext) -> TypeId {
    match expr {
        Expr::Integer(_) => ctx.types.lookup(tauc_sem::UNTYPED_INTEGER_LITERAL),
        Expr::Float(_) => ctx.types.lookup(tauc_sem::UNTYPED_FLOAT_LITERAL),
        Expr::Bool(_) => ctx.types.lookup("bool"),
        Expr::Char(_) => ctx.types.lookup("char"),
        Expr::String(_) => TypeId::UNKNOWN,
        Expr::Variable { path } => ctx
            .scope
            .get(&qualify(path, ctx))
            .or_else(|| ctx.scope.get(&path.dotted()))
            .map(|i| i.type_id)
            .unwrap_or(TypeId::UNKNOWN),
        Expr::Call { path, .. } => ctx
            .scope
            .get(&qualify(path, ctx))
            .or_else(|| ctx.scope.get(&path.dotted()))
            .filter(|i| i.is_function)
            .map(|i| i.type_id)
            .unwrap_or(TypeId::UNKNOWN),
        Expr::Unary { child, .. } => expr_type(child, ctx),
        Expr::Binary { lhs, .. } => expr_type(lhs, ctx),
    }
}

fn emit_expr(out: &mut String, expr: &Expr, ctx: &EmitContext) -> EmitResult<()> {
    match expr {
        Expr::Integer(n) => write!(out, "{n}")?,
        Expr::Float(f) => write!(out, "{f}")?,
        Expr::Bool(b) => write!(out, "{}", if *b { "true" } else { "false" })?,
        Expr::Char(c) => write!(out, "'\\x{c:02x}'")?,
        Expr::String(s) => write!(out, "\"{s}\"")?,
        Expr::Variable { path } => write!(out, "{}", qualify(path, ctx))?,
        Expr::Call { path, args } => {
            write!(out, "{}(", qualify(path, ctx))?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                emit_expr(out, arg, ctx)?;
            }
            write!(out, ")")?;
        }
        Expr::Unary { op, child, is_postfix } => {
            let operand_ty = expr_type(child, ctx);
            if resolve_unary(ctx.types, &ctx.unary_ops, *op, operand_ty).is_none() {
                return Err(EmitError::NoUnaryOperator {
                    op: op.as_str().to_string(),
                    operand: ctx.types.name_of(operand_ty).unwrap_or("?").to_string(),
                });
            }
            if *is_postfix {
                emit_expr(out, child, ctx)?;
                write!(out, "{}", op.as_str())?;
            } else {
                write!(out, "{}", op.as_str())?;
                emit_expr(out, child, ctx)?;
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let left_ty = expr_type(lhs, ctx);
            let right_ty = expr_type(rhs, ctx);
            if resolve_binary(ctx.types, &ctx.binary_ops, *op, left_ty, right_ty).is_none() {
                return Err(EmitError::NoBinaryOperator {
                    op: op.as_str().to_string(),
                    left: ctx.types.name_of(left_ty).unwrap_or("?").to_string(),
                    right: ctx.types.name_of(right_ty).unwrap_or("?").to_string(),
                });
            }
            emit_expr(out, lhs, ctx)?;
            write!(out, " {} ", op.as_str())?;
            emit_expr(out, rhs, ctx)?;
        }
    }
    Ok(())
}

fn emit_inline_c(out: &mut String, block: &InlineCBlock) -> EmitResult<()> {
    for tok in &block.raw_tokens {
        write!(out, "{tok} ")?;
        if tok == ";" {
            out.push('\n');
        }
    }
    Ok(())
}

fn emit_statement(out: &mut String, stmt: &Stmt, ctx: &mut EmitContext) -> EmitResult<()> {
    match stmt {
        Stmt::VariableDecl(VariableDecl { name, type_name, default, .. }) => {
            write!(out, "{} {}", c_type_name(type_name, ctx), name)?;
            if let Some(value) = default {
                write!(out, " = ")?;
                emit_expr(out, value, ctx)?;
            }
            writeln!(out, ";")?;
            ctx.scope.add_variable(name.clone(), ctx.types.lookup(type_name), false, false);
        }
        Stmt::Return(value) => {
            write!(out, "return ")?;
            if let Some(value) = value {
                emit_expr(out, value, ctx)?;
            }
            writeln!(out, ";")?;
        }
        Stmt::Expr(expr) => {
            emit_expr(out, expr, ctx)?;
            writeln!(out, ";")?;
        }
        Stmt::InlineC(block) => emit_inline_c(out, block)?,
        Stmt::If(if_stmt) => emit_if(out, if_stmt, ctx)?,
        Stmt::Block(block) => {
            writeln!(out, "{{")?;
            ctx.scope.begin();
            for s in &block.statements {
                emit_statement(out, s, ctx)?;
            }
            ctx.scope.end();
            writeln!(out, "}}")?;
        }
    }
    Ok(())
}

fn emit_if(out: &mut String, if_stmt: &IfStmt, ctx: &mut EmitContext) -> EmitResult<()> {
    write!(out, "if (")?;
    emit_expr(out, &if_stmt.condition, ctx)?;
    writeln!(out, ")")?;
    writeln!(out, "{{")?;
    ctx.scope.begin();
    for s in &if_stmt.body.statements {
        emit_statement(out, s, ctx)?;
    }
    ctx.scope.end();
    writeln!(out, "}}")?;
    match &if_stmt.else_branch {
        Some(Else::If(nested)) => {
            write!(out, "else ")?;
            emit_if(out, nested, ctx)?;
        }
        Some(Else::Body(block)) => {
            writeln!(out, "else")?;
            writeln!(out, "{{")?;
            ctx.scope.begin();
            for s in &block.statements {
                emit_statement(out, s, ctx)?;
            }
            ctx.scope.end();
            writeln!(out, "}}")?;
        }
        None => {}
    }
    Ok(())
}

fn struct_field_types(def: &StructDef, ctx: &EmitContext) -> Vec<(String, TypeId)> {
    def.members.iter().map(|m| (m.name.clone(), ctx.types.lookup(&m.type_name))).collect()
}

/// Registers `def` in the type table under `qualified_name` if it isn't
/// already there. Parsing already registered every struct under its bare
/// name (so member and parameter types can reference it within the same
/// module); this adds the fully-qualified entry emission's name
/// qualification looks up across a module boundary. A duplicate here
/// just means the bare and qualified names coincide (e.g. single-segment
/// module names) and is not an error.
fn ensure_struct_registered(def: &StructDef, qualified_name: &str, ctx: &mut EmitContext) {
    if ctx.types.try_lookup(qualified_name).is_some() {
        return;
    }
    let fields = struct_field_types(def, ctx);
    let _ = ctx.types.define_struct(qualified_name, &fields);
}

fn emit_struct_body(out: &mut String, def: &StructDef, ctx: &EmitContext) -> EmitResult<()> {
    writeln!(out, "struct {} {{", def.name)?;
    for member in &def.members {
        writeln!(out, "    {} {};", c_type_name(&member.type_name, ctx), member.name)?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    Ok(())
}

fn emit_function_prototype(out: &mut String, func: &FunctionDef, private_static: bool, ctx: &EmitContext) -> EmitResult<()> {
    if private_static {
        write!(out, "static ")?;
    }
    write!(out, "{} {}(", c_type_name(&func.return_type_name, ctx), func.name)?;
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{}", c_type_name(&param.type_name, ctx))?;
    }
    writeln!(out, ");")?;
    Ok(())
}

fn emit_function_def(out: &mut String, func: &FunctionDef, ctx: &mut EmitContext) -> EmitResult<()> {
    if matches!(func.visibility, tauc_par::ast::Visibility::Private) {
        write!(out, "static ")?;
    }
    write!(out, "{} {}(", c_type_name(&func.return_type_name, ctx), func.name)?;
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{} {}", c_type_name(&param.type_name, ctx), param.name)?;
    }
    writeln!(out, ") {{")?;

    let return_ty = ctx.types.lookup(&func.return_type_name);
    ctx.scope.add(func.name.clone(), ItemInfo::function(return_ty));
    ctx.scope.begin();
    for param in &func.params {
        let ty = ctx.types.lookup(&param.type_name);
        ctx.scope.add_variable(param.name.clone(), ty, false, false);
    }

    let mut result = Ok(());
    for stmt in &func.body.statements {
        if let Err(e) = emit_statement(out, stmt, ctx) {
            result = Err(e);
            break;
        }
    }
    ctx.scope.end();
    writeln!(out, "}}")?;
    writeln!(out)?;
    result
}

/// Emission entry points for a parsed module, mirroring the two-pass
/// split a `tau` compiler runs one source file through: a header pass
/// that only ever declares, and a body pass that defines.
pub trait EmitModule {
    fn emit_header(&self, out: &mut String, ctx: &mut EmitContext) -> EmitResult<()>;
    fn emit_body(&self, out: &mut String, ctx: &mut EmitContext) -> EmitResult<()>;
}

impl EmitModule for Module {
    fn emit_header(&self, out: &mut String, ctx: &mut EmitContext) -> EmitResult<()> {
        let guard = format!("__{}_H__", ctx.module_underscored());
        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        out.push('\n');

        for inc in &self.body.includes {
            if inc.is_c_include {
                writeln!(out, "#include \"{}\"", inc.value)?;
            }
        }

        for def in &self.body.structs {
            if def.template_params.is_empty() {
                let qualified = format!("{}.{}", ctx.module_dotted(), def.name);
                ensure_struct_registered(def, &qualified, ctx);
                writeln!(out, "struct {};", def.name)?;
            }
        }
        out.push('\n');

        for def in &self.body.structs {
            if def.template_params.is_empty() && matches!(def.visibility, tauc_par::ast::Visibility::Public) {
                emit_struct_body(out, def, ctx)?;
            }
        }

        for func in &self.body.functions {
            if func.template_params.is_empty() && matches!(func.visibility, tauc_par::ast::Visibility::Public) {
                emit_function_prototype(out, func, false, ctx)?;
            }
        }

        writeln!(out, "#endif")?;
        Ok(())
    }

    fn emit_body(&self, out: &mut String, ctx: &mut EmitContext) -> EmitResult<()> {
        writeln!(out, "#include <stdbool.h>")?;
        writeln!(out, "#include <stdlib.h>")?;
        out.push('\n');
        writeln!(out, "#include \"tautypes.h\"")?;
        writeln!(out, "#include \"{}.h\"", ctx.module_dotted())?;
        out.push('\n');

        ctx.scope.add(ctx.module_dotted(), ItemInfo::module());

        for inc in &self.body.includes {
            if inc.is_c_include {
                writeln!(out, "#include \"{}\"", inc.value)?;
            }
        }

        for def in &self.body.structs {
            if def.template_params.is_empty() {
                writeln!(out, "struct {};", def.name)?;
            }
        }
        out.push('\n');

        for def in &self.body.structs {
            if def.template_params.is_empty() && matches!(def.visibility, tauc_par::ast::Visibility::Private) {
                emit_struct_body(out, def, ctx)?;
            }
        }

        for func in &self.body.functions {
            if func.template_params.is_empty() {
                let private = matches!(func.visibility, tauc_par::ast::Visibility::Private);
                emit_function_prototype(out, func, private, ctx)?;
            }
        }
        out.push('\n');

        for func in &self.body.functions {
            if func.template_params.is_empty() {
                emit_function_def(out, func, ctx)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauc_lex::{tokenize, TokenKind, TokenStream};

    fn build(src: &str) -> (Module, TypeRegistry, Scope) {
        let tokens = tokenize(src, "t.tau").expect("lex ok");
        let tokens: Vec<_> = tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
            .collect();
        let mut stream = TokenStream::new(tokens, "t.tau");
        let mut types = TypeRegistry::new();
        let mut scope = Scope::new();
        let module = tauc_par::parse(&mut stream, &mut types, &mut scope).expect("parse ok");
        (module, types, scope)
    }

    #[test]
    fn minimal_module_header_declares_main_prototype() {
        let (module, mut types, mut scope) = build("mod app; pub fn main() void { return; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut header = String::new();
        module.emit_header(&mut header, &mut ctx).unwrap();
        assert!(header.contains("void main();"));
        assert!(!header.contains("{"));
    }

    #[test]
    fn minimal_module_body_defines_main() {
        let (module, mut types, mut scope) = build("mod app; pub fn main() void { return; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut body = String::new();
        module.emit_body(&mut body, &mut ctx).unwrap();
        assert!(body.contains("#include \"tautypes.h\""));
        assert!(body.contains("#include \"app.h\""));
        assert!(body.contains("void main() {"));
        assert!(body.contains("return;"));
    }

    #[test]
    fn header_contains_only_the_public_struct_body() {
        let (module, mut types, mut scope) =
            build("mod app; pub struct P { pub i32 x; } struct Q { i32 y; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut header = String::new();
        module.emit_header(&mut header, &mut ctx).unwrap();
        assert!(header.contains("struct P {"));
        assert!(!header.contains("struct Q {"));
        assert!(header.contains("struct P;"));
        assert!(header.contains("struct Q;"));
    }

    #[test]
    fn body_contains_only_the_private_struct_body() {
        let (module, mut types, mut scope) =
            build("mod app; pub struct P { pub i32 x; } struct Q { i32 y; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut body = String::new();
        module.emit_body(&mut body, &mut ctx).unwrap();
        assert!(body.contains("struct Q {"));
        assert!(!body.contains("struct P {"));
        assert!(body.contains("struct P;"));
        assert!(body.contains("struct Q;"));
    }

    #[test]
    fn addition_of_two_integer_literals_emits_plus() {
        let (module, mut types, mut scope) =
            build("mod app; fn f() i32 { return 1 + 2; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut body = String::new();
        module.emit_body(&mut body, &mut ctx).unwrap();
        assert!(body.contains("1 + 2"));
    }

    #[test]
    fn private_function_prototype_is_static_in_body_only() {
        let (module, mut types, mut scope) = build("mod app; fn helper() void { return; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut header = String::new();
        module.emit_header(&mut header, &mut ctx).unwrap();
        assert!(!header.contains("helper"));

        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut body = String::new();
        module.emit_body(&mut body, &mut ctx).unwrap();
        assert!(body.contains("static void helper();"));
    }

    #[test]
    fn inline_c_block_is_passed_through_with_a_newline_after_semicolons() {
        let (module, mut types, mut scope) =
            build("mod app; fn f() void { inline _C { printf(\"%d\", 1); } }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut body = String::new();
        module.emit_body(&mut body, &mut ctx).unwrap();
        assert!(body.contains("printf ( \"%d\" , 1 ) ;\n"));
    }

    #[test]
    fn binary_operator_on_incompatible_types_fails_emission() {
        let (module, mut types, mut scope) =
            build("mod app; fn f() bool { return 1 + true; }");
        let mut ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
        let mut body = String::new();
        assert!(module.emit_body(&mut body, &mut ctx).is_err());
    }
}
