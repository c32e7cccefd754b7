//! Driver: wires the lexer, parser, and emitter together into a single
//! per-file compilation, and writes the results to disk. Invoking an
//! external C compiler on the produced `.h`/`.c` pair is the CLI's job,
//! not this crate's — see `main.rs`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tauc_gen::{EmitContext, EmitModule};
use tauc_lex::{tokenize, TokenKind, TokenStream};
use tauc_par::ast::Module;
use tauc_sem::{Scope, TypeRegistry};

/// One source file's compiled output: the module's AST plus the two C
/// texts the emitter produced from it.
#[derive(Debug)]
pub struct Compiled {
    pub module: Module,
    pub header: String,
    pub body: String,
}

/// Run the full pipeline — lex, parse, emit header, emit body — over one
/// source file's text. `file_name` is used only for error locations.
pub fn compile_source(source: &str, file_name: &str) -> Result<Compiled> {
    let tokens = tokenize(source, file_name)
        .with_context(|| format!("lexing {file_name}"))?;
    let tokens: Vec<_> = tokens
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
        .collect();
    let mut stream = TokenStream::new(tokens, file_name);

    let mut types = TypeRegistry::new();
    let mut scope = Scope::new();
    let module = tauc_par::parse(&mut stream, &mut types, &mut scope)
        .with_context(|| format!("parsing {file_name}"))?;

    let mut header_ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
    let mut header = String::new();
    module
        .emit_header(&mut header, &mut header_ctx)
        .with_context(|| format!("emitting header for {}", module.dotted_name()))?;

    let mut body_ctx = EmitContext::new(&mut types, &mut scope, module.name_path.clone());
    let mut body = String::new();
    module
        .emit_body(&mut body, &mut body_ctx)
        .with_context(|| format!("emitting body for {}", module.dotted_name()))?;

    Ok(Compiled { module, header, body })
}

/// Compile `source` and write `<module>.h` / `<module>.c` into `out_dir`,
/// returning the two paths written.
pub fn compile_to_dir(source: &str, file_name: &str, out_dir: &Path) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    let compiled = compile_source(source, file_name)?;
    if !out_dir.exists() {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    }
    let stem = compiled.module.dotted_name();
    let header_path = out_dir.join(format!("{stem}.h"));
    let body_path = out_dir.join(format!("{stem}.c"));
    std::fs::write(&header_path, &compiled.header)
        .with_context(|| format!("writing {}", header_path.display()))?;
    std::fs::write(&body_path, &compiled.body)
        .with_context(|| format!("writing {}", body_path.display()))?;
    Ok((header_path, body_path))
}

/// Read `input`, compile it, and write its header/body next to `out_dir`.
/// Fails loudly (rather than silently skipping) on a missing input file,
/// matching the CLI's one-file-at-a-time contract.
pub fn compile_file(input: &Path, out_dir: &Path) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    if !input.exists() {
        bail!("input file not found: {}", input.display());
    }
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let file_name = input.to_string_lossy();
    compile_to_dir(&source, &file_name, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_module_compiles_to_header_and_body() {
        let compiled =
            compile_source("mod app; pub fn main() void { return; }", "t.tau").unwrap();
        assert!(compiled.header.contains("void main();"));
        assert!(compiled.body.contains("void main() {"));
    }

    #[test]
    fn compile_to_dir_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let (header_path, body_path) = compile_to_dir(
            "mod app; pub fn main() void { return; }",
            "t.tau",
            dir.path(),
        )
        .unwrap();
        assert!(header_path.exists());
        assert!(body_path.exists());
        assert_eq!(header_path.file_name().unwrap(), "app.h");
        assert_eq!(body_path.file_name().unwrap(), "app.c");
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = compile_file(Path::new("/no/such/file.tau"), dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn parse_error_is_reported_with_context() {
        let result = compile_source("mod app; fn f() void { nosuch v; }", "t.tau");
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("parsing t.tau"));
    }
}
