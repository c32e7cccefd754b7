use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Compile a `tau` source file to a C header and body.
#[derive(Parser)]
#[command(name = "tauc", version, about)]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Directory the generated `<module>.h` / `<module>.c` are written
    /// into.
    #[arg(short, long, default_value = "tmp")]
    out_dir: PathBuf,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let (header_path, body_path) = tauc_drv::compile_file(&cli.input, &cli.out_dir)?;
    tracing::info!(header = %header_path.display(), body = %body_path.display(), "wrote output");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
