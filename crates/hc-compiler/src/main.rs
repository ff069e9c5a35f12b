//! HC compiler CLI.
//!
//! Grounded in the teacher's `compiler/src/main.rs` (a single `clap`
//! derive struct, `process::exit` on failure) and the `tracing_subscriber`
//! setup in `crates/lsp/src/main.rs` (`EnvFilter::from_default_env` plus
//! a crate-scoped default directive, writer on stderr so stdout stays
//! clean for the emitted assembly).

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use hccompile::config::CompilerConfig;

#[derive(ClapParser)]
#[command(name = "hccompile")]
#[command(about = "Compile HC source to Human Resource Machine assembly", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// HC source file. Reads stdin if omitted.
    input: Option<PathBuf>,

    /// Skip variable merging and empty-block/fall-through cleanup.
    #[arg(long)]
    no_optimize: bool,

    /// Keep every jump explicit; skip fall-through elision.
    #[arg(long)]
    explicit_jumps: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("hccompile=info".parse().unwrap()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match read_source(cli.input.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let config = CompilerConfig::new()
        .with_optimize(!cli.no_optimize)
        .with_explicit_jumps(cli.explicit_jumps);

    match hccompile::compile(&source, &config) {
        Ok(asm) => {
            if let Err(e) = io::stdout().write_all(asm.as_bytes()) {
                eprintln!("Error: {e}");
                process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn read_source(input: Option<&std::path::Path>) -> io::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_source_from_a_file_argument() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "forever\n    output input\n").unwrap();
        let source = read_source(Some(file.path())).unwrap();
        assert_eq!(source, "forever\n    output input\n");
    }

    #[test]
    fn missing_file_argument_is_an_io_error() {
        let err = read_source(Some(std::path::Path::new("/does/not/exist.hc"))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
