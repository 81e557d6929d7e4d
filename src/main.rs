use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

#[derive(Parser)]
#[command(name = "tinylang", about = "Compile a tinylang source file to a pseudo-assembly listing")]
struct Cli {
  /// Source file to compile.
  input: PathBuf,

  /// Write the listing here instead of stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Dump the parsed tree before the listing.
  #[arg(long)]
  emit_ast: bool,

  /// Treat semantic diagnostics as fatal and emit nothing.
  #[arg(long)]
  deny_diagnostics: bool,
}

fn main() {
  let cli = Cli::parse();

  let source = match fs::read_to_string(&cli.input) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("cannot read {}: {err}", cli.input.display());
      process::exit(1);
    }
  };

  let compilation = match tinylang::compile(&source) {
    Ok(compilation) => compilation,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  for diagnostic in &compilation.diagnostics {
    eprintln!("warning: {diagnostic}");
  }
  if cli.deny_diagnostics && !compilation.diagnostics.is_empty() {
    eprintln!(
      "aborting: {} semantic diagnostic(s)",
      compilation.diagnostics.len()
    );
    process::exit(1);
  }

  if cli.emit_ast {
    eprintln!("{:#?}", compilation.program);
  }

  match &cli.output {
    Some(path) => {
      if let Err(err) = fs::write(path, &compilation.assembly) {
        eprintln!("cannot write {}: {err}", path.display());
        process::exit(1);
      }
    }
    None => print!("{}", compilation.assembly),
  }
}
