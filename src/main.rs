//! bindery - compose EPUB books from a JSON description

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bindery::{BookOptions, EpubComposer, FsLoader, RandomNames};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "Compose EPUB books from HTML fragments", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery book.json book.epub             Compose book.json into book.epub
    bindery book.json book.epub --seed 42   Reproducible file names and identifier

Image paths and the cover path in the JSON are resolved relative to the
JSON file's directory.")]
struct Cli {
    /// Book description (JSON)
    #[arg(value_name = "BOOK")]
    input: PathBuf,

    /// Output file (must end in .epub)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Seed for generated names and the book identifier
    #[arg(long)]
    seed: Option<u64>,

    /// Log pipeline progress
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match compose(&cli) {
        Ok(()) => {
            if !cli.quiet {
                println!("Wrote {}", cli.output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn compose(cli: &Cli) -> Result<(), String> {
    let json = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let options: BookOptions = serde_json::from_str(&json)
        .map_err(|e| format!("{}: invalid book description: {e}", cli.input.display()))?;

    let root = cli
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut composer = EpubComposer::new(options)
        .map_err(|e| e.to_string())?
        .with_loader(FsLoader::with_root(root));
    if let Some(seed) = cli.seed {
        composer = composer.with_names(RandomNames::seeded(seed));
    }
    composer.compose(&cli.output).map_err(|e| e.to_string())
}
