//! `argus-asm` - command-line front end for the two-pass Argus assembler. All real work
//! happens in `argus-core`; this binary only parses flags, does file I/O, and renders
//! diagnostics and the listing.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;

use argus_core::asm;
use argus_core::format;
use argus_core::word::MEMORY_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Hex,
    Bin,
}

#[derive(Parser)]
#[command(author, version, about = "Two-pass assembler for the Argus 400/500 CPU family", long_about = None)]
struct Cli {
    /// Assembler source file
    #[arg(short = 'f', long = "filename")]
    filename: PathBuf,

    /// Destination for the assembled code; if omitted, only the listing is printed
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output encoding for the assembled code
    #[arg(short = 'g', long = "format", value_enum, default_value = "hex")]
    format: OutputFormat,

    /// Suppress the listing to stdout while assembling
    #[arg(short = 'n', long = "nolisting")]
    nolisting: bool,

    /// First word address to include in the written output
    #[arg(short = 's', long = "start_adr", default_value_t = 0)]
    start_adr: usize,

    /// Number of words to include in the written output (default: rest of memory)
    #[arg(short = 'z', long = "size", default_value_t = 0)]
    size: usize,
}

const HEADER_TEXT: &str = "\
-------------------------------------------------------------------------
 A r g u s  *  A S S E M B L E R
-------------------------------------------------------------------------
 ADDR : CODE                 : SOURCE
------:----------------------:-------------------------------------------";

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.filename)
        .map_err(|e| format!("failed to read {}: {}", cli.filename.display(), e))?;

    let program = asm::assemble(&source);

    if !cli.nolisting {
        println!("{}", HEADER_TEXT);
        print_listing(&program);
    }

    for diagnostic in program.diagnostics.iter() {
        eprintln!("{}", diagnostic.nice_message());
    }
    let error_count = program
        .diagnostics
        .iter()
        .filter(|d| d.severity == asm::Severity::Error)
        .count();
    let summary = format!(
        "\nAssembled {} words of code with {} error(s).",
        program.words.iter().filter(|w| **w != 0).count(),
        error_count,
    );
    if error_count > 0 {
        println!("{}", summary.red());
    } else {
        println!("{}", summary.green());
    }

    if let Some(output_path) = &cli.output {
        if program.diagnostics.has_errors() {
            return Err("refusing to write output: assembly had errors".to_string());
        }

        let start = cli.start_adr.min(MEMORY_SIZE);
        let size = if cli.size == 0 {
            MEMORY_SIZE - start
        } else {
            cli.size
        };
        let end = (start + size).min(MEMORY_SIZE);
        let slice = &program.words[start..end];

        match cli.format {
            OutputFormat::Hex => {
                fs::write(output_path, format::to_hex_text(slice))
                    .map_err(|e| format!("failed to write {}: {}", output_path.display(), e))?;
            }
            OutputFormat::Bin => {
                fs::write(output_path, format::to_binary_bytes(slice))
                    .map_err(|e| format!("failed to write {}: {}", output_path.display(), e))?;
            }
        }
    }

    if program.diagnostics.has_errors() {
        Err(format!("{} error(s) during assembly", program.diagnostics.len()))
    } else {
        Ok(())
    }
}

/// A simple word-dump listing: every nonzero (i.e. assembled) address alongside its word,
/// twelve to a line. The assembler doesn't retain a per-source-line address map, so this
/// traces the final image rather than interleaving words with the original source text.
fn print_listing(program: &asm::AssembledProgram) {
    let last_nonzero = program.words.iter().rposition(|w| *w != 0).unwrap_or(0);
    for (addr, chunk) in program.words[..=last_nonzero].chunks(8).enumerate() {
        let base = addr * 8;
        if chunk.iter().all(|w| *w == 0) {
            continue;
        }
        let code = chunk
            .iter()
            .map(|w| format!("{:06x}", w))
            .collect::<Vec<_>>()
            .join(" ");
        println!(" {:04x} : {}", base, code);
    }

    println!("\nSymbol Table:\n");
    let mut symbols: Vec<(&str, u32)> = program.symtab.iter().collect();
    symbols.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in symbols {
        if name.len() <= 2 && name.starts_with('r') {
            continue;
        }
        println!(" {:<28} 0x{:06X} ({})", name, value, value);
    }
}
