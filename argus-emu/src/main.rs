//! `argus-emu` - command-line front end for the Argus instruction-set emulator. Drives
//! `argus-core`'s fetch/decode/execute loop to a halt or fault and renders the trace, any
//! console output, and (for the Argus 500 dialect) the per-model timing report.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use argus_core::emu::{Emulator, FaultKind, State, LISTING_HEADER};
use argus_core::format;
use argus_core::isa::{Dialect, Model, ALL_MODELS};
use argus_core::log;
use argus_core::word::Memory;

const LOG_PATH: &str = "argus-emu.log";

#[derive(Parser)]
#[command(author, version, about = "Instruction-set emulator for the Argus 400/500 CPU family", long_about = None)]
struct Cli {
    /// Hex-format memory image to load and run
    #[arg(short = 'f', long = "filename")]
    filename: PathBuf,

    /// Suppress the trace listing to stdout
    #[arg(short = 'n', long = "nolisting")]
    nolisting: bool,

    /// Disassemble using the Argus 100 mnemonic table
    #[arg(short = '1', long = "100")]
    argus100: bool,

    /// Disassemble using the Argus 400 mnemonic table
    #[arg(short = '4', long = "400")]
    argus400: bool,

    /// Disassemble using the Argus 500 mnemonic table and print the timing report (default)
    #[arg(short = '5', long = "500")]
    argus500: bool,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let dialect = if cli.argus100 {
        Dialect::Argus100
    } else if cli.argus400 {
        Dialect::Argus400
    } else {
        Dialect::Argus500
    };
    let track_timing = dialect.is_argus_500();

    let text = fs::read_to_string(&cli.filename)
        .map_err(|e| format!("failed to read {}: {}", cli.filename.display(), e))?;
    let words = format::parse_hex_text(&text)?;

    log::init_log(LOG_PATH);

    let mut emulator = Emulator::new(Memory::load(&words), dialect);

    if !cli.nolisting {
        println!("{}", LISTING_HEADER);
    }

    let mut console_buffer = Vec::new();
    loop {
        let event = match emulator.step(track_timing) {
            Ok(None) => break,
            Ok(Some(event)) => event,
            Err(fault) => {
                eprintln!("{}", fault_message(&fault).red().bold());
                log::log(LOG_PATH, &fault_message(&fault));
                return Err(format!("emulation faulted at pc {:#06x}", fault.pc));
            }
        };

        if !cli.nolisting {
            println!("{}", event.trace_line);
        }
        log::log(LOG_PATH, &event.trace_line);

        if let Some(byte) = event.console_byte {
            if cli.nolisting {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                let _ = handle.write_all(&[byte]);
                let _ = handle.flush();
            } else {
                console_buffer.push(byte);
            }
        }

        if event.halted {
            break;
        }
    }

    if !console_buffer.is_empty() {
        println!("\nConsole output:");
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(&console_buffer);
        let _ = handle.write_all(b"\n");
    }

    println!(
        "\nHalted after {} instruction(s) at pc {:#06x}.",
        emulator.instr_count(),
        emulator.pc()
    );

    if track_timing {
        print_timing_report(emulator.timings_us());
    }

    match emulator.state() {
        State::Halted => Ok(()),
        State::Faulted => Err("emulator halted in a faulted state".to_string()),
        State::Running => Err("emulator stopped while still running".to_string()),
    }
}

fn fault_message(fault: &argus_core::emu::Fault) -> String {
    let kind = match fault.kind {
        FaultKind::DecodeFault => "decode fault: operand address coincides with accumulator".to_string(),
        FaultKind::UnimplementedOpcode(op) => format!("unimplemented opcode {:?} on this dialect", op),
        FaultKind::DivideByZero => "division by zero".to_string(),
    };
    format!("fault at pc {:#06x}: {}", fault.pc, kind)
}

fn print_timing_report(timings_us: [f64; 5]) {
    println!("\nTiming report (estimated, microseconds):");
    for model in ALL_MODELS {
        println!("  {:<12} {:>12.2} us", model_name(model), timings_us[model_index(model)]);
    }
}

fn model_name(model: Model) -> &'static str {
    model.name()
}

fn model_index(model: Model) -> usize {
    ALL_MODELS.iter().position(|m| *m == model).unwrap()
}
