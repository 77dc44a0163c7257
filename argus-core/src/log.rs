//! A tiny file-backed logger, for output that would otherwise be lost when stdout is
//! reserved for a program's interactive listing.

use std::fs::{self, OpenOptions};
use std::io::Write;

pub fn init_log(path: &str) {
    match fs::File::create(path) {
        Ok(_) => {}
        // The file may already exist from a previous run; that's fine, we're about to append.
        Err(_) => {}
    };
}

/// Append a line to the log file at `path`.
pub fn log(path: &str, text: &str) {
    let mut file = match OpenOptions::new().write(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let _ = file.write_all(text.as_bytes());
    let _ = file.write_all(b"\n");
}
