//! The Argus emulator core: fetch/decode/execute loop, ALU/shift/branch semantics, the
//! per-model timing accumulator, and the console-output side channel.

mod cpu;
mod trace;

pub use cpu::{Emulator, Fault, FaultKind, RunSummary, State, StepEvent};
pub use trace::LISTING_HEADER;
