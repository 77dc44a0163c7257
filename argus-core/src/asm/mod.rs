//! The Argus two-pass assembler: macro preprocessing, pass 1 address assignment, and
//! pass 2 word emission, tied together behind one [`assemble`] entry point.

mod diagnostics;
mod lineparse;
mod pass1;
mod pass2;
mod preprocessor;
mod symtab;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use preprocessor::Preprocessor;
pub use symtab::SymbolTable;

/// The result of assembling one source file: the emitted memory image (already zero-padded
/// to the full 16 384-word address space), the final symbol table, and any diagnostics
/// collected across both passes.
pub struct AssembledProgram {
    pub words: Vec<u32>,
    pub symtab: SymbolTable,
    pub diagnostics: Diagnostics,
}

/// Run the full assembler pipeline over `source`: macro expansion, pass 1 (address
/// assignment), pass 2 (word emission). Never aborts early; diagnostics are collected and
/// returned alongside whatever image could be produced, per the error-collection design.
pub fn assemble(source: &str) -> AssembledProgram {
    let mut preprocessor = Preprocessor::new();
    let lines = preprocessor.expand(source);

    let mut diagnostics = Diagnostics::new();
    let symtab = pass1::run(&lines, &mut diagnostics);
    let words = pass2::run(&lines, &symtab, &mut diagnostics);

    AssembledProgram {
        words,
        symtab,
        diagnostics,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assembles_worked_scenario_one_end_to_end() {
        let program = assemble("start: ldc r1,#0x5\nhalt\n");
        assert!(program.diagnostics.is_empty());
        let start = crate::word::register::DEFAULT_START as usize;
        assert_eq!(program.words[start], 0x001484);
        assert_eq!(program.words[start + 1], 0x000380);
        assert_eq!(program.symtab.get("start"), Some(start as u32));
        assert_eq!(program.words.len(), crate::word::MEMORY_SIZE);
    }

    #[test]
    fn expands_a_macro_before_assembling() {
        let source = "MACRO inc(X)\nadd X,#1\nENDMACRO\ninc(r2)\n";
        let program = assemble(source);
        assert!(program.diagnostics.is_empty());
        let start = crate::word::register::DEFAULT_START as usize;
        let decoded = crate::isa::decode(program.words[start]).unwrap();
        assert_eq!(decoded.opcode, crate::isa::Opcode::Addc);
        assert_eq!(decoded.x, 2);
        assert_eq!(decoded.n, 1);
    }

    #[test]
    fn equ_without_a_colon_is_available_to_later_expressions() {
        let source = "VAL EQU 0x10\nldc r1,#VAL\n";
        let program = assemble(source);
        assert!(program.diagnostics.is_empty());
        let start = crate::word::register::DEFAULT_START as usize;
        let decoded = crate::isa::decode(program.words[start]).unwrap();
        assert_eq!(decoded.n, 0x10);
    }

    #[test]
    fn assembled_program_loads_directly_into_the_emulator() {
        let program = assemble("start: ldc r1,#0x5\nhalt\n");
        assert!(program.diagnostics.is_empty());
        let mut emulator = crate::emu::Emulator::new(
            crate::word::Memory::load(&program.words),
            crate::isa::Dialect::Argus500,
        );
        let summary = emulator.run_to_completion(false).unwrap();
        assert_eq!(summary.instr_count, 2);
        assert_eq!(
            emulator.memory().read(crate::word::register::INPUT_BASE + 1),
            5
        );
    }
}
