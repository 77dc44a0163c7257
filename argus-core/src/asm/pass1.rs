//! Pass 1: walk the macro-expanded source, assigning addresses to labels and binding `EQU`
//! symbols. Does not validate mnemonics or evaluate operand expressions beyond what `EQU`
//! and `ORG` require.

use crate::expr;
use crate::word::register::DEFAULT_START;

use super::diagnostics::{Diagnostic, Diagnostics};
use super::lineparse::{parse_line, directive_word_count, Directive};
use super::symtab::{SymResolver, SymbolTable};

pub(crate) fn run(lines: &[String], diagnostics: &mut Diagnostics) -> SymbolTable {
    let mut symtab = SymbolTable::new();
    // The original assembler starts its address counter at 0, requiring every source file to
    // open with an explicit `ORG` to reach loadable memory. Defaulting to `DEFAULT_START`
    // instead means a program with no `ORG` assembles directly into the address the emulator's
    // PC always starts at, matching the worked scenarios (`ORG`-free sources that run as-is).
    let mut nextmem: u32 = DEFAULT_START as u32;

    for (line_no, raw) in lines.iter().enumerate() {
        let parsed = parse_line(raw);

        match &parsed.directive {
            Some(Directive::Equ(expr_text)) => {
                let resolver = SymResolver {
                    symbols: &symtab,
                    pc: nextmem,
                };
                match expr::eval(expr_text, &resolver) {
                    Ok(value) => match &parsed.label {
                        Some(label) => {
                            if let Err(message) = symtab.define(label, value) {
                                diagnostics.push(Diagnostic::error(line_no, raw, message));
                            }
                        }
                        None => diagnostics.push(Diagnostic::error(
                            line_no,
                            raw,
                            "EQU without a label",
                        )),
                    },
                    Err(err) => diagnostics.push(Diagnostic::error(line_no, raw, err.to_string())),
                }
            }
            Some(Directive::Org(expr_text)) => {
                if let Some(label) = &parsed.label {
                    if let Err(message) = symtab.define(label, nextmem) {
                        diagnostics.push(Diagnostic::error(line_no, raw, message));
                    }
                }
                let resolver = SymResolver {
                    symbols: &symtab,
                    pc: nextmem,
                };
                match expr::eval(expr_text, &resolver) {
                    Ok(value) => nextmem = value,
                    Err(err) => diagnostics.push(Diagnostic::error(line_no, raw, err.to_string())),
                }
            }
            Some(other) => {
                if let Some(label) = &parsed.label {
                    if let Err(message) = symtab.define(label, nextmem) {
                        diagnostics.push(Diagnostic::error(line_no, raw, message));
                    }
                }
                nextmem += directive_word_count(other);
            }
            None => {
                if let Some(label) = &parsed.label {
                    if let Err(message) = symtab.define(label, nextmem) {
                        diagnostics.push(Diagnostic::error(line_no, raw, message));
                    }
                }
                if parsed.mnemonic.is_some() {
                    nextmem += 1;
                }
            }
        }
    }

    symtab
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn binds_labels_to_the_current_address() {
        let lines = vec!["start: ldc r1,#0x5".to_string(), "halt".to_string()];
        let mut diagnostics = Diagnostics::new();
        let symtab = run(&lines, &mut diagnostics);
        assert_eq!(symtab.get("start"), Some(DEFAULT_START as u32));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn equ_binds_the_evaluated_expression() {
        let lines = vec!["VAL EQU 0x10 + 1".to_string()];
        let mut diagnostics = Diagnostics::new();
        let symtab = run(&lines, &mut diagnostics);
        assert_eq!(symtab.get("val"), Some(0x11));
    }

    #[test]
    fn org_moves_the_address_counter() {
        let lines = vec![
            "ORG 0x2000".to_string(),
            "here: halt".to_string(),
        ];
        let mut diagnostics = Diagnostics::new();
        let symtab = run(&lines, &mut diagnostics);
        assert_eq!(symtab.get("here"), Some(0x2000));
    }

    #[test]
    fn redefinition_is_collected_as_a_diagnostic() {
        let lines = vec![
            "start: halt".to_string(),
            "start: halt".to_string(),
        ];
        let mut diagnostics = Diagnostics::new();
        run(&lines, &mut diagnostics);
        assert!(diagnostics.has_errors());
    }
}
