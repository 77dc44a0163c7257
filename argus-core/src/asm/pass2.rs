//! Pass 2: re-walk the macro-expanded source with the complete symbol table and emit
//! 24-bit words.

use crate::expr;
use crate::isa::{self, Opcode};
use crate::word::{mask_addr, mask_word, register::DEFAULT_START, MEMORY_SIZE};

use super::diagnostics::{Diagnostic, Diagnostics};
use super::lineparse::{parse_line, Directive};
use super::symtab::{SymResolver, SymbolTable};

/// Write `value` at `addr`, wrapping into the 16 384-word address space the same way the
/// memory model does. `addr` is a free-running counter driven by `ORG`, so it can in
/// principle run past the end of the space; wrapping (rather than panicking) matches the
/// memory model's own indexing and keeps the assembler from crashing on a pathological input.
fn write_word(words: &mut [u32], addr: u32, value: u32) {
    words[(addr as usize) & (MEMORY_SIZE - 1)] = value;
}

/// Emit words directly into their assigned addresses, indexed by the same `nextmem` counter
/// pass 1 used to assign label values — so a label's bound address and the word it names
/// always coincide, including after an `ORG` jump.
pub(crate) fn run(lines: &[String], symtab: &SymbolTable, diagnostics: &mut Diagnostics) -> Vec<u32> {
    let mut words = vec![0u32; MEMORY_SIZE];
    // Must track pass 1's starting address exactly (see the comment there) so label values
    // and the words emitted at them continue to coincide.
    let mut nextmem: u32 = DEFAULT_START as u32;

    for (line_no, raw) in lines.iter().enumerate() {
        let parsed = parse_line(raw);

        match &parsed.directive {
            Some(Directive::Equ(_)) => {}
            Some(Directive::Org(expr_text)) => {
                let resolver = SymResolver { symbols: symtab, pc: nextmem };
                match expr::eval(expr_text, &resolver) {
                    Ok(value) => nextmem = value,
                    Err(err) => diagnostics.push(Diagnostic::error(line_no, raw, err.to_string())),
                }
            }
            Some(Directive::Word(exprs)) => {
                let resolver = SymResolver { symbols: symtab, pc: nextmem };
                for (i, expr_text) in exprs.iter().enumerate() {
                    match expr::eval(expr_text, &resolver) {
                        Ok(value) => write_word(&mut words, nextmem + i as u32, mask_word(value)),
                        Err(err) => {
                            diagnostics.push(Diagnostic::error(line_no, raw, err.to_string()));
                        }
                    }
                }
                nextmem += exprs.len() as u32;
            }
            Some(Directive::Byte(exprs)) => {
                let resolver = SymResolver { symbols: symtab, pc: nextmem };
                let mut bytes = Vec::with_capacity(exprs.len());
                for expr_text in exprs {
                    match expr::eval(expr_text, &resolver) {
                        Ok(value) => bytes.push((value & 0xFF) as u8),
                        Err(err) => {
                            diagnostics.push(Diagnostic::error(line_no, raw, err.to_string()));
                            bytes.push(0);
                        }
                    }
                }
                for (i, word) in pack_bytes(&bytes).into_iter().enumerate() {
                    write_word(&mut words, nextmem + i as u32, word);
                }
                nextmem += ((exprs.len() as u32) + 2) / 3;
            }
            Some(Directive::StringDir(text)) => {
                for (i, ch) in text.chars().enumerate() {
                    write_word(&mut words, nextmem + i as u32, ch as u32 & 0xFF);
                }
                nextmem += text.chars().count() as u32;
            }
            Some(Directive::BString(text)) => {
                let bytes: Vec<u8> = text.bytes().collect();
                for (i, word) in pack_bytes(&bytes).into_iter().enumerate() {
                    write_word(&mut words, nextmem + i as u32, word);
                }
                nextmem += ((bytes.len() as u32) + 2) / 3;
            }
            Some(Directive::PbString(text)) => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.push((text.len() % 256) as u8);
                bytes.extend(text.bytes());
                for (i, word) in pack_bytes(&bytes).into_iter().enumerate() {
                    write_word(&mut words, nextmem + i as u32, word);
                }
                nextmem += ((bytes.len() as u32) + 2) / 3;
            }
            None => {
                if let Some(mnemonic) = &parsed.mnemonic {
                    let word = assemble_instruction(
                        mnemonic,
                        &parsed.operand_text,
                        symtab,
                        nextmem,
                        line_no,
                        raw,
                        diagnostics,
                    );
                    write_word(&mut words, nextmem, word);
                    nextmem += 1;
                }
            }
        }
    }

    words
}

/// Pack bytes three-to-a-word, little-endian within the word, zero-padding the final word.
fn pack_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(3)
        .map(|chunk| {
            let b0 = chunk[0] as u32;
            let b1 = *chunk.get(1).unwrap_or(&0) as u32;
            let b2 = *chunk.get(2).unwrap_or(&0) as u32;
            b0 | (b1 << 8) | (b2 << 16)
        })
        .collect()
}

fn assemble_instruction(
    mnemonic: &str,
    operand_text: &str,
    symtab: &SymbolTable,
    nextmem: u32,
    line_no: usize,
    raw: &str,
    diagnostics: &mut Diagnostics,
) -> u32 {
    let opcode = match Opcode::lookup(mnemonic) {
        Some(op) => op,
        None => {
            diagnostics.push(Diagnostic::error(
                line_no,
                raw,
                format!("unknown mnemonic: {}", mnemonic),
            ));
            return 0;
        }
    };

    let pc = nextmem + 1;
    let resolver = SymResolver { symbols: symtab, pc };

    if opcode == Opcode::Halt {
        return isa::encode(Opcode::Halt, 0, 0, 0);
    }

    if opcode == Opcode::Jp || opcode == Opcode::Jpovr {
        let (expr_text, m) = parse_modifier_suffix(operand_text);
        return match expr::eval(&expr_text, &resolver) {
            Ok(value) => isa::encode(opcode, 0, m, mask_addr(value)),
            Err(err) => {
                diagnostics.push(Diagnostic::error(line_no, raw, err.to_string()));
                0
            }
        };
    }

    let comma = match operand_text.find(',') {
        Some(idx) => idx,
        None => {
            diagnostics.push(Diagnostic::error(
                line_no,
                raw,
                "expected 'rX, <expr>' operand",
            ));
            return 0;
        }
    };

    let (reg_part, rest) = operand_text.split_at(comma);
    let rest = &rest[1..];

    let x = match parse_register(reg_part) {
        Some(x) if x <= 7 => x,
        Some(_) => {
            diagnostics.push(Diagnostic::error(
                line_no,
                raw,
                "register number out of 0..7",
            ));
            return 0;
        }
        None => {
            diagnostics.push(Diagnostic::error(line_no, raw, "expected register operand"));
            return 0;
        }
    };

    let (mut expr_text, m) = parse_modifier_suffix(rest);
    let mut final_opcode = opcode;
    if let Some(stripped) = expr_text.trim_start().strip_prefix('#') {
        if let Some(immediate_opcode) = opcode.immediate_form() {
            final_opcode = immediate_opcode;
            expr_text = stripped.to_string();
        }
    }

    match expr::eval(&expr_text, &resolver) {
        Ok(value) => isa::encode(final_opcode, x, m, mask_addr(value)),
        Err(err) => {
            diagnostics.push(Diagnostic::error(line_no, raw, err.to_string()));
            0
        }
    }
}

fn parse_register(text: &str) -> Option<u8> {
    let trimmed = text.trim();
    if trimmed.len() > 1 && (trimmed.starts_with('r') || trimmed.starts_with('R')) {
        trimmed[1..].parse::<u8>().ok()
    } else {
        None
    }
}

/// Split a trailing `!rN` modifier-register suffix off an operand expression, if present.
fn parse_modifier_suffix(text: &str) -> (String, u8) {
    let trimmed = text.trim();
    if let Some(idx) = trimmed.rfind('!') {
        let (expr_part, suffix) = trimmed.split_at(idx);
        let suffix = suffix[1..].trim();
        if suffix.len() > 1 && (suffix.starts_with('r') || suffix.starts_with('R')) {
            if let Ok(m) = suffix[1..].parse::<u8>() {
                return (expr_part.trim().to_string(), m & 0x03);
            }
        }
    }
    (trimmed.to_string(), 0)
}

#[cfg(test)]
mod test {
    use super::super::pass1;
    use super::*;

    fn assemble(lines: &[&str]) -> (Vec<u32>, Diagnostics) {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let mut diagnostics = Diagnostics::new();
        let symtab = pass1::run(&lines, &mut diagnostics);
        let words = run(&lines, &symtab, &mut diagnostics);
        (words, diagnostics)
    }

    #[test]
    fn encodes_worked_scenario_one() {
        let (words, diagnostics) = assemble(&["start: ldc r1,#0x5", "halt"]);
        assert!(diagnostics.is_empty());
        let start = DEFAULT_START as usize;
        assert_eq!(&words[start..start + 2], &[0x001484, 0x000380]);
    }

    #[test]
    fn unknown_mnemonic_emits_placeholder_and_diagnostic() {
        let (words, diagnostics) = assemble(&["bogus r1, 1"]);
        assert_eq!(words[DEFAULT_START as usize], 0);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn immediate_shortcut_substitutes_c_suffixed_opcode() {
        let (words, diagnostics) = assemble(&["add r2,#1"]);
        assert!(diagnostics.is_empty());
        let decoded = isa::decode(words[DEFAULT_START as usize]).unwrap();
        assert_eq!(decoded.opcode, Opcode::Addc);
        assert_eq!(decoded.n, 1);
    }

    #[test]
    fn word_directive_emits_evaluated_values() {
        let (words, diagnostics) = assemble(&["table: WORD 1,2,0x10"]);
        assert!(diagnostics.is_empty());
        let start = DEFAULT_START as usize;
        assert_eq!(&words[start..start + 3], &[1, 2, 0x10]);
    }

    #[test]
    fn org_places_words_at_the_jumped_to_address() {
        let (words, diagnostics) = assemble(&["ORG 0x2000", "here: halt"]);
        assert!(diagnostics.is_empty());
        assert_eq!(words[0x2000], isa::encode(Opcode::Halt, 0, 0, 0));
    }
}
