//! Listing-line formatting for the emulator trace. Exact column layout from the external
//! interface spec, carried over verbatim from the original tool's listing convention.

pub const LISTING_HEADER: &str =
    "PC   : Mem    : Instr  Reg Adr   (Mod) : C O :   R1     R2     R3     R4     R5     R6     R7   :    Q";

/// Format one trace line: `PC : word : mnemonic rX, N (rM) : C O : r1..r7 : Q`.
///
/// `carry`, `overflow`, `regs`, and `q` must be a snapshot of machine state as it stood
/// *entering* the instruction, not after it executed — the listing documents what the
/// instruction saw, not what it left behind.
#[allow(clippy::too_many_arguments)]
pub fn format_trace_line(
    pc: u16,
    instr_word: u32,
    mnemonic: &str,
    x: u8,
    n: u16,
    m: u8,
    carry: u32,
    overflow: bool,
    regs: [u32; 7],
    q: u32,
) -> String {
    let modifier = if m > 0 {
        format!("(r{})", m)
    } else {
        "    ".to_string()
    };
    let regs_str = regs
        .iter()
        .map(|r| format!("{:06x}", r))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{:04x} : {:06x} : {:<6} r{}, {:06x} {} : {} {} : {} : {:06x}",
        pc,
        instr_word,
        mnemonic,
        x,
        n,
        modifier,
        carry,
        overflow as u32,
        regs_str,
        q,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_a_trace_line_with_a_modifier() {
        let line = format_trace_line(0x1020, 0x001484, "ldc", 1, 5, 0, 0, false, [0; 7], 0);
        assert!(line.starts_with("1020 : 001484 : ldc    r1, 000005     : 0 0 :"));
    }

    #[test]
    fn formats_a_trace_line_with_a_modifier_register() {
        let line = format_trace_line(0x1020, 0, "add", 2, 0x10, 3, 1, true, [0; 7], 0);
        assert!(line.contains("(r3)"));
        assert!(line.contains(": 1 1 :"));
    }

    #[test]
    fn formats_a_trace_line_from_a_nonzero_register_snapshot() {
        let mut regs = [0u32; 7];
        regs[0] = 5;
        let line = format_trace_line(0x1021, 0, "halt", 0, 0, 0, 0, false, regs, 0x41);
        assert!(line.contains(": 000005 000000"));
        assert!(line.ends_with("000041"));
    }
}
