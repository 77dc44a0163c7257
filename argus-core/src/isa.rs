//! The Argus instruction set: opcode identities, the dual 400/500 mnemonic tables, the
//! 24-bit instruction word encoding, and the per-model timing table.

/// One of the 32 Argus opcodes. Discriminants are the actual 5-bit encoded value, fixed by
/// the 400/500 mnemonic equivalence table: `ld, ldm, add, sub, ldc, ldmc, addc, subc, sto,
/// stom, madd, msub, swap, and, xor, or, jpz, jpnz, jpge, jplt, jpovr, jpbusy, out, jp, asr,
/// asl, lsr, rol, halt, none1d, mul, div`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Opcode {
    Ld     = 0x00,
    Ldm    = 0x01,
    Add    = 0x02,
    Sub    = 0x03,
    Ldc    = 0x04,
    Ldmc   = 0x05,
    Addc   = 0x06,
    Subc   = 0x07,
    Sto    = 0x08,
    Stom   = 0x09,
    Madd   = 0x0A,
    Msub   = 0x0B,
    Swap   = 0x0C,
    And    = 0x0D,
    Xor    = 0x0E,
    Or     = 0x0F,
    Jpz    = 0x10,
    Jpnz   = 0x11,
    Jpge   = 0x12,
    Jplt   = 0x13,
    Jpovr  = 0x14,
    Jpbusy = 0x15,
    Out    = 0x16,
    Jp     = 0x17,
    Asr    = 0x18,
    Asl    = 0x19,
    Lsr    = 0x1A,
    Rol    = 0x1B,
    Halt   = 0x1C,
    None1d = 0x1D,
    Mul    = 0x1E,
    Div    = 0x1F,
}

pub const OPCODE_COUNT: usize = 32;

#[rustfmt::skip]
pub const ALL_OPCODES: [Opcode; OPCODE_COUNT] = [
    Opcode::Ld, Opcode::Ldm, Opcode::Add, Opcode::Sub,
    Opcode::Ldc, Opcode::Ldmc, Opcode::Addc, Opcode::Subc,
    Opcode::Sto, Opcode::Stom, Opcode::Madd, Opcode::Msub,
    Opcode::Swap, Opcode::And, Opcode::Xor, Opcode::Or,
    Opcode::Jpz, Opcode::Jpnz, Opcode::Jpge, Opcode::Jplt,
    Opcode::Jpovr, Opcode::Jpbusy, Opcode::Out, Opcode::Jp,
    Opcode::Asr, Opcode::Asl, Opcode::Lsr, Opcode::Rol,
    Opcode::Halt, Opcode::None1d, Opcode::Mul, Opcode::Div,
];

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Opcode> {
        ALL_OPCODES.iter().copied().find(|op| *op as u8 == value)
    }

    /// The Argus 400 mnemonic for this opcode, lowercase.
    #[rustfmt::skip]
    pub fn mnemonic_400(self) -> &'static str {
        match self {
            Opcode::Ld => "ld", Opcode::Ldm => "ldm", Opcode::Add => "add", Opcode::Sub => "sub",
            Opcode::Ldc => "ldc", Opcode::Ldmc => "ldmc", Opcode::Addc => "addc", Opcode::Subc => "subc",
            Opcode::Sto => "sto", Opcode::Stom => "stom", Opcode::Madd => "madd", Opcode::Msub => "msub",
            Opcode::Swap => "swap", Opcode::And => "and", Opcode::Xor => "xor", Opcode::Or => "or",
            Opcode::Jpz => "jpz", Opcode::Jpnz => "jpnz", Opcode::Jpge => "jpge", Opcode::Jplt => "jplt",
            Opcode::Jpovr => "jpovr", Opcode::Jpbusy => "jpbusy", Opcode::Out => "out", Opcode::Jp => "jp",
            Opcode::Asr => "asr", Opcode::Asl => "asl", Opcode::Lsr => "lsr", Opcode::Rol => "rol",
            Opcode::Halt => "halt", Opcode::None1d => "none1d", Opcode::Mul => "mul", Opcode::Div => "div",
        }
    }

    /// The Argus 500 mnemonic for this opcode, lowercase.
    #[rustfmt::skip]
    pub fn mnemonic_500(self) -> &'static str {
        match self {
            Opcode::Ld => "ldx", Opcode::Ldm => "nlx", Opcode::Add => "add", Opcode::Sub => "sub",
            Opcode::Ldc => "ldc", Opcode::Ldmc => "lmc", Opcode::Addc => "adc", Opcode::Subc => "sbc",
            Opcode::Sto => "sto", Opcode::Stom => "stn", Opcode::Madd => "ads", Opcode::Msub => "ssb",
            Opcode::Swap => "exc", Opcode::And => "and", Opcode::Xor => "neq", Opcode::Or => "orf",
            Opcode::Jpz => "jze", Opcode::Jpnz => "jnz", Opcode::Jpge => "jge", Opcode::Jplt => "jlt",
            Opcode::Jpovr => "ovr", Opcode::Jpbusy => "jbs", Opcode::Out => "out", Opcode::Jp => "jcs",
            Opcode::Asr => "sra", Opcode::Asl => "sla", Opcode::Lsr => "srl", Opcode::Rol => "slc",
            Opcode::Halt => "sll", Opcode::None1d => "slv", Opcode::Mul => "mpy", Opcode::Div => "div",
        }
    }

    /// Resolve a mnemonic (either dialect, case-insensitive) to its opcode.
    pub fn lookup(mnemonic: &str) -> Option<Opcode> {
        let lower = mnemonic.to_lowercase();
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| op.mnemonic_400() == lower || op.mnemonic_500() == lower)
    }

    /// The mnemonic this opcode disassembles to under `dialect`.
    pub fn mnemonic_for(self, dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::Argus100 | Dialect::Argus400 => self.mnemonic_400(),
            Dialect::Argus500 => self.mnemonic_500(),
        }
    }

    /// Whether this opcode is the "immediate" counterpart of a memory-operand opcode used by
    /// the assembler's `#`-literal shortcut (`ld`, `ldm`, `add`, `sub`).
    pub fn immediate_form(self) -> Option<Opcode> {
        match self {
            Opcode::Ld => Some(Opcode::Ldc),
            Opcode::Ldm => Some(Opcode::Ldmc),
            Opcode::Add => Some(Opcode::Addc),
            Opcode::Sub => Some(Opcode::Subc),
            _ => None,
        }
    }

    /// Arithmetic/logic/compare/branch class: receives the Argus 400 per-bit bit-serial ALU
    /// timing surcharge (but not the larger multiply/divide surcharge). This exact opcode set
    /// is transcribed from the original's `exec_time_us`, which lists `nlx, add, sub, lmc,
    /// adc, sbc, stn, ads, ssb, and, neq, orf, jze, jnz, jge, jlt, jbs, jcs` — notably
    /// *excluding* `ldc`/`ldmc`'s literal-load cousin `ldc` and the overflow-jump `ovr`, and
    /// *including* `ldm`/`stom`/`jp`, which a naive "ALU-class" guess would miss.
    pub fn is_alu_class(self) -> bool {
        matches!(
            self,
            Opcode::Ldm
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Ldmc
                | Opcode::Addc
                | Opcode::Subc
                | Opcode::Stom
                | Opcode::Madd
                | Opcode::Msub
                | Opcode::And
                | Opcode::Xor
                | Opcode::Or
                | Opcode::Jpz
                | Opcode::Jpnz
                | Opcode::Jpge
                | Opcode::Jplt
                | Opcode::Jpbusy
                | Opcode::Jp
        )
    }

    pub fn is_mul_div_class(self) -> bool {
        matches!(self, Opcode::Mul | Opcode::Div)
    }

    /// Whether this opcode falls in the original's `op["sra"] <= opcode <= op["slv"]` numeric
    /// range used to gate the per-bit shift-timing surcharge. That range is `0x18..=0x1D`,
    /// which is the four real shift opcodes *plus* `halt`/`none1d` (`sll`/`slv` in the
    /// original) — an idiosyncrasy of the original's range check, not a shift-semantics claim,
    /// preserved here rather than narrowed to only the opcodes that actually shift.
    fn in_shift_timing_range(self) -> bool {
        let value = self as u8;
        (Opcode::Asr as u8..=Opcode::None1d as u8).contains(&value)
    }
}

/// Decoded fields of a 24-bit instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub n: u16,
    pub opcode: Opcode,
    pub x: u8,
    pub m: u8,
}

/// Decode a raw 24-bit word into its instruction fields. Returns `None` if the 5-bit opcode
/// field does not correspond to a known opcode (it always will, since all 32 values are
/// assigned, but the API stays honest about the possibility).
pub fn decode(word: u32) -> Option<Instruction> {
    let word = word & 0x00FF_FFFF;
    let n = ((word >> 10) & 0x3FFF) as u16;
    let opcode_bits = ((word >> 5) & 0x1F) as u8;
    let x = ((word >> 2) & 0x07) as u8;
    let m = (word & 0x03) as u8;
    Opcode::from_u8(opcode_bits).map(|opcode| Instruction { n, opcode, x, m })
}

/// Encode an instruction's fields into a 24-bit word. `n` is truncated to 14 bits, silently
/// dropping overflow (documented assembler behavior, not repaired here).
pub fn encode(opcode: Opcode, x: u8, m: u8, n: u16) -> u32 {
    let n = (n as u32) & 0x3FFF;
    let opcode_bits = (opcode as u32) & 0x1F;
    let x = (x as u32) & 0x07;
    let m = (m as u32) & 0x03;
    (n << 10) | (opcode_bits << 5) | (x << 2) | m
}

/// The emulator's `-1/-4/-5` model selection: which mnemonic table disassembles a trace
/// line, and whether the Argus 500-only opcode (`none1d`/`slv`) and per-model timing report
/// are available. Distinct from [`Model`], which is the five-way timing-table axis that
/// stays fully populated regardless of this selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Argus100,
    Argus400,
    Argus500,
}

impl Dialect {
    pub fn is_argus_500(self) -> bool {
        matches!(self, Dialect::Argus500)
    }
}

/// One of the five documented Argus hardware variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Argus400,
    A500S1M1,
    A500S2M2,
    A500S3M1,
    A500S4M2,
}

pub const ALL_MODELS: [Model; 5] = [
    Model::Argus400,
    Model::A500S1M1,
    Model::A500S2M2,
    Model::A500S3M1,
    Model::A500S4M2,
];

impl Model {
    pub fn name(self) -> &'static str {
        match self {
            Model::Argus400 => "Argus400",
            Model::A500S1M1 => "A500-S1M1",
            Model::A500S2M2 => "A500-S2M2",
            Model::A500S3M1 => "A500-S3M1",
            Model::A500S4M2 => "A500-S4M2",
        }
    }

    fn index(self) -> usize {
        ALL_MODELS.iter().position(|m| *m == self).unwrap()
    }
}

/// Base instruction cost in microseconds, before any adjustment, indexed `[opcode][model]`
/// in `ALL_MODELS` order. Transcribed digit-for-digit from the original's `base_timing_us`
/// table; the A500 variants are successive speed grades of the same microcoded engine, each
/// faster than the last, while Argus 400 shares its base cost with the slowest A500 grade
/// (`S1M1`) and makes up the difference with the bit-serial ALU surcharge below.
#[rustfmt::skip]
const BASE_TIMING_US: [[f64; 5]; OPCODE_COUNT] = [
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Ld
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Ldm
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Add
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Sub
    [4.7, 4.7, 3.1, 4.7, 2.8],   // Ldc
    [4.7, 4.7, 3.1, 4.7, 2.8],   // Ldmc
    [4.7, 4.7, 3.1, 4.7, 2.8],   // Addc
    [4.7, 4.7, 3.1, 4.7, 2.8],   // Subc
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Sto
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Stom
    [6.4, 6.4, 4.0, 6.4, 3.6],   // Madd
    [6.4, 6.4, 4.0, 6.4, 3.6],   // Msub
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Swap
    [6.0, 6.0, 3.6, 6.0, 3.2],   // And
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Xor
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Or
    [4.0, 4.0, 2.4, 4.0, 2.2],   // Jpz
    [4.0, 4.0, 2.4, 4.0, 2.2],   // Jpnz
    [4.0, 4.0, 2.4, 4.0, 2.2],   // Jpge
    [4.0, 4.0, 2.4, 4.0, 2.2],   // Jplt
    [2.7, 2.7, 1.9, 3.4, 1.9],   // Jpovr
    [2.7, 2.7, 1.9, 3.4, 1.9],   // Jpbusy
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Out
    [6.0, 6.0, 3.6, 6.0, 3.2],   // Jp
    [4.4, 4.4, 2.8, 4.4, 2.6],   // Asr
    [4.4, 4.4, 2.8, 4.4, 2.6],   // Asl
    [4.4, 4.4, 2.8, 4.4, 2.6],   // Lsr
    [4.4, 4.4, 2.8, 4.4, 2.6],   // Rol
    [4.4, 4.4, 2.8, 4.4, 2.6],   // Halt
    [6.4, 6.4, 4.0, 6.4, 3.6],   // None1d
    [13.4, 13.4, 11.5, 13.4, 11.1], // Mul
    [15.0, 15.0, 13.1, 15.0, 12.7], // Div
];

/// Additive cost in microseconds when the effective operand address falls in the
/// memory-mapped I/O region, indexed by model.
const IO_INC_TIMING_US: [f64; 5] = [2.0, 2.0, 1.2, 2.0, 1.1];

/// Additive cost in microseconds when the instruction carries a nonzero modifier register
/// (`M != 0`), indexed by model.
const MODIFIER_TIMING_US: [f64; 5] = [2.0, 2.0, 1.2, 2.0, 1.1];

/// Additive cost in microseconds per bit of shift distance, indexed by model.
const PERBIT_SHIFT_TIMING_US: [f64; 5] = [0.4, 0.4, 0.4, 0.4, 0.4];

/// Additive cost in microseconds per bit of bit-serial ALU work, Argus 400 only (every other
/// model's entry is zero since they aren't bit-serial machines).
const PERBIT_ALU_TIMING_US: f64 = 0.25;

/// Compute the estimated execution time of one instruction on `model`, in microseconds.
///
/// `eff_operand_addr` is the effective operand address computed per the data model (used for
/// the I/O-region adjustment); `modified` is whether `M != 0`; `shift_distance` is `N & 0x1F`,
/// applied whenever `opcode` falls in the shift-timing numeric range (see
/// [`Opcode::in_shift_timing_range`]).
pub fn exec_time_us(
    opcode: Opcode,
    model: Model,
    eff_operand_addr: u16,
    modified: bool,
    shift_distance: u8,
) -> f64 {
    let idx = model.index();
    let mut total = BASE_TIMING_US[opcode as usize][idx];

    if crate::word::register::io_region::contains(eff_operand_addr) {
        total += IO_INC_TIMING_US[idx];
    }
    if modified {
        total += MODIFIER_TIMING_US[idx];
    }
    if opcode.in_shift_timing_range() {
        total += (shift_distance as u32 % 32) as f64 * PERBIT_SHIFT_TIMING_US[idx];
    }
    if model == Model::Argus400 {
        if opcode.is_mul_div_class() {
            total += PERBIT_ALU_TIMING_US * 24.0 * 24.0;
        } else if opcode.is_alu_class() {
            total += PERBIT_ALU_TIMING_US * 24.0;
        }
    }
    total
}

/// Compute the timing vector across all five models for one instruction, in table order
/// (`ALL_MODELS`).
pub fn exec_time_us_all_models(
    opcode: Opcode,
    eff_operand_addr: u16,
    modified: bool,
    shift_distance: u8,
) -> [f64; 5] {
    let mut out = [0.0f64; 5];
    for model in ALL_MODELS {
        out[model.index()] = exec_time_us(opcode, model, eff_operand_addr, modified, shift_distance);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opcode_values_match_worked_scenario() {
        assert_eq!(Opcode::Ldc as u8, 0x04);
        assert_eq!(Opcode::Halt as u8, 0x1C);
    }

    #[test]
    fn mnemonic_lookup_accepts_both_dialects() {
        assert_eq!(Opcode::lookup("ld"), Some(Opcode::Ld));
        assert_eq!(Opcode::lookup("LDX"), Some(Opcode::Ld));
        assert_eq!(Opcode::lookup("mpy"), Some(Opcode::Mul));
        assert_eq!(Opcode::lookup("mul"), Some(Opcode::Mul));
        assert_eq!(Opcode::lookup("bogus"), None);
    }

    #[test]
    fn encode_matches_worked_scenario_one() {
        // start: ldc r1,#0x5 ; halt
        let first = encode(Opcode::Ldc, 1, 0, 0x0005);
        assert_eq!(first, 0x001484);
        let second = encode(Opcode::Halt, 0, 0, 0);
        assert_eq!(second, 0x000380);
    }

    #[test]
    fn decode_round_trips_encode() {
        let word = encode(Opcode::Add, 3, 2, 0x1234 & 0x3FFF);
        let decoded = decode(word).unwrap();
        assert_eq!(decoded.opcode, Opcode::Add);
        assert_eq!(decoded.x, 3);
        assert_eq!(decoded.m, 2);
        assert_eq!(decoded.n, 0x1234 & 0x3FFF);
    }

    #[test]
    fn mnemonic_for_dialect_picks_the_right_table() {
        assert_eq!(Opcode::Ld.mnemonic_for(Dialect::Argus400), "ld");
        assert_eq!(Opcode::Ld.mnemonic_for(Dialect::Argus500), "ldx");
    }

    #[test]
    fn argus_400_applies_larger_surcharge_to_mul_than_alu_ops() {
        let mul_time = exec_time_us(Opcode::Mul, Model::Argus400, 0, false, 0);
        let add_time = exec_time_us(Opcode::Add, Model::Argus400, 0, false, 0);
        assert!(mul_time > add_time);
    }

    /// Argus 400 and its `S1M1` twin share the same base timing table entries; the only
    /// thing that can separate them is the bit-serial ALU surcharge, so their difference
    /// isolates it exactly.
    #[test]
    fn argus_400_adds_bit_serial_alu_surcharge_over_its_s1m1_twin() {
        let add_400 = exec_time_us(Opcode::Add, Model::Argus400, 0, false, 0);
        let add_s1m1 = exec_time_us(Opcode::Add, Model::A500S1M1, 0, false, 0);
        assert_eq!(add_400 - add_s1m1, 24.0 * 0.25);
    }

    #[test]
    fn mul_and_div_receive_the_larger_24x24_bit_serial_surcharge() {
        let mul_400 = exec_time_us(Opcode::Mul, Model::Argus400, 0, false, 0);
        let mul_s1m1 = exec_time_us(Opcode::Mul, Model::A500S1M1, 0, false, 0);
        let div_400 = exec_time_us(Opcode::Div, Model::Argus400, 0, false, 0);
        let div_s1m1 = exec_time_us(Opcode::Div, Model::A500S1M1, 0, false, 0);
        assert_eq!(mul_400 - mul_s1m1, 24.0 * 24.0 * 0.25);
        assert_eq!(div_400 - div_s1m1, 24.0 * 24.0 * 0.25);
    }
}
