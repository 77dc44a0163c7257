//! The 24-bit word and the 16 384-word memory-mapped register file.

/// Number of addressable words in the Argus address space.
pub const MEMORY_SIZE: usize = 0x4000;

/// Mask a raw integer down to a 24-bit machine word.
#[inline]
pub fn mask_word(value: u32) -> u32 {
    value & 0x00FF_FFFF
}

/// Mask a raw integer down to a 14-bit address/literal field.
#[inline]
pub fn mask_addr(value: u32) -> u16 {
    (value & 0x3FFF) as u16
}

pub mod register {
    //! Named addresses within the memory-mapped register file. See the address table in
    //! the data model: these are ordinary memory cells, not a separate register bank.

    pub const Z: u16 = 0x0000;
    pub const R: u16 = 0x0001;
    pub const Q: u16 = 0x0002;
    pub const C: u16 = 0x0003;
    pub const HSW: u16 = 0x0004;

    pub const INPUT_BASE: u16 = 0x1000;
    pub const LINK: u16 = 0x1008;
    pub const INT: u16 = 0x1010;

    /// Default program-counter start address.
    pub const DEFAULT_START: u16 = 0x1020;

    /// Address of accumulator `rX`, `x` in `0..=7`. `r0` is the always-zero register `Z`.
    #[inline]
    pub fn accumulator(x: u8) -> u16 {
        if x == 0 {
            Z
        } else {
            INPUT_BASE + x as u16
        }
    }

    /// Address of modifier index register `rM`, `m` in `0..=3`. `m == 0` means "no modifier"
    /// and is handled by the caller before this is reached.
    #[inline]
    pub fn modifier(m: u8) -> u16 {
        INPUT_BASE + m as u16
    }

    /// I/O region used for timing-class adjustment: `0x010 .. 0x1000`.
    pub mod io_region {
        pub const MIN: u16 = 0x010;
        pub const MAX: u16 = 0x1000;

        #[inline]
        pub fn contains(addr: u16) -> bool {
            addr >= MIN && addr <= MAX
        }
    }
}

/// The flat, word-addressed memory that also serves as the Argus register file.
///
/// Address 0 (`register::Z`) always reads as zero; writes to it are silently discarded. All
/// other addresses behave as plain storage cells, including the `Q`/`C` registers and the
/// `r0..r7` accumulators — there is no separate register API, by design (see the data model).
pub struct Memory {
    cells: Box<[u32; MEMORY_SIZE]>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            cells: Box::new([0u32; MEMORY_SIZE]),
        }
    }

    /// Load a sequence of words starting at address 0, zero-padding any remainder up to
    /// `MEMORY_SIZE`. Extra words beyond `MEMORY_SIZE` are an error at the boundary, not here.
    pub fn load(words: &[u32]) -> Memory {
        let mut memory = Memory::new();
        for (addr, word) in words.iter().enumerate().take(MEMORY_SIZE) {
            memory.cells[addr] = mask_word(*word);
        }
        memory
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u32 {
        self.cells[(addr as usize) & (MEMORY_SIZE - 1)]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u32) {
        let addr = (addr as usize) & (MEMORY_SIZE - 1);
        if addr == register::Z as usize {
            return;
        }
        self.cells[addr] = mask_word(value);
    }

    pub fn as_slice(&self) -> &[u32] {
        self.cells.as_ref()
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_register_reads_as_zero_and_discards_writes() {
        let mut memory = Memory::new();
        memory.write(register::Z, 0xABCDEF);
        assert_eq!(memory.read(register::Z), 0);
    }

    #[test]
    fn writes_mask_to_24_bits() {
        let mut memory = Memory::new();
        memory.write(register::INPUT_BASE + 1, 0xFF_FFFFFF);
        assert_eq!(memory.read(register::INPUT_BASE + 1), 0x00FF_FFFF);
    }

    #[test]
    fn load_zero_pads_short_input() {
        let memory = Memory::load(&[0x000001, 0x000002]);
        assert_eq!(memory.read(0), 0x000001);
        assert_eq!(memory.read(1), 0x000002);
        assert_eq!(memory.read(2), 0);
        assert_eq!(memory.as_slice().len(), MEMORY_SIZE);
    }

    #[test]
    fn accumulator_address_maps_r0_to_z() {
        assert_eq!(register::accumulator(0), register::Z);
        assert_eq!(register::accumulator(1), register::INPUT_BASE + 1);
        assert_eq!(register::accumulator(7), register::INPUT_BASE + 7);
    }
}
