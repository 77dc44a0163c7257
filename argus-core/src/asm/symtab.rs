//! The assembler's symbol table: identifier to 24-bit value, pre-seeded with `r0..r7`.

use std::collections::HashMap;

pub struct SymbolTable {
    values: HashMap<String, u32>,
}

impl SymbolTable {
    /// A fresh table pre-seeded with `r0 = 0` and `r1..r7 = 0x1001..0x1007`, matching the
    /// accumulator addresses in the memory-mapped register file.
    pub fn new() -> SymbolTable {
        let mut values = HashMap::new();
        values.insert("r0".to_string(), 0u32);
        for i in 1u32..=7 {
            values.insert(format!("r{}", i), 0x1000 + i);
        }
        SymbolTable { values }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.values.get(&name.to_lowercase()).copied()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_lowercase())
    }

    /// Iterate all bound symbols, for the assembler listing's symbol table dump.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Bind `name` to `value`. Labels and `EQU` entries share one namespace; redefining an
    /// already-bound symbol (including one of the seeded registers) is a fatal error.
    pub fn define(&mut self, name: &str, value: u32) -> Result<(), String> {
        let key = name.to_lowercase();
        if self.values.contains_key(&key) {
            return Err(format!("symbol '{}' redefined", name));
        }
        self.values.insert(key, value);
        Ok(())
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

/// Resolves identifiers against a symbol table plus the pseudo-symbol `PC`, for use with
/// [`crate::expr::eval`].
pub struct SymResolver<'a> {
    pub symbols: &'a SymbolTable,
    pub pc: u32,
}

impl<'a> crate::expr::SymbolResolver for SymResolver<'a> {
    fn resolve(&self, name: &str) -> Option<u32> {
        if name.eq_ignore_ascii_case("pc") {
            Some(self.pc)
        } else {
            self.symbols.get(name)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeds_register_names() {
        let table = SymbolTable::new();
        assert_eq!(table.get("r0"), Some(0));
        assert_eq!(table.get("r1"), Some(0x1001));
        assert_eq!(table.get("r7"), Some(0x1007));
        assert_eq!(table.get("R3"), Some(0x1003));
    }

    #[test]
    fn redefinition_is_an_error() {
        let mut table = SymbolTable::new();
        table.define("start", 0x1020).unwrap();
        assert!(table.define("start", 0x1030).is_err());
        assert!(table.define("r1", 0).is_err());
    }
}
