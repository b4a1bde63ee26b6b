//! Symbol table module for the Hack assembler.
//!
//! Hybrid storage:
//! - PHF map for the predefined symbols, built at compile time
//! - `HashMap` for user-defined labels and variables
//!
//! Variables are allocated from RAM[16] upward on first reference; the
//! next free address lives with the caller so one pass owns the counter.

use phf::phf_map;
use std::collections::HashMap;

/// Symbols built into the Hack platform.
static PREDEFINED_SYMBOLS: phf::Map<&'static str, u16> = phf_map! {
    // Virtual registers
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    // VM segment pointers
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,

    // Memory-mapped I/O
    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// Maps label and variable names to RAM/ROM addresses.
///
/// # Example
/// ```
/// use hack_assembler::SymbolTable;
///
/// let mut st = SymbolTable::new();
/// assert_eq!(st.get_address("SP"), Some(0));
///
/// assert!(st.add_entry("LOOP", 100));
/// assert_eq!(st.get_address("LOOP"), Some(100));
/// ```
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// User-defined symbols (labels and variables).
    user_symbols: HashMap<String, u16>,
}

impl SymbolTable {
    /// Creates a new symbol table; predefined symbols are always present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_symbols: HashMap::with_capacity(32),
        }
    }

    /// Binds a symbol to an address.
    ///
    /// Returns `false` if the name is already taken, either by a
    /// predefined symbol or by an earlier binding; the table is left
    /// unchanged in that case.
    #[inline]
    pub fn add_entry(&mut self, symbol: &str, address: u16) -> bool {
        if PREDEFINED_SYMBOLS.contains_key(symbol) || self.user_symbols.contains_key(symbol) {
            return false;
        }
        self.user_symbols.insert(symbol.to_string(), address);
        true
    }

    /// Checks whether a symbol exists, predefined or user-defined.
    #[inline]
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED_SYMBOLS.contains_key(symbol) || self.user_symbols.contains_key(symbol)
    }

    /// Looks up the address bound to a symbol.
    #[inline]
    #[must_use]
    pub fn get_address(&self, symbol: &str) -> Option<u16> {
        if let Some(&addr) = PREDEFINED_SYMBOLS.get(symbol) {
            return Some(addr);
        }
        self.user_symbols.get(symbol).copied()
    }

    /// Looks up a symbol, allocating it at `*next_address` if unseen.
    ///
    /// This is the hot path of pass 2: every symbolic A-command resolves
    /// through here. `next_address` is incremented only on a fresh
    /// allocation.
    ///
    /// # Example
    /// ```
    /// use hack_assembler::SymbolTable;
    ///
    /// let mut st = SymbolTable::new();
    /// let mut ram_addr = 16;
    ///
    /// assert_eq!(st.get_or_insert("var1", &mut ram_addr), 16);
    /// assert_eq!(ram_addr, 17);
    ///
    /// assert_eq!(st.get_or_insert("var1", &mut ram_addr), 16);
    /// assert_eq!(ram_addr, 17);
    /// ```
    #[inline]
    pub fn get_or_insert(&mut self, symbol: &str, next_address: &mut u16) -> u16 {
        use std::collections::hash_map::Entry;

        if let Some(&addr) = PREDEFINED_SYMBOLS.get(symbol) {
            return addr;
        }

        match self.user_symbols.entry(symbol.to_string()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let addr = *next_address;
                *next_address += 1;
                *e.insert(addr)
            }
        }
    }

    /// Number of user-defined symbols.
    #[inline]
    #[must_use]
    pub fn user_symbol_count(&self) -> usize {
        self.user_symbols.len()
    }
}
