//! Mnemonic-to-bits encoding tables for Hack machine code.
//!
//! All three instruction fields are translated through perfect hash maps
//! built at compile time, so a lookup is a single probe with no runtime
//! table construction.
//!
//! Lookups are strict: a mnemonic missing from its table yields `None`,
//! which the assembly driver turns into a fatal diagnostic. The commutative
//! two-operand computations (`D+A`, `D&A`, `D|A` and their `M` variants)
//! are accepted in either operand order via explicit alternate entries;
//! subtraction is not commutative and has no alternates.

use phf::phf_map;

/// Destination mnemonic to binary code mapping (3 bits).
///
/// One bit per writable register: `A`, `D`, `M`. Empty string is the null
/// destination.
static DEST_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "M" => "001",
    "D" => "010",
    "MD" => "011",
    "A" => "100",
    "AM" => "101",
    "AD" => "110",
    "AMD" => "111",
};

/// Computation mnemonic to binary code mapping (7 bits: `a` + `cccccc`).
///
/// The leading bit selects the second ALU operand: 0 for A, 1 for M.
static COMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    // a=0 (A register operations)
    "0" => "0101010",
    "1" => "0111111",
    "-1" => "0111010",
    "D" => "0001100",
    "A" => "0110000",
    "!D" => "0001101",
    "!A" => "0110001",
    "-D" => "0001111",
    "-A" => "0110011",
    "D+1" => "0011111",
    "A+1" => "0110111",
    "D-1" => "0001110",
    "A-1" => "0110010",
    "D+A" => "0000010",
    "A+D" => "0000010",
    "D-A" => "0010011",
    "A-D" => "0000111",
    "D&A" => "0000000",
    "A&D" => "0000000",
    "D|A" => "0010101",
    "A|D" => "0010101",

    // a=1 (M register operations)
    "M" => "1110000",
    "!M" => "1110001",
    "-M" => "1110011",
    "M+1" => "1110111",
    "M-1" => "1110010",
    "D+M" => "1000010",
    "M+D" => "1000010",
    "D-M" => "1010011",
    "M-D" => "1000111",
    "D&M" => "1000000",
    "M&D" => "1000000",
    "D|M" => "1010101",
    "M|D" => "1010101",
};

/// Jump mnemonic to binary code mapping (3 bits).
static JUMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "JGT" => "001",
    "JEQ" => "010",
    "JGE" => "011",
    "JLT" => "100",
    "JNE" => "101",
    "JLE" => "110",
    "JMP" => "111",
};

/// Translates a destination mnemonic to its 3-bit code.
#[inline]
#[must_use]
pub fn dest(mnemonic: &str) -> Option<&'static str> {
    DEST_MAP.get(mnemonic).copied()
}

/// Translates a computation mnemonic to its 7-bit code.
#[inline]
#[must_use]
pub fn comp(mnemonic: &str) -> Option<&'static str> {
    COMP_MAP.get(mnemonic).copied()
}

/// Translates a jump mnemonic to its 3-bit code.
#[inline]
#[must_use]
pub fn jump(mnemonic: &str) -> Option<&'static str> {
    JUMP_MAP.get(mnemonic).copied()
}

/// Encodes a complete C-instruction: `111` ++ comp(7) ++ dest(3) ++ jump(3).
///
/// Returns `None` if any field mnemonic is unknown; the caller reports
/// which field failed via the individual lookups.
///
/// # Example
/// ```
/// use hack_assembler::code::encode_c_instruction;
/// let instruction = encode_c_instruction("D", "D+1", "").unwrap();
/// assert_eq!(instruction, "1110011111010000");
/// ```
#[inline]
#[must_use]
pub fn encode_c_instruction(
    dest_mnemonic: &str,
    comp_mnemonic: &str,
    jump_mnemonic: &str,
) -> Option<String> {
    Some(format!(
        "111{}{}{}",
        comp(comp_mnemonic)?,
        dest(dest_mnemonic)?,
        jump(jump_mnemonic)?
    ))
}

/// Encodes an A-instruction: `0` followed by the 15-bit address.
///
/// The address must already be validated to fit 15 bits.
///
/// # Example
/// ```
/// use hack_assembler::code::encode_a_instruction;
/// assert_eq!(encode_a_instruction(100), "0000000001100100");
/// ```
#[inline]
#[must_use]
pub fn encode_a_instruction(address: u16) -> String {
    format!("{address:016b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_translations() {
        assert_eq!(dest(""), Some("000"));
        assert_eq!(dest("M"), Some("001"));
        assert_eq!(dest("D"), Some("010"));
        assert_eq!(dest("MD"), Some("011"));
        assert_eq!(dest("A"), Some("100"));
        assert_eq!(dest("AM"), Some("101"));
        assert_eq!(dest("AD"), Some("110"));
        assert_eq!(dest("AMD"), Some("111"));

        assert_eq!(dest("DM"), None);
        assert_eq!(dest("X"), None);
    }

    #[test]
    fn test_comp_translations() {
        // a=0 cases
        assert_eq!(comp("0"), Some("0101010"));
        assert_eq!(comp("1"), Some("0111111"));
        assert_eq!(comp("D"), Some("0001100"));
        assert_eq!(comp("A"), Some("0110000"));
        assert_eq!(comp("D+A"), Some("0000010"));
        assert_eq!(comp("D&A"), Some("0000000"));

        // a=1 cases
        assert_eq!(comp("M"), Some("1110000"));
        assert_eq!(comp("D+M"), Some("1000010"));
        assert_eq!(comp("D&M"), Some("1000000"));

        assert_eq!(comp("D*A"), None);
    }

    #[test]
    fn test_comp_commutative_alternates() {
        assert_eq!(comp("A+D"), comp("D+A"));
        assert_eq!(comp("A&D"), comp("D&A"));
        assert_eq!(comp("A|D"), comp("D|A"));
        assert_eq!(comp("M+D"), comp("D+M"));
        assert_eq!(comp("M&D"), comp("D&M"));
        assert_eq!(comp("M|D"), comp("D|M"));
    }

    #[test]
    fn test_comp_subtraction_not_commutative() {
        // D-A and A-D are distinct operations; no reordering is accepted
        // beyond the documented pairs.
        assert_ne!(comp("D-A"), comp("A-D"));
        assert_ne!(comp("D-M"), comp("M-D"));
    }

    #[test]
    fn test_jump_translations() {
        assert_eq!(jump(""), Some("000"));
        assert_eq!(jump("JGT"), Some("001"));
        assert_eq!(jump("JEQ"), Some("010"));
        assert_eq!(jump("JGE"), Some("011"));
        assert_eq!(jump("JLT"), Some("100"));
        assert_eq!(jump("JNE"), Some("101"));
        assert_eq!(jump("JLE"), Some("110"));
        assert_eq!(jump("JMP"), Some("111"));

        assert_eq!(jump("JXX"), None);
    }

    #[test]
    fn test_encode_c_instruction() {
        // D=D+1
        assert_eq!(
            encode_c_instruction("D", "D+1", "").unwrap(),
            "1110011111010000"
        );

        // MD=M-1;JEQ
        assert_eq!(
            encode_c_instruction("MD", "M-1", "JEQ").unwrap(),
            "1111110010011010"
        );

        // 0;JMP (unconditional jump)
        assert_eq!(
            encode_c_instruction("", "0", "JMP").unwrap(),
            "1110101010000111"
        );

        // M=1
        assert_eq!(
            encode_c_instruction("M", "1", "").unwrap(),
            "1110111111001000"
        );
    }

    #[test]
    fn test_encode_c_instruction_unknown_field() {
        assert!(encode_c_instruction("D", "D*A", "").is_none());
        assert!(encode_c_instruction("DX", "0", "").is_none());
        assert!(encode_c_instruction("", "0", "JJJ").is_none());
    }

    #[test]
    fn test_encode_a_instruction() {
        assert_eq!(encode_a_instruction(0), "0000000000000000");
        assert_eq!(encode_a_instruction(100), "0000000001100100");
        assert_eq!(encode_a_instruction(16384), "0100000000000000");
        assert_eq!(encode_a_instruction(32767), "0111111111111111");
    }
}
