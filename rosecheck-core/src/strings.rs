//! Character and string generators.
//!
//! Strings are arrays of characters collected into `String`, so they
//! inherit collection shrinking: drop characters first, then simplify the
//! ones that remain.

use crate::gen::Gen;

const ALPHA_NUM: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl Gen<char> {
    /// Characters with codes 0 through 255, shrinking toward code 0.
    pub fn char_any() -> Self {
        Gen::<i64>::int_within(0, 255).map(|&code| char::from(code as u8))
    }

    /// Printable ascii characters (codes 32 through 126), shrinking toward
    /// the space character.
    pub fn ascii_char() -> Self {
        Gen::<i64>::int_within(32, 126).map(|&code| char::from(code as u8))
    }

    /// Characters matching `[a-zA-Z0-9]`, shrinking toward `'a'`.
    pub fn alpha_num_char() -> Self {
        Gen::<i64>::int_within(0, ALPHA_NUM.len() as i64 - 1)
            .map(|&index| char::from(ALPHA_NUM[index as usize]))
    }
}

impl Gen<String> {
    /// Strings of arbitrary characters in the 0–255 code range.
    pub fn string() -> Self {
        string_of(Gen::char_any())
    }

    /// Strings of printable ascii characters.
    pub fn ascii_string() -> Self {
        string_of(Gen::ascii_char())
    }

    /// Strings matching `[a-zA-Z0-9]*`.
    pub fn alpha_num_string() -> Self {
        string_of(Gen::alpha_num_char())
    }
}

/// Collect a character generator into strings of size-bounded length.
pub fn string_of(chars: Gen<char>) -> Gen<String> {
    Gen::array(chars).map(|chars| chars.iter().collect())
}
