//! Six-bit flag messages carried by deposits.

use std::fmt;

use serde::{Deserialize, Serialize};
use zkmsg_common::MessageValidator;

/// Number of meaningful flag bits.
pub const FLAG_COUNT: u32 = 6;

/// A deposit message: six flags packed into the low bits of a word.
///
/// Flag `n` (1-based) is bit `n - 1`, so `0b000001` sets flag 1 only.
///
/// Rules:
/// - flag 1 set: flags 2 to 6 are all clear
/// - flag 2 set: flag 3 is set
/// - flag 4 set: flags 5 and 6 are clear
/// - no bit above flag 6 is set
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagMessage(pub u64);

impl FlagMessage {
    pub fn new(word: u64) -> Self {
        Self(word)
    }

    pub fn word(&self) -> u64 {
        self.0
    }

    /// Whether flag `n` (1-based) is set.
    pub fn flag(&self, n: u32) -> bool {
        (1..=FLAG_COUNT).contains(&n) && self.0 & (1 << (n - 1)) != 0
    }

    /// First rule this message breaks, if any.
    pub fn violation(&self) -> Option<&'static str> {
        if self.0 >> FLAG_COUNT != 0 {
            return Some("bits above flag 6 must be clear");
        }
        if self.flag(1) && (2..=FLAG_COUNT).any(|n| self.flag(n)) {
            return Some("flag 1 excludes flags 2 to 6");
        }
        if self.flag(2) && !self.flag(3) {
            return Some("flag 2 requires flag 3");
        }
        if self.flag(4) && (self.flag(5) || self.flag(6)) {
            return Some("flag 4 excludes flags 5 and 6");
        }
        None
    }
}

impl MessageValidator for FlagMessage {
    fn is_valid(&self) -> bool {
        self.violation().is_none()
    }
}

impl fmt::Debug for FlagMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagMessage({:#08b})", self.0)
    }
}

impl fmt::Display for FlagMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06b}", self.0)
    }
}

impl From<u64> for FlagMessage {
    fn from(word: u64) -> Self {
        Self(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        let cases = [
            (0b000001, true),
            (0b100001, false),
            (0b000110, true),
            (0b100010, false),
            (0b001000, true),
            (0b111000, false),
        ];
        for (word, expected) in cases {
            assert_eq!(FlagMessage(word).is_valid(), expected, "{word:06b}");
        }
    }

    #[test]
    fn empty_word_is_valid() {
        assert!(FlagMessage(0).is_valid());
    }

    #[test]
    fn high_bits_are_rejected() {
        let msg = FlagMessage(1 << 6);
        assert!(!msg.is_valid());
        assert_eq!(msg.violation(), Some("bits above flag 6 must be clear"));
    }

    #[test]
    fn flag_accessor_ignores_out_of_range() {
        let msg = FlagMessage(u64::MAX);
        assert!(!msg.flag(0));
        assert!(!msg.flag(7));
        assert!(msg.flag(6));
    }
}
