//! Packed truth tables for gates of small arity.

use std::{fmt::Display, str::FromStr};

use crate::error::ParserError;

/// The truth table of a Boolean function of `arity` inputs.
///
/// Bit `i` holds the output for the input pattern whose binary value is `i`,
/// the first input being the most significant bit. For example, a two-input
/// AND gate is `0001` and a two-input OR gate is `0111`, reading indices from 0
/// up to 3.
///
/// ```rust
/// use rectify::TruthTable;
/// let and: TruthTable = "0001".parse().unwrap();
/// assert_eq!(and.arity(), 2);
/// assert!(and.evaluate(&[true, true]));
/// assert!(!and.evaluate(&[true, false]));
/// assert_eq!(and.to_string(), "0001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TruthTable {
    arity: usize,
    bits: u64,
}

impl TruthTable {
    /// Largest arity a packed table can hold (2^6 = 64 rows).
    pub const MAX_ARITY: usize = 6;

    /// Builds a table from its packed rows. Bits above `2^arity` are ignored.
    pub fn new(arity: usize, bits: u64) -> Self {
        assert!(
            arity <= Self::MAX_ARITY,
            "truth tables are limited to {} inputs, got {}",
            Self::MAX_ARITY,
            arity
        );
        let mask = if arity == Self::MAX_ARITY {
            u64::MAX
        } else {
            (1u64 << (1usize << arity)) - 1
        };
        TruthTable {
            arity,
            bits: bits & mask,
        }
    }

    /// Builds a table by calling `f` on every row index.
    pub fn from_fn(arity: usize, f: impl Fn(usize) -> bool) -> Self {
        let mut bits = 0u64;
        for row in 0..(1usize << arity) {
            if f(row) {
                bits |= 1 << row;
            }
        }
        TruthTable::new(arity, bits)
    }

    /// Builds a table from its rows, in index order.
    pub fn from_rows(rows: &[bool]) -> Option<Self> {
        if !rows.len().is_power_of_two() {
            return None;
        }
        let arity = rows.len().trailing_zeros() as usize;
        if arity > Self::MAX_ARITY {
            return None;
        }
        Some(TruthTable::from_fn(arity, |row| rows[row]))
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of rows, `2^arity`.
    pub fn len(&self) -> usize {
        1 << self.arity
    }

    /// Output for the row with the given index.
    pub fn get(&self, row: usize) -> bool {
        (self.bits >> row) & 1 == 1
    }

    /// Index of the row selected by the given input values (first input is the MSB).
    pub fn pattern_index(inputs: &[bool]) -> usize {
        inputs
            .iter()
            .fold(0, |index, &value| (index << 1) | value as usize)
    }

    /// Output of the function for the given input values.
    pub fn evaluate(&self, inputs: &[bool]) -> bool {
        debug_assert_eq!(inputs.len(), self.arity);
        self.get(Self::pattern_index(inputs))
    }

    /// Rows of the table, in index order.
    pub fn rows(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(|row| self.get(row))
    }
}

impl Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            write!(f, "{}", if row { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl FromStr for TruthTable {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(ParserError::InvalidToken {
                    line: None,
                    message: format!("invalid truth table character '{}' in {}", c, s),
                }),
            })
            .collect::<Result<Vec<bool>, ParserError>>()?;
        TruthTable::from_rows(&rows).ok_or_else(|| ParserError::InvalidToken {
            line: None,
            message: format!("truth table {} does not have 2^k rows (k <= 6)", s),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pattern_index_test() {
        assert_eq!(TruthTable::pattern_index(&[]), 0);
        assert_eq!(TruthTable::pattern_index(&[true]), 1);
        assert_eq!(TruthTable::pattern_index(&[true, false]), 2);
        assert_eq!(TruthTable::pattern_index(&[false, true]), 1);
        assert_eq!(TruthTable::pattern_index(&[true, true, false]), 6);
    }

    #[test]
    fn parse_and_display_test() {
        let or: TruthTable = "0111".parse().unwrap();
        assert_eq!(or.arity(), 2);
        assert!(!or.evaluate(&[false, false]));
        assert!(or.evaluate(&[false, true]));
        assert!(or.evaluate(&[true, false]));
        assert_eq!(or.to_string(), "0111");

        let konst: TruthTable = "1".parse().unwrap();
        assert_eq!(konst.arity(), 0);
        assert!(konst.evaluate(&[]));

        assert!("".parse::<TruthTable>().is_err());
        assert!("011".parse::<TruthTable>().is_err());
        assert!("01x1".parse::<TruthTable>().is_err());
    }

    #[test]
    fn new_masks_extra_bits_test() {
        let t = TruthTable::new(1, 0b1110);
        assert_eq!(t.bits(), 0b10);
        assert_eq!(t.to_string(), "01");
        let wide = TruthTable::new(6, u64::MAX);
        assert_eq!(wide.len(), 64);
        assert!(wide.rows().all(|row| row));
    }

    #[test]
    #[should_panic]
    fn new_too_wide_test() {
        let _ = TruthTable::new(7, 0);
    }
}
