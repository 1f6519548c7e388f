//! Four-state signal values.
//!
//! VCD dumps carry values drawn from a fixed alphabet: `0`, `1`, `x`
//! (unknown), `z` (high impedance). Values are validated against that
//! alphabet when constructed so nothing downstream has to re-check
//! arbitrary strings.

use serde::{Deserialize, Serialize};

/// Error constructing a signal value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// A character outside the `0/1/x/z` alphabet
    #[error("invalid value symbol: {0:?}")]
    InvalidSymbol(char),
    /// A vector value with no bits
    #[error("empty vector value")]
    EmptyVector,
}

/// A single four-state bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scalar {
    /// Logic low
    Zero,
    /// Logic high
    One,
    /// Unknown
    X,
    /// High impedance
    Z,
}

impl Scalar {
    /// Parse a dump symbol, case-insensitive
    #[must_use]
    pub const fn from_symbol(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            'x' | 'X' => Some(Self::X),
            'z' | 'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// The canonical (lowercase) dump symbol
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::X => 'x',
            Self::Z => 'z',
        }
    }

    /// True only for logic high
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::One)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A recorded signal value: a single bit or a bit vector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalValue {
    /// Single-bit value
    Scalar(Scalar),
    /// Multi-bit value, most significant bit first as dumped
    Vector(Vec<Scalar>),
}

impl SignalValue {
    /// Construct a single-bit value from a dump symbol
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidSymbol`] for characters outside the
    /// value alphabet.
    pub fn scalar(symbol: char) -> Result<Self, ValueError> {
        Scalar::from_symbol(symbol)
            .map(Self::Scalar)
            .ok_or(ValueError::InvalidSymbol(symbol))
    }

    /// Construct a vector value from a dump bit-string
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EmptyVector`] for an empty string and
    /// [`ValueError::InvalidSymbol`] for any character outside the
    /// value alphabet.
    pub fn vector(bits: &str) -> Result<Self, ValueError> {
        if bits.is_empty() {
            return Err(ValueError::EmptyVector);
        }
        let parsed = bits
            .chars()
            .map(|c| Scalar::from_symbol(c).ok_or(ValueError::InvalidSymbol(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Vector(parsed))
    }

    /// Whether this value counts as active for page tracking
    ///
    /// Active means the value is exactly logic high: a scalar `1` or a
    /// one-bit vector holding `1`. Wider vectors never count.
    #[must_use]
    pub fn is_high(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_high(),
            Self::Vector(bits) => bits.len() == 1 && bits[0].is_high(),
        }
    }

    /// Bit width of this value
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(bits) => bits.len(),
        }
    }
}

impl std::fmt::Display for SignalValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Vector(bits) => {
                for bit in bits {
                    write!(f, "{bit}")?;
                }
                Ok(())
            }
        }
    }
}
