//! Fixed-length hex decoding for credentials
//!
//! Credentials arrive as unprefixed, separator-free hex strings of an exact
//! length per field. Anything else is rejected before a byte is produced.

use core::fmt;

/// Hex parsing error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HexError {
    /// Input does not have exactly two characters per output byte
    InvalidLength {
        /// Required number of hex characters
        expected: usize,
        /// Number of bytes in the input
        actual: usize,
    },
    /// Byte at `index` is not a hex digit
    InvalidDigit {
        /// Offset of the offending byte in the input
        index: usize,
    },
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, actual } => {
                write!(f, "expected {} hex characters, got {}", expected, actual)
            }
            Self::InvalidDigit { index } => write!(f, "invalid hex digit at offset {}", index),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HexError {}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 0xA),
        b'A'..=b'F' => Some(c - b'A' + 0xA),
        _ => None,
    }
}

/// Decode exactly `N` bytes from `2 * N` hex characters
///
/// Case-insensitive. Short input, trailing characters and any non-hex
/// character (including multi-byte UTF-8) are errors.
pub fn decode_fixed<const N: usize>(hex: &str) -> Result<[u8; N], HexError> {
    let input = hex.as_bytes();
    if input.len() != 2 * N {
        return Err(HexError::InvalidLength {
            expected: 2 * N,
            actual: input.len(),
        });
    }

    let mut out = [0u8; N];
    for (i, pair) in input.chunks_exact(2).enumerate() {
        let msn = nibble(pair[0]).ok_or(HexError::InvalidDigit { index: 2 * i })?;
        let lsn = nibble(pair[1]).ok_or(HexError::InvalidDigit { index: 2 * i + 1 })?;
        out[i] = (msn << 4) | lsn;
    }
    Ok(out)
}

/// Contiguous hex rendering of a byte slice
///
/// `Display` and `LowerHex` print lowercase, `UpperHex` uppercase. The output
/// of either is accepted by [`decode_fixed`].
#[derive(Debug, Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::LowerHex for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::UpperHex for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}
