use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur when accepting a PIN from a caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinCodeError {
    #[error("PIN is empty")]
    Empty,

    #[error("PIN is too long (maximum {max} characters)")]
    TooLong { max: usize },
}

/// PIN as presented by a caller or produced by the generator.
///
/// Matching is exact and case-sensitive, so the value is kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct PinCode(String);

impl PinCode {
    /// Longest value the `pin_code` column accepts.
    pub const MAX_LENGTH: usize = 255;

    /// Accept a caller-supplied PIN. Blank input is rejected so it can be
    /// treated as "no credential" rather than a failed attempt.
    pub fn parse(raw: &str) -> Result<Self, PinCodeError> {
        if raw.trim().is_empty() {
            return Err(PinCodeError::Empty);
        }
        if raw.len() > Self::MAX_LENGTH {
            return Err(PinCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub(crate) fn from_generated(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PinCode").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_pins_are_rejected() {
        assert_eq!(PinCode::parse(""), Err(PinCodeError::Empty));
        assert_eq!(PinCode::parse("   \t"), Err(PinCodeError::Empty));
    }

    #[test]
    fn pins_are_kept_verbatim() {
        let pin = PinCode::parse("AbC123").unwrap();
        assert_eq!(pin.as_str(), "AbC123");
        assert_ne!(pin, PinCode::parse("abc123").unwrap());
    }

    #[test]
    fn oversized_pins_are_rejected() {
        let raw = "9".repeat(PinCode::MAX_LENGTH + 1);
        assert!(matches!(
            PinCode::parse(&raw),
            Err(PinCodeError::TooLong { .. })
        ));
    }

    #[test]
    fn debug_is_redacted() {
        let pin = PinCode::parse("123456").unwrap();
        assert!(!format!("{pin:?}").contains("123456"));
    }
}
