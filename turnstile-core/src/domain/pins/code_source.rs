use std::fmt;

use rand::{TryRngCore, rngs::OsRng};

use crate::domain::auth::value_objects::PinCode;
use crate::error::GenerationError;

/// Character set PIN codes are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeAlphabet {
    #[default]
    Numeric,
    /// Uppercase letters and digits without `0 O 1 I`.
    Alphanumeric,
}

impl CodeAlphabet {
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            CodeAlphabet::Numeric => b"0123456789",
            CodeAlphabet::Alphanumeric => b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ",
        }
    }
}

/// Shape of generated codes and the per-slot redraw budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinPolicy {
    pub length: usize,
    pub alphabet: CodeAlphabet,
    /// Redraws allowed per slot after the first draw collides.
    pub max_redraws: u32,
}

impl Default for PinPolicy {
    fn default() -> Self {
        Self {
            length: 10,
            alphabet: CodeAlphabet::Numeric,
            max_redraws: 16,
        }
    }
}

/// Source of candidate PIN codes.
pub trait CodeSource: Send + Sync + fmt::Debug {
    fn draw(&self, policy: &PinPolicy) -> Result<PinCode, GenerationError>;
}

/// Draws from the operating system CSPRNG.
///
/// Bytes that would bias the modulo reduction are rejected, so every symbol
/// of the alphabet is equally likely.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsCodeSource;

impl CodeSource for OsCodeSource {
    fn draw(&self, policy: &PinPolicy) -> Result<PinCode, GenerationError> {
        let symbols = policy.alphabet.symbols();
        let radix = symbols.len();
        // Largest multiple of radix that fits in a byte.
        let limit = 256 - (256 % radix);

        let mut code = String::with_capacity(policy.length);
        let mut buffer = vec![0u8; policy.length * 2];
        while code.len() < policy.length {
            OsRng
                .try_fill_bytes(&mut buffer)
                .map_err(|err| GenerationError::Entropy(err.to_string()))?;
            for &byte in &buffer {
                if usize::from(byte) >= limit {
                    continue;
                }
                code.push(char::from(symbols[usize::from(byte) % radix]));
                if code.len() == policy.length {
                    break;
                }
            }
        }

        Ok(PinCode::from_generated(code))
    }
}
