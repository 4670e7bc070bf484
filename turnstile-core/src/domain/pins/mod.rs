//! Bulk PIN issuance and the PIN directory.

pub mod code_source;
pub mod directory;
pub mod generator;

pub use code_source::{CodeAlphabet, CodeSource, OsCodeSource, PinPolicy};
pub use directory::PinDirectory;
pub use generator::PinGenerator;
