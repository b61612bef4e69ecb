//! Bytecode errors

use thiserror::Error;

/// Errors that can occur while interpreting instruction words
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// Opcode byte outside the instruction set
    #[error("Invalid opcode: {0}")]
    InvalidOpcode(u8),
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
