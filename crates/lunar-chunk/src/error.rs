//! Chunk decoding errors

use thiserror::Error;

/// Errors that can occur while decoding a precompiled chunk
///
/// Every error is fatal to the decode in progress: the caller gets either a
/// complete prototype tree or exactly one of these, never a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChunkError {
    /// Buffer does not start with the chunk signature
    #[error("not a precompiled chunk")]
    BadSignature,

    /// Chunk was produced for another bytecode version
    #[error("version mismatch: {0:#04x}")]
    UnsupportedVersion(u8),

    /// Chunk was produced in another format
    #[error("format mismatch: {0}")]
    UnsupportedFormat(u8),

    /// Data canary bytes are corrupted
    #[error("corrupted chunk data")]
    CorruptData,

    /// C int width differs from what this decoder was built for
    #[error("int size mismatch: {0}")]
    IntWidthMismatch(u8),

    /// C size_t width differs from what this decoder was built for
    #[error("size_t size mismatch: {0}")]
    SizeTWidthMismatch(u8),

    /// Instruction width differs from what this decoder was built for
    #[error("instruction size mismatch: {0}")]
    InstructionWidthMismatch(u8),

    /// Integer width differs from what this decoder was built for
    #[error("integer size mismatch: {0}")]
    IntegerWidthMismatch(u8),

    /// Float width differs from what this decoder was built for
    #[error("float size mismatch: {0}")]
    FloatWidthMismatch(u8),

    /// Integer canary did not decode to the expected value (endianness)
    #[error("endianness mismatch: {0:#x}")]
    EndiannessMismatch(i64),

    /// Float canary did not decode to the expected value (float format)
    #[error("float format mismatch: {0}")]
    FloatFormatMismatch(f64),

    /// Unrecognized constant tag byte
    #[error("corrupted constant: tag {0:#04x}")]
    CorruptConstant(u8),

    /// A read ran past the end of the buffer
    #[error("truncated chunk")]
    TruncatedInput,
}

/// Result type for chunk decoding
pub type Result<T> = std::result::Result<T, ChunkError>;
