//! Chunk header validation
//!
//! The header is pure self-description: a signature, version/format tags and
//! a set of canaries that let the decoder reject chunks compiled for another
//! machine before it touches any real data. Nothing in it is retained.

use crate::error::{ChunkError, Result};
use crate::reader::Reader;

/// Magic bytes every chunk starts with
pub const SIGNATURE: [u8; 4] = *b"\x1bLua";

/// Supported bytecode version
pub const VERSION: u8 = 0x53;

/// Supported chunk format
pub const FORMAT: u8 = 0;

/// Canary bytes after the format tag, for corruption detection
///
/// 0x1993 (the year of the first release) followed by CR, LF, SUB, LF.
pub const CANARY_DATA: [u8; 6] = *b"\x19\x93\r\n\x1a\n";

/// Width of a C int in the chunk, in bytes
pub const INT_WIDTH: u8 = 4;

/// Width of a C size_t in the chunk, in bytes
pub const SIZE_T_WIDTH: u8 = 8;

/// Width of an instruction word, in bytes
pub const INSTRUCTION_WIDTH: u8 = 4;

/// Width of an integer value, in bytes
pub const INTEGER_WIDTH: u8 = 8;

/// Width of a float value, in bytes
pub const FLOAT_WIDTH: u8 = 8;

/// Integer canary; decoding it to anything else means an endianness mismatch
pub const CANARY_INT: i64 = 0x5678;

/// Float canary; decoding it to anything else means a float format mismatch
pub const CANARY_FLOAT: f64 = 370.5;

/// Validate the chunk header
///
/// Checks run in stream order and each mismatch maps to its own
/// [`ChunkError`] discriminant so callers can report the exact violated
/// expectation. On success the reader is left positioned after the header.
pub fn check(r: &mut Reader<'_>) -> Result<()> {
    if r.read_bytes(4)? != SIGNATURE {
        return Err(ChunkError::BadSignature);
    }
    let version = r.read_byte()?;
    if version != VERSION {
        return Err(ChunkError::UnsupportedVersion(version));
    }
    let format = r.read_byte()?;
    if format != FORMAT {
        return Err(ChunkError::UnsupportedFormat(format));
    }
    if r.read_bytes(6)? != CANARY_DATA {
        return Err(ChunkError::CorruptData);
    }
    let int_width = r.read_byte()?;
    if int_width != INT_WIDTH {
        return Err(ChunkError::IntWidthMismatch(int_width));
    }
    let size_t_width = r.read_byte()?;
    if size_t_width != SIZE_T_WIDTH {
        return Err(ChunkError::SizeTWidthMismatch(size_t_width));
    }
    let instruction_width = r.read_byte()?;
    if instruction_width != INSTRUCTION_WIDTH {
        return Err(ChunkError::InstructionWidthMismatch(instruction_width));
    }
    let integer_width = r.read_byte()?;
    if integer_width != INTEGER_WIDTH {
        return Err(ChunkError::IntegerWidthMismatch(integer_width));
    }
    let float_width = r.read_byte()?;
    if float_width != FLOAT_WIDTH {
        return Err(ChunkError::FloatWidthMismatch(float_width));
    }
    let canary_int = r.read_i64()?;
    if canary_int != CANARY_INT {
        return Err(ChunkError::EndiannessMismatch(canary_int));
    }
    let canary_float = r.read_f64()?;
    if canary_float != CANARY_FLOAT {
        return Err(ChunkError::FloatFormatMismatch(canary_float));
    }
    Ok(())
}
