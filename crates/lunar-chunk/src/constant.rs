//! Constants stored in a prototype's constant table

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};
use crate::reader::Reader;

/// Tag byte for a nil constant
pub const TAG_NIL: u8 = 0x00;
/// Tag byte for a boolean constant
pub const TAG_BOOLEAN: u8 = 0x01;
/// Tag byte for a float constant
pub const TAG_FLOAT: u8 = 0x03;
/// Tag byte for an integer constant
pub const TAG_INTEGER: u8 = 0x13;
/// Tag byte for a short string constant
pub const TAG_SHORT_STRING: u8 = 0x04;
/// Tag byte for a long string constant
pub const TAG_LONG_STRING: u8 = 0x14;

/// A literal from the source program
///
/// The two string tags only describe the storage size class in the chunk;
/// both decode to the same variant. Values are immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    /// nil
    Nil,
    /// true or false
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit IEEE float
    Float(f64),
    /// Owned string payload
    Str(String),
}

impl Constant {
    /// Decode one tagged constant from the stream
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let tag = r.read_byte()?;
        match tag {
            TAG_NIL => Ok(Self::Nil),
            TAG_BOOLEAN => Ok(Self::Boolean(r.read_byte()? != 0)),
            TAG_INTEGER => Ok(Self::Integer(r.read_i64()?)),
            TAG_FLOAT => Ok(Self::Float(r.read_f64()?)),
            TAG_SHORT_STRING | TAG_LONG_STRING => Ok(Self::Str(r.read_string()?)),
            _ => Err(ChunkError::CorruptConstant(tag)),
        }
    }

    /// Check if this is nil
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Get as integer if this is an integer constant
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a float constant
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string if this is a string constant
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
