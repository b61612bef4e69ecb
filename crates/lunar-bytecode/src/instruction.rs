//! Packed 32-bit instruction words
//!
//! ```text
//!  31       23       15        7      0
//!   +--------+---------+--------+-----+
//!   | B: 9   |  C: 9   | A: 8   | op:6|   iABC
//!   +--------+---------+--------+-----+
//!   |    Bx: 18        | A: 8   | op:6|   iABx
//!   +------------------+--------+-----+
//!   |   sBx: 18        | A: 8   | op:6|   iAsBx
//!   +------------------+--------+-----+
//!   |        Ax: 26             | op:6|   iAx
//!   +---------------------------+-----+
//! ```

use serde::{Deserialize, Serialize};

use crate::opcode::Opcode;

/// Maximum value of an unsigned 18-bit Bx operand
pub const MAX_ARG_BX: u32 = (1 << 18) - 1; // 262143

/// Excess-K bias for the signed sBx operand
///
/// sBx stores a signed value in offset-binary form: the unsigned 18-bit
/// field minus this bias gives the signed value.
pub const MAX_ARG_SBX: i32 = (MAX_ARG_BX >> 1) as i32; // 131071

/// One instruction word
///
/// The word is opaque: nothing here executes opcode semantics, these methods
/// only extract bit fields and consult the opcode metadata table. Extraction
/// is total — every 32-bit pattern decodes under every layout, and it is the
/// opcode's layout class that says which extraction is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Wrap a raw instruction word
    #[inline]
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    /// The raw word
    #[inline]
    pub const fn word(self) -> u32 {
        self.0
    }

    /// Opcode byte from the low 6 bits
    #[inline]
    pub const fn opcode_byte(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    /// Opcode from the low 6 bits, `None` for bytes outside the table
    #[inline]
    pub fn opcode(self) -> Option<Opcode> {
        Opcode::from_byte(self.opcode_byte())
    }

    /// Extract (A, B, C) under the iABC layout
    #[inline]
    pub const fn abc(self) -> (u8, u16, u16) {
        let a = (self.0 >> 6 & 0xFF) as u8;
        let c = (self.0 >> 14 & 0x1FF) as u16;
        let b = (self.0 >> 23 & 0x1FF) as u16;
        (a, b, c)
    }

    /// Extract (A, Bx) under the iABx layout
    #[inline]
    pub const fn abx(self) -> (u8, u32) {
        let a = (self.0 >> 6 & 0xFF) as u8;
        let bx = self.0 >> 14;
        (a, bx)
    }

    /// Extract (A, sBx) under the iAsBx layout
    ///
    /// The 18-bit field is offset-binary encoded: an unsigned value of 0
    /// means -131071, 131071 means 0, 262143 means 131072.
    #[inline]
    pub const fn asbx(self) -> (u8, i32) {
        let (a, bx) = self.abx();
        (a, bx as i32 - MAX_ARG_SBX)
    }

    /// Extract Ax under the iAx layout
    #[inline]
    pub const fn ax(self) -> u32 {
        self.0 >> 6
    }
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        Self(word)
    }
}
