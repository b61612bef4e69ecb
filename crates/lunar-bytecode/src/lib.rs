//! # Lunar VM Bytecode
//!
//! This crate defines the instruction format for the Lunar VM: the packed
//! 32-bit instruction word, its four operand layouts, and the static
//! per-opcode metadata table an executor or disassembler drives on.
//!
//! ## Design Principles
//!
//! - **Register-based**: operands name virtual registers or constant slots
//! - **Fixed-width**: every instruction is one 32-bit word
//! - **Pure decoding**: field extraction only, no opcode semantics

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod instruction;
pub mod opcode;

pub use error::BytecodeError;
pub use instruction::{Instruction, MAX_ARG_BX, MAX_ARG_SBX};
pub use opcode::{ArgMode, OpMode, Opcode, OpcodeInfo, OPCODE_COUNT};
