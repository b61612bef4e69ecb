//! # Lunar Chunk
//!
//! Decoder for precompiled chunks: the on-disk artifact a bytecode compiler
//! emits is turned into an in-memory tree of [`Prototype`]s any executor can
//! consume.
//!
//! ## Design Principles
//!
//! - **Decode-only**: there is no dump direction here
//! - **All-or-nothing**: a decode yields a complete tree or one error,
//!   never a partial result
//! - **No I/O**: callers hand in a fully loaded byte buffer

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constant;
pub mod error;
pub mod header;
pub mod prototype;
pub mod reader;

pub use constant::Constant;
pub use error::{ChunkError, Result};
pub use prototype::{LocalVar, Prototype, Upvalue};
pub use reader::Reader;

use tracing::debug;

/// Decode a precompiled chunk into its root prototype
///
/// Validates the header, skips the reserved upvalue-count byte of the main
/// closure, then decodes the prototype tree. The returned root owns the
/// whole tree; `data` is not retained.
pub fn undump(data: &[u8]) -> Result<Prototype> {
    let mut r = Reader::new(data);
    header::check(&mut r)?;
    r.read_byte()?; // upvalue count of the main closure, fixed by the format
    let proto = Prototype::read(&mut r, "")?;
    debug!(
        source = %proto.source,
        instructions = proto.code.len(),
        protos = proto.protos.len(),
        "chunk decoded"
    );
    Ok(proto)
}
