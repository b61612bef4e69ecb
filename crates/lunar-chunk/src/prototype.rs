//! Function prototypes decoded from a chunk

use lunar_bytecode::Instruction;
use serde::{Deserialize, Serialize};

use crate::constant::Constant;
use crate::error::Result;
use crate::reader::Reader;

/// An upvalue descriptor
///
/// `in_stack` says whether the value is captured from the enclosing
/// function's register frame (as opposed to its upvalue list); `index` is
/// the slot in whichever of the two it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upvalue {
    /// Captured from the enclosing register frame
    pub in_stack: bool,
    /// Slot index in the frame or upvalue list
    pub index: u8,
}

/// Debug record for one local variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVar {
    /// Variable name
    pub name: String,
    /// First instruction index where the variable is live
    pub start_pc: u32,
    /// Last instruction index where the variable is live
    pub end_pc: u32,
}

/// The compiled form of one function
///
/// Prototypes form a tree: each exclusively owns its children and the root
/// (the implicit main chunk) is handed to the caller of
/// [`undump`](crate::undump). The three debug tables at the end are advisory
/// only; their lengths are taken from the stream as-is and are not checked
/// against the instruction or upvalue tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    /// Source name; inherited from the nearest ancestor when the chunk
    /// stores an empty string for this node
    pub source: String,
    /// Line where the function is defined (0 for the main chunk)
    pub line_defined: u32,
    /// Line where the function definition ends (0 for the main chunk)
    pub last_line_defined: u32,
    /// Number of fixed parameters
    pub num_params: u8,
    /// Raw vararg flag byte
    pub is_vararg: u8,
    /// Registers the function needs
    pub max_stack_size: u8,
    /// Instruction words
    pub code: Vec<Instruction>,
    /// Constant table
    pub constants: Vec<Constant>,
    /// Upvalue descriptors
    pub upvalues: Vec<Upvalue>,
    /// Nested function prototypes
    pub protos: Vec<Prototype>,
    /// Source line per instruction (debug, parallel to `code`)
    pub line_info: Vec<u32>,
    /// Local variable records (debug)
    pub loc_vars: Vec<LocalVar>,
    /// Upvalue names (debug, parallel to `upvalues`)
    pub upvalue_names: Vec<String>,
}

impl Prototype {
    /// Decode one prototype, recursing into nested ones
    ///
    /// `parent_source` is substituted when this node stores no source name
    /// of its own, so every node reports an effective source.
    pub fn read(r: &mut Reader<'_>, parent_source: &str) -> Result<Self> {
        let mut source = r.read_string()?;
        if source.is_empty() {
            source = parent_source.to_owned();
        }
        let line_defined = r.read_u32()?;
        let last_line_defined = r.read_u32()?;
        let num_params = r.read_byte()?;
        let is_vararg = r.read_byte()?;
        let max_stack_size = r.read_byte()?;
        let code = read_code(r)?;
        let constants = read_constants(r)?;
        let upvalues = read_upvalues(r)?;
        let protos = read_protos(r, &source)?;
        let line_info = read_line_info(r)?;
        let loc_vars = read_loc_vars(r)?;
        let upvalue_names = read_upvalue_names(r)?;
        Ok(Self {
            source,
            line_defined,
            last_line_defined,
            num_params,
            is_vararg,
            max_stack_size,
            code,
            constants,
            upvalues,
            protos,
            line_info,
            loc_vars,
            upvalue_names,
        })
    }

    /// Whether the function accepts variadic arguments
    #[inline]
    pub fn is_vararg(&self) -> bool {
        self.is_vararg != 0
    }

    /// Whether this is the synthetic main chunk
    #[inline]
    pub fn is_main_chunk(&self) -> bool {
        self.line_defined == 0
    }

    /// Source line for the instruction at `pc`, if recorded
    #[inline]
    pub fn line_at(&self, pc: usize) -> Option<u32> {
        self.line_info.get(pc).copied()
    }
}

/// Pre-allocation bound for a stream-supplied element count
///
/// Every element consumes at least one byte, so the bytes left in the
/// buffer cap how many can actually follow.
fn capacity_for(count: u32, r: &Reader<'_>) -> usize {
    (count as usize).min(r.remaining())
}

fn read_code(r: &mut Reader<'_>) -> Result<Vec<Instruction>> {
    let count = r.read_u32()?;
    let mut code = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        code.push(Instruction::new(r.read_u32()?));
    }
    Ok(code)
}

fn read_constants(r: &mut Reader<'_>) -> Result<Vec<Constant>> {
    let count = r.read_u32()?;
    let mut constants = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        constants.push(Constant::read(r)?);
    }
    Ok(constants)
}

fn read_upvalues(r: &mut Reader<'_>) -> Result<Vec<Upvalue>> {
    let count = r.read_u32()?;
    let mut upvalues = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        upvalues.push(Upvalue {
            in_stack: r.read_byte()? != 0,
            index: r.read_byte()?,
        });
    }
    Ok(upvalues)
}

fn read_protos(r: &mut Reader<'_>, parent_source: &str) -> Result<Vec<Prototype>> {
    let count = r.read_u32()?;
    let mut protos = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        protos.push(Prototype::read(r, parent_source)?);
    }
    Ok(protos)
}

fn read_line_info(r: &mut Reader<'_>) -> Result<Vec<u32>> {
    let count = r.read_u32()?;
    let mut line_info = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        line_info.push(r.read_u32()?);
    }
    Ok(line_info)
}

fn read_loc_vars(r: &mut Reader<'_>) -> Result<Vec<LocalVar>> {
    let count = r.read_u32()?;
    let mut loc_vars = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        loc_vars.push(LocalVar {
            name: r.read_string()?,
            start_pc: r.read_u32()?,
            end_pc: r.read_u32()?,
        });
    }
    Ok(loc_vars)
}

fn read_upvalue_names(r: &mut Reader<'_>) -> Result<Vec<String>> {
    let count = r.read_u32()?;
    let mut names = Vec::with_capacity(capacity_for(count, r));
    for _ in 0..count {
        names.push(r.read_string()?);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::{TAG_INTEGER, TAG_SHORT_STRING};
    use crate::error::ChunkError;

    fn push_string(buf: &mut Vec<u8>, s: &str) {
        buf.push(s.len() as u8 + 1);
        buf.extend_from_slice(s.as_bytes());
    }

    /// Body of a prototype with the given source and children, no code,
    /// no constants, no upvalues, no debug info.
    fn empty_proto(source: &str, children: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = Vec::new();
        if source.is_empty() {
            buf.push(0);
        } else {
            push_string(&mut buf, source);
        }
        buf.extend_from_slice(&0u32.to_le_bytes()); // line_defined
        buf.extend_from_slice(&0u32.to_le_bytes()); // last_line_defined
        buf.push(0); // num_params
        buf.push(1); // is_vararg
        buf.push(2); // max_stack_size
        buf.extend_from_slice(&0u32.to_le_bytes()); // code
        buf.extend_from_slice(&0u32.to_le_bytes()); // constants
        buf.extend_from_slice(&0u32.to_le_bytes()); // upvalues
        buf.extend_from_slice(&(children.len() as u32).to_le_bytes());
        for child in children {
            buf.extend_from_slice(child);
        }
        buf.extend_from_slice(&0u32.to_le_bytes()); // line_info
        buf.extend_from_slice(&0u32.to_le_bytes()); // loc_vars
        buf.extend_from_slice(&0u32.to_le_bytes()); // upvalue_names
        buf
    }

    #[test]
    fn test_empty_prototype() {
        let buf = empty_proto("@main.lua", &[]);
        let mut r = Reader::new(&buf);
        let proto = Prototype::read(&mut r, "").unwrap();
        assert_eq!(r.position(), buf.len());
        assert_eq!(proto.source, "@main.lua");
        assert!(proto.is_main_chunk());
        assert!(proto.is_vararg());
        assert_eq!(proto.max_stack_size, 2);
        assert!(proto.code.is_empty());
        assert!(proto.constants.is_empty());
        assert!(proto.upvalues.is_empty());
        assert!(proto.protos.is_empty());
        assert!(proto.line_info.is_empty());
        assert!(proto.loc_vars.is_empty());
        assert!(proto.upvalue_names.is_empty());
    }

    #[test]
    fn test_source_inheritance() {
        // grandchild with no name inherits through the unnamed child;
        // a named child keeps its own
        let grandchild = empty_proto("", &[]);
        let unnamed_child = empty_proto("", &[grandchild]);
        let named_child = empty_proto("@other.lua", &[]);
        let root = empty_proto("@main.lua", &[unnamed_child, named_child]);

        let proto = Prototype::read(&mut Reader::new(&root), "").unwrap();
        assert_eq!(proto.source, "@main.lua");
        assert_eq!(proto.protos[0].source, "@main.lua");
        assert_eq!(proto.protos[0].protos[0].source, "@main.lua");
        assert_eq!(proto.protos[1].source, "@other.lua");
    }

    #[test]
    fn test_full_body() {
        let mut buf = Vec::new();
        push_string(&mut buf, "@f.lua");
        buf.extend_from_slice(&3u32.to_le_bytes()); // line_defined
        buf.extend_from_slice(&5u32.to_le_bytes()); // last_line_defined
        buf.push(2); // num_params
        buf.push(0); // is_vararg
        buf.push(4); // max_stack_size
        // two instructions
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&0x0000_4041u32.to_le_bytes());
        buf.extend_from_slice(&0x0080_0026u32.to_le_bytes());
        // one integer constant
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(TAG_INTEGER);
        buf.extend_from_slice(&99i64.to_le_bytes());
        // one upvalue (in stack, slot 0)
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(1);
        buf.push(0);
        // no children
        buf.extend_from_slice(&0u32.to_le_bytes());
        // line info, one entry per instruction
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&4u32.to_le_bytes());
        buf.extend_from_slice(&5u32.to_le_bytes());
        // one local
        buf.extend_from_slice(&1u32.to_le_bytes());
        push_string(&mut buf, "x");
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        // one upvalue name
        buf.extend_from_slice(&1u32.to_le_bytes());
        push_string(&mut buf, "_ENV");

        let proto = Prototype::read(&mut Reader::new(&buf), "").unwrap();
        assert_eq!(proto.source, "@f.lua");
        assert_eq!((proto.line_defined, proto.last_line_defined), (3, 5));
        assert!(!proto.is_main_chunk());
        assert!(!proto.is_vararg());
        assert_eq!(proto.num_params, 2);
        assert_eq!(proto.code.len(), 2);
        assert_eq!(proto.code[0].word(), 0x0000_4041);
        assert_eq!(proto.constants, vec![Constant::Integer(99)]);
        assert_eq!(
            proto.upvalues,
            vec![Upvalue {
                in_stack: true,
                index: 0
            }]
        );
        assert_eq!(proto.line_at(1), Some(5));
        assert_eq!(proto.line_at(2), None);
        assert_eq!(
            proto.loc_vars,
            vec![LocalVar {
                name: "x".into(),
                start_pc: 0,
                end_pc: 2
            }]
        );
        assert_eq!(proto.upvalue_names, vec!["_ENV".to_owned()]);
    }

    #[test]
    fn test_truncated_body_aborts() {
        let buf = empty_proto("@main.lua", &[]);
        // drop the trailing upvalue-name count
        let truncated = &buf[..buf.len() - 2];
        assert_eq!(
            Prototype::read(&mut Reader::new(truncated), ""),
            Err(ChunkError::TruncatedInput)
        );
    }
}
