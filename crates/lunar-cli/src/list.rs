//! Text listing of a decoded prototype tree
//!
//! Output follows the layout of `luac -l`: a header pair per function, one
//! line per instruction, then the constant, local and upvalue detail blocks,
//! recursing into nested prototypes. Decode-only; nothing here executes.

use std::fmt::Write;

use lunar_bytecode::{ArgMode, BytecodeError, Instruction, OpMode, Opcode};
use lunar_chunk::{Constant, Prototype};

/// Render the whole prototype tree
pub fn list(proto: &Prototype) -> Result<String, BytecodeError> {
    let mut out = String::new();
    list_proto(&mut out, proto)?;
    Ok(out)
}

fn list_proto(out: &mut String, proto: &Prototype) -> Result<(), BytecodeError> {
    header(out, proto);
    code(out, proto)?;
    detail(out, proto);
    for child in &proto.protos {
        list_proto(out, child)?;
    }
    Ok(())
}

fn header(out: &mut String, proto: &Prototype) {
    let kind = if proto.is_main_chunk() { "main" } else { "function" };
    let vararg = if proto.is_vararg() { "+" } else { "" };
    let _ = writeln!(
        out,
        "\n{} <{}:{},{}> ({} instructions)",
        kind,
        proto.source,
        proto.line_defined,
        proto.last_line_defined,
        proto.code.len()
    );
    let _ = writeln!(
        out,
        "{}{} params, {} slots, {} upvalues, {} locals, {} constants, {} functions",
        proto.num_params,
        vararg,
        proto.max_stack_size,
        proto.upvalues.len(),
        proto.loc_vars.len(),
        proto.constants.len(),
        proto.protos.len()
    );
}

fn code(out: &mut String, proto: &Prototype) -> Result<(), BytecodeError> {
    for (pc, word) in proto.code.iter().enumerate() {
        let line = match proto.line_at(pc) {
            Some(n) => n.to_string(),
            None => "-".to_string(),
        };
        let op = Opcode::try_from_byte(word.opcode_byte())?;
        let _ = write!(out, "\t{}\t[{}]\t{:<9}\t", pc + 1, line, op.name());
        operands(out, op, *word);
        out.push('\n');
    }
    Ok(())
}

/// Format operands the way `luac` prints them: constant-table indexes in RK
/// operands show as `-1-k`, unused operands are omitted.
fn operands(out: &mut String, op: Opcode, word: Instruction) {
    match op.mode() {
        OpMode::Abc => {
            let (a, b, c) = word.abc();
            let _ = write!(out, "{}", a);
            if op.b_mode() != ArgMode::Unused {
                let _ = write!(out, " {}", rk(b));
            }
            if op.c_mode() != ArgMode::Unused {
                let _ = write!(out, " {}", rk(c));
            }
        }
        OpMode::Abx => {
            let (a, bx) = word.abx();
            let _ = write!(out, "{}", a);
            match op.b_mode() {
                ArgMode::RegisterOrConstant => {
                    let _ = write!(out, " {}", -1 - bx as i64);
                }
                ArgMode::Unsigned => {
                    let _ = write!(out, " {}", bx);
                }
                _ => {}
            }
        }
        OpMode::AsBx => {
            let (a, sbx) = word.asbx();
            let _ = write!(out, "{} {}", a, sbx);
        }
        OpMode::Ax => {
            let _ = write!(out, "{}", -1 - word.ax() as i64);
        }
    }
}

/// An RK operand with the high bit set names a constant-table slot
fn rk(operand: u16) -> i32 {
    if operand > 0xFF {
        -1 - (operand & 0xFF) as i32
    } else {
        operand as i32
    }
}

fn detail(out: &mut String, proto: &Prototype) {
    let _ = writeln!(out, "constants ({}):", proto.constants.len());
    for (i, constant) in proto.constants.iter().enumerate() {
        let _ = writeln!(out, "\t{}\t{}", i + 1, constant_repr(constant));
    }

    let _ = writeln!(out, "locals ({}):", proto.loc_vars.len());
    for (i, var) in proto.loc_vars.iter().enumerate() {
        let _ = writeln!(
            out,
            "\t{}\t{}\t{}\t{}",
            i,
            var.name,
            var.start_pc + 1,
            var.end_pc + 1
        );
    }

    let _ = writeln!(out, "upvalues ({}):", proto.upvalues.len());
    for (i, upvalue) in proto.upvalues.iter().enumerate() {
        let name = proto.upvalue_names.get(i).map(String::as_str).unwrap_or("-");
        let _ = writeln!(
            out,
            "\t{}\t{}\t{}\t{}",
            i,
            name,
            upvalue.in_stack as u8,
            upvalue.index
        );
    }
}

fn constant_repr(constant: &Constant) -> String {
    match constant {
        Constant::Nil => "nil".to_string(),
        Constant::Boolean(b) => b.to_string(),
        Constant::Integer(i) => i.to_string(),
        Constant::Float(n) => n.to_string(),
        Constant::Str(s) => format!("{:?}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_abc(op: u8, a: u8, b: u16, c: u16) -> Instruction {
        Instruction(((b as u32) << 23) | ((c as u32) << 14) | ((a as u32) << 6) | op as u32)
    }

    fn pack_abx(op: u8, a: u8, bx: u32) -> Instruction {
        Instruction((bx << 14) | ((a as u32) << 6) | op as u32)
    }

    fn hello_proto() -> Prototype {
        Prototype {
            source: "@hello.lua".into(),
            line_defined: 0,
            last_line_defined: 0,
            num_params: 0,
            is_vararg: 2,
            max_stack_size: 2,
            code: vec![
                // GETTABUP 0 0 -1 ; LOADK 1 -2 ; CALL 0 2 1 ; RETURN 0 1
                pack_abc(6, 0, 0, 0x100),
                pack_abx(1, 1, 1),
                pack_abc(36, 0, 2, 1),
                pack_abc(38, 0, 1, 0),
            ],
            constants: vec![
                Constant::Str("print".into()),
                Constant::Str("hello".into()),
            ],
            upvalues: vec![lunar_chunk::Upvalue {
                in_stack: true,
                index: 0,
            }],
            protos: vec![],
            line_info: vec![1, 1, 1, 1],
            loc_vars: vec![],
            upvalue_names: vec!["_ENV".into()],
        }
    }

    #[test]
    fn test_list_hello() {
        let out = list(&hello_proto()).unwrap();
        assert!(out.contains("main <@hello.lua:0,0> (4 instructions)"));
        assert!(out.contains("0+ params, 2 slots, 1 upvalues, 0 locals, 2 constants, 0 functions"));
        assert!(out.contains("GETTABUP"));
        assert!(out.contains("0 0 -1")); // RK operand rendered as constant slot
        assert!(out.contains("\t2\t[1]\tLOADK"));
        assert!(out.contains("\t1\t\"print\""));
        assert!(out.contains("\t0\t_ENV\t1\t0"));
    }

    #[test]
    fn test_list_recurses_into_children() {
        let mut root = hello_proto();
        let mut child = hello_proto();
        child.line_defined = 2;
        child.last_line_defined = 4;
        root.protos.push(child);

        let out = list(&root).unwrap();
        assert!(out.contains("function <@hello.lua:2,4>"));
    }

    #[test]
    fn test_list_rejects_invalid_opcode() {
        let mut proto = hello_proto();
        proto.code.push(Instruction(63)); // opcode byte past the table
        let err = list(&proto).unwrap_err();
        assert!(matches!(err, BytecodeError::InvalidOpcode(63)));
    }

    #[test]
    fn test_missing_line_info_prints_dash() {
        let mut proto = hello_proto();
        proto.line_info.clear();
        let out = list(&proto).unwrap();
        assert!(out.contains("\t1\t[-]\t"));
    }
}
