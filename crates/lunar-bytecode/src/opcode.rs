//! Opcodes and the static per-opcode metadata table

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};

/// Number of opcodes in the instruction set
pub const OPCODE_COUNT: usize = 48;

/// Instruction layout class
///
/// Every instruction word carries its opcode in the low 6 bits; the layout
/// class decides how the remaining 26 bits are partitioned among operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpMode {
    /// Operands A (8 bits), B (9 bits), C (9 bits)
    Abc,
    /// Operands A (8 bits), Bx (18 bits, unsigned)
    Abx,
    /// Operands A (8 bits), sBx (18 bits, excess-K signed)
    AsBx,
    /// Single operand Ax (26 bits); extends the previous instruction
    Ax,
}

/// How an instruction uses its B or C operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgMode {
    /// Operand is not used
    Unused,
    /// Generic unsigned value (boolean, count, upvalue index, ...)
    Unsigned,
    /// Register index (jump offset for sBx)
    Register,
    /// Register index or constant-table index (RK operand)
    RegisterOrConstant,
}

/// Bytecode opcodes
///
/// Register-based instruction set. Discriminants are the opcode bytes as
/// they appear in the low 6 bits of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// R(A) := R(B)
    Move = 0,
    /// R(A) := Kst(Bx)
    LoadK = 1,
    /// R(A) := Kst(extra arg); next instruction is EXTRAARG
    LoadKx = 2,
    /// R(A) := (bool)B; if C, skip next instruction
    LoadBool = 3,
    /// R(A), R(A+1), ..., R(A+B) := nil
    LoadNil = 4,
    /// R(A) := UpValue\[B\]
    GetUpval = 5,
    /// R(A) := UpValue\[B\]\[RK(C)\]
    GetTabUp = 6,
    /// R(A) := R(B)\[RK(C)\]
    GetTable = 7,
    /// UpValue\[A\]\[RK(B)\] := RK(C)
    SetTabUp = 8,
    /// UpValue\[B\] := R(A)
    SetUpval = 9,
    /// R(A)\[RK(B)\] := RK(C)
    SetTable = 10,
    /// R(A) := {} (size hints in B and C)
    NewTable = 11,
    /// R(A+1) := R(B); R(A) := R(B)\[RK(C)\] (method-call prelude)
    SelfCall = 12,
    /// R(A) := RK(B) + RK(C)
    Add = 13,
    /// R(A) := RK(B) - RK(C)
    Sub = 14,
    /// R(A) := RK(B) * RK(C)
    Mul = 15,
    /// R(A) := RK(B) % RK(C)
    Mod = 16,
    /// R(A) := RK(B) ^ RK(C)
    Pow = 17,
    /// R(A) := RK(B) / RK(C)
    Div = 18,
    /// R(A) := RK(B) // RK(C)
    IDiv = 19,
    /// R(A) := RK(B) & RK(C)
    BAnd = 20,
    /// R(A) := RK(B) | RK(C)
    BOr = 21,
    /// R(A) := RK(B) ~ RK(C)
    BXor = 22,
    /// R(A) := RK(B) << RK(C)
    Shl = 23,
    /// R(A) := RK(B) >> RK(C)
    Shr = 24,
    /// R(A) := -R(B)
    Unm = 25,
    /// R(A) := ~R(B)
    BNot = 26,
    /// R(A) := not R(B)
    Not = 27,
    /// R(A) := length of R(B)
    Len = 28,
    /// R(A) := R(B).. ... ..R(C)
    Concat = 29,
    /// pc += sBx; if A, close upvalues >= R(A-1)
    Jmp = 30,
    /// if (RK(B) == RK(C)) != A then pc++
    Eq = 31,
    /// if (RK(B) < RK(C)) != A then pc++
    Lt = 32,
    /// if (RK(B) <= RK(C)) != A then pc++
    Le = 33,
    /// if bool(R(A)) != C then pc++
    Test = 34,
    /// if bool(R(B)) == C then R(A) := R(B) else pc++
    TestSet = 35,
    /// R(A), ... := R(A)(R(A+1), ...)
    Call = 36,
    /// return R(A)(R(A+1), ...)
    TailCall = 37,
    /// return R(A), ... R(A+B-2)
    Return = 38,
    /// numeric for loop step
    ForLoop = 39,
    /// numeric for loop init
    ForPrep = 40,
    /// generic for loop iterator call
    TForCall = 41,
    /// generic for loop step
    TForLoop = 42,
    /// R(A)\[(C-1)*FPF+i\] := R(A+i), 1 <= i <= B
    SetList = 43,
    /// R(A) := closure(KPROTO\[Bx\])
    Closure = 44,
    /// R(A), R(A+1), ..., R(A+B-2) := vararg
    Vararg = 45,
    /// extra (larger) argument for the previous instruction
    ExtraArg = 46,
    /// reserved slot past EXTRAARG; never emitted by the compiler
    Invalid = 47,
}

impl Opcode {
    /// Convert from raw byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Move),
            1 => Some(Self::LoadK),
            2 => Some(Self::LoadKx),
            3 => Some(Self::LoadBool),
            4 => Some(Self::LoadNil),
            5 => Some(Self::GetUpval),
            6 => Some(Self::GetTabUp),
            7 => Some(Self::GetTable),
            8 => Some(Self::SetTabUp),
            9 => Some(Self::SetUpval),
            10 => Some(Self::SetTable),
            11 => Some(Self::NewTable),
            12 => Some(Self::SelfCall),
            13 => Some(Self::Add),
            14 => Some(Self::Sub),
            15 => Some(Self::Mul),
            16 => Some(Self::Mod),
            17 => Some(Self::Pow),
            18 => Some(Self::Div),
            19 => Some(Self::IDiv),
            20 => Some(Self::BAnd),
            21 => Some(Self::BOr),
            22 => Some(Self::BXor),
            23 => Some(Self::Shl),
            24 => Some(Self::Shr),
            25 => Some(Self::Unm),
            26 => Some(Self::BNot),
            27 => Some(Self::Not),
            28 => Some(Self::Len),
            29 => Some(Self::Concat),
            30 => Some(Self::Jmp),
            31 => Some(Self::Eq),
            32 => Some(Self::Lt),
            33 => Some(Self::Le),
            34 => Some(Self::Test),
            35 => Some(Self::TestSet),
            36 => Some(Self::Call),
            37 => Some(Self::TailCall),
            38 => Some(Self::Return),
            39 => Some(Self::ForLoop),
            40 => Some(Self::ForPrep),
            41 => Some(Self::TForCall),
            42 => Some(Self::TForLoop),
            43 => Some(Self::SetList),
            44 => Some(Self::Closure),
            45 => Some(Self::Vararg),
            46 => Some(Self::ExtraArg),
            47 => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Convert from raw byte, failing on bytes outside the instruction set
    pub fn try_from_byte(byte: u8) -> Result<Self> {
        Self::from_byte(byte).ok_or(BytecodeError::InvalidOpcode(byte))
    }

    /// Convert to raw byte
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Metadata table entry for this opcode
    #[inline]
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODES[self as usize]
    }

    /// Display name of this opcode (as printed by disassemblers)
    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Layout class of this opcode
    #[inline]
    pub fn mode(self) -> OpMode {
        self.info().mode
    }

    /// Usage mode of operand B
    #[inline]
    pub fn b_mode(self) -> ArgMode {
        self.info().b_mode
    }

    /// Usage mode of operand C
    #[inline]
    pub fn c_mode(self) -> ArgMode {
        self.info().c_mode
    }

    /// Whether this is a test opcode (next instruction must be a jump)
    #[inline]
    pub fn is_test(self) -> bool {
        self.info().is_test
    }

    /// Whether this opcode writes register A
    #[inline]
    pub fn sets_a(self) -> bool {
        self.info().sets_a
    }
}

/// Static metadata describing one opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Test opcode: the following instruction must be an unconditional jump
    pub is_test: bool,
    /// Instruction writes register A
    pub sets_a: bool,
    /// Usage mode of operand B
    pub b_mode: ArgMode,
    /// Usage mode of operand C
    pub c_mode: ArgMode,
    /// Layout class
    pub mode: OpMode,
    /// Display name
    pub name: &'static str,
}

const fn entry(
    is_test: bool,
    sets_a: bool,
    b_mode: ArgMode,
    c_mode: ArgMode,
    mode: OpMode,
    name: &'static str,
) -> OpcodeInfo {
    OpcodeInfo {
        is_test,
        sets_a,
        b_mode,
        c_mode,
        mode,
        name,
    }
}

use ArgMode::{Register as R, RegisterOrConstant as K, Unsigned as U, Unused as N};

/// The opcode metadata table, indexed by opcode byte
pub static OPCODES: [OpcodeInfo; OPCODE_COUNT] = [
    //    test   setA   B  C  mode         name
    entry(false, true, R, N, OpMode::Abc, "MOVE"),
    entry(false, true, K, N, OpMode::Abx, "LOADK"),
    entry(false, true, N, N, OpMode::Abx, "LOADKX"),
    entry(false, true, U, U, OpMode::Abc, "LOADBOOL"),
    entry(false, true, U, N, OpMode::Abc, "LOADNIL"),
    entry(false, true, U, N, OpMode::Abc, "GETUPVAL"),
    entry(false, true, U, K, OpMode::Abc, "GETTABUP"),
    entry(false, true, R, K, OpMode::Abc, "GETTABLE"),
    entry(false, false, K, K, OpMode::Abc, "SETTABUP"),
    entry(false, false, U, N, OpMode::Abc, "SETUPVAL"),
    entry(false, false, K, K, OpMode::Abc, "SETTABLE"),
    entry(false, true, U, U, OpMode::Abc, "NEWTABLE"),
    entry(false, true, R, K, OpMode::Abc, "SELF"),
    entry(false, true, K, K, OpMode::Abc, "ADD"),
    entry(false, true, K, K, OpMode::Abc, "SUB"),
    entry(false, true, K, K, OpMode::Abc, "MUL"),
    entry(false, true, K, K, OpMode::Abc, "MOD"),
    entry(false, true, K, K, OpMode::Abc, "POW"),
    entry(false, true, K, K, OpMode::Abc, "DIV"),
    entry(false, true, K, K, OpMode::Abc, "IDIV"),
    entry(false, true, K, K, OpMode::Abc, "BAND"),
    entry(false, true, K, K, OpMode::Abc, "BOR"),
    entry(false, true, K, K, OpMode::Abc, "BXOR"),
    entry(false, true, K, K, OpMode::Abc, "SHL"),
    entry(false, true, K, K, OpMode::Abc, "SHR"),
    entry(false, true, R, N, OpMode::Abc, "UNM"),
    entry(false, true, R, N, OpMode::Abc, "BNOT"),
    entry(false, true, R, N, OpMode::Abc, "NOT"),
    entry(false, true, R, N, OpMode::Abc, "LEN"),
    entry(false, true, R, R, OpMode::Abc, "CONCAT"),
    entry(false, false, R, N, OpMode::AsBx, "JMP"),
    entry(true, false, K, K, OpMode::Abc, "EQ"),
    entry(true, false, K, K, OpMode::Abc, "LT"),
    entry(true, false, K, K, OpMode::Abc, "LE"),
    entry(true, false, N, U, OpMode::Abc, "TEST"),
    entry(true, true, R, U, OpMode::Abc, "TESTSET"),
    entry(false, true, U, U, OpMode::Abc, "CALL"),
    entry(false, true, U, U, OpMode::Abc, "TAILCALL"),
    entry(false, false, U, N, OpMode::Abc, "RETURN"),
    entry(false, true, R, N, OpMode::AsBx, "FORLOOP"),
    entry(false, true, R, N, OpMode::AsBx, "FORPREP"),
    entry(false, false, N, U, OpMode::Abc, "TFORCALL"),
    entry(false, true, R, N, OpMode::AsBx, "TFORLOOP"),
    entry(false, false, U, U, OpMode::Abc, "SETLIST"),
    entry(false, true, U, N, OpMode::Abx, "CLOSURE"),
    entry(false, true, U, N, OpMode::Abc, "VARARG"),
    entry(false, false, U, U, OpMode::Ax, "EXTRAARG"),
    entry(false, false, N, N, OpMode::Abc, "INVALID"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        assert_eq!(OPCODES.len(), OPCODE_COUNT);
        assert_eq!(OPCODE_COUNT, 48);
    }

    #[test]
    fn test_from_byte_roundtrip() {
        for byte in 0u8..48 {
            let op = Opcode::from_byte(byte).unwrap();
            assert_eq!(op.to_byte(), byte);
        }
        assert!(Opcode::from_byte(48).is_none());
        assert!(Opcode::from_byte(0xFF).is_none());
    }

    #[test]
    fn test_try_from_byte_invalid() {
        let err = Opcode::try_from_byte(63).unwrap_err();
        assert!(matches!(err, BytecodeError::InvalidOpcode(63)));
    }

    #[test]
    fn test_lookup_in_range_never_panics() {
        for byte in 0u8..48 {
            let _ = &OPCODES[byte as usize];
        }
    }

    #[test]
    fn test_metadata() {
        assert_eq!(Opcode::Move.name(), "MOVE");
        assert_eq!(Opcode::Move.mode(), OpMode::Abc);
        assert_eq!(Opcode::LoadK.mode(), OpMode::Abx);
        assert_eq!(Opcode::Jmp.mode(), OpMode::AsBx);
        assert_eq!(Opcode::ExtraArg.mode(), OpMode::Ax);

        assert!(Opcode::Eq.is_test());
        assert!(Opcode::TestSet.is_test());
        assert!(!Opcode::Call.is_test());

        assert!(Opcode::Move.sets_a());
        assert!(!Opcode::Return.sets_a());

        assert_eq!(Opcode::Add.b_mode(), ArgMode::RegisterOrConstant);
        assert_eq!(Opcode::Add.c_mode(), ArgMode::RegisterOrConstant);
        assert_eq!(Opcode::Move.c_mode(), ArgMode::Unused);
    }
}
