//! Chunks of bytecode and the instruction set

use strum::{EnumIter, FromRepr, IntoStaticStr};

use crate::error::BytecodeError;
use crate::value::Value;

/// Most constants a single chunk can address with a one-byte operand.
pub const MAX_CONSTANTS: usize = 256;

/// One-byte instruction codes.
///
/// Operands follow the opcode in the byte stream:
/// one byte for constant indexes and local slots, two bytes (big endian)
/// for jump distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OpCode {
    /// Push a constant: `[index]`
    Constant,
    /// Push `nil`
    Nil,
    /// Push `true`
    True,
    /// Push `false`
    False,
    /// Discard the top of the stack
    Pop,
    /// Push a local: `[slot]`
    GetLocal,
    /// Store the top of the stack into a local: `[slot]`
    SetLocal,
    /// Push a global: `[name constant]`
    GetGlobal,
    /// Define a global from the top of the stack: `[name constant]`
    DefineGlobal,
    /// Assign an existing global: `[name constant]`
    SetGlobal,
    /// `==`
    Equal,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterEqual,
    /// `<=`
    LessEqual,
    /// `+` on numbers or strings
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `!`
    Not,
    /// Unary `-`
    Negate,
    /// Print the top of the stack
    Print,
    /// Jump forward: `[hi, lo]`
    Jump,
    /// Jump forward if the top of the stack is falsey: `[hi, lo]`
    JumpIfFalse,
    /// Jump backward: `[hi, lo]`
    Loop,
    /// End of the chunk
    Return,
}

impl OpCode {
    /// Name used by the disassembler, e.g. `OP_JUMP_IF_FALSE`.
    pub fn name(self) -> String {
        let name: &'static str = self.into();
        format!("OP_{}", name)
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::GetLocal
            | OpCode::SetLocal
            | OpCode::GetGlobal
            | OpCode::DefineGlobal
            | OpCode::SetGlobal => 1,
            OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => 2,
            _ => 0,
        }
    }

    /// Decode the opcode at `offset` of a code stream.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOpCode` for bytes that are not opcodes.
    pub fn decode(byte: u8, offset: usize) -> Result<Self, BytecodeError> {
        OpCode::from_repr(byte).ok_or(BytecodeError::InvalidOpCode { byte, offset })
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

/// A sequence of bytecode with its constant pool and line table.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    code: Vec<u8>,
    constants: Vec<Value>,
    lines: Vec<usize>,
}

impl Chunk {
    /// Create an empty chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw bytes.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// The constant pool.
    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    /// Source line of the byte at `offset`.
    pub fn line(&self, offset: usize) -> usize {
        self.lines.get(offset).copied().unwrap_or(0)
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Append a byte (an opcode or an operand) from source line `line`.
    pub fn write(&mut self, byte: impl Into<u8>, line: usize) {
        self.code.push(byte.into());
        self.lines.push(line);
    }

    /// Overwrite an already written byte; used to patch jumps.
    pub fn patch(&mut self, offset: usize, byte: u8) {
        if let Some(slot) = self.code.get_mut(offset) {
            *slot = byte;
        }
    }

    /// Add a constant and return its index.
    ///
    /// The pool itself is unbounded; the compiler enforces
    /// [`MAX_CONSTANTS`] because operands are a single byte.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Read a byte.
    ///
    /// # Errors
    ///
    /// Returns `Truncated` when `offset` is past the end.
    pub fn byte(&self, offset: usize) -> Result<u8, BytecodeError> {
        self.code
            .get(offset)
            .copied()
            .ok_or(BytecodeError::Truncated { offset })
    }

    /// Read a big-endian 16-bit operand.
    ///
    /// # Errors
    ///
    /// Returns `Truncated` when the operand runs past the end.
    pub fn short(&self, offset: usize) -> Result<u16, BytecodeError> {
        let hi = self.byte(offset)?;
        let lo = self.byte(offset + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Look up a constant.
    ///
    /// # Errors
    ///
    /// Returns `MissingConstant` for an index outside the pool.
    pub fn constant(&self, index: usize) -> Result<&Value, BytecodeError> {
        self.constants
            .get(index)
            .ok_or(BytecodeError::MissingConstant { index })
    }
}
