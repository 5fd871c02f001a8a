//! Human-readable disassembly of chunks

use crate::chunk::{Chunk, OpCode};
use crate::error::BytecodeError;

/// Disassemble a whole chunk under a `== name ==` header.
///
/// # Example
///
/// ```
/// use lox_bytecode::{disassemble, Chunk, OpCode, Value};
///
/// let mut chunk = Chunk::new();
/// let constant = chunk.add_constant(Value::Number(1.2));
/// chunk.write(OpCode::Constant, 123);
/// chunk.write(constant as u8, 123);
/// chunk.write(OpCode::Return, 123);
///
/// assert_eq!(
///     disassemble(&chunk, "test chunk").unwrap(),
///     "== test chunk ==\n0000  123 OP_CONSTANT         0 '1.2'\n0002    | OP_RETURN\n"
/// );
/// ```
///
/// # Errors
///
/// Returns a [`BytecodeError`] if the chunk does not decode.
pub fn disassemble(chunk: &Chunk, name: &str) -> Result<String, BytecodeError> {
    let mut out = format!("== {} ==\n", name);

    let mut offset = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(chunk, offset, &mut out)?;
    }

    Ok(out)
}

/// Disassemble the instruction at `offset` onto `out`, returning the
/// offset of the next instruction.
///
/// # Errors
///
/// Returns a [`BytecodeError`] if the instruction does not decode.
pub fn disassemble_instruction(
    chunk: &Chunk,
    offset: usize,
    out: &mut String,
) -> Result<usize, BytecodeError> {
    let op = OpCode::decode(chunk.byte(offset)?, offset)?;

    out.push_str(&format!("{:04} ", offset));
    if offset > 0 && chunk.line(offset) == chunk.line(offset - 1) {
        out.push_str("   | ");
    } else {
        out.push_str(&format!("{:4} ", chunk.line(offset)));
    }

    let name = op.name();
    let line = match op {
        OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => {
            let index = usize::from(chunk.byte(offset + 1)?);
            let value = chunk.constant(index)?;
            format!("{:<16} {:4} '{}'", name, index, value)
        }
        OpCode::GetLocal | OpCode::SetLocal => {
            let slot = chunk.byte(offset + 1)?;
            format!("{:<16} {:4}", name, slot)
        }
        OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => {
            let jump = usize::from(chunk.short(offset + 1)?);
            let next = offset + 3;
            let target = if op == OpCode::Loop {
                next.saturating_sub(jump)
            } else {
                next + jump
            };
            format!("{:<16} {:4} -> {}", name, offset, target)
        }
        _ => name,
    };

    out.push_str(&line);
    out.push('\n');

    Ok(offset + 1 + op.operand_len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeated_lines_use_bar() {
        let mut chunk = Chunk::new();
        chunk.write(OpCode::Nil, 1);
        chunk.write(OpCode::Print, 1);
        chunk.write(OpCode::Return, 2);

        assert_eq!(
            disassemble(&chunk, "lines").unwrap(),
            "== lines ==\n0000    1 OP_NIL\n0001    | OP_PRINT\n0002    2 OP_RETURN\n"
        );
    }

    #[test]
    fn test_global_and_local_operands() {
        let mut chunk = Chunk::new();
        let name = chunk.add_constant(Value::string("x"));
        chunk.write(OpCode::GetGlobal, 1);
        chunk.write(name as u8, 1);
        chunk.write(OpCode::GetLocal, 1);
        chunk.write(3u8, 1);

        let listing = disassemble(&chunk, "ops").unwrap();
        assert!(listing.contains("0000    1 OP_GET_GLOBAL       0 'x'\n"));
        assert!(listing.contains("0002    | OP_GET_LOCAL        3\n"));
    }

    #[test]
    fn test_jump_targets() {
        let mut chunk = Chunk::new();
        chunk.write(OpCode::Jump, 1);
        chunk.write(0u8, 1);
        chunk.write(2u8, 1);
        chunk.write(OpCode::Loop, 1);
        chunk.write(0u8, 1);
        chunk.write(6u8, 1);

        let listing = disassemble(&chunk, "jumps").unwrap();
        assert!(listing.contains("OP_JUMP             0 -> 5\n"));
        assert!(listing.contains("OP_LOOP             3 -> 0\n"));
    }

    #[test]
    fn test_invalid_opcode() {
        let mut chunk = Chunk::new();
        chunk.write(255u8, 1);
        assert_eq!(
            disassemble(&chunk, "bad"),
            Err(BytecodeError::InvalidOpCode {
                byte: 255,
                offset: 0,
            })
        );
    }
}
