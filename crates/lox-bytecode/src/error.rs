//! Errors raised while decoding bytecode

use thiserror::Error;

/// A chunk that does not decode.
///
/// The compiler never produces one; these surface only for hand-built or
/// corrupted chunks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BytecodeError {
    /// A byte that is not an opcode
    #[error("Unknown opcode {byte} at offset {offset}.")]
    InvalidOpCode {
        /// The offending byte
        byte: u8,
        /// Where it was found
        offset: usize,
    },

    /// An instruction whose operand runs past the end of the chunk
    #[error("Truncated instruction at offset {offset}.")]
    Truncated {
        /// Offset of the instruction
        offset: usize,
    },

    /// A constant index outside the constant pool
    #[error("Constant {index} out of range.")]
    MissingConstant {
        /// The index read from the code
        index: usize,
    },

    /// A constant used as a variable name that is not a string
    #[error("Constant {index} is not a variable name.")]
    InvalidName {
        /// The index read from the code
        index: usize,
    },

    /// An instruction that needs more values than the stack holds
    #[error("Stack underflow at offset {offset}.")]
    StackUnderflow {
        /// Offset of the instruction
        offset: usize,
    },
}
