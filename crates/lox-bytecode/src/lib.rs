//! # Lox Bytecode
//!
//! A single-pass compiler and stack virtual machine for the procedural
//! core of Lox.
//!
//! ```text
//! Source → [Scanner] → Tokens → [Compiler] → Chunk → [Vm] → Output
//! ```
//!
//! - **Compiler**: a Pratt parser that emits bytecode directly, with no
//!   syntax tree in between
//! - **Chunk**: bytes, a constant pool and a per-byte line table
//! - **Vm**: a dispatch loop over a value stack, with globals kept
//!   between runs
//!
//! Output and error messages match the tree-walking interpreter in the
//! `lox` crate. Functions, classes and closures are outside this engine
//! and are rejected at compile time.
//!
//! ```
//! use lox::SharedOutput;
//! use lox_bytecode::Vm;
//!
//! let out = SharedOutput::new();
//! let mut vm = Vm::with_output(out.clone());
//! vm.interpret("for (var i = 0; i < 3; i = i + 1) print i;").unwrap();
//! assert_eq!(out.contents(), "0\n1\n2\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod value;
pub mod vm;

pub use chunk::{Chunk, OpCode, MAX_CONSTANTS};
pub use compiler::{compile, MAX_LOCALS};
pub use debug::{disassemble, disassemble_instruction};
pub use error::BytecodeError;
pub use value::Value;
pub use vm::Vm;
