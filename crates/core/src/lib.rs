//! Shared bytecode constants for the Ape language.
//!
//! `ape-compiler` and `ape-runtime` both depend on this crate so that the
//! opcode table, value/object tags, and VM limits can never drift out of
//! sync between the two halves of the pipeline.

mod limits;
mod opcode;
mod tags;

pub use limits::*;
pub use opcode::OpCode;
pub use tags::{ObjTag, ValueTag};

/// The byte that terminates a bytecode stream (`runBytecode` appends it
/// after reading the file; the compiler never emits it itself).
pub const TERMINATOR: u8 = 0xFF;
