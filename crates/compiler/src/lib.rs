//! Lexer, Pratt-precedence compiler, and disassembler for Ape.
//!
//! This crate only turns source text into a bytecode stream (and back into
//! a human-readable listing); it knows nothing about executing that stream
//! — that's `ape_runtime`'s job.

mod compiler;
mod config;
mod disasm;
mod error;
mod lexer;
mod token;

pub use compiler::Compiler;
pub use config::CompilerConfig;
pub use disasm::disassemble;
pub use error::CompileError;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use std::io::Cursor;

/// Convenience wrapper compiling a whole source string straight to an
/// owned byte buffer, for callers (the CLI, tests) that don't need direct
/// control over the output sink.
pub fn compile_to_bytes(source: &str, config: CompilerConfig) -> Result<Vec<u8>, CompileError> {
    let compiler = Compiler::new(source, Cursor::new(Vec::new()), config);
    compiler.compile().map(Cursor::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_to_bytes_round_trips_through_disassembler() {
        let bytes = compile_to_bytes("tree 1 ooh 1", CompilerConfig::new()).unwrap();
        let listing = disassemble("inline", &bytes);
        assert!(listing.contains("OP_ADD"));
    }
}
