use std::fmt;

/// A single compile-time diagnostic: the message plus the lexeme it was
/// raised at (empty at end-of-file, matching the reference's `errorAt`).
#[derive(Debug, Clone)]
pub struct CompileError {
    pub message: String,
    pub lexeme: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lexeme.is_empty() {
            write!(f, "[Error] at end: {}", self.message)
        } else {
            write!(f, "[Error] at '{}': {}", self.lexeme, self.message)
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError {
            message: format!("I/O error: {err}"),
            lexeme: String::new(),
        }
    }
}
