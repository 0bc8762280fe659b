use std::fmt;

/// A single stack frame's contribution to a runtime error's trace.
pub struct TraceLine {
    pub function_name: String,
}

/// Everything that can go wrong while running bytecode, with enough detail
/// to reproduce the reference VM's `runtimeError`-style multi-line report.
#[derive(Debug)]
pub enum VmError {
    TypeMismatch { expected: &'static str, got: &'static str },
    UndefinedGlobal(String),
    IndexOutOfBounds { index: f64, len: usize },
    UndefinedKey,
    ArityMismatch { expected: u8, got: u8 },
    NotCallable,
    StackOverflow,
    HandlerStackOverflow,
    UnknownOpcode(u8),
    ModuleNotFound(String),
    InvalidModulePath(String),
    Io(String),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::TypeMismatch { expected, got } => {
                write!(f, "expected {expected}, got {got}")
            }
            VmError::UndefinedGlobal(name) => write!(f, "undefined variable '{name}'"),
            VmError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for bunch of length {len}")
            }
            VmError::UndefinedKey => write!(f, "key not found in canopy"),
            VmError::ArityMismatch { expected, got } => {
                write!(f, "expected {expected} arguments but got {got}")
            }
            VmError::NotCallable => write!(f, "can only call functions"),
            VmError::StackOverflow => write!(f, "stack overflow"),
            VmError::HandlerStackOverflow => write!(f, "too many nested tumbles"),
            VmError::UnknownOpcode(op) => write!(f, "unknown opcode {op}"),
            VmError::ModuleNotFound(path) => write!(f, "could not summon module '{path}'"),
            VmError::InvalidModulePath(path) => {
                write!(f, "'{path}' is not a .ape module path")
            }
            VmError::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for VmError {}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::Io(err.to_string())
    }
}
