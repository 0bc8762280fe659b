/// The one-byte tag following `OP_PUSH` that selects how the payload is
/// decoded (`common.h`'s `ValueType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueTag {
    Number = 0,
    Obj = 1,
}

impl ValueTag {
    pub fn from_byte(byte: u8) -> Option<ValueTag> {
        match byte {
            0 => Some(ValueTag::Number),
            1 => Some(ValueTag::Obj),
            _ => None,
        }
    }
}

/// The one-byte tag following `ValueTag::Obj` naming the heap object kind
/// being constant-folded into the bytecode stream. Only `String` and
/// `Function` literals ever appear inline this way — Bunch and Canopy
/// values are always built at runtime from `OP_BUILD_BUNCH`/`OP_BUILD_CANOPY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjTag {
    String = 0,
    Function = 1,
}

impl ObjTag {
    pub fn from_byte(byte: u8) -> Option<ObjTag> {
        match byte {
            0 => Some(ObjTag::String),
            1 => Some(ObjTag::Function),
            _ => None,
        }
    }
}
