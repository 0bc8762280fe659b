/// One byte instructions making up the Ape bytecode stream.
///
/// Numeric values are part of the wire format: `compile` writes them and
/// `runBytecode`/the disassembler read them back, so reordering variants
/// changes the format. This implementation does not promise binary
/// compatibility with any other encoding of these opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Push = 0,
    Nil,
    True,
    False,
    Pop,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    Greater,
    Less,
    JumpIfFalse,
    Jump,
    JumpBack,
    LoopStart,
    Print,
    Ask,
    GetGlobal,
    SetGlobal,
    GetLocal,
    SetLocal,
    Call,
    Return,
    BuildBunch,
    BuildCanopy,
    GetSubscript,
    SetSubscript,
    TumbleSetup,
    TumbleEnd,
    Summon,
    Loop,
    Forage,
    Inscribe,
}

impl OpCode {
    /// Decodes a raw byte read from the bytecode stream.
    ///
    /// Returns `None` for the reserved terminator byte (`0xFF`) and for any
    /// byte that names no opcode; the VM and disassembler treat those two
    /// cases differently, so the caller inspects the raw byte itself rather
    /// than this method distinguishing them.
    pub fn from_byte(byte: u8) -> Option<OpCode> {
        use OpCode::*;
        let op = match byte {
            0 => Push,
            1 => Nil,
            2 => True,
            3 => False,
            4 => Pop,
            5 => Not,
            6 => Add,
            7 => Sub,
            8 => Mul,
            9 => Div,
            10 => Equal,
            11 => Greater,
            12 => Less,
            13 => JumpIfFalse,
            14 => Jump,
            15 => JumpBack,
            16 => LoopStart,
            17 => Print,
            18 => Ask,
            19 => GetGlobal,
            20 => SetGlobal,
            21 => GetLocal,
            22 => SetLocal,
            23 => Call,
            24 => Return,
            25 => BuildBunch,
            26 => BuildCanopy,
            27 => GetSubscript,
            28 => SetSubscript,
            29 => TumbleSetup,
            30 => TumbleEnd,
            31 => Summon,
            32 => Loop,
            33 => Forage,
            34 => Inscribe,
            _ => return None,
        };
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        let all = [
            OpCode::Push,
            OpCode::Nil,
            OpCode::True,
            OpCode::False,
            OpCode::Pop,
            OpCode::Not,
            OpCode::Add,
            OpCode::Sub,
            OpCode::Mul,
            OpCode::Div,
            OpCode::Equal,
            OpCode::Greater,
            OpCode::Less,
            OpCode::JumpIfFalse,
            OpCode::Jump,
            OpCode::JumpBack,
            OpCode::LoopStart,
            OpCode::Print,
            OpCode::Ask,
            OpCode::GetGlobal,
            OpCode::SetGlobal,
            OpCode::GetLocal,
            OpCode::SetLocal,
            OpCode::Call,
            OpCode::Return,
            OpCode::BuildBunch,
            OpCode::BuildCanopy,
            OpCode::GetSubscript,
            OpCode::SetSubscript,
            OpCode::TumbleSetup,
            OpCode::TumbleEnd,
            OpCode::Summon,
            OpCode::Loop,
            OpCode::Forage,
            OpCode::Inscribe,
        ];
        for op in all {
            assert_eq!(OpCode::from_byte(op as u8), Some(op));
        }
    }

    #[test]
    fn terminator_byte_decodes_to_none() {
        assert_eq!(OpCode::from_byte(0xFF), None);
    }
}
