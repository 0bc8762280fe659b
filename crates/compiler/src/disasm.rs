use ape_core::{ObjTag, OpCode, ValueTag};
use std::fmt::Write as _;

/// Pretty-prints a bytecode buffer for `ape disassemble`, one instruction
/// per line. Ported from the reference disassembler, themed comments and
/// all — they're part of what makes this recognizably Ape rather than a
/// generic bytecode dump.
pub fn disassemble(name: &str, bytecode: &[u8]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {name}: The Ape Scrolls ==");
    let mut offset = 0usize;
    while offset < bytecode.len() {
        offset = disassemble_instruction(bytecode, offset, &mut out);
    }
    out
}

fn disassemble_instruction(bytecode: &[u8], offset: usize, out: &mut String) -> usize {
    let _ = write!(out, "{offset:04} ");
    let instruction = bytecode[offset];
    let Some(op) = OpCode::from_byte(instruction) else {
        if instruction == ape_core::TERMINATOR {
            let _ = writeln!(out, "OP_HALT          ; the ape rests, the scroll ends");
            return offset + 1;
        }
        let _ = writeln!(out, "Unknown opcode {instruction}");
        return offset + 1;
    };
    match op {
        OpCode::Push => constant_instruction(bytecode, offset, out),
        OpCode::Nil => simple(out, "OP_NIL           ; nil, the absence of bananas", offset),
        OpCode::True => simple(out, "OP_TRUE          ; true, the banana is ripe", offset),
        OpCode::False => simple(out, "OP_FALSE         ; false, the banana is not ripe", offset),
        OpCode::Pop => simple(out, "OP_POP           ; ape drops a banana from the stack", offset),
        OpCode::Not => simple(out, "OP_NOT           ; is it not a banana?", offset),
        OpCode::Add => simple(out, "OP_ADD           ; gather more bananas", offset),
        OpCode::Sub => simple(out, "OP_SUB           ; eat a banana", offset),
        OpCode::Mul => simple(out, "OP_MUL           ; multiply the banana bunch", offset),
        OpCode::Div => simple(out, "OP_DIV           ; share the bananas", offset),
        OpCode::Equal => simple(out, "OP_EQUAL         ; are the banana bunches equal?", offset),
        OpCode::Greater => simple(out, "OP_GREATER       ; more bananas than the other ape", offset),
        OpCode::Less => simple(out, "OP_LESS          ; fewer bananas than the other ape", offset),
        OpCode::JumpIfFalse => jump_instruction(
            "OP_JUMP_IF_FALSE ; jump if the banana is falsey",
            1,
            bytecode,
            offset,
            out,
        ),
        OpCode::Jump => jump_instruction("OP_JUMP          ; swing to another branch", 1, bytecode, offset, out),
        OpCode::Loop => jump_instruction("OP_LOOP          ; swing back on the vine", -1, bytecode, offset, out),
        OpCode::JumpBack => {
            let target = u32::from_le_bytes(bytecode[offset + 1..offset + 5].try_into().unwrap());
            let _ = writeln!(out, "{:<16} -> {target} ; swing way back", "OP_JUMP_BACK");
            offset + 1 + 4
        }
        OpCode::LoopStart => simple(out, "OP_LOOP_START    ; begin the banana-counting dance", offset),
        OpCode::Print => simple(out, "OP_PRINT         ; ape screeches about bananas", offset),
        OpCode::Ask => simple(out, "OP_ASK           ; ask the jungle for wisdom (and input)", offset),
        OpCode::GetGlobal => global_instruction("OP_GET_GLOBAL    ; find a banana in the jungle", bytecode, offset, out),
        OpCode::SetGlobal => global_instruction("OP_SET_GLOBAL    ; place a banana in the jungle", bytecode, offset, out),
        OpCode::GetLocal => byte_instruction("OP_GET_LOCAL     ; grab a nearby banana", bytecode, offset, out),
        OpCode::SetLocal => byte_instruction("OP_SET_LOCAL     ; place a banana nearby", bytecode, offset, out),
        OpCode::Call => byte_instruction("OP_CALL          ; summon the tribe", bytecode, offset, out),
        OpCode::Return => simple(out, "OP_RETURN        ; ape returns to the tribe's canopy", offset),
        OpCode::BuildBunch => byte_instruction("OP_BUILD_BUNCH   ; gather a bunch of bananas (array)", bytecode, offset, out),
        OpCode::BuildCanopy => byte_instruction("OP_BUILD_CANOPY  ; build a sturdy canopy (map)", bytecode, offset, out),
        OpCode::GetSubscript => simple(out, "OP_GET_SUBSCRIPT ; grab a specific banana from the bunch", offset),
        OpCode::SetSubscript => simple(out, "OP_SET_SUBSCRIPT ; put a banana back in the bunch", offset),
        OpCode::TumbleSetup => jump_instruction("OP_TUMBLE_SETUP  ; prepare for a clumsy tumble (try)", 1, bytecode, offset, out),
        OpCode::TumbleEnd => simple(out, "OP_TUMBLE_END    ; the tumble is over, safe now", offset),
        OpCode::Summon => simple(out, "OP_SUMMON        ; summon another ape spirit (module)", offset),
        OpCode::Forage => simple(out, "OP_FORAGE        ; forage the jungle floor for a file", offset),
        OpCode::Inscribe => simple(out, "OP_INSCRIBE      ; carve a message into a leaf", offset),
    }
}

fn simple(out: &mut String, name: &str, offset: usize) -> usize {
    let _ = writeln!(out, "{name}");
    offset + 1
}

fn byte_instruction(name: &str, bytecode: &[u8], offset: usize, out: &mut String) -> usize {
    let slot = bytecode[offset + 1];
    let _ = writeln!(out, "{name:<16} {slot:>4}");
    offset + 2
}

fn jump_instruction(name: &str, sign: i64, bytecode: &[u8], offset: usize, out: &mut String) -> usize {
    let jump = u16::from_le_bytes([bytecode[offset + 1], bytecode[offset + 2]]) as i64;
    let target = offset as i64 + 3 + sign * jump;
    let _ = writeln!(out, "{name:<16} {offset:>4} -> {target}");
    offset + 3
}

fn global_instruction(name: &str, bytecode: &[u8], offset: usize, out: &mut String) -> usize {
    let len = bytecode[offset + 1] as usize;
    let bytes = &bytecode[offset + 2..offset + 2 + len];
    let text = String::from_utf8_lossy(bytes);
    let _ = writeln!(out, "{name:<16} '{text}'");
    offset + 2 + len
}

fn constant_instruction(bytecode: &[u8], offset: usize, out: &mut String) -> usize {
    let _ = write!(out, "{:<16} ", "OP_PUSH");
    let tag = ValueTag::from_byte(bytecode[offset + 1]);
    let mut cur = offset + 2;
    match tag {
        Some(ValueTag::Number) => {
            let num = f64::from_le_bytes(bytecode[cur..cur + 8].try_into().unwrap());
            let _ = writeln!(out, "NUMBER {num}");
            cur += 8;
        }
        Some(ValueTag::Obj) => {
            let obj_tag = ObjTag::from_byte(bytecode[cur]);
            cur += 1;
            match obj_tag {
                Some(ObjTag::String) => {
                    let len = bytecode[cur] as usize;
                    cur += 1;
                    let text = String::from_utf8_lossy(&bytecode[cur..cur + len]);
                    let _ = writeln!(out, "STRING \"{text}\"");
                    cur += len;
                }
                Some(ObjTag::Function) => {
                    let arity = bytecode[cur];
                    cur += 1;
                    let addr = u32::from_le_bytes(bytecode[cur..cur + 4].try_into().unwrap());
                    cur += 4;
                    let name_len = bytecode[cur] as usize;
                    cur += 1;
                    let text = String::from_utf8_lossy(&bytecode[cur..cur + name_len]);
                    let _ = writeln!(out, "FUNCTION <tribe {text}> (arity: {arity}, addr: {addr})");
                    cur += name_len;
                }
                None => {
                    let _ = writeln!(out, "UNKNOWN_OBJ_TYPE");
                }
            }
        }
        None => {
            let _ = writeln!(out, "UNKNOWN_VAL_TYPE");
        }
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::config::CompilerConfig;
    use std::io::Cursor;

    #[test]
    fn disassembles_a_push_number_and_print() {
        let cursor = Cursor::new(Vec::new());
        let compiler = Compiler::new("tree 42", cursor, CompilerConfig::new());
        let bytes = compiler.compile().unwrap().into_inner();
        let listing = disassemble("test", &bytes);
        assert!(listing.contains("== test: The Ape Scrolls =="));
        assert!(listing.contains("NUMBER 42"));
        assert!(listing.contains("OP_PRINT"));
    }
}
