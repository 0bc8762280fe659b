use std::cell::RefCell;
use std::io::{BufRead, Write};

use ape_core::{
    ObjTag, OpCode, ValueTag, FRAMES_MAX, GC_INITIAL_THRESHOLD, HANDLER_MAX, LOOP_MAX, STACK_MAX,
    TERMINATOR,
};

use crate::canopy;
use crate::error::VmError;
use crate::gc;
use crate::globals::Globals;
use crate::heap::{ApeFunction, Heap, ObjHandle};
use crate::value::Value;

/// A stack frame tracking execution inside one function body. `owner` is
/// the handle holding the actual bytecode buffer — itself for a top-level
/// script or module, or the enclosing function for a nested "tribe",
/// matching the owner-relative addressing invariant.
struct CallFrame {
    function: ObjHandle,
    owner: ObjHandle,
    ip: usize,
    slot_base: usize,
}

/// Snapshot recorded by a `tumble` block so a runtime error can unwind back
/// to its `catch`.
struct Handler {
    catch_ip: usize,
    frame_count: usize,
    stack_top: usize,
}

/// A runtime error that escaped every handler, carrying the per-frame call
/// trace the reference VM prints on the way down. Bytecode carries no line
/// table, so each trace line reports the literal `line ?` the reference
/// implementation does too.
pub struct RuntimeError {
    pub message: String,
    pub trace: Vec<String>,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Runtime Error: {}", self.message)?;
        for name in &self.trace {
            writeln!(f, "[line ?] in {name}()")?;
        }
        Ok(())
    }
}

enum Control {
    Continue,
    Halt,
}

/// The bytecode interpreter: stack, frames, handler stack, loop-counter
/// stack, globals, and the garbage-collected heap they all point into.
pub struct Vm<Out: Write, In: BufRead> {
    heap: Heap,
    globals: Globals,
    stack: Vec<Value>,
    frames: Vec<CallFrame>,
    handlers: Vec<Handler>,
    loop_counters: Vec<f64>,
    error_slot: Value,
    out: Out,
    input: In,
}

impl<Out: Write, In: BufRead> Vm<Out, In> {
    pub fn new(out: Out, input: In) -> Self {
        Vm {
            heap: Heap::new(GC_INITIAL_THRESHOLD),
            globals: Globals::new(),
            stack: Vec::new(),
            frames: Vec::new(),
            handlers: Vec::new(),
            loop_counters: Vec::new(),
            error_slot: Value::Nil,
            out,
            input,
        }
    }

    /// Borrows the output sink, for callers (tests, the CLI) that write to
    /// an in-memory buffer and want to inspect what the program printed.
    pub fn out(&self) -> &Out {
        &self.out
    }

    /// Runs a freshly-compiled top-level script: `bytecode` should already
    /// carry the trailing [`TERMINATOR`] byte (the CLI appends it after
    /// reading the `.apb` file, matching `runBytecode`).
    pub fn run_script(&mut self, bytecode: Vec<u8>) -> Result<(), RuntimeError> {
        let func = ApeFunction {
            arity: 0,
            owner: None,
            code: RefCell::new(Some(bytecode)),
            code_offset: 0,
            name: None,
            is_module: false,
        };
        let handle = self.heap.alloc_function(func);
        self.run_top_level(handle)
    }

    /// Compiles and runs one REPL line against this VM's persistent
    /// globals and heap. Each line gets its own fresh frame/stack/handler
    /// state, mirroring the reference `interpret`'s per-line invocation.
    pub fn interpret(&mut self, source: &str) -> Result<(), ReplError> {
        let config = ape_compiler::CompilerConfig::new().repl(true);
        let bytecode = ape_compiler::compile_to_bytes(source, config)
            .map_err(|e| ReplError::Compile(e.to_string()))?;
        let mut bytes = bytecode;
        bytes.push(TERMINATOR);
        let func = ApeFunction {
            arity: 0,
            owner: None,
            code: RefCell::new(Some(bytes)),
            code_offset: 0,
            name: None,
            is_module: true,
        };
        let handle = self.heap.alloc_function(func);
        self.run_top_level(handle).map_err(ReplError::Runtime)
    }

    fn run_top_level(&mut self, handle: ObjHandle) -> Result<(), RuntimeError> {
        self.stack.clear();
        self.frames.clear();
        self.handlers.clear();
        self.loop_counters.clear();
        self.stack.push(Value::Obj(handle));
        self.frames.push(CallFrame {
            function: handle,
            owner: handle,
            ip: 0,
            slot_base: 0,
        });
        self.run()
    }

    fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            let byte = self.read_byte();
            if byte == TERMINATOR {
                return Ok(());
            }
            let Some(op) = OpCode::from_byte(byte) else {
                return Err(self.build_runtime_error(VmError::UnknownOpcode(byte)));
            };
            match self.execute_one(op) {
                Ok(Control::Continue) => {}
                Ok(Control::Halt) => return Ok(()),
                Err(e) => {
                    if let Some(handler) = self.handlers.pop() {
                        self.frames.truncate(handler.frame_count);
                        self.stack.truncate(handler.stack_top);
                        let message = e.to_string();
                        let handle = self.heap.alloc_string(&message);
                        self.error_slot = Value::Obj(handle);
                        self.stack.push(self.error_slot);
                        self.maybe_collect();
                        self.frames.last_mut().expect("handler records an active frame").ip =
                            handler.catch_ip;
                    } else {
                        return Err(self.build_runtime_error(e));
                    }
                }
            }
        }
    }

    fn build_runtime_error(&self, error: VmError) -> RuntimeError {
        let trace = self
            .frames
            .iter()
            .rev()
            .map(|f| f.function.as_function().unwrap().display_name())
            .collect();
        RuntimeError {
            message: error.to_string(),
            trace,
        }
    }

    fn read_byte(&mut self) -> u8 {
        let frame = self.frames.last_mut().expect("run() always has an active frame");
        let owner = frame.owner.as_function().expect("owner is always a Function");
        let code = owner.code.borrow();
        let byte = code.as_ref().expect("owner holds its own bytecode")[frame.ip];
        frame.ip += 1;
        byte
    }

    fn read_u16(&mut self) -> u16 {
        let hi = self.read_byte();
        let lo = self.read_byte();
        u16::from_le_bytes([hi, lo])
    }

    fn read_u32(&mut self) -> u32 {
        let bytes = [
            self.read_byte(),
            self.read_byte(),
            self.read_byte(),
            self.read_byte(),
        ];
        u32::from_le_bytes(bytes)
    }

    fn read_f64(&mut self) -> f64 {
        let mut bytes = [0u8; 8];
        for b in bytes.iter_mut() {
            *b = self.read_byte();
        }
        f64::from_le_bytes(bytes)
    }

    fn read_string(&mut self) -> String {
        let len = self.read_byte() as usize;
        let bytes: Vec<u8> = (0..len).map(|_| self.read_byte()).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn mark_roots(&self) {
        for v in &self.stack {
            gc::mark_value(v);
        }
        for v in self.globals.iter() {
            gc::mark_value(v);
        }
        for frame in &self.frames {
            gc::mark_value(&Value::Obj(frame.function));
            gc::mark_value(&Value::Obj(frame.owner));
        }
        gc::mark_value(&self.error_slot);
    }

    fn maybe_collect(&mut self) {
        if gc::should_collect(&self.heap) {
            self.mark_roots();
            gc::collect(&mut self.heap);
        }
    }

    fn call(&mut self, handle: ObjHandle, arg_count: usize) -> Result<(), VmError> {
        let func = handle.as_function().ok_or(VmError::NotCallable)?;
        if func.arity as usize != arg_count {
            return Err(VmError::ArityMismatch {
                expected: func.arity,
                got: arg_count as u8,
            });
        }
        if self.frames.len() >= FRAMES_MAX {
            return Err(VmError::StackOverflow);
        }
        let owner = func.owner.unwrap_or(handle);
        let ip = func.code_offset as usize;
        let slot_base = self.stack.len() - arg_count - 1;
        self.frames.push(CallFrame {
            function: handle,
            owner,
            ip,
            slot_base,
        });
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, VmError> {
        self.stack.pop().ok_or(VmError::StackOverflow)
    }

    /// Slot `STACK_MAX - 1` is reserved for the pending runtime error (see
    /// `error_slot`), so the value stack itself is capped one below that.
    fn push(&mut self, value: Value) -> Result<(), VmError> {
        if self.stack.len() >= STACK_MAX - 1 {
            return Err(VmError::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    fn string_of(&self, value: Value) -> Result<String, VmError> {
        match value {
            Value::Obj(h) => h
                .as_string()
                .map(|s| s.as_str().to_string())
                .ok_or(VmError::TypeMismatch {
                    expected: "string",
                    got: value.type_name(),
                }),
            _ => Err(VmError::TypeMismatch {
                expected: "string",
                got: value.type_name(),
            }),
        }
    }

    fn numeric_binary(&mut self, op: OpCode) -> Result<(), VmError> {
        let b = self.pop()?;
        let a = self.pop()?;
        let (Some(a), Some(b)) = (a.as_number(), b.as_number()) else {
            return Err(VmError::TypeMismatch {
                expected: "number",
                got: "non-number",
            });
        };
        let result = match op {
            OpCode::Sub => Value::Number(a - b),
            OpCode::Mul => Value::Number(a * b),
            OpCode::Div => Value::Number(a / b),
            OpCode::Greater => Value::Bool(a > b),
            OpCode::Less => Value::Bool(a < b),
            _ => unreachable!("numeric_binary only called for arithmetic/comparison ops"),
        };
        self.push(result)?;
        Ok(())
    }

    fn execute_one(&mut self, op: OpCode) -> Result<Control, VmError> {
        match op {
            OpCode::Push => self.op_push()?,
            OpCode::Nil => self.push(Value::Nil)?,
            OpCode::True => self.push(Value::Bool(true))?,
            OpCode::False => self.push(Value::Bool(false))?,
            OpCode::Pop => {
                self.pop()?;
            }
            OpCode::Not => {
                let v = self.pop()?;
                self.push(Value::Bool(v.is_falsey()))?;
            }
            OpCode::Add => self.op_add()?,
            OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Greater | OpCode::Less => {
                self.numeric_binary(op)?
            }
            OpCode::Equal => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(Value::Bool(a == b))?;
            }
            OpCode::JumpIfFalse => {
                let offset = self.read_u16();
                if self.stack.last().ok_or(VmError::StackOverflow)?.is_falsey() {
                    self.frames.last_mut().unwrap().ip += offset as usize;
                }
            }
            OpCode::Jump => {
                let offset = self.read_u16();
                self.frames.last_mut().unwrap().ip += offset as usize;
            }
            OpCode::Loop => {
                let offset = self.read_u16();
                self.frames.last_mut().unwrap().ip -= offset as usize;
            }
            OpCode::LoopStart => {
                let n = self.pop()?.as_number().ok_or(VmError::TypeMismatch {
                    expected: "number",
                    got: "non-number",
                })?;
                if self.loop_counters.len() >= LOOP_MAX {
                    return Err(VmError::StackOverflow);
                }
                self.loop_counters.push(n);
            }
            OpCode::JumpBack => {
                let target = self.read_u32();
                let counter = self.loop_counters.last_mut().ok_or(VmError::StackOverflow)?;
                if *counter > 0.0 {
                    *counter -= 1.0;
                    self.frames.last_mut().unwrap().ip = target as usize;
                } else {
                    self.loop_counters.pop();
                }
            }
            OpCode::Print => {
                let v = self.pop()?;
                let _ = writeln!(self.out, "{v}");
            }
            OpCode::Ask => self.op_ask()?,
            OpCode::GetGlobal => {
                let name = self.read_string();
                let value = self
                    .globals
                    .get(&name)
                    .ok_or_else(|| VmError::UndefinedGlobal(name.clone()))?;
                self.push(value)?;
            }
            OpCode::SetGlobal => {
                let name = self.read_string();
                let value = *self.stack.last().ok_or(VmError::StackOverflow)?;
                self.globals.set(&name, value);
            }
            OpCode::GetLocal => {
                let slot = self.read_byte() as usize;
                let base = self.frames.last().unwrap().slot_base;
                let value = self.stack[base + slot];
                self.push(value)?;
            }
            OpCode::SetLocal => {
                let slot = self.read_byte() as usize;
                let value = *self.stack.last().ok_or(VmError::StackOverflow)?;
                let base = self.frames.last().unwrap().slot_base;
                self.stack[base + slot] = value;
            }
            OpCode::Call => {
                let arg_count = self.read_byte() as usize;
                let callee_index = self
                    .stack
                    .len()
                    .checked_sub(1 + arg_count)
                    .ok_or(VmError::StackOverflow)?;
                let callee = self.stack[callee_index];
                match callee {
                    Value::Obj(h) if h.as_function().is_some() => self.call(h, arg_count)?,
                    _ => return Err(VmError::NotCallable),
                }
            }
            OpCode::Return => {
                let result = self.pop()?;
                let frame = self.frames.pop().expect("Return always runs inside a frame");
                self.stack.truncate(frame.slot_base);
                if self.frames.is_empty() {
                    return Ok(Control::Halt);
                }
                self.push(result)?;
            }
            OpCode::BuildBunch => self.op_build_bunch()?,
            OpCode::BuildCanopy => self.op_build_canopy()?,
            OpCode::GetSubscript => self.op_get_subscript()?,
            OpCode::SetSubscript => self.op_set_subscript()?,
            OpCode::TumbleSetup => {
                let offset = self.read_u16();
                if self.handlers.len() >= HANDLER_MAX {
                    return Err(VmError::HandlerStackOverflow);
                }
                let catch_ip = self.frames.last().unwrap().ip + offset as usize;
                self.handlers.push(Handler {
                    catch_ip,
                    frame_count: self.frames.len(),
                    stack_top: self.stack.len(),
                });
            }
            OpCode::TumbleEnd => {
                self.handlers.pop();
            }
            OpCode::Summon => self.op_summon()?,
            OpCode::Forage => self.op_forage()?,
            OpCode::Inscribe => self.op_inscribe()?,
        }
        Ok(Control::Continue)
    }

    fn op_push(&mut self) -> Result<(), VmError> {
        let tag_byte = self.read_byte();
        let tag = ValueTag::from_byte(tag_byte).ok_or(VmError::UnknownOpcode(tag_byte))?;
        match tag {
            ValueTag::Number => {
                let num = self.read_f64();
                self.push(Value::Number(num))?;
            }
            ValueTag::Obj => {
                let obj_tag_byte = self.read_byte();
                let obj_tag =
                    ObjTag::from_byte(obj_tag_byte).ok_or(VmError::UnknownOpcode(obj_tag_byte))?;
                match obj_tag {
                    ObjTag::String => {
                        let text = self.read_string();
                        let handle = self.heap.alloc_string(&text);
                        self.push(Value::Obj(handle))?;
                        self.maybe_collect();
                    }
                    ObjTag::Function => {
                        let arity = self.read_byte();
                        let addr = self.read_u32();
                        let name = self.read_string();
                        let owner = self.frames.last().unwrap().owner;
                        let name_handle = if name.is_empty() {
                            None
                        } else {
                            Some(self.heap.alloc_string(&name))
                        };
                        let func = ApeFunction {
                            arity,
                            owner: Some(owner),
                            code: RefCell::new(None),
                            code_offset: addr,
                            name: name_handle,
                            is_module: false,
                        };
                        let handle = self.heap.alloc_function(func);
                        self.push(Value::Obj(handle))?;
                        self.maybe_collect();
                    }
                }
            }
        }
        Ok(())
    }

    /// String concatenation peeks both operands rather than popping them,
    /// so they stay reachable as GC roots for the duration of the
    /// allocation that builds the new string, then pops 2 and pushes 1.
    fn op_add(&mut self) -> Result<(), VmError> {
        let len = self.stack.len();
        let a = *self.stack.get(len.wrapping_sub(2)).ok_or(VmError::StackOverflow)?;
        let b = *self.stack.get(len.wrapping_sub(1)).ok_or(VmError::StackOverflow)?;
        let a_str = match a {
            Value::Obj(h) => h.as_string(),
            _ => None,
        };
        let b_str = match b {
            Value::Obj(h) => h.as_string(),
            _ => None,
        };
        if let (Some(a_str), Some(b_str)) = (a_str, b_str) {
            let mut combined = String::with_capacity(a_str.bytes.len() + b_str.bytes.len());
            combined.push_str(a_str.as_str());
            combined.push_str(b_str.as_str());
            let handle = self.heap.alloc_string(&combined);
            self.stack.truncate(len - 2);
            self.push(Value::Obj(handle))?;
            self.maybe_collect();
            Ok(())
        } else {
            let (Some(a), Some(b)) = (a.as_number(), b.as_number()) else {
                return Err(VmError::TypeMismatch {
                    expected: "number or string",
                    got: "mismatched operands",
                });
            };
            self.stack.truncate(len - 2);
            self.push(Value::Number(a + b))?;
            Ok(())
        }
    }

    fn op_ask(&mut self) -> Result<(), VmError> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.is_empty() {
            self.push(Value::Nil)?;
        } else if let Ok(num) = trimmed.parse::<f64>() {
            self.push(Value::Number(num))?;
        } else {
            let handle = self.heap.alloc_string(trimmed);
            self.push(Value::Obj(handle))?;
            self.maybe_collect();
        }
        Ok(())
    }

    fn op_build_bunch(&mut self) -> Result<(), VmError> {
        let count = self.read_byte() as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.pop()?);
        }
        items.reverse();
        let handle = self.heap.alloc_bunch(items);
        self.push(Value::Obj(handle))?;
        self.maybe_collect();
        Ok(())
    }

    fn op_build_canopy(&mut self) -> Result<(), VmError> {
        let pair_count = self.read_byte() as usize;
        let capacity = if pair_count > 0 {
            pair_count * 2
        } else {
            ape_core::CANOPY_MIN_CAPACITY
        };
        let handle = self.heap.alloc_canopy(capacity);
        {
            let cell = handle.as_canopy().expect("just allocated as a canopy");
            let mut live = cell.borrow_mut();
            for _ in 0..pair_count {
                let value = self.pop()?;
                let key = self.pop()?;
                let key_handle = match key {
                    Value::Obj(h) if h.as_string().is_some() => h,
                    _ => {
                        return Err(VmError::TypeMismatch {
                            expected: "string key",
                            got: key.type_name(),
                        })
                    }
                };
                canopy::set(&mut live, key_handle, value);
            }
        }
        self.push(Value::Obj(handle))?;
        self.maybe_collect();
        Ok(())
    }

    fn op_get_subscript(&mut self) -> Result<(), VmError> {
        let index = self.pop()?;
        let container = self.pop()?;
        let result = match container {
            Value::Obj(h) if h.as_bunch().is_some() => {
                let bunch = h.as_bunch().unwrap().borrow();
                let i = index.as_number().ok_or(VmError::TypeMismatch {
                    expected: "number",
                    got: index.type_name(),
                })?;
                if i < 0.0 || i as usize >= bunch.values.len() {
                    Value::Nil
                } else {
                    bunch.values[i as usize]
                }
            }
            Value::Obj(h) if h.as_canopy().is_some() => {
                let key = self.string_of(index)?;
                let live = h.as_canopy().unwrap().borrow();
                canopy::get(&live, &key)
            }
            other => {
                return Err(VmError::TypeMismatch {
                    expected: "bunch or canopy",
                    got: other.type_name(),
                })
            }
        };
        self.push(result)?;
        Ok(())
    }

    fn op_set_subscript(&mut self) -> Result<(), VmError> {
        let value = self.pop()?;
        let index = self.pop()?;
        let container = self.pop()?;
        match container {
            Value::Obj(h) if h.as_bunch().is_some() => {
                let mut bunch = h.as_bunch().unwrap().borrow_mut();
                let i = index.as_number().ok_or(VmError::TypeMismatch {
                    expected: "number",
                    got: index.type_name(),
                })?;
                if i < 0.0 || i as usize >= bunch.values.len() {
                    return Err(VmError::IndexOutOfBounds {
                        index: i,
                        len: bunch.values.len(),
                    });
                }
                bunch.values[i as usize] = value;
            }
            Value::Obj(h) if h.as_canopy().is_some() => {
                let key_handle = match index {
                    Value::Obj(kh) if kh.as_string().is_some() => kh,
                    _ => {
                        return Err(VmError::TypeMismatch {
                            expected: "string",
                            got: index.type_name(),
                        })
                    }
                };
                let cell = h.as_canopy().unwrap();
                let mut live = cell.borrow_mut();
                canopy::set(&mut live, key_handle, value);
            }
            other => {
                return Err(VmError::TypeMismatch {
                    expected: "bunch or canopy",
                    got: other.type_name(),
                })
            }
        }
        self.push(value)?;
        Ok(())
    }

    fn op_summon(&mut self) -> Result<(), VmError> {
        let path_val = self.pop()?;
        let path = self.string_of(path_val)?;
        if !path.ends_with(".ape") {
            return Err(VmError::InvalidModulePath(path));
        }
        let apb_path = format!("{}.apb", &path[..path.len() - 4]);
        let mut bytes =
            std::fs::read(&apb_path).map_err(|_| VmError::ModuleNotFound(path.clone()))?;
        if bytes.last() != Some(&TERMINATOR) {
            bytes.push(TERMINATOR);
        }
        let module_fn = ApeFunction {
            arity: 0,
            owner: None,
            code: RefCell::new(Some(bytes)),
            code_offset: 0,
            name: None,
            is_module: true,
        };
        let handle = self.heap.alloc_function(module_fn);
        self.push(Value::Obj(handle))?;
        self.maybe_collect();
        self.call(handle, 0)
    }

    fn op_forage(&mut self) -> Result<(), VmError> {
        let path_val = self.pop()?;
        let path = self.string_of(path_val)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let handle = self.heap.alloc_string(&contents);
                self.push(Value::Obj(handle))?;
                self.maybe_collect();
            }
            Err(_) => self.push(Value::Nil)?,
        }
        Ok(())
    }

    fn op_inscribe(&mut self) -> Result<(), VmError> {
        let content_val = self.pop()?;
        let path_val = self.pop()?;
        let content = self.string_of(content_val)?;
        let path = self.string_of(path_val)?;
        let ok = std::fs::write(&path, content).is_ok();
        self.push(Value::Bool(ok))?;
        Ok(())
    }
}

pub enum ReplError {
    Compile(String),
    Runtime(RuntimeError),
}

impl std::fmt::Display for ReplError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplError::Compile(msg) => write!(f, "{msg}"),
            ReplError::Runtime(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn vm_with(source: &str) -> (Vec<u8>, Vm<Vec<u8>, Cursor<Vec<u8>>>) {
        let config = ape_compiler::CompilerConfig::new();
        let mut bytecode = ape_compiler::compile_to_bytes(source, config).unwrap();
        bytecode.push(TERMINATOR);
        (bytecode, Vm::new(Vec::new(), Cursor::new(Vec::new())))
    }

    #[test]
    fn runs_simple_print() {
        let (bytecode, mut vm) = vm_with("tree 1 ooh 1");
        vm.run_script(bytecode).unwrap();
        assert_eq!(String::from_utf8(vm.out.clone()).unwrap(), "2\n");
    }

    #[test]
    fn string_concat_produces_new_string() {
        let (bytecode, mut vm) = vm_with("tree \"ab\" ooh \"cd\"");
        vm.run_script(bytecode).unwrap();
        assert_eq!(String::from_utf8(vm.out.clone()).unwrap(), "abcd\n");
    }

    #[test]
    fn undefined_global_is_a_runtime_error() {
        let (bytecode, mut vm) = vm_with("tree missing");
        let result = vm.run_script(bytecode);
        assert!(result.is_err());
    }

    #[test]
    fn if_statement_skips_false_branch() {
        let (bytecode, mut vm) = vm_with("if (false) { tree 1 } tree 2");
        vm.run_script(bytecode).unwrap();
        assert_eq!(String::from_utf8(vm.out.clone()).unwrap(), "2\n");
    }
}
