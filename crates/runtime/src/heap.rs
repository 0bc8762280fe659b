use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use crate::value::Value;

/// The header every heap allocation carries: a mark bit for the collector
/// and an intrusive link into the VM's singly-linked object list. Mirrors
/// the reference `Obj` struct's `isMarked`/`next` fields.
pub struct GcHeader {
    marked: Cell<bool>,
    next: Cell<Option<NonNull<GcObject>>>,
}

impl GcHeader {
    fn new() -> Self {
        GcHeader {
            marked: Cell::new(false),
            next: Cell::new(None),
        }
    }
}

/// An immutable, content-addressed string. Strings are not interned —
/// equality is by content, computed on demand — but each carries a
/// precomputed FNV-1a hash so Canopy lookups don't re-hash on every probe.
pub struct ApeString {
    pub bytes: Box<[u8]>,
    pub hash: u32,
}

impl ApeString {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes().to_vec().into_boxed_slice();
        let hash = fnv1a_hash(&bytes);
        ApeString { bytes, hash }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// FNV-1a, ported byte-for-byte from the reference `hashString`.
pub fn fnv1a_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

/// A user-defined function (a "tribe").
///
/// `owner` distinguishes two cases: `None` means this Function owns its own
/// contiguous bytecode buffer (the top-level script or an imported module);
/// `Some(handle)` means it is a nested function literal sharing the
/// enclosing function's buffer, with `code_offset` as the entry point
/// relative to that owner's base — the owner-relative addressing model
/// required by the function ownership invariant.
pub struct ApeFunction {
    pub arity: u8,
    pub owner: Option<ObjHandle>,
    pub code: RefCell<Option<Vec<u8>>>,
    pub code_offset: u32,
    pub name: Option<ObjHandle>,
    pub is_module: bool,
}

impl ApeFunction {
    pub fn display_name(&self) -> String {
        match self.name {
            None => "<script>".to_string(),
            Some(name) => match name.kind() {
                ObjKind::String(s) => format!("<tribe {}>", s.as_str()),
                _ => "<tribe ?>".to_string(),
            },
        }
    }
}

#[derive(Default)]
pub struct ApeBunch {
    pub values: Vec<Value>,
}

/// Sentinel-tombstone open-addressed table, per the Canopy invariants: a
/// `Nil` key marks a free slot; `Nil` key with non-`Nil` value marks a
/// tombstone left by deletion. `count` only counts live (non-`Nil`-keyed)
/// entries.
pub struct ApeCanopy {
    pub entries: Vec<(Value, Value)>,
    pub count: usize,
}

impl ApeCanopy {
    pub fn with_capacity(capacity: usize) -> Self {
        ApeCanopy {
            entries: vec![(Value::Nil, Value::Nil); capacity],
            count: 0,
        }
    }
}

pub enum ObjKind {
    String(ApeString),
    Function(ApeFunction),
    Bunch(RefCell<ApeBunch>),
    Canopy(RefCell<ApeCanopy>),
}

pub struct GcObject {
    header: GcHeader,
    kind: ObjKind,
}

/// A non-owning handle to a heap object. Copying a `Value::Obj` copies one
/// of these, aliasing the same allocation — matching the data model's
/// "copying `Obj` aliases the heap object."
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ObjHandle(NonNull<GcObject>);

impl ObjHandle {
    /// # Safety
    /// `ptr` must point at a live `GcObject` owned by the heap that produced
    /// it; handles must not outlive the heap (or the object, post-sweep).
    unsafe fn from_raw(ptr: NonNull<GcObject>) -> Self {
        ObjHandle(ptr)
    }

    pub fn kind(&self) -> &ObjKind {
        // SAFETY: the heap never frees an object still reachable from a
        // live handle; an ObjHandle only exists while its object is rooted
        // or reachable from a root, by construction of the VM's value
        // stack/globals/frames discipline.
        unsafe { &self.0.as_ref().kind }
    }

    pub fn is_marked(&self) -> bool {
        unsafe { self.0.as_ref().header.marked.get() }
    }

    pub fn set_marked(&self, marked: bool) {
        unsafe { self.0.as_ref().header.marked.set(marked) };
    }

    fn next(&self) -> Option<ObjHandle> {
        unsafe { self.0.as_ref().header.next.get().map(ObjHandle) }
    }

    fn set_next(&self, next: Option<ObjHandle>) {
        unsafe {
            self.0.as_ref().header.next.set(next.map(|h| h.0));
        }
    }

    pub fn as_string(&self) -> Option<&ApeString> {
        match self.kind() {
            ObjKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&ApeFunction> {
        match self.kind() {
            ObjKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bunch(&self) -> Option<&RefCell<ApeBunch>> {
        match self.kind() {
            ObjKind::Bunch(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_canopy(&self) -> Option<&RefCell<ApeCanopy>> {
        match self.kind() {
            ObjKind::Canopy(c) => Some(c),
            _ => None,
        }
    }

    /// Identity comparison, used for equality of non-String heap values.
    pub fn ptr_eq(&self, other: &ObjHandle) -> bool {
        self.0 == other.0
    }
}

/// Owns the intrusive object list and performs allocation bookkeeping.
/// `Heap` itself does not know about the VM's roots — `collect` is driven
/// by the VM, which marks its own roots before calling `sweep`.
pub struct Heap {
    head: Option<ObjHandle>,
    pub bytes_allocated: usize,
    pub next_gc: usize,
    pub objects_allocated: usize,
}

impl Heap {
    pub fn new(initial_threshold: usize) -> Self {
        Heap {
            head: None,
            bytes_allocated: 0,
            next_gc: initial_threshold,
            objects_allocated: 0,
        }
    }

    fn link(&mut self, object: NonNull<GcObject>, size: usize) -> ObjHandle {
        // SAFETY: `object` was just produced by `Box::into_raw` below and is
        // uniquely owned by this call; no other reference to it exists yet.
        let handle = unsafe { ObjHandle::from_raw(object) };
        handle.set_next(self.head);
        self.head = Some(handle);
        self.bytes_allocated += size;
        self.objects_allocated += 1;
        handle
    }

    fn alloc(&mut self, kind: ObjKind, size: usize) -> ObjHandle {
        let boxed = Box::new(GcObject {
            header: GcHeader::new(),
            kind,
        });
        let ptr = NonNull::new(Box::into_raw(boxed)).expect("Box::into_raw is never null");
        self.link(ptr, size)
    }

    pub fn alloc_string(&mut self, text: &str) -> ObjHandle {
        let s = ApeString::new(text);
        let size = std::mem::size_of::<GcObject>() + s.bytes.len();
        self.alloc(ObjKind::String(s), size)
    }

    pub fn alloc_function(&mut self, function: ApeFunction) -> ObjHandle {
        let size = std::mem::size_of::<GcObject>();
        self.alloc(ObjKind::Function(function), size)
    }

    pub fn alloc_bunch(&mut self, values: Vec<Value>) -> ObjHandle {
        let size = std::mem::size_of::<GcObject>() + values.len() * std::mem::size_of::<Value>();
        self.alloc(ObjKind::Bunch(RefCell::new(ApeBunch { values })), size)
    }

    pub fn alloc_canopy(&mut self, capacity: usize) -> ObjHandle {
        let size = std::mem::size_of::<GcObject>()
            + capacity * std::mem::size_of::<(Value, Value)>();
        self.alloc(
            ObjKind::Canopy(RefCell::new(ApeCanopy::with_capacity(capacity))),
            size,
        )
    }

    /// Walks the object list, unlinking and freeing everything whose mark
    /// bit is clear, and clears the mark bit on every survivor. Matches the
    /// reference `sweep`.
    pub fn sweep(&mut self) {
        let mut previous: Option<ObjHandle> = None;
        let mut current = self.head;
        while let Some(object) = current {
            let next = object.next();
            if object.is_marked() {
                object.set_marked(false);
                previous = Some(object);
                current = next;
            } else {
                match previous {
                    Some(prev) => prev.set_next(next),
                    None => self.head = next,
                }
                current = next;
                self.free(object);
            }
        }
    }

    fn free(&mut self, object: ObjHandle) {
        // SAFETY: `object` has just been unlinked from the object list by
        // `sweep` and is reachable from no root (that's what "unmarked"
        // means at this point), so reclaiming it is sound and this is the
        // only place a `GcObject` is ever dropped.
        let size = match object.kind() {
            ObjKind::String(s) => std::mem::size_of::<GcObject>() + s.bytes.len(),
            ObjKind::Function(_) => std::mem::size_of::<GcObject>(),
            ObjKind::Bunch(b) => {
                std::mem::size_of::<GcObject>()
                    + b.borrow().values.len() * std::mem::size_of::<Value>()
            }
            ObjKind::Canopy(c) => {
                std::mem::size_of::<GcObject>()
                    + c.borrow().entries.len() * std::mem::size_of::<(Value, Value)>()
            }
        };
        unsafe {
            drop(Box::from_raw(object.0.as_ptr()));
        }
        self.bytes_allocated -= size;
    }

    /// All currently-live objects, oldest-linked-last, for the marker to
    /// walk without needing its own traversal state.
    pub fn iter(&self) -> HeapIter {
        HeapIter { next: self.head }
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        let mut current = self.head;
        while let Some(object) = current {
            let next = object.next();
            unsafe {
                drop(Box::from_raw(object.0.as_ptr()));
            }
            current = next;
        }
    }
}

pub struct HeapIter {
    next: Option<ObjHandle>,
}

impl Iterator for HeapIter {
    type Item = ObjHandle;
    fn next(&mut self) -> Option<ObjHandle> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_known_vector() {
        assert_eq!(fnv1a_hash(b""), 2166136261);
    }

    #[test]
    fn sweep_frees_unmarked_and_clears_marks_on_survivors() {
        let mut heap = Heap::new(1024);
        let keep = heap.alloc_string("keep");
        let drop_me = heap.alloc_string("drop");
        keep.set_marked(true);
        let _ = drop_me;
        heap.sweep();
        assert!(!keep.is_marked());
        let remaining: Vec<_> = heap.iter().collect();
        assert_eq!(remaining.len(), 1);
    }
}
