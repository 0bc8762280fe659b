use crate::heap::{Heap, ObjHandle, ObjKind};
use crate::value::Value;
use ape_core::GC_HEAP_GROW_FACTOR;

/// Marks a value and, if it's a heap object already marked, does nothing
/// further (cycle-safe). Recurses into Bunch/Canopy contents and a
/// Function's captured name so the whole live subgraph is kept. Matches the
/// reference `markValue`/`markObject`.
pub fn mark_value(value: &Value) {
    if let Value::Obj(handle) = value {
        mark_object(*handle);
    }
}

fn mark_object(handle: ObjHandle) {
    if handle.is_marked() {
        return;
    }
    handle.set_marked(true);
    match handle.kind() {
        ObjKind::String(_) => {}
        ObjKind::Function(func) => {
            if let Some(name) = func.name {
                mark_object(name);
            }
            if let Some(owner) = func.owner {
                mark_object(owner);
            }
        }
        ObjKind::Bunch(bunch) => {
            for v in bunch.borrow().values.iter() {
                mark_value(v);
            }
        }
        ObjKind::Canopy(canopy) => {
            for (k, v) in canopy.borrow().entries.iter() {
                mark_value(k);
                mark_value(v);
            }
        }
    }
}

/// Runs a full collection: the caller marks every root with
/// [`mark_value`]/`mark_object` first, then calls this to sweep and grow
/// the threshold. Matches the reference `collectGarbage`.
pub fn collect(heap: &mut Heap) {
    heap.sweep();
    heap.next_gc = heap.bytes_allocated * GC_HEAP_GROW_FACTOR;
}

/// Whether the VM should collect before its next allocation. The reference
/// collector only triggers on an allocation that grows `bytesAllocated`
/// past `nextGC`; callers check this after each alloc.
pub fn should_collect(heap: &Heap) -> bool {
    heap.bytes_allocated > heap.next_gc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_a_bunch_marks_its_elements() {
        let mut heap = Heap::new(1024);
        let inner = heap.alloc_string("inside");
        let bunch = heap.alloc_bunch(vec![Value::Obj(inner)]);
        mark_value(&Value::Obj(bunch));
        assert!(inner.is_marked());
        assert!(bunch.is_marked());
    }

    #[test]
    fn unmarked_objects_are_swept() {
        let mut heap = Heap::new(1024);
        let keep = heap.alloc_string("keep");
        mark_value(&Value::Obj(keep));
        heap.alloc_string("gone");
        collect(&mut heap);
        assert_eq!(heap.iter().count(), 1);
    }
}
