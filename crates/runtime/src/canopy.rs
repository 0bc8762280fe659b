use crate::heap::{fnv1a_hash, ApeCanopy, ObjHandle};
use crate::value::Value;
use ape_core::{CANOPY_MAX_LOAD_DEN, CANOPY_MAX_LOAD_NUM, CANOPY_MIN_CAPACITY};

fn key_text(key: &Value) -> Option<&str> {
    match key {
        Value::Obj(h) => h.as_string().map(|s| s.as_str()),
        _ => None,
    }
}

fn find_slot(entries: &[(Value, Value)], key: &str, hash: u32) -> usize {
    let capacity = entries.len();
    let mut index = hash as usize % capacity;
    let mut tombstone: Option<usize> = None;
    loop {
        let (k, v) = &entries[index];
        if k.is_nil() {
            if v.is_nil() {
                return tombstone.unwrap_or(index);
            } else if tombstone.is_none() {
                tombstone = Some(index);
            }
        } else if key_text(k) == Some(key) {
            return index;
        }
        index = (index + 1) % capacity;
    }
}

pub fn get(canopy: &ApeCanopy, key: &str) -> Value {
    if canopy.entries.is_empty() {
        return Value::Nil;
    }
    let hash = fnv1a_hash(key.as_bytes());
    let index = find_slot(&canopy.entries, key, hash);
    if canopy.entries[index].0.is_nil() {
        Value::Nil
    } else {
        canopy.entries[index].1
    }
}

/// Inserts or overwrites a key, growing the table first if the load factor
/// would exceed 3/4. The reference implementation never rehashes past its
/// initial capacity (a known source bug); growing here is a deliberate
/// redesign so a long-running Canopy doesn't degrade into a near-linear
/// scan.
pub fn set(canopy: &mut ApeCanopy, key_handle: ObjHandle, value: Value) -> bool {
    if (canopy.count + 1) * CANOPY_MAX_LOAD_DEN > canopy.entries.len() * CANOPY_MAX_LOAD_NUM {
        grow(canopy);
    }
    let key = key_handle.as_string().expect("canopy keys are strings").as_str();
    let hash = fnv1a_hash(key.as_bytes());
    let index = find_slot(&canopy.entries, key, hash);
    let is_new = canopy.entries[index].0.is_nil();
    if is_new {
        canopy.count += 1;
    }
    canopy.entries[index] = (Value::Obj(key_handle), value);
    is_new
}

fn grow(canopy: &mut ApeCanopy) {
    let new_capacity = (canopy.entries.len() * 2).max(CANOPY_MIN_CAPACITY);
    let old_entries = std::mem::replace(&mut canopy.entries, vec![(Value::Nil, Value::Nil); new_capacity]);
    for (k, v) in old_entries {
        if k.is_nil() {
            continue;
        }
        let key = key_text(&k).expect("live canopy keys are strings");
        let hash = fnv1a_hash(key.as_bytes());
        let index = find_slot(&canopy.entries, key, hash);
        canopy.entries[index] = (k, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    #[test]
    fn set_then_get_round_trips() {
        let mut heap = Heap::new(1024);
        let key = heap.alloc_string("color");
        let mut canopy = ApeCanopy::with_capacity(8);
        set(&mut canopy, key, Value::Number(7.0));
        assert_eq!(get(&canopy, "color").as_number(), Some(7.0));
    }

    #[test]
    fn missing_key_is_nil() {
        let canopy = ApeCanopy::with_capacity(8);
        assert!(get(&canopy, "nope").is_nil());
    }

    #[test]
    fn growth_preserves_all_entries_past_initial_capacity() {
        let mut heap = Heap::new(1024);
        let mut canopy = ApeCanopy::with_capacity(CANOPY_MIN_CAPACITY);
        let mut keys = Vec::new();
        for i in 0..20 {
            let k = heap.alloc_string(&format!("k{i}"));
            keys.push(k);
            set(&mut canopy, k, Value::Number(i as f64));
        }
        for (i, _k) in keys.iter().enumerate() {
            assert_eq!(get(&canopy, &format!("k{i}")).as_number(), Some(i as f64));
        }
    }
}
