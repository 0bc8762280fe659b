//! Fixed capacities mirroring the reference VM's stack-allocated arrays.
//!
//! The spec leaves globals uncapped but fixes these four; we keep them as
//! `const` rather than configurable so overflow is always a VM error, never
//! a silent reallocation that would change observable behavior.

/// Value stack depth. Slot `STACK_MAX - 1` is reserved for the pending
/// runtime error, per the data model.
pub const STACK_MAX: usize = 256;

/// Maximum live call frames (recursion depth).
pub const FRAMES_MAX: usize = 64;

/// Maximum nested `tumble` handlers.
pub const HANDLER_MAX: usize = 16;

/// Maximum nested `swing` loop counters.
pub const LOOP_MAX: usize = 256;

/// Initial GC trigger threshold, in bytes tracked by the allocator.
pub const GC_INITIAL_THRESHOLD: usize = 1024 * 1024;

/// Factor the trigger threshold grows by after each collection.
pub const GC_HEAP_GROW_FACTOR: usize = 2;

/// Load factor (as a fraction, numerator/denominator) above which a Canopy
/// grows its entry table. The reference never rehashes at all; this is the
/// redesigned behavior the spec calls out in its "source bugs to note".
pub const CANOPY_MAX_LOAD_NUM: usize = 3;
pub const CANOPY_MAX_LOAD_DEN: usize = 4;

/// Minimum Canopy entry-table capacity, used both as the floor for a fresh
/// literal's capacity and as the starting size when an empty table first
/// needs to grow.
pub const CANOPY_MIN_CAPACITY: usize = 8;
