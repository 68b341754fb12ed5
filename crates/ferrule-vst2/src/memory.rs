//! Lifetime tracking for memory handed to the host by pointer.
//!
//! Some commands answer by writing an address into a host-provided slot
//! (chunk data, speaker arrangements). The host reads through that address
//! after the dispatcher returns, so the memory cannot be freed when the
//! command finishes. [`MemoryTracker`] keeps each such block alive until the
//! next safe point: processing being switched on or off, or teardown.

use std::alloc::{self, Layout};
use std::collections::BTreeMap;
use std::ffi::c_void;
use std::ptr::NonNull;

use ferrule_core::{PluginError, PluginResult};

/// A zero-initialized heap block with an explicit layout.
///
/// Used for native structs whose size is only known at runtime (for example
/// speaker arrangements with more channels than the declared array holds).
pub struct NativeBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl NativeBlock {
    /// Allocate a zeroed block.
    ///
    /// Zero-sized layouts are rejected.
    pub fn zeroed(layout: Layout) -> PluginResult<Self> {
        if layout.size() == 0 {
            return Err(PluginError::InvalidArgument(
                "zero-sized native block".to_string(),
            ));
        }

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        Ok(Self { ptr, layout })
    }

    /// Start of the block.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Start of the block as a typed pointer.
    #[inline]
    pub fn cast<T>(&self) -> *mut T {
        self.ptr.as_ptr().cast()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl Drop for NativeBlock {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by alloc_zeroed with this exact layout and
        // is freed only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// SAFETY: the block is uniquely owned plain memory.
unsafe impl Send for NativeBlock {}

impl std::fmt::Debug for NativeBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBlock")
            .field("ptr", &self.ptr)
            .field("size", &self.layout.size())
            .finish()
    }
}

/// A tracked allocation. The variant decides how it is released.
#[derive(Debug)]
enum Allocation {
    /// Raw bytes (chunk data).
    Block(Box<[u8]>),
    /// A native struct.
    Object(NativeBlock),
}

/// Registry of blocks whose addresses were returned to the host.
///
/// Keyed by address. Every registered block stays valid until
/// [`clear_all`](Self::clear_all) or until the tracker is dropped.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    allocations: BTreeMap<usize, Allocation>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a byte block and return its address.
    ///
    /// An empty block has no address worth handing out: it is dropped
    /// immediately and null is returned.
    pub fn register_block(&mut self, mut block: Box<[u8]>) -> *mut u8 {
        if block.is_empty() {
            return std::ptr::null_mut();
        }

        let ptr = block.as_mut_ptr();
        self.allocations.insert(ptr as usize, Allocation::Block(block));
        ptr
    }

    /// Take ownership of a native struct block and return its address.
    pub fn register_object(&mut self, block: NativeBlock) -> *mut c_void {
        let ptr = block.as_ptr();
        self.allocations.insert(ptr as usize, Allocation::Object(block));
        ptr.cast()
    }

    /// Release every tracked block and return how many there were.
    ///
    /// Calling this on an empty tracker does nothing.
    pub fn clear_all(&mut self) -> usize {
        let released = self.allocations.len();
        self.allocations.clear();
        released
    }

    /// Returns true if `ptr` is the address of a tracked block.
    pub fn contains(&self, ptr: *const c_void) -> bool {
        self.allocations.contains_key(&(ptr as usize))
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_clear() {
        let mut tracker = MemoryTracker::new();

        let bytes = tracker.register_block(vec![1u8, 2, 3].into_boxed_slice());
        let block = NativeBlock::zeroed(Layout::new::<[u32; 4]>()).unwrap();
        let object = tracker.register_object(block);

        assert_eq!(tracker.len(), 2);
        assert!(tracker.contains(bytes as *const c_void));
        assert!(tracker.contains(object));

        // SAFETY: both blocks are alive until clear_all.
        unsafe {
            assert_eq!(std::slice::from_raw_parts(bytes, 3), &[1, 2, 3]);
            assert_eq!(*object.cast::<[u32; 4]>(), [0; 4]);
        }

        assert_eq!(tracker.clear_all(), 2);
        assert!(tracker.is_empty());
        assert!(!tracker.contains(bytes as *const c_void));

        // Idempotent
        assert_eq!(tracker.clear_all(), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_empty_block_not_tracked() {
        let mut tracker = MemoryTracker::new();
        let ptr = tracker.register_block(Box::new([]));
        assert!(ptr.is_null());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_native_block_rejects_zero_size() {
        assert!(NativeBlock::zeroed(Layout::new::<()>()).is_err());

        let block = NativeBlock::zeroed(Layout::from_size_align(24, 8).unwrap()).unwrap();
        assert_eq!(block.layout().size(), 24);
        assert_eq!(block.as_ptr() as usize % 8, 0);
    }
}
