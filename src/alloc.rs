//! Node allocation strategies.
//!
//! A [`Map`](../struct.Map.html) never touches the process allocator directly. Every node is
//! allocated and released one at a time through the map's `NodeAllocator`, which defaults to
//! [`Global`].

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use thiserror::Error;

/// The error returned when a `NodeAllocator` cannot satisfy a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// A source of memory for tree nodes.
///
/// The map only ever asks for blocks of a single layout (that of its node type) and always returns
/// a block with the layout it was allocated with.
///
/// # Safety
///
/// A successful `allocate` must return a block that is valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stays valid until it is passed to
/// `deallocate` on the same allocator (or a clone of it).
pub unsafe trait NodeAllocator {
    /// Allocates a block of memory described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously returned by `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the same `layout`, and
    /// must not have been deallocated since.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl NodeAllocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout)
    }
}

unsafe impl<'a, A> NodeAllocator for &'a A where A: NodeAllocator + ?Sized {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}
