//! Strided column vector views.

use crate::assert;
use core::{marker::PhantomData, ptr::NonNull};

mod colmut;
mod colref;

pub use colmut::ColMut;
pub use colref::ColRef;

#[derive(Debug)]
struct VecImpl<E> {
    ptr: NonNull<E>,
    len: usize,
    stride: isize,
}

unsafe impl<E: Sync> Sync for VecImpl<E> {}
unsafe impl<E: Send> Send for VecImpl<E> {}

impl<E> Copy for VecImpl<E> {}
impl<E> Clone for VecImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> VecImpl<E> {
    #[inline(always)]
    fn ptr_at(self, row: usize) -> *mut E {
        self.ptr.as_ptr().wrapping_offset(row as isize * self.stride)
    }

    #[inline]
    #[track_caller]
    fn subrows(self, row_start: usize, nrows: usize) -> Self {
        assert!(all(row_start <= self.len, nrows <= self.len - row_start));
        Self {
            ptr: unsafe { NonNull::new_unchecked(self.ptr_at(row_start)) },
            len: nrows,
            stride: self.stride,
        }
    }
}

/// Creates a `ColRef` from raw parts.
///
/// # Safety
/// The element at index `i` is read from `ptr + i * row_stride`. Every such element must be valid
/// for reads during `'a`, and must not be written through another view for that duration.
#[inline(always)]
pub unsafe fn from_raw_parts<'a, E>(ptr: *const E, nrows: usize, row_stride: isize) -> ColRef<'a, E> {
    ColRef {
        inner: VecImpl {
            ptr: NonNull::new_unchecked(ptr as *mut E),
            len: nrows,
            stride: row_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `ColMut` from raw parts.
///
/// # Safety
/// Same as [`from_raw_parts`], with writes allowed, and no other view may access the elements
/// during `'a`.
#[inline(always)]
pub unsafe fn from_raw_parts_mut<'a, E>(ptr: *mut E, nrows: usize, row_stride: isize) -> ColMut<'a, E> {
    ColMut {
        inner: VecImpl {
            ptr: NonNull::new_unchecked(ptr),
            len: nrows,
            stride: row_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a contiguous `ColRef` from a slice.
#[inline]
pub fn from_slice<E>(slice: &[E]) -> ColRef<'_, E> {
    unsafe { from_raw_parts(slice.as_ptr(), slice.len(), 1) }
}

/// Creates a contiguous `ColMut` from a slice.
#[inline]
pub fn from_slice_mut<E>(slice: &mut [E]) -> ColMut<'_, E> {
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), slice.len(), 1) }
}
