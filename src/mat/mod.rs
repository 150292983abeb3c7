//! Strided matrix views and the owned column-major matrix.

use crate::assert;
use core::{marker::PhantomData, ptr::NonNull};

mod matmut;
mod matown;
mod matref;

pub use matmut::MatMut;
pub use matown::Mat;
pub use matref::MatRef;

#[derive(Debug)]
struct MatImpl<E> {
    ptr: NonNull<E>,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}

unsafe impl<E: Sync> Sync for MatImpl<E> {}
unsafe impl<E: Send> Send for MatImpl<E> {}

impl<E> Copy for MatImpl<E> {}
impl<E> Clone for MatImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> MatImpl<E> {
    #[inline(always)]
    fn ptr_at(self, row: usize, col: usize) -> *mut E {
        self.ptr
            .as_ptr()
            .wrapping_offset(row as isize * self.row_stride + col as isize * self.col_stride)
    }

    #[inline]
    #[track_caller]
    fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(
            row_start <= self.nrows,
            col_start <= self.ncols,
            nrows <= self.nrows - row_start,
            ncols <= self.ncols - col_start,
        ));
        Self {
            ptr: unsafe { NonNull::new_unchecked(self.ptr_at(row_start, col_start)) },
            nrows,
            ncols,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }

    #[inline]
    fn transpose(self) -> Self {
        Self {
            ptr: self.ptr,
            nrows: self.ncols,
            ncols: self.nrows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }
}

#[inline]
fn column_major_len(nrows: usize, ncols: usize, col_stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        (ncols - 1) * col_stride + nrows
    }
}

/// Creates a `MatRef` from raw parts.
///
/// # Safety
/// The element at `(i, j)` is read from `ptr + i * row_stride + j * col_stride`. Every such
/// element must be valid for reads during `'a`, and must not be written through another view for
/// that duration.
#[inline(always)]
pub unsafe fn from_raw_parts<'a, E>(
    ptr: *const E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatRef<'a, E> {
    MatRef {
        inner: MatImpl {
            ptr: NonNull::new_unchecked(ptr as *mut E),
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `MatMut` from raw parts.
///
/// # Safety
/// Same as [`from_raw_parts`], with writes allowed, and no other view may access the elements
/// during `'a`.
#[inline(always)]
pub unsafe fn from_raw_parts_mut<'a, E>(
    ptr: *mut E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatMut<'a, E> {
    MatMut {
        inner: MatImpl {
            ptr: NonNull::new_unchecked(ptr),
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a column-major `MatRef` from a slice, with the given leading dimension.
///
/// # Panics
/// Panics if the slice is too short to hold `ncols` columns spaced `col_stride` apart.
#[track_caller]
#[inline]
pub fn from_column_major_slice_with_stride<E>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    col_stride: usize,
) -> MatRef<'_, E> {
    assert!(slice.len() >= column_major_len(nrows, ncols, col_stride));
    unsafe { from_raw_parts(slice.as_ptr(), nrows, ncols, 1, col_stride as isize) }
}

/// Creates a column-major `MatMut` from a slice, with the given leading dimension.
///
/// The leading dimension is not checked against `nrows`: kernels validate it themselves and
/// reject views whose columns overlap.
///
/// # Panics
/// Panics if the slice is too short to hold `ncols` columns spaced `col_stride` apart.
#[track_caller]
#[inline]
pub fn from_column_major_slice_with_stride_mut<E>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
    col_stride: usize,
) -> MatMut<'_, E> {
    assert!(slice.len() >= column_major_len(nrows, ncols, col_stride));
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), nrows, ncols, 1, col_stride as isize) }
}

/// Creates a column-major `MatRef` from a slice of exactly `nrows * ncols` elements.
#[track_caller]
#[inline]
pub fn from_column_major_slice<E>(slice: &[E], nrows: usize, ncols: usize) -> MatRef<'_, E> {
    from_column_major_slice_with_stride(slice, nrows, ncols, nrows)
}

/// Creates a column-major `MatMut` from a slice of exactly `nrows * ncols` elements.
#[track_caller]
#[inline]
pub fn from_column_major_slice_mut<E>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
) -> MatMut<'_, E> {
    from_column_major_slice_with_stride_mut(slice, nrows, ncols, nrows)
}
