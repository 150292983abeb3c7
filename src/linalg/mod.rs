//! Linear algebra module.
//!
//! Contains the strided BLAS/LAPACK-equivalent layer used by the tile kernels, the Householder
//! reflector utilities, and the tile LQ kernels themselves.
//!
//! # Memory allocation
//! Most routines defer memory allocation to the caller. Routines that need temporary space for
//! intermediate computations take a [`stack: PodStack`](dyn_stack::PodStack) parameter. A
//! [`PodStack`] is a thin wrapper over a slice of memory bytes. The functions taking a
//! [`PodStack`] parameter have a corresponding function with a similar name ending in `_req`
//! that returns the memory requirements of the algorithm. For example:
//! [`lq::tslqt::tslqt`] and [`lq::tslqt::tslqt_req`].
//!
//! Requirements can be combined with [`dyn_stack::StackReq::try_all_of`] and
//! [`dyn_stack::StackReq::try_any_of`] into a single allocation, which is typically obtained
//! through [`dyn_stack::GlobalPodBuffer::try_new`].

use crate::{mat, ComplexField, MatMut};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

pub mod blas;
pub mod householder;
pub mod lq;

/// Returns the stack requirements for creating a temporary matrix with the given dimensions.
#[inline]
pub fn temp_mat_req<E: ComplexField>(nrows: usize, ncols: usize) -> Result<StackReq, SizeOverflow> {
    let len = nrows.checked_mul(ncols).ok_or(SizeOverflow)?;
    StackReq::try_new::<E>(len)
}

/// Creates a temporary column-major matrix with unspecified values, from the given memory stack.
#[inline]
pub fn temp_mat_uninit<E: ComplexField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (alloc, stack) = stack.make_raw::<E>(nrows * ncols);
    (
        mat::from_column_major_slice_with_stride_mut(alloc, nrows, ncols, nrows),
        stack,
    )
}

/// Creates a temporary column-major matrix filled with zeros, from the given memory stack.
#[inline]
pub fn temp_mat_zeroed<E: ComplexField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (mut mat, stack) = temp_mat_uninit::<E>(nrows, ncols, stack);
    mat.fill_zero();
    (mat, stack)
}
