use super::*;
use crate::{assert, ComplexField, MatRef};
use reborrow::*;

/// Immutable view over a column vector, similar to an immutable reference to a strided
/// [prim@slice].
#[derive(Debug)]
pub struct ColRef<'a, E> {
    pub(super) inner: VecImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Clone for ColRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ColRef<'_, E> {}

impl<'short, E> Reborrow<'short> for ColRef<'_, E> {
    type Target = ColRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for ColRef<'_, E> {
    type Target = ColRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<E> IntoConst for ColRef<'_, E> {
    type Target = Self;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, E> ColRef<'a, E> {
    /// Returns the number of rows of the column.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.len
    }

    /// Returns the offset between two successive elements of the column.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.stride
    }

    /// Returns a view over the `nrows` elements starting at `row_start`.
    #[track_caller]
    #[inline]
    pub fn subrows(self, row_start: usize, nrows: usize) -> Self {
        Self {
            inner: self.inner.subrows(row_start, nrows),
            __marker: PhantomData,
        }
    }

    /// Returns a view over the column as an `nrows × 1` matrix.
    #[inline]
    pub fn as_2d(self) -> MatRef<'a, E> {
        unsafe {
            crate::mat::from_raw_parts(self.inner.ptr.as_ptr(), self.nrows(), 1, self.row_stride(), 0)
        }
    }
}

impl<E: ComplexField> ColRef<'_, E> {
    /// Reads the value at `row`.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, row: usize) -> E {
        assert!(row < self.nrows());
        unsafe { *self.inner.ptr_at(row) }
    }
}
