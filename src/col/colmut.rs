use super::*;
use crate::{assert, ColRef, ComplexField, MatMut};
use reborrow::*;

/// Mutable view over a column vector, similar to a mutable reference to a strided
/// [prim@slice].
#[derive(Debug)]
pub struct ColMut<'a, E> {
    pub(super) inner: VecImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

impl<'short, E> Reborrow<'short> for ColMut<'_, E> {
    type Target = ColRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        ColRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for ColMut<'_, E> {
    type Target = ColMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        ColMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for ColMut<'a, E> {
    type Target = ColRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        ColRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> ColMut<'a, E> {
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
    pub fn subrows_mut(self, row_start: usize, nrows: usize) -> Self {
        Self {
            inner: self.inner.subrows(row_start, nrows),
            __marker: PhantomData,
        }
    }

    /// Returns a view over the column as an `nrows × 1` matrix.
    #[inline]
    pub fn as_2d_mut(self) -> MatMut<'a, E> {
        unsafe {
            crate::mat::from_raw_parts_mut(
                self.inner.ptr.as_ptr(),
                self.nrows(),
                1,
                self.row_stride(),
                0,
            )
        }
    }
}

impl<E: ComplexField> ColMut<'_, E> {
    /// Reads the value at `row`.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, row: usize) -> E {
        self.rb().read(row)
    }

    /// Writes `value` at `row`.
    #[track_caller]
    #[inline(always)]
    pub fn write(&mut self, row: usize, value: E) {
        assert!(row < self.nrows());
        unsafe { *self.inner.ptr_at(row) = value };
    }

    /// Copies the values of `other` into `self`.
    #[track_caller]
    pub fn copy_from(&mut self, other: ColRef<'_, E>) {
        assert!(self.nrows() == other.nrows());
        for i in 0..self.nrows() {
            self.write(i, other.read(i));
        }
    }

    /// Fills every element with zero.
    pub fn fill_zero(&mut self) {
        for i in 0..self.nrows() {
            self.write(i, E::faer_zero());
        }
    }
}
