use super::*;
use crate::{assert, col::ColMut, ComplexField, MatRef};
use reborrow::*;

/// Mutable view over a matrix, similar to a mutable reference to a 2D strided [prim@slice].
///
/// Since `MatMut` mutably borrows data, it cannot be [`Copy`]. Use
/// [`reborrow::ReborrowMut::rb_mut`] to pass it to a function without giving it up, and
/// [`reborrow::Reborrow::rb`] to obtain a [`MatRef`] for the duration of a borrow.
#[derive(Debug)]
pub struct MatMut<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> MatMut<'a, E> {
    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    /// Returns the offset between the first elements of two successive rows in the matrix.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    /// Returns the offset between the first elements of two successive columns in the matrix.
    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    /// Returns a mutable pointer to the matrix data.
    #[inline(always)]
    pub fn as_ptr_mut(self) -> *mut E {
        self.inner.ptr.as_ptr()
    }

    /// Returns the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose_mut(self) -> Self {
        Self {
            inner: self.inner.transpose(),
            __marker: PhantomData,
        }
    }

    /// Returns a view over the submatrix starting at `(row_start, col_start)`, with `nrows` rows
    /// and `ncols` columns.
    #[track_caller]
    #[inline]
    pub fn submatrix_mut(
        self,
        row_start: usize,
        col_start: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        Self {
            inner: self.inner.submatrix(row_start, col_start, nrows, ncols),
            __marker: PhantomData,
        }
    }

    /// Splits the matrix horizontally at `row`, returning the top and bottom parts.
    #[track_caller]
    #[inline]
    pub fn split_at_row_mut(self, row: usize) -> (Self, Self) {
        let (m, n) = (self.nrows(), self.ncols());
        assert!(row <= m);
        let inner = self.inner;
        (
            Self {
                inner: inner.submatrix(0, 0, row, n),
                __marker: PhantomData,
            },
            Self {
                inner: inner.submatrix(row, 0, m - row, n),
                __marker: PhantomData,
            },
        )
    }

    /// Splits the matrix vertically at `col`, returning the left and right parts.
    #[track_caller]
    #[inline]
    pub fn split_at_col_mut(self, col: usize) -> (Self, Self) {
        let (m, n) = (self.nrows(), self.ncols());
        assert!(col <= n);
        let inner = self.inner;
        (
            Self {
                inner: inner.submatrix(0, 0, m, col),
                __marker: PhantomData,
            },
            Self {
                inner: inner.submatrix(0, col, m, n - col),
                __marker: PhantomData,
            },
        )
    }

    /// Returns a view over the column at `col`.
    #[track_caller]
    #[inline]
    pub fn col_mut(self, col: usize) -> ColMut<'a, E> {
        assert!(col < self.ncols());
        unsafe {
            crate::col::from_raw_parts_mut(
                self.inner.ptr_at(0, col),
                self.nrows(),
                self.row_stride(),
            )
        }
    }

    /// Returns a view over the row at `row`, as a column vector.
    #[track_caller]
    #[inline]
    pub fn row_as_col_mut(self, row: usize) -> ColMut<'a, E> {
        self.transpose_mut().col_mut(row)
    }
}

impl<'a, E: ComplexField> MatMut<'a, E> {
    /// Reads the value at `(row, col)`.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.rb().read(row, col)
    }

    /// Writes `value` at `(row, col)`.
    #[track_caller]
    #[inline(always)]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { *self.inner.ptr_at(row, col) = value };
    }

    /// Copies the values of `other` into `self`.
    ///
    /// # Panics
    /// Panics if the two matrices do not have the same shape.
    #[track_caller]
    pub fn copy_from(&mut self, other: MatRef<'_, E>) {
        assert!(all(self.nrows() == other.nrows(), self.ncols() == other.ncols()));
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                self.write(i, j, other.read(i, j));
            }
        }
    }

    /// Fills every element with `value`.
    pub fn fill(&mut self, value: E) {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                self.write(i, j, value);
            }
        }
    }

    /// Fills every element with zero.
    #[inline]
    pub fn fill_zero(&mut self) {
        self.fill(E::faer_zero())
    }
}
