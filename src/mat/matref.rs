use super::*;
use crate::{assert, col::ColRef, ComplexField, Mat};
use reborrow::*;

/// Immutable view over a matrix, similar to an immutable reference to a 2D strided
/// [prim@slice].
#[derive(Debug)]
pub struct MatRef<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Copy for MatRef<'_, E> {}
impl<E> Clone for MatRef<'_, E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<'a, E> IntoConst for MatRef<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'a, E> MatRef<'a, E> {
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

    /// Returns a pointer to the matrix data.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr.as_ptr()
    }

    /// Returns the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose(self) -> Self {
        Self {
            inner: self.inner.transpose(),
            __marker: PhantomData,
        }
    }

    /// Returns a view over the submatrix starting at `(row_start, col_start)`, with `nrows` rows
    /// and `ncols` columns.
    #[track_caller]
    #[inline]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        Self {
            inner: self.inner.submatrix(row_start, col_start, nrows, ncols),
            __marker: PhantomData,
        }
    }

    /// Splits the matrix horizontally at `row`, returning the top and bottom parts.
    #[track_caller]
    #[inline]
    pub fn split_at_row(self, row: usize) -> (Self, Self) {
        let (m, n) = (self.nrows(), self.ncols());
        assert!(row <= m);
        (
            self.submatrix(0, 0, row, n),
            self.submatrix(row, 0, m - row, n),
        )
    }

    /// Splits the matrix vertically at `col`, returning the left and right parts.
    #[track_caller]
    #[inline]
    pub fn split_at_col(self, col: usize) -> (Self, Self) {
        let (m, n) = (self.nrows(), self.ncols());
        assert!(col <= n);
        (
            self.submatrix(0, 0, m, col),
            self.submatrix(0, col, m, n - col),
        )
    }

    /// Returns a view over the column at `col`.
    #[track_caller]
    #[inline]
    pub fn col(self, col: usize) -> ColRef<'a, E> {
        assert!(col < self.ncols());
        unsafe {
            crate::col::from_raw_parts(
                self.inner.ptr_at(0, col),
                self.nrows(),
                self.row_stride(),
            )
        }
    }

    /// Returns a view over the row at `row`, as a column vector.
    #[track_caller]
    #[inline]
    pub fn row_as_col(self, row: usize) -> ColRef<'a, E> {
        self.transpose().col(row)
    }
}

impl<'a, E: ComplexField> MatRef<'a, E> {
    /// Reads the value at `(row, col)`.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { *self.inner.ptr_at(row, col) }
    }

    /// Returns an owned copy of the matrix.
    #[inline]
    pub fn to_owned(&self) -> Mat<E> {
        let this = *self;
        Mat::from_fn(this.nrows(), this.ncols(), |i, j| this.read(i, j))
    }

    /// Returns the conjugate transpose as an owned matrix.
    #[inline]
    pub fn adjoint_to_owned(&self) -> Mat<E> {
        let this = *self;
        Mat::from_fn(this.ncols(), this.nrows(), |i, j| this.read(j, i).faer_conj())
    }
}
