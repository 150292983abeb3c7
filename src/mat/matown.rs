use crate::{assert, ComplexField, MatMut, MatRef};

/// Heap allocated column-major matrix.
#[derive(Clone, Debug)]
pub struct Mat<E> {
    data: Vec<E>,
    nrows: usize,
    ncols: usize,
}

impl<E: ComplexField> Mat<E> {
    /// Returns an empty matrix of dimension `0×0`.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            nrows: 0,
            ncols: 0,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with the provided function.
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> E) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![E::faer_zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, with ones on the diagonal and zeros
    /// elsewhere.
    #[inline]
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        Self::from_fn(nrows, ncols, |i, j| {
            if i == j {
                E::faer_one()
            } else {
                E::faer_zero()
            }
        })
    }

    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns a view over the matrix.
    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, E> {
        super::from_column_major_slice(&self.data, self.nrows, self.ncols)
    }

    /// Returns a mutable view over the matrix.
    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, E> {
        super::from_column_major_slice_mut(&mut self.data, self.nrows, self.ncols)
    }

    /// Reads the value at `(row, col)`.
    #[track_caller]
    #[inline]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows, col < self.ncols));
        self.data[row + col * self.nrows]
    }

    /// Writes `value` at `(row, col)`.
    #[track_caller]
    #[inline]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows, col < self.ncols));
        self.data[row + col * self.nrows] = value;
    }

    /// Returns the column-major storage of the matrix.
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }
}

impl<E: ComplexField> Default for Mat<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
