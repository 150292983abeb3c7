//! Tile LQ kernels.
//!
//! The LQ factorization of a tile row is computed by the four kernels below, following the
//! blocked Householder scheme with inner block size `ib`:
//!
//! - [`gelqt`](gelqt::gelqt) factorizes a single tile `A = L * Q`,
//! - [`unmlq`](unmlq::unmlq) applies the `Q` computed by `gelqt` to another tile,
//! - [`tslqt`](tslqt::tslqt) factorizes a lower triangular tile coupled with a full tile
//!   `[A1 A2] = L * Q`,
//! - [`tsmlq`](tsmlq::tsmlq) applies the `Q` computed by `tslqt` to a pair of tiles.
//!
//! Reflectors are stored rowwise (see [`householder`](crate::linalg::householder)), and the block
//! factors are stored in an `ib × k` matrix `T`, whose columns `[i, i + ib)` hold the upper
//! triangular factor of the block starting at reflector `i`.
//!
//! Every kernel validates its arguments before touching any data, and reports invalid ones
//! through [`IllegalArgument`].

use crate::{IllegalArgument, MatRef};

pub mod gelqt;
pub mod tslqt;
pub mod tsmlq;
pub mod unmlq;

/// Checks that `mat` is column-major with a leading dimension no smaller than its row count.
#[inline]
pub(crate) fn check_layout<E>(mat: MatRef<'_, E>, arg: &'static str) -> Result<(), IllegalArgument> {
    let (m, n) = (mat.nrows(), mat.ncols());
    let bad_rows = m > 1 && mat.row_stride() != 1;
    let bad_cols = m > 0 && n > 1 && mat.col_stride() < Ord::max(1, m) as isize;
    if bad_rows || bad_cols {
        Err(IllegalArgument::new(arg))
    } else {
        Ok(())
    }
}

/// Checks that a block factor matrix can hold `k` reflectors with inner block size `ib`.
#[inline]
pub(crate) fn check_factor<E>(
    t: MatRef<'_, E>,
    ib: usize,
    k: usize,
) -> Result<(), IllegalArgument> {
    if t.nrows() < Ord::min(ib, k) || t.ncols() < k {
        return Err(IllegalArgument::new("t"));
    }
    check_layout(t, "ldt")
}
