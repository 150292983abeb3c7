use crate::{
    mat,
    runtime::{
        tasks::{self, Tile},
        Context, Request, Sequence,
    },
    tile::{Layout, TileMatrix},
    utils::thread::{for_each_raw, Ptr},
    ComplexField, IllegalArgument, MatMut, MatRef, Parallelism,
};
use reborrow::*;
use std::sync::Arc;

#[cfg(feature = "perf-warn")]
fn warn_layout(row_stride: isize, col_stride: isize) {
    if row_stride.unsigned_abs() != 1 {
        if col_stride.unsigned_abs() == 1 {
            log::warn!(target: "faer_perf", "tile conversion prefers column-major matrix. Found row-major matrix.");
        } else {
            log::warn!(target: "faer_perf", "tile conversion prefers column-major matrix. Found matrix with generic strides.");
        }
    }
}

/// Copies the elements of `a` into the stored tiles of `tiles`.
pub(crate) fn lapack_to_tiles<E: ComplexField>(
    parallelism: Parallelism,
    a: MatRef<'_, E>,
    tiles: &mut TileMatrix<E>,
) {
    tiles.assert_unshared();
    #[cfg(feature = "perf-warn")]
    warn_layout(a.row_stride(), a.col_stride());
    let tiles = &*tiles;
    let desc = *tiles.desc();
    let (mb, nb) = (desc.mb(), desc.nb());

    for_each_raw(
        desc.nt(),
        |n| {
            for m in desc.tile_row_range(n) {
                if !desc.is_stored(m, n) {
                    continue;
                }
                // SAFETY: each tile column is written by a single thread, and `tiles` is borrowed
                // mutably by the caller.
                let mut dst = unsafe { tiles.tile_mut(m, n) };
                let (nrows, ncols) = (dst.nrows(), dst.ncols());
                dst.copy_from(a.submatrix(m * mb, n * nb, nrows, ncols));
            }
        },
        parallelism,
    );
}

/// Copies the stored tiles of `tiles` into `a`. Elements outside the stored tiles are left
/// untouched.
pub(crate) fn tiles_to_lapack<E: ComplexField>(
    parallelism: Parallelism,
    tiles: &TileMatrix<E>,
    a: MatMut<'_, E>,
) {
    tiles.assert_unshared();
    let desc = *tiles.desc();
    let (mb, nb) = (desc.mb(), desc.nb());
    let (nrows, ncols, rs, cs) = (a.nrows(), a.ncols(), a.row_stride(), a.col_stride());
    #[cfg(feature = "perf-warn")]
    warn_layout(rs, cs);
    let ptr = Ptr(a.as_ptr_mut());

    for_each_raw(
        desc.nt(),
        |n| {
            let ptr = ptr;
            // SAFETY: each thread writes to its own block of columns of `a`.
            let a = unsafe { mat::from_raw_parts_mut(ptr.0, nrows, ncols, rs, cs) };
            let mut a = a.submatrix_mut(0, n * nb, nrows, desc.tile_ncols(n));
            for m in desc.tile_row_range(n) {
                if !desc.is_stored(m, n) {
                    continue;
                }
                // SAFETY: no task holds `tiles`.
                let src = unsafe { tiles.tile(m, n) };
                let mut dst = a.rb_mut().submatrix_mut(m * mb, 0, src.nrows(), src.ncols());
                dst.copy_from(src);
            }
        },
        parallelism,
    );
}

// column-major matrix borrowed by the conversion tasks, which complete before the conversion
// returns
struct RawMat<E> {
    ptr: Ptr<E>,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}

impl<E> Copy for RawMat<E> {}
impl<E> Clone for RawMat<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> RawMat<E> {
    #[inline]
    fn from_ref(a: MatRef<'_, E>) -> Self {
        Self {
            ptr: Ptr(a.as_ptr() as *mut E),
            nrows: a.nrows(),
            ncols: a.ncols(),
            row_stride: a.row_stride(),
            col_stride: a.col_stride(),
        }
    }

    #[inline]
    fn from_mut(a: MatMut<'_, E>) -> Self {
        let (nrows, ncols) = (a.nrows(), a.ncols());
        let (row_stride, col_stride) = (a.row_stride(), a.col_stride());
        Self {
            ptr: Ptr(a.as_ptr_mut()),
            nrows,
            ncols,
            row_stride,
            col_stride,
        }
    }

    /// # Safety
    /// The borrowed matrix must still be alive, and the block must not be written concurrently.
    #[inline]
    unsafe fn block<'a>(self, i: usize, j: usize, nrows: usize, ncols: usize) -> MatRef<'a, E> {
        mat::from_raw_parts(
            self.ptr.0 as *const E,
            self.nrows,
            self.ncols,
            self.row_stride,
            self.col_stride,
        )
        .submatrix(i, j, nrows, ncols)
    }

    /// # Safety
    /// The borrowed matrix must still be alive and mutably borrowed, and the block must not be
    /// accessed concurrently.
    #[inline]
    unsafe fn block_mut<'a>(
        self,
        i: usize,
        j: usize,
        nrows: usize,
        ncols: usize,
    ) -> MatMut<'a, E> {
        mat::from_raw_parts_mut(
            self.ptr.0,
            self.nrows,
            self.ncols,
            self.row_stride,
            self.col_stride,
        )
        .submatrix_mut(i, j, nrows, ncols)
    }
}

// drains the scheduler even when unwinding, so that no task outlives the borrowed matrix
struct DrainOnDrop<'a>(&'a Context);

impl Drop for DrainOnDrop<'_> {
    fn drop(&mut self) {
        self.0.scheduler().drain();
    }
}

fn check_general<E>(a_dims: (usize, usize), tiles: &TileMatrix<E>) -> Result<(), IllegalArgument> {
    let desc = tiles.desc();
    if desc.layout() != Layout::General {
        return Err(IllegalArgument::new("layout"));
    }
    if a_dims != (desc.m(), desc.n()) {
        return Err(IllegalArgument::new("a"));
    }
    Ok(())
}

/// Copies the column-major matrix `a` into the general tiled matrix `tiles`.
///
/// One task is submitted per tile, so the copy is ordered after the tasks already submitted on
/// `tiles`. The call returns once every task of the scheduler has completed. Nothing is copied
/// if `sequence` has failed, in which case its status is propagated to `request`.
///
/// # Errors
/// Returns an error if `tiles` does not have the general layout, or if its dimensions differ from
/// those of `a`.
pub fn ge2desc<E: ComplexField>(
    ctx: &Context,
    a: MatRef<'_, E>,
    tiles: &TileMatrix<E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) -> Result<(), IllegalArgument> {
    check_general((a.nrows(), a.ncols()), tiles)?;
    if let Err(code) = sequence.status() {
        sequence.fail(request, code);
        return Ok(());
    }
    #[cfg(feature = "perf-warn")]
    warn_layout(a.row_stride(), a.col_stride());

    let src = RawMat::from_ref(a);
    let desc = *tiles.desc();
    let (mb, nb) = (desc.mb(), desc.nb());
    let guard = DrainOnDrop(ctx);
    for n in 0..desc.nt() {
        for m in 0..desc.mt() {
            let write = move |mut dst: MatMut<'_, E>| {
                let (nrows, ncols) = (dst.nrows(), dst.ncols());
                // SAFETY: `a` outlives the tasks, and is only read.
                dst.copy_from(unsafe { src.block(m * mb, n * nb, nrows, ncols) });
            };
            tasks::write_tile(ctx, "ge2desc", Tile::new(tiles, m, n), write, sequence, request);
        }
    }
    drop(guard);
    ctx.scheduler().wait();
    Ok(())
}

/// Copies the general tiled matrix `tiles` into the column-major matrix `a`.
///
/// One task is submitted per tile, so the copy is ordered after the tasks already submitted on
/// `tiles`. The call returns once every task of the scheduler has completed. Nothing is copied
/// if `sequence` has failed, in which case its status is propagated to `request`.
///
/// # Errors
/// Returns an error if `tiles` does not have the general layout, or if its dimensions differ from
/// those of `a`.
pub fn desc2ge<E: ComplexField>(
    ctx: &Context,
    tiles: &TileMatrix<E>,
    a: MatMut<'_, E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) -> Result<(), IllegalArgument> {
    check_general((a.nrows(), a.ncols()), tiles)?;
    if let Err(code) = sequence.status() {
        sequence.fail(request, code);
        return Ok(());
    }
    #[cfg(feature = "perf-warn")]
    warn_layout(a.row_stride(), a.col_stride());

    let dst = RawMat::from_mut(a);
    let desc = *tiles.desc();
    let (mb, nb) = (desc.mb(), desc.nb());
    let guard = DrainOnDrop(ctx);
    for n in 0..desc.nt() {
        for m in 0..desc.mt() {
            let read = move |src: MatRef<'_, E>| {
                // SAFETY: `a` outlives the tasks, and each task writes to its own block.
                let mut dst = unsafe { dst.block_mut(m * mb, n * nb, src.nrows(), src.ncols()) };
                dst.copy_from(src);
            };
            tasks::read_tile(ctx, "desc2ge", Tile::new(tiles, m, n), read, sequence, request);
        }
    }
    drop(guard);
    ctx.scheduler().wait();
    Ok(())
}

/// Copies the band matrix `ab`, given in LAPACK band storage, into the band tiled matrix `tiles`.
///
/// Element `(i, j)` of the band is read from row `ku + i - j` of `ab` for
/// [`Layout::UpperBand`], `i - j` for [`Layout::LowerBand`], and `kl + ku + i - j` for
/// [`Layout::GeneralBand`], whose first `kl` rows are reserved for fill-in. One task is submitted
/// per tile intersecting the band, and the elements of these tiles outside the band are set to
/// zero. The call returns once every task of the scheduler has completed.
///
/// Nothing is copied if `sequence` has failed, in which case its status is propagated to
/// `request`.
///
/// # Errors
/// Returns an error if `tiles` does not have a band layout, if `ab` does not have as many columns
/// as `tiles`, or if `ab` has too few rows to hold the band.
pub fn pb2desc<E: ComplexField>(
    ctx: &Context,
    ab: MatRef<'_, E>,
    tiles: &TileMatrix<E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) -> Result<(), IllegalArgument> {
    let desc = *tiles.desc();
    let (kl, ku) = (desc.kl(), desc.ku());
    let (diag_row, band_rows) = match desc.layout() {
        Layout::UpperBand => (ku, ku + 1),
        Layout::LowerBand => (0, kl + 1),
        Layout::GeneralBand => (kl + ku, 2 * kl + ku + 1),
        _ => return Err(IllegalArgument::new("layout")),
    };
    if ab.ncols() != desc.n() {
        return Err(IllegalArgument::new("ab"));
    }
    if ab.nrows() < band_rows {
        return Err(IllegalArgument::new("ldab"));
    }

    if let Err(code) = sequence.status() {
        sequence.fail(request, code);
        return Ok(());
    }

    let src = RawMat::from_ref(ab);
    let (mb, nb) = (desc.mb(), desc.nb());
    let guard = DrainOnDrop(ctx);
    for n in 0..desc.nt() {
        for m in desc.tile_row_range(n) {
            if !desc.is_stored(m, n) {
                continue;
            }
            let write = move |mut dst: MatMut<'_, E>| {
                // SAFETY: `ab` outlives the tasks, and is only read.
                let ab = unsafe { src.block(0, 0, src.nrows, src.ncols) };
                for jj in 0..dst.ncols() {
                    let j = n * nb + jj;
                    for ii in 0..dst.nrows() {
                        let i = m * mb + ii;
                        let value = if i + ku >= j && i <= j + kl {
                            ab.read(diag_row + i - j, j)
                        } else {
                            E::faer_zero()
                        };
                        dst.write(ii, jj, value);
                    }
                }
            };
            tasks::write_tile(ctx, "pb2desc", Tile::new(tiles, m, n), write, sequence, request);
        }
    }
    drop(guard);
    ctx.scheduler().wait();
    Ok(())
}
