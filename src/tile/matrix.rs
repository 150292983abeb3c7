use super::{TileAddr, TileDesc};
use crate::{
    assert, compute::convert, mat, runtime::Context, runtime::Region, ComplexField,
    IllegalArgument, Mat, MatMut, MatRef, Parallelism,
};
use core::ptr::NonNull;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Process-unique identifier of the arena of a [`TileMatrix`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArenaId(u64);

impl ArenaId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct Arena<E> {
    ptr: NonNull<E>,
    len: usize,
    id: ArenaId,
}

unsafe impl<E: Send> Send for Arena<E> {}
unsafe impl<E: Sync> Sync for Arena<E> {}

impl<E: ComplexField> Arena<E> {
    fn zeroed(len: usize) -> Self {
        let data: Box<[E]> = vec![E::faer_zero(); len].into_boxed_slice();
        Self {
            ptr: NonNull::from(Box::leak(data)).cast::<E>(),
            len,
            id: ArenaId::next(),
        }
    }
}

impl<E> Drop for Arena<E> {
    fn drop(&mut self) {
        // SAFETY: `ptr` and `len` come from the boxed slice leaked in `Arena::zeroed`.
        unsafe {
            drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            )))
        };
    }
}

/// Tiled matrix: a [`TileDesc`] together with the arena holding its tiles.
///
/// The arena is reference counted. Tasks operating on the matrix hold a shared handle to it, and
/// access individual tiles through [`TileMatrix::tile`] and [`TileMatrix::tile_mut`], whose
/// soundness relies on the footprint declared to the scheduler. Element access from safe code
/// requires that no task holds the matrix anymore.
pub struct TileMatrix<E> {
    desc: TileDesc,
    arena: Arc<Arena<E>>,
}

impl<E> core::fmt::Debug for TileMatrix<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileMatrix")
            .field("desc", &self.desc)
            .field("arena", &self.arena.id)
            .finish()
    }
}

impl<E: ComplexField> TileMatrix<E> {
    /// Returns a tiled matrix with the given descriptor, filled with zeros.
    pub fn zeros(desc: TileDesc) -> Self {
        Self {
            arena: Arc::new(Arena::zeroed(desc.storage_len())),
            desc,
        }
    }

    /// Copies the column-major matrix `a` into a new tiled matrix with the general layout, using
    /// the tile size and parallelism of `ctx`.
    pub fn from_mat(ctx: &Context, a: MatRef<'_, E>) -> Result<Self, IllegalArgument> {
        let nb = ctx.tile_size();
        let mut tiles = Self::zeros(TileDesc::general(a.nrows(), a.ncols(), nb, nb)?);
        convert::lapack_to_tiles(ctx.parallelism(), a, &mut tiles);
        Ok(tiles)
    }

    /// Copies the matrix into a new column-major matrix. Elements outside the stored tiles are
    /// zero.
    #[track_caller]
    pub fn to_mat(&self) -> Mat<E> {
        self.assert_unshared();
        let mut out = Mat::zeros(self.desc.m(), self.desc.n());
        convert::tiles_to_lapack(Parallelism::None, self, out.as_mut());
        out
    }

    /// Returns the element at row `i` and column `j`.
    #[track_caller]
    pub fn read(&self, i: usize, j: usize) -> E {
        self.assert_unshared();
        assert!(all(i < self.desc.m(), j < self.desc.n()));
        let (mb, nb) = (self.desc.mb(), self.desc.nb());
        let (m, n) = (i / mb, j / nb);
        if !self.desc.is_stored(m, n) {
            return E::faer_zero();
        }
        // SAFETY: the matrix is not shared with any task.
        unsafe { self.tile(m, n).read(i - m * mb, j - n * nb) }
    }

    /// Writes `value` to the element at row `i` and column `j`.
    ///
    /// # Panics
    /// Panics if the element belongs to a tile that is not stored.
    #[track_caller]
    pub fn write(&mut self, i: usize, j: usize, value: E) {
        self.assert_unshared();
        assert!(all(i < self.desc.m(), j < self.desc.n()));
        let (mb, nb) = (self.desc.mb(), self.desc.nb());
        let (m, n) = (i / mb, j / nb);
        // SAFETY: the matrix is not shared with any task.
        unsafe { self.tile_mut(m, n).write(i - m * mb, j - n * nb, value) }
    }
}

impl<E> TileMatrix<E> {
    /// Returns the descriptor of the matrix.
    #[inline]
    pub fn desc(&self) -> &TileDesc {
        &self.desc
    }

    /// Returns the identifier of the arena.
    #[inline]
    pub fn arena_id(&self) -> ArenaId {
        self.arena.id
    }

    /// Returns the memory region of the tile `(m, n)`, for use in a task footprint.
    #[track_caller]
    #[inline]
    pub fn region(&self, m: usize, n: usize) -> Region {
        let TileAddr { offset, len, .. } = self.desc.tile_addr(m, n);
        Region::new(self.arena.id, offset, len)
    }

    /// Returns a view over the tile `(m, n)`.
    ///
    /// # Safety
    /// No other view may write to the tile while the returned view is alive. Inside a task, this
    /// holds when the tile region is part of the declared footprint.
    #[track_caller]
    #[inline]
    pub unsafe fn tile(&self, m: usize, n: usize) -> MatRef<'_, E> {
        let addr = self.desc.tile_addr(m, n);
        mat::from_raw_parts(
            self.arena.ptr.as_ptr().add(addr.offset) as *const E,
            self.desc.tile_nrows(m),
            self.desc.tile_ncols(n),
            1,
            addr.ld as isize,
        )
    }

    /// Returns a mutable view over the tile `(m, n)`.
    ///
    /// # Safety
    /// No other view may access the tile while the returned view is alive. Inside a task, this
    /// holds when the tile region is part of the declared footprint with write access.
    #[track_caller]
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn tile_mut(&self, m: usize, n: usize) -> MatMut<'_, E> {
        let addr = self.desc.tile_addr(m, n);
        mat::from_raw_parts_mut(
            self.arena.ptr.as_ptr().add(addr.offset),
            self.desc.tile_nrows(m),
            self.desc.tile_ncols(n),
            1,
            addr.ld as isize,
        )
    }

    /// Returns a new handle to the same arena, to be moved into a task.
    #[inline]
    pub(crate) fn share(&self) -> Self {
        Self {
            desc: self.desc,
            arena: self.arena.clone(),
        }
    }

    #[track_caller]
    #[inline]
    pub(crate) fn assert_unshared(&self) {
        assert!(Arc::strong_count(&self.arena) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64, runtime::TileParams, tile::Layout};

    fn ctx(tile_size: usize) -> Context {
        let mut params = TileParams::default();
        params.tile_size = tile_size;
        params.tuning = false;
        params.parallelism = Parallelism::None;
        Context::new(params).unwrap()
    }

    #[test]
    fn test_from_mat_round_trip() {
        let a = Mat::<c64>::from_fn(10, 7, |i, j| c64::new(i as f64, j as f64));
        let tiles = TileMatrix::from_mat(&ctx(4), a.as_ref()).unwrap();
        assert_eq!(tiles.desc().mt(), 3);
        assert_eq!(tiles.desc().nt(), 2);
        assert_eq!(tiles.read(9, 6), c64::new(9.0, 6.0));
        assert_eq!(tiles.to_mat().as_slice(), a.as_slice());

        // the last partial tile row is stored with its own leading dimension
        let corner = unsafe { tiles.tile(2, 1) };
        assert_eq!((corner.nrows(), corner.ncols()), (2, 3));
        assert_eq!(corner.col_stride(), 2);
        assert_eq!(corner.read(1, 2), c64::new(9.0, 6.0));
    }

    #[test]
    fn test_regions_are_distinct_across_matrices() {
        let desc = TileDesc::general(4, 4, 2, 2).unwrap();
        let a = TileMatrix::<f64>::zeros(desc);
        let b = TileMatrix::<f64>::zeros(desc);
        assert!(a.arena_id() != b.arena_id());
        assert!(a.region(0, 0).overlaps(&a.region(0, 0)));
        assert!(!a.region(0, 0).overlaps(&a.region(0, 1)));
        assert!(!a.region(0, 0).overlaps(&b.region(0, 0)));
    }

    #[test]
    fn test_band_elements() {
        let desc = TileDesc::band(Layout::LowerBand, 9, 9, 3, 3, 2, 0).unwrap();
        let mut tiles = TileMatrix::<f64>::zeros(desc);
        tiles.write(4, 2, 1.5);
        assert_eq!(tiles.read(4, 2), 1.5);
        // tile (2, 0) lies outside the band
        assert_eq!(tiles.read(8, 0), 0.0);
        assert_eq!(tiles.to_mat().read(4, 2), 1.5);
    }

    #[test]
    #[should_panic]
    fn test_shared_access_panics() {
        let tiles = TileMatrix::<f64>::zeros(TileDesc::general(2, 2, 2, 2).unwrap());
        let _task_handle = tiles.share();
        tiles.read(0, 0);
    }
}
