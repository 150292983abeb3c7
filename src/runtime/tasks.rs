//! Task wrappers around the tile kernels.
//!
//! Each function declares the footprint of the kernel from the regions of its tiles and submits
//! it to the scheduler of the context. The task body checks the sequence, allocates its private
//! workspace, runs the kernel, and reports failures through the sequence.

use super::{Context, Footprint, Request, Sequence};
use crate::{
    assert,
    linalg::lq::{gelqt, tslqt, tsmlq, unmlq},
    tile::TileMatrix,
    ComplexField, ErrorCode, IllegalArgument, MatMut, MatRef, Side, Trans,
};
use dyn_stack::{GlobalPodBuffer, PodStack, SizeOverflow, StackReq};
use std::sync::Arc;

/// Top-left block of the tile `(m, n)` of a tiled matrix.
#[derive(Debug)]
pub struct Tile<'a, E> {
    matrix: &'a TileMatrix<E>,
    m: usize,
    n: usize,
    nrows: usize,
    ncols: usize,
}

impl<E> Copy for Tile<'_, E> {}
impl<E> Clone for Tile<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, E> Tile<'a, E> {
    /// Returns the whole tile `(m, n)` of `matrix`.
    #[track_caller]
    #[inline]
    pub fn new(matrix: &'a TileMatrix<E>, m: usize, n: usize) -> Self {
        let desc = matrix.desc();
        assert!(desc.is_stored(m, n));
        Self {
            matrix,
            m,
            n,
            nrows: desc.tile_nrows(m),
            ncols: desc.tile_ncols(n),
        }
    }

    /// Restricts the tile to its first `nrows` rows and `ncols` columns.
    #[track_caller]
    #[inline]
    pub fn top_left(self, nrows: usize, ncols: usize) -> Self {
        assert!(all(nrows <= self.nrows, ncols <= self.ncols));
        Self {
            nrows,
            ncols,
            ..self
        }
    }

    /// Returns the number of rows of the tile.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the tile.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    fn share(self) -> OwnedTile<E> {
        OwnedTile {
            matrix: self.matrix.share(),
            m: self.m,
            n: self.n,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

// keeps the arena alive for the duration of the task
struct OwnedTile<E> {
    matrix: TileMatrix<E>,
    m: usize,
    n: usize,
    nrows: usize,
    ncols: usize,
}

impl<E> OwnedTile<E> {
    fn region(&self) -> super::Region {
        self.matrix.region(self.m, self.n)
    }

    /// # Safety
    /// The tile must be in the footprint of the running task.
    unsafe fn as_ref(&self) -> MatRef<'_, E> {
        self.matrix
            .tile(self.m, self.n)
            .submatrix(0, 0, self.nrows, self.ncols)
    }

    /// # Safety
    /// The tile must be in the footprint of the running task, with write access.
    unsafe fn as_mut(&self) -> MatMut<'_, E> {
        self.matrix
            .tile_mut(self.m, self.n)
            .submatrix_mut(0, 0, self.nrows, self.ncols)
    }
}

fn run_kernel(
    name: &'static str,
    sequence: &Sequence,
    request: &Request,
    req: impl FnOnce() -> Result<StackReq, SizeOverflow>,
    kernel: impl FnOnce(PodStack<'_>) -> Result<(), IllegalArgument>,
) {
    if let Err(code) = sequence.status() {
        sequence.fail(request, code);
        return;
    }

    let mut mem = match req().ok().map(GlobalPodBuffer::try_new) {
        Some(Ok(mem)) => mem,
        _ => {
            log::error!(target: "faer_tile", "{name}: failed to allocate the workspace");
            sequence.fail(request, ErrorCode::OutOfMemory);
            return;
        }
    };

    if let Err(err) = kernel(PodStack::new(&mut mem)) {
        log::error!(target: "faer_tile", "{name}: {err}");
        sequence.fail(request, ErrorCode::IllegalValue);
    }
}

/// Submits [`gelqt`](gelqt::gelqt) on the tile `a`, with the block factors written to `t`.
pub fn gelqt<E: ComplexField>(
    ctx: &Context,
    ib: usize,
    a: Tile<'_, E>,
    t: Tile<'_, E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let (a, t) = (a.share(), t.share());
    let footprint = Footprint::new().read_write(a.region()).write(t.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            "gelqt",
            &sequence,
            &request,
            || gelqt::gelqt_req::<E>(a.nrows, a.ncols, ib),
            // SAFETY: both tiles are in the footprint.
            |stack| unsafe { gelqt::gelqt(ib, a.as_mut(), t.as_mut(), stack) },
        )
    });
}

/// Submits [`unmlq`](unmlq::unmlq), applying the `Q` stored in `a` and `t` to the tile `c`.
pub fn unmlq<E: ComplexField>(
    ctx: &Context,
    side: Side,
    trans: Trans,
    ib: usize,
    a: Tile<'_, E>,
    t: Tile<'_, E>,
    c: Tile<'_, E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let (a, t, c) = (a.share(), t.share(), c.share());
    let footprint = Footprint::new()
        .read(a.region())
        .read(t.region())
        .read_write(c.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            "unmlq",
            &sequence,
            &request,
            || unmlq::unmlq_req::<E>(side, c.nrows, c.ncols, ib),
            // SAFETY: every tile is in the footprint, and only `c` is written.
            |stack| unsafe {
                unmlq::unmlq(side, trans, ib, a.as_ref(), t.as_ref(), c.as_mut(), stack)
            },
        )
    });
}

/// Submits [`tslqt`](tslqt::tslqt) on the pair of tiles `a1`, `a2`, with the block factors
/// written to `t`.
pub fn tslqt<E: ComplexField>(
    ctx: &Context,
    ib: usize,
    a1: Tile<'_, E>,
    a2: Tile<'_, E>,
    t: Tile<'_, E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let (a1, a2, t) = (a1.share(), a2.share(), t.share());
    let footprint = Footprint::new()
        .read_write(a1.region())
        .read_write(a2.region())
        .write(t.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            "tslqt",
            &sequence,
            &request,
            || tslqt::tslqt_req::<E>(a1.nrows, ib),
            // SAFETY: every tile is in the footprint.
            |stack| unsafe { tslqt::tslqt(ib, a1.as_mut(), a2.as_mut(), t.as_mut(), stack) },
        )
    });
}

/// Submits [`tsmlq`](tsmlq::tsmlq), applying the `Q` stored in `v` and `t` to the pair of tiles
/// `a1`, `a2`.
pub fn tsmlq<E: ComplexField>(
    ctx: &Context,
    side: Side,
    trans: Trans,
    ib: usize,
    a1: Tile<'_, E>,
    a2: Tile<'_, E>,
    v: Tile<'_, E>,
    t: Tile<'_, E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let (a1, a2, v, t) = (a1.share(), a2.share(), v.share(), t.share());
    let footprint = Footprint::new()
        .read_write(a1.region())
        .read_write(a2.region())
        .read(v.region())
        .read(t.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            "tsmlq",
            &sequence,
            &request,
            || tsmlq::tsmlq_req::<E>(side, a1.nrows, a1.ncols, ib),
            // SAFETY: every tile is in the footprint, and only `a1` and `a2` are written.
            |stack| unsafe {
                tsmlq::tsmlq(
                    side,
                    trans,
                    ib,
                    a1.as_mut(),
                    a2.as_mut(),
                    v.as_ref(),
                    t.as_ref(),
                    stack,
                )
            },
        )
    });
}

/// Submits a task setting the off-diagonal elements of the tile `a` to `alpha`, and its diagonal
/// elements to `beta`.
pub fn laset<E: ComplexField>(
    ctx: &Context,
    alpha: E,
    beta: E,
    a: Tile<'_, E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let a = a.share();
    let footprint = Footprint::new().write(a.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            "laset",
            &sequence,
            &request,
            || Ok(StackReq::empty()),
            |_| {
                // SAFETY: the tile is in the footprint.
                let mut a = unsafe { a.as_mut() };
                a.fill(alpha);
                for i in 0..Ord::min(a.nrows(), a.ncols()) {
                    a.write(i, i, beta);
                }
                Ok(())
            },
        )
    });
}

/// Submits `body` with read access to the tile `a`.
pub(crate) fn read_tile<E: ComplexField>(
    ctx: &Context,
    name: &'static str,
    a: Tile<'_, E>,
    body: impl FnOnce(MatRef<'_, E>) + Send + 'static,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let a = a.share();
    let footprint = Footprint::new().read(a.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            name,
            &sequence,
            &request,
            || Ok(StackReq::empty()),
            |_| {
                // SAFETY: the tile is in the footprint.
                body(unsafe { a.as_ref() });
                Ok(())
            },
        )
    });
}

/// Submits `body` with write access to the tile `a`.
pub(crate) fn write_tile<E: ComplexField>(
    ctx: &Context,
    name: &'static str,
    a: Tile<'_, E>,
    body: impl FnOnce(MatMut<'_, E>) + Send + 'static,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) {
    let a = a.share();
    let footprint = Footprint::new().write(a.region());
    let (sequence, request) = (sequence.clone(), request.clone());

    ctx.scheduler().submit(footprint, move || {
        run_kernel(
            name,
            &sequence,
            &request,
            || Ok(StackReq::empty()),
            |_| {
                // SAFETY: the tile is in the footprint.
                body(unsafe { a.as_mut() });
                Ok(())
            },
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert, c64, runtime::TileParams, testing::random_mat, tile::TileDesc, Parallelism,
    };
    use rand::prelude::*;

    fn ctx(parallelism: Parallelism) -> Context {
        let mut params = TileParams::default();
        params.tile_size = 4;
        params.inner_blocksize = 2;
        params.tuning = false;
        params.parallelism = parallelism;
        Context::new(params).unwrap()
    }

    #[test]
    fn test_gelqt_task_matches_kernel() {
        let ctx = ctx(Parallelism::Rayon(2));
        let rng = &mut StdRng::seed_from_u64(0);
        let a_mat = random_mat::<c64>(rng, 4, 4);
        let a = TileMatrix::from_mat(&ctx, a_mat.as_ref()).unwrap();
        let t = TileMatrix::<c64>::zeros(TileDesc::general(2, 4, 2, 4).unwrap());

        let sequence = Sequence::new();
        let request = Request::new(&sequence);
        gelqt(&ctx, 2, Tile::new(&a, 0, 0), Tile::new(&t, 0, 0), &sequence, &request);
        ctx.scheduler().wait();
        assert!(request.succeeded());

        let mut expected = a_mat.clone();
        let mut t_expected = crate::Mat::<c64>::zeros(2, 4);
        let mut mem = GlobalPodBuffer::new(gelqt::gelqt_req::<c64>(4, 4, 2).unwrap());
        gelqt::gelqt(2, expected.as_mut(), t_expected.as_mut(), PodStack::new(&mut mem)).unwrap();

        assert_eq!(a.to_mat().as_slice(), expected.as_slice());
        assert_eq!(t.to_mat().as_slice(), t_expected.as_slice());
    }

    #[test]
    fn test_allocation_failure_poisons_sequence() {
        let ctx = ctx(Parallelism::Rayon(2));
        let rng = &mut StdRng::seed_from_u64(1);
        let a_mat = random_mat::<c64>(rng, 4, 8);
        let a = TileMatrix::from_mat(&ctx, a_mat.as_ref()).unwrap();
        let t = TileMatrix::<c64>::zeros(TileDesc::general(2, 8, 2, 4).unwrap());

        let sequence = Sequence::new();
        let request = Request::new(&sequence);
        let later = Request::new(&sequence);

        // the workspace size overflows
        gelqt(
            &ctx,
            usize::MAX / 2,
            Tile::new(&a, 0, 0),
            Tile::new(&t, 0, 0),
            &sequence,
            &request,
        );
        tslqt(
            &ctx,
            2,
            Tile::new(&a, 0, 0),
            Tile::new(&a, 0, 1),
            Tile::new(&t, 0, 1),
            &sequence,
            &later,
        );
        ctx.scheduler().wait();

        assert_eq!(sequence.status(), Err(ErrorCode::OutOfMemory));
        assert_eq!(sequence.failed_request().unwrap().0, request.id());
        assert_eq!(request.status(), Err(ErrorCode::OutOfMemory));
        // the dependent task observed the failure and did nothing
        assert_eq!(later.status(), Err(ErrorCode::OutOfMemory));
        assert_eq!(a.to_mat().as_slice(), a_mat.as_slice());
    }

    #[test]
    fn test_kernel_error_is_reported() {
        let ctx = ctx(Parallelism::None);
        let a = TileMatrix::<c64>::zeros(TileDesc::general(4, 4, 4, 4).unwrap());
        let t = TileMatrix::<c64>::zeros(TileDesc::general(2, 2, 2, 2).unwrap());

        let sequence = Sequence::new();
        let request = Request::new(&sequence);
        // `t` has too few columns for four reflectors
        gelqt(&ctx, 2, Tile::new(&a, 0, 0), Tile::new(&t, 0, 0), &sequence, &request);
        ctx.scheduler().wait();
        assert_eq!(request.status(), Err(ErrorCode::IllegalValue));
    }

    #[test]
    fn test_laset() {
        let ctx = ctx(Parallelism::None);
        let q = TileMatrix::<f64>::zeros(TileDesc::general(6, 6, 4, 4).unwrap());
        let sequence = Sequence::new();
        let request = Request::new(&sequence);
        for m in 0..2 {
            for n in 0..2 {
                let diag = if m == n { 1.0 } else { 0.0 };
                laset(&ctx, 0.0, diag, Tile::new(&q, m, n), &sequence, &request);
            }
        }
        ctx.scheduler().wait();
        let q = q.to_mat();
        assert_eq!(q.as_slice(), crate::Mat::<f64>::identity(6, 6).as_slice());
    }
}
