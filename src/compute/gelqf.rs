use super::check_lq_args;
use crate::{
    runtime::{
        tasks::{self, Tile},
        Context, Request, Sequence,
    },
    tile::TileMatrix,
    ComplexField, Error, IllegalArgument, Side, Trans,
};
use std::sync::Arc;

/// Submits the tile LQ factorization `A = L * Q`.
///
/// On completion, the elements on and below the diagonal of `a` hold the `m × min(m, n)` lower
/// trapezoidal factor `L`, and the elements above the diagonal, together with the block factors
/// in `t`, represent the unitary factor `Q`. `t` is typically created by
/// [`lq_factor_alloc`](super::lq_factor_alloc).
///
/// No task is submitted if `sequence` has already failed, in which case its status is propagated
/// to `request`.
///
/// # Errors
/// Returns an error without submitting anything if `a` is not a general tiled matrix with square
/// tiles, or if `t` cannot hold the block factors.
pub fn gelqf_async<E: ComplexField>(
    ctx: &Context,
    a: &TileMatrix<E>,
    t: &TileMatrix<E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) -> Result<(), IllegalArgument> {
    let ib = check_lq_args(a, t)?;
    if let Err(code) = sequence.status() {
        sequence.fail(request, code);
        return Ok(());
    }

    let desc = *a.desc();
    let (mt, nt) = (desc.mt(), desc.nt());
    log::debug!(target: "faer_tile", "gelqf: {mt} × {nt} tiles, nb = {}, ib = {ib}", desc.nb());

    for k in 0..Ord::min(mt, nt) {
        let mvak = desc.tile_nrows(k);
        let nvak = desc.tile_ncols(k);
        let akk = Tile::new(a, k, k);

        tasks::gelqt(ctx, ib, akk, Tile::new(t, k, k), sequence, request);

        for m in k + 1..mt {
            tasks::unmlq(
                ctx,
                Side::Right,
                Trans::ConjTrans,
                ib,
                akk.top_left(Ord::min(mvak, nvak), nvak),
                Tile::new(t, k, k),
                Tile::new(a, m, k),
                sequence,
                request,
            );
        }

        for n in k + 1..nt {
            tasks::tslqt(
                ctx,
                ib,
                akk.top_left(mvak, mvak),
                Tile::new(a, k, n),
                Tile::new(t, k, n),
                sequence,
                request,
            );

            for m in k + 1..mt {
                tasks::tsmlq(
                    ctx,
                    Side::Right,
                    Trans::ConjTrans,
                    ib,
                    Tile::new(a, m, k),
                    Tile::new(a, m, n),
                    Tile::new(a, k, n),
                    Tile::new(t, k, n),
                    sequence,
                    request,
                );
            }
        }
    }
    Ok(())
}

/// Computes the tile LQ factorization `A = L * Q`, and waits for its completion.
///
/// See [`gelqf_async`] for the layout of the result.
///
/// # Errors
/// Returns [`Error::IllegalArgument`] if the arguments are rejected, and [`Error::Failed`] if a
/// task failed, in which case the contents of `a` and `t` are unspecified.
pub fn gelqf<E: ComplexField>(
    ctx: &Context,
    a: &mut TileMatrix<E>,
    t: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let sequence = Sequence::new();
    let request = Request::new(&sequence);
    gelqf_async(ctx, a, t, &sequence, &request)?;
    ctx.scheduler().wait();
    sequence.status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        c64,
        compute::lq_factor_alloc,
        linalg::lq::tslqt::tests::product,
        runtime::TileParams,
        testing::{max_abs_diff, random_mat, tolerance},
        tile::TileDesc,
        ErrorCode, Mat, MatRef, Parallelism,
    };
    use rand::prelude::*;

    fn ctx(nb: usize, ib: usize, parallelism: Parallelism) -> Context {
        let mut params = TileParams::default();
        params.tile_size = nb;
        params.inner_blocksize = ib;
        params.tuning = false;
        params.parallelism = parallelism;
        Context::new(params).unwrap()
    }

    fn lower(a: MatRef<'_, c64>) -> Mat<c64> {
        Mat::from_fn(a.nrows(), a.ncols(), |i, j| {
            if j <= i {
                a.read(i, j)
            } else {
                c64::new(0.0, 0.0)
            }
        })
    }

    #[test]
    fn test_gelqf_tall() {
        // with more rows than columns, `A * Aᴴ = L * Lᴴ`
        let rng = &mut StdRng::seed_from_u64(7);
        for parallelism in [Parallelism::None, Parallelism::Rayon(3)] {
            let ctx = ctx(3, 2, parallelism);
            let a = random_mat::<c64>(rng, 8, 5);
            let mut tiles = TileMatrix::from_mat(&ctx, a.as_ref()).unwrap();
            let mut t = lq_factor_alloc::<c64>(&ctx, tiles.desc()).unwrap();
            gelqf(&ctx, &mut tiles, &mut t).unwrap();

            let l = lower(tiles.to_mat().as_ref());
            let llh = product(l.as_ref(), l.as_ref().adjoint_to_owned().as_ref());
            let aah = product(a.as_ref(), a.as_ref().adjoint_to_owned().as_ref());
            assert!(max_abs_diff(llh.as_ref(), aah.as_ref()) < tolerance::<c64>(8 * 8));
        }
    }

    #[test]
    fn test_gelqf_illegal_arguments() {
        let ctx = ctx(4, 2, Parallelism::None);
        let mut a = TileMatrix::<c64>::zeros(TileDesc::general(8, 8, 4, 4).unwrap());

        let mut short = TileMatrix::<c64>::zeros(TileDesc::general(2, 8, 2, 4).unwrap());
        let err = gelqf(&ctx, &mut a, &mut short).unwrap_err();
        assert_eq!(err, Error::IllegalArgument(IllegalArgument { arg: "t" }));

        let mut rect = TileMatrix::<c64>::zeros(TileDesc::general(8, 8, 2, 4).unwrap());
        let mut t = lq_factor_alloc::<c64>(&ctx, rect.desc()).unwrap();
        let err = gelqf(&ctx, &mut rect, &mut t).unwrap_err();
        assert_eq!(err, Error::IllegalArgument(IllegalArgument { arg: "nb" }));
    }

    #[test]
    fn test_gelqf_async_after_failure() {
        let ctx = ctx(4, 2, Parallelism::Rayon(2));
        let rng = &mut StdRng::seed_from_u64(3);
        let a_mat = random_mat::<c64>(rng, 8, 8);
        let a = TileMatrix::from_mat(&ctx, a_mat.as_ref()).unwrap();
        let t = lq_factor_alloc::<c64>(&ctx, a.desc()).unwrap();

        let sequence = Sequence::new();
        let first = Request::new(&sequence);
        sequence.fail(&first, ErrorCode::IllegalValue);

        let request = Request::new(&sequence);
        gelqf_async(&ctx, &a, &t, &sequence, &request).unwrap();
        ctx.scheduler().wait();

        assert_eq!(request.status(), Err(ErrorCode::IllegalValue));
        assert_eq!(sequence.failed_request().unwrap().0, first.id());
        assert_eq!(a.to_mat().as_slice(), a_mat.as_slice());
    }
}
