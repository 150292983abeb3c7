use super::check_lq_args;
use crate::{
    runtime::{
        tasks::{self, Tile},
        Context, Request, Sequence,
    },
    tile::{Layout, TileMatrix},
    ComplexField, Error, IllegalArgument, Side, Trans,
};
use std::sync::Arc;

/// Submits the generation of the `m × n` matrix `Q` with orthonormal rows from the output of
/// [`gelqf`](super::gelqf). `Q` is the first `m` rows of the unitary factor.
///
/// `a` and `t` hold the factorization of an `m × n` matrix with `m <= n`, and `q` has the same
/// dimensions and tile size as `a`. Its contents on entry are overwritten.
///
/// No task is submitted if `sequence` has already failed, in which case its status is propagated
/// to `request`.
///
/// # Errors
/// Returns an error without submitting anything if `a` and `t` are not valid [`gelqf`](super::gelqf)
/// arguments, if `a` has more rows than columns, or if `q` does not match `a`.
pub fn unglq_async<E: ComplexField>(
    ctx: &Context,
    a: &TileMatrix<E>,
    t: &TileMatrix<E>,
    q: &TileMatrix<E>,
    sequence: &Arc<Sequence>,
    request: &Arc<Request>,
) -> Result<(), IllegalArgument> {
    let ib = check_lq_args(a, t)?;
    let desc = *a.desc();
    if desc.m() > desc.n() {
        return Err(IllegalArgument::new("m"));
    }
    let q_desc = q.desc();
    if q_desc.layout() != Layout::General
        || (q_desc.m(), q_desc.n()) != (desc.m(), desc.n())
        || (q_desc.mb(), q_desc.nb()) != (desc.mb(), desc.nb())
    {
        return Err(IllegalArgument::new("q"));
    }
    if let Err(code) = sequence.status() {
        sequence.fail(request, code);
        return Ok(());
    }

    let (mt, nt) = (desc.mt(), desc.nt());
    log::debug!(target: "faer_tile", "unglq: {mt} × {nt} tiles, nb = {}, ib = {ib}", desc.nb());

    for m in 0..mt {
        for n in 0..nt {
            let diag = if m == n {
                E::faer_one()
            } else {
                E::faer_zero()
            };
            tasks::laset(ctx, E::faer_zero(), diag, Tile::new(q, m, n), sequence, request);
        }
    }

    // the tile rows of `q` above `k` are still zero in the columns touched by step `k`
    for k in (0..mt).rev() {
        let mvak = desc.tile_nrows(k);
        let nvak = desc.tile_ncols(k);

        for n in (k + 1..nt).rev() {
            for m in k..mt {
                tasks::tsmlq(
                    ctx,
                    Side::Right,
                    Trans::NoTrans,
                    ib,
                    Tile::new(q, m, k),
                    Tile::new(q, m, n),
                    Tile::new(a, k, n),
                    Tile::new(t, k, n),
                    sequence,
                    request,
                );
            }
        }

        for m in k..mt {
            tasks::unmlq(
                ctx,
                Side::Right,
                Trans::NoTrans,
                ib,
                Tile::new(a, k, k).top_left(mvak, nvak),
                Tile::new(t, k, k),
                Tile::new(q, m, k),
                sequence,
                request,
            );
        }
    }
    Ok(())
}

/// Generates the `m × n` matrix `Q` with orthonormal rows from the output of
/// [`gelqf`](super::gelqf), and waits for its completion.
///
/// See [`unglq_async`] for the requirements on the arguments.
///
/// # Errors
/// Returns [`Error::IllegalArgument`] if the arguments are rejected, and [`Error::Failed`] if a
/// task failed, in which case the contents of `q` are unspecified.
pub fn unglq<E: ComplexField>(
    ctx: &Context,
    a: &TileMatrix<E>,
    t: &TileMatrix<E>,
    q: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let sequence = Sequence::new();
    let request = Request::new(&sequence);
    unglq_async(ctx, a, t, q, &sequence, &request)?;
    ctx.scheduler().wait();
    sequence.status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        c64,
        compute::{gelqf, lq_factor_alloc},
        linalg::lq::tslqt::tests::{gram, product},
        runtime::TileParams,
        testing::{max_abs_diff, random_mat, tolerance},
        tile::TileDesc,
        Mat, Parallelism,
    };
    use assert_approx_eq::assert_approx_eq;
    use rand::prelude::*;

    fn ctx(nb: usize, ib: usize, parallelism: Parallelism) -> Context {
        let mut params = TileParams::default();
        params.tile_size = nb;
        params.inner_blocksize = ib;
        params.tuning = false;
        params.parallelism = parallelism;
        Context::new(params).unwrap()
    }

    fn check_lq(m: usize, n: usize, nb: usize, ib: usize, parallelism: Parallelism, seed: u64) {
        let ctx = ctx(nb, ib, parallelism);
        let rng = &mut StdRng::seed_from_u64(seed);
        let a_mat = random_mat::<c64>(rng, m, n);

        let mut a = TileMatrix::from_mat(&ctx, a_mat.as_ref()).unwrap();
        let mut t = lq_factor_alloc::<c64>(&ctx, a.desc()).unwrap();
        gelqf(&ctx, &mut a, &mut t).unwrap();

        let mut q = TileMatrix::<c64>::zeros(*a.desc());
        unglq(&ctx, &a, &t, &mut q).unwrap();

        let q = q.to_mat();
        let factored = a.to_mat();
        let l = Mat::from_fn(m, m, |i, j| {
            if j <= i {
                factored.read(i, j)
            } else {
                c64::new(0.0, 0.0)
            }
        });

        let tol = tolerance::<c64>(m + n);
        let identity = Mat::<c64>::identity(m, m);
        assert!(max_abs_diff(gram(q.as_ref()).as_ref(), identity.as_ref()) < tol);
        assert!(max_abs_diff(product(l.as_ref(), q.as_ref()).as_ref(), a_mat.as_ref()) < tol);

        // the diagonal of L carries the norms of the orthogonalized rows
        let mut norm2 = 0.0;
        for j in 0..n {
            norm2 += a_mat.read(0, j).norm_sqr();
        }
        assert_approx_eq!(l.read(0, 0).norm(), norm2.sqrt(), 1e-10);
    }

    #[test]
    fn test_gelqf_unglq_sequential() {
        check_lq(10, 13, 4, 2, Parallelism::None, 0);
        check_lq(8, 8, 4, 4, Parallelism::None, 1);
        check_lq(1, 5, 2, 1, Parallelism::None, 2);
    }

    #[test]
    fn test_gelqf_unglq_parallel() {
        check_lq(10, 13, 4, 2, Parallelism::Rayon(4), 0);
        check_lq(9, 22, 5, 3, Parallelism::Rayon(3), 3);
        check_lq(16, 16, 4, 2, Parallelism::Rayon(0), 4);
    }

    #[test]
    fn test_unglq_rejects_tall() {
        let ctx = ctx(2, 1, Parallelism::None);
        let a = TileMatrix::<f64>::zeros(TileDesc::general(5, 3, 2, 2).unwrap());
        let t = lq_factor_alloc::<f64>(&ctx, a.desc()).unwrap();
        let mut q = TileMatrix::<f64>::zeros(*a.desc());
        let err = unglq(&ctx, &a, &t, &mut q).unwrap_err();
        assert_eq!(err, Error::IllegalArgument(IllegalArgument { arg: "m" }));
    }
}
