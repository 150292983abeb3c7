//! Tile algorithms.
//!
//! Each algorithm comes in two forms. The asynchronous form (`*_async`) validates its arguments,
//! then submits the tile kernels to the scheduler of the context and returns immediately;
//! failures are reported through the given [`Sequence`](crate::runtime::Sequence). The
//! synchronous form creates its own sequence, waits for every task to complete, and returns the
//! final status.

pub mod convert;
mod gelqf;
mod unglq;

pub use convert::{desc2ge, ge2desc, pb2desc};
pub use gelqf::{gelqf, gelqf_async};
pub use unglq::{unglq, unglq_async};

use crate::{
    runtime::Context,
    tile::{Layout, TileDesc, TileMatrix},
    ComplexField, IllegalArgument,
};

/// Allocates the block factors of the LQ factorization of a matrix with the descriptor `desc`.
///
/// The result holds one `ib × nb` tile per tile of the matrix, where `ib` is the inner block size
/// of `ctx`.
pub fn lq_factor_alloc<E: ComplexField>(
    ctx: &Context,
    desc: &TileDesc,
) -> Result<TileMatrix<E>, IllegalArgument> {
    let ib = ctx.inner_blocksize();
    let t = TileDesc::general(desc.mt() * ib, desc.nt() * desc.nb(), ib, desc.nb())?;
    Ok(TileMatrix::zeros(t))
}

/// Checks that `a` can be factorized and that `t` can hold its block factors, and returns the
/// inner block size.
fn check_lq_args<E>(a: &TileMatrix<E>, t: &TileMatrix<E>) -> Result<usize, IllegalArgument> {
    let (a, t) = (a.desc(), t.desc());
    if a.layout() != Layout::General {
        return Err(IllegalArgument::new("a"));
    }
    if a.mb() != a.nb() {
        return Err(IllegalArgument::new("nb"));
    }
    let ib = t.mb();
    if t.layout() != Layout::General
        || t.nb() != a.nb()
        || ib > a.nb()
        || t.m() < a.mt() * ib
        || t.n() < a.nt() * a.nb()
    {
        return Err(IllegalArgument::new("t"));
    }
    Ok(ib)
}
