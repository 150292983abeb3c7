use super::{check_factor, check_layout};
use crate::{
    linalg::householder::{
        apply_block_householder_on_the_left_in_place_req,
        apply_block_householder_on_the_right_in_place_req,
        apply_ts_block_householder_on_the_left_in_place,
        apply_ts_block_householder_on_the_right_in_place,
    },
    ComplexField, IllegalArgument, MatMut, MatRef, Side, Trans,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Computes the size and alignment of required workspace for [`tsmlq`], where `a1` has
/// dimensions `m1 × n1`.
pub fn tsmlq_req<E: ComplexField>(
    side: Side,
    m1: usize,
    n1: usize,
    ib: usize,
) -> Result<StackReq, SizeOverflow> {
    match side {
        Side::Left => apply_block_householder_on_the_left_in_place_req::<E>(n1, ib),
        Side::Right => apply_block_householder_on_the_right_in_place_req::<E>(m1, ib),
    }
}

/// Whether the blocks of reflectors are applied from first to last.
#[inline]
pub(crate) fn is_forward(side: Side, trans: Trans) -> bool {
    matches!(
        (side, trans),
        (Side::Left, Trans::NoTrans) | (Side::Right, Trans::ConjTrans)
    )
}

/// Returns the starting row of each block of `ib` reflectors out of `k`, in application order.
pub(crate) fn block_starts(k: usize, ib: usize, forward: bool) -> impl Iterator<Item = usize> {
    let nblocks = if k == 0 { 0 } else { (k - 1) / ib + 1 };
    (0..nblocks).map(move |b| if forward { b * ib } else { (nblocks - 1 - b) * ib })
}

/// Overwrites the pair of tiles with `op(Q)` applied from `side`, where `Q` is the unitary
/// factor computed by [`tslqt`](super::tslqt::tslqt), stored as the reflector tails `v` and the
/// block factors `t`.
///
/// - With [`Side::Right`], `[A1 A2]` is overwritten by `[A1 A2] * op(Q)`. `v` has `k` rows and as
///   many columns as `a2`, and only the first `k` columns of `a1` are modified.
/// - With [`Side::Left`], `[A1; A2]` is overwritten by `op(Q) * [A1; A2]`. `v` has `k` rows and as
///   many columns as `a2` has rows, and only the first `k` rows of `a1` are modified.
///
/// `op(Q)` is `Q` for [`Trans::NoTrans`] and `Qᴴ` for [`Trans::ConjTrans`].
///
/// # Errors
/// Returns an error without modifying anything if the dimensions are inconsistent or if one of
/// the matrices is not column-major with a sufficient leading dimension.
#[track_caller]
pub fn tsmlq<E: ComplexField>(
    side: Side,
    trans: Trans,
    ib: usize,
    mut a1: MatMut<'_, E>,
    mut a2: MatMut<'_, E>,
    v: MatRef<'_, E>,
    t: MatRef<'_, E>,
    mut stack: PodStack<'_>,
) -> Result<(), IllegalArgument> {
    let (m1, n1) = (a1.nrows(), a1.ncols());
    let (m2, n2) = (a2.nrows(), a2.ncols());
    let k = v.nrows();

    match side {
        Side::Right => {
            if m1 != m2 {
                return Err(IllegalArgument::new("m2"));
            }
            if n1 < k {
                return Err(IllegalArgument::new("k"));
            }
            if v.ncols() != n2 {
                return Err(IllegalArgument::new("v"));
            }
        }
        Side::Left => {
            if n1 != n2 {
                return Err(IllegalArgument::new("n2"));
            }
            if m1 < k {
                return Err(IllegalArgument::new("k"));
            }
            if v.ncols() != m2 {
                return Err(IllegalArgument::new("v"));
            }
        }
    }
    check_layout(a1.rb(), "lda1")?;
    check_layout(a2.rb(), "lda2")?;
    check_layout(v, "ldv")?;

    if m1 == 0 || n1 == 0 || m2 == 0 || n2 == 0 || k == 0 || ib == 0 {
        return Ok(());
    }
    check_factor(t, ib, k)?;

    for i in block_starts(k, ib, is_forward(side, trans)) {
        let kb = Ord::min(ib, k - i);
        let v = v.submatrix(i, 0, kb, v.ncols());
        let t = t.submatrix(0, i, kb, kb);
        match side {
            Side::Right => apply_ts_block_householder_on_the_right_in_place(
                v,
                t,
                trans,
                a1.rb_mut().submatrix_mut(0, i, m1, kb),
                a2.rb_mut(),
                stack.rb_mut(),
            ),
            Side::Left => apply_ts_block_householder_on_the_left_in_place(
                v,
                t,
                trans,
                a1.rb_mut().submatrix_mut(i, 0, kb, n1),
                a2.rb_mut(),
                stack.rb_mut(),
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_starts() {
        assert_eq!(block_starts(7, 3, true).collect::<Vec<_>>(), [0, 3, 6]);
        assert_eq!(block_starts(7, 3, false).collect::<Vec<_>>(), [6, 3, 0]);
        assert_eq!(block_starts(6, 3, false).collect::<Vec<_>>(), [3, 0]);
        assert_eq!(block_starts(0, 3, true).count(), 0);
        assert_eq!(block_starts(4, usize::MAX / 2, false).collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn test_direction() {
        assert!(is_forward(Side::Right, Trans::ConjTrans));
        assert!(is_forward(Side::Left, Trans::NoTrans));
        assert!(!is_forward(Side::Right, Trans::NoTrans));
        assert!(!is_forward(Side::Left, Trans::ConjTrans));
    }
}
