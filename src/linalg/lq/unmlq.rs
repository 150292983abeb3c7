use super::{
    check_factor, check_layout,
    tsmlq::{block_starts, is_forward},
};
use crate::{
    linalg::householder::{
        apply_block_householder_on_the_left_in_place,
        apply_block_householder_on_the_left_in_place_req,
        apply_block_householder_on_the_right_in_place,
        apply_block_householder_on_the_right_in_place_req,
    },
    ComplexField, IllegalArgument, MatMut, MatRef, Side, Trans,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Computes the size and alignment of required workspace for [`unmlq`] on an `m × n` matrix `C`.
pub fn unmlq_req<E: ComplexField>(
    side: Side,
    m: usize,
    n: usize,
    ib: usize,
) -> Result<StackReq, SizeOverflow> {
    match side {
        Side::Left => apply_block_householder_on_the_left_in_place_req::<E>(n, ib),
        Side::Right => apply_block_householder_on_the_right_in_place_req::<E>(m, ib),
    }
}

/// Overwrites `C` with `op(Q) * C` ([`Side::Left`]) or `C * op(Q)` ([`Side::Right`]), where `Q`
/// is the unitary factor computed by [`gelqt`](super::gelqt::gelqt).
///
/// `a` holds the `k` reflectors rowwise, in its elements above the diagonal, and has as many
/// columns as `C` has rows (left) or columns (right). `t` holds the block factors. `op(Q)` is `Q`
/// for [`Trans::NoTrans`] and `Qᴴ` for [`Trans::ConjTrans`].
///
/// # Errors
/// Returns an error without modifying anything if the dimensions are inconsistent or if one of
/// the matrices is not column-major with a sufficient leading dimension.
#[track_caller]
pub fn unmlq<E: ComplexField>(
    side: Side,
    trans: Trans,
    ib: usize,
    a: MatRef<'_, E>,
    t: MatRef<'_, E>,
    mut c: MatMut<'_, E>,
    mut stack: PodStack<'_>,
) -> Result<(), IllegalArgument> {
    let (m, n) = (c.nrows(), c.ncols());
    let k = a.nrows();
    let nq = match side {
        Side::Left => m,
        Side::Right => n,
    };

    if a.ncols() != nq {
        return Err(IllegalArgument::new("a"));
    }
    if k > nq {
        return Err(IllegalArgument::new("k"));
    }
    check_layout(a, "lda")?;
    check_layout(c.rb(), "ldc")?;

    if m == 0 || n == 0 || k == 0 || ib == 0 {
        return Ok(());
    }
    check_factor(t, ib, k)?;

    for i in block_starts(k, ib, is_forward(side, trans)) {
        let kb = Ord::min(ib, k - i);
        let v = a.submatrix(i, i, kb, nq - i);
        let t = t.submatrix(0, i, kb, kb);
        match side {
            Side::Left => apply_block_householder_on_the_left_in_place(
                v,
                t,
                trans,
                c.rb_mut().submatrix_mut(i, 0, m - i, n),
                stack.rb_mut(),
            ),
            Side::Right => apply_block_householder_on_the_right_in_place(
                v,
                t,
                trans,
                c.rb_mut().submatrix_mut(0, i, m, n - i),
                stack.rb_mut(),
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{c64, testing::{max_abs_diff, random_mat, tolerance}, Mat};
    use dyn_stack::GlobalPodBuffer;
    use rand::prelude::*;

    #[test]
    fn test_unmlq_dimension_mismatch() {
        let rng = &mut StdRng::seed_from_u64(0);
        let a = random_mat::<c64>(rng, 3, 5);
        let t = Mat::<c64>::zeros(2, 3);
        let mut c = random_mat::<c64>(rng, 4, 4);
        let c_orig = c.clone();
        let mut mem = GlobalPodBuffer::new(unmlq_req::<c64>(Side::Right, 4, 4, 2).unwrap());

        let err = unmlq(
            Side::Right,
            Trans::NoTrans,
            2,
            a.as_ref(),
            t.as_ref(),
            c.as_mut(),
            PodStack::new(&mut mem),
        )
        .unwrap_err();
        assert_eq!(err.arg, "a");
        assert_eq!(c.as_slice(), c_orig.as_slice());
    }

    #[test]
    fn test_unmlq_round_trip() {
        let rng = &mut StdRng::seed_from_u64(1);
        let (m, n, ib) = (5, 7, 2);
        let mut a = random_mat::<c64>(rng, m, n);
        let mut t = Mat::<c64>::zeros(ib, m);
        let mut mem = GlobalPodBuffer::new(
            StackReq::try_any_of([
                super::super::gelqt::gelqt_req::<c64>(m, n, ib).unwrap(),
                unmlq_req::<c64>(Side::Left, n, 3, ib).unwrap(),
            ])
            .unwrap(),
        );
        super::super::gelqt::gelqt(ib, a.as_mut(), t.as_mut(), PodStack::new(&mut mem)).unwrap();

        // Qᴴ * (Q * C) == C
        let c_orig = random_mat::<c64>(rng, n, 3);
        let mut c = c_orig.clone();
        for trans in [Trans::NoTrans, Trans::ConjTrans] {
            unmlq(
                Side::Left,
                trans,
                ib,
                a.as_ref(),
                t.as_ref(),
                c.as_mut(),
                PodStack::new(&mut mem),
            )
            .unwrap();
        }
        assert!(max_abs_diff(c.as_ref(), c_orig.as_ref()) < tolerance::<c64>(n));
    }
}
