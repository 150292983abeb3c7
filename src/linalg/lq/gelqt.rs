use super::{check_factor, check_layout};
use crate::{
    linalg::{
        blas::{conjugate_in_place, matvec, rank_one_update_conj, upper_triangular_matvec_in_place},
        householder::{
            apply_block_householder_on_the_right_in_place,
            apply_block_householder_on_the_right_in_place_req, make_householder_in_place,
        },
        temp_mat_req, temp_mat_uninit,
    },
    ComplexField, Conj, IllegalArgument, MatMut, Trans,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Computes the size and alignment of required workspace for [`gelqt`] on an `m × n` tile, with
/// inner block size `ib`.
pub fn gelqt_req<E: ComplexField>(
    m: usize,
    n: usize,
    ib: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([
        StackReq::try_new::<E>(Ord::min(m, n))?,
        StackReq::try_any_of([
            temp_mat_req::<E>(ib, 1)?,
            apply_block_householder_on_the_right_in_place_req::<E>(m, ib)?,
        ])?,
    ])
}

/// Computes the LQ factorization `A = L * Q` of an `m × n` tile, with `k = min(m, n)`
/// reflectors.
///
/// On exit, the elements on and below the diagonal of `A` hold the `m × k` lower trapezoidal
/// factor `L`, and the elements above the diagonal hold the reflectors, stored rowwise and
/// conjugated. The first `min(ib, k)` rows and `k` columns of `t` hold the block factors.
///
/// Returns immediately without touching anything if `m`, `n` or `ib` is zero.
///
/// # Errors
/// Returns an error without modifying anything if `t` is too small, or if `a` or `t` is not
/// column-major with a leading dimension no smaller than its row count.
#[track_caller]
pub fn gelqt<E: ComplexField>(
    ib: usize,
    mut a: MatMut<'_, E>,
    mut t: MatMut<'_, E>,
    stack: PodStack<'_>,
) -> Result<(), IllegalArgument> {
    let (m, n) = (a.nrows(), a.ncols());
    check_layout(a.rb(), "lda")?;

    if m == 0 || n == 0 || ib == 0 {
        return Ok(());
    }
    let k = Ord::min(m, n);
    check_factor(t.rb(), ib, k)?;

    let one = E::faer_one();
    let (tau, mut stack) = stack.make_raw::<E>(k);

    let mut ii = 0;
    while ii < k {
        let sb = Ord::min(k - ii, ib);

        for i in 0..sb {
            let r = ii + i;
            let len = n - r;

            if E::IS_COMPLEX {
                conjugate_in_place(a.rb_mut().row_as_col_mut(r).subrows_mut(r, len));
            }
            let mut beta = a.read(r, r);
            tau[r] = make_householder_in_place(
                &mut beta,
                a.rb_mut().row_as_col_mut(r).subrows_mut(r + 1, len - 1),
            );
            a.write(r, r, one);

            let below = sb - i - 1;
            if below > 0 {
                let (top, bot) = a.rb_mut().split_at_row_mut(r + 1);
                let v = top.into_const().row_as_col(r).subrows(r, len);
                let c = bot.submatrix_mut(0, r, below, len);

                let (w, _) = temp_mat_uninit::<E>(below, 1, stack.rb_mut());
                let mut w = w.col_mut(0);
                matvec(w.rb_mut(), None, c.rb(), Conj::No, v, one);
                rank_one_update_conj(c, -tau[r], w.rb(), v);
            }

            let (t_left, t_right) = t.rb_mut().split_at_col_mut(r);
            let mut t_col = t_right.col_mut(0).subrows_mut(0, i);
            matvec(
                t_col.rb_mut(),
                None,
                a.rb().submatrix(ii, r, i, len),
                Conj::No,
                a.rb().row_as_col(r).subrows(r, len),
                -tau[r],
            );

            a.write(r, r, beta);
            if E::IS_COMPLEX {
                conjugate_in_place(a.rb_mut().row_as_col_mut(r).subrows_mut(r + 1, len - 1));
            }

            upper_triangular_matvec_in_place(t_left.into_const().submatrix(0, ii, i, i), t_col);
            t.write(i, r, tau[r]);
        }

        if m > ii + sb {
            let (v, c) = a.rb_mut().split_at_row_mut(ii + sb);
            apply_block_householder_on_the_right_in_place(
                v.into_const().submatrix(ii, ii, sb, n - ii),
                t.rb().submatrix(0, ii, sb, sb),
                Trans::ConjTrans,
                c.submatrix_mut(0, ii, m - ii - sb, n - ii),
                stack.rb_mut(),
            );
        }

        ii += sb;
    }

    Ok(())
}
