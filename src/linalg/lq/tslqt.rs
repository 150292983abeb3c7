use super::{
    check_factor, check_layout,
    tsmlq::{tsmlq, tsmlq_req},
};
use crate::{
    linalg::{
        blas::{
            axpy, conjugate_in_place, matvec, rank_one_update_conj,
            upper_triangular_matvec_in_place,
        },
        householder::make_householder_in_place,
        temp_mat_req, temp_mat_uninit,
    },
    ComplexField, Conj, IllegalArgument, MatMut, Side, Trans,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Computes the size and alignment of required workspace for [`tslqt`] on a pair of tiles with
/// `m` rows, with inner block size `ib`.
///
/// The workspace holds the `m` reflector factors, then the larger of the update vector and the
/// `m × ib` block used when updating the trailing rows.
pub fn tslqt_req<E: ComplexField>(m: usize, ib: usize) -> Result<StackReq, SizeOverflow> {
    StackReq::try_all_of([
        StackReq::try_new::<E>(m)?,
        StackReq::try_any_of([
            temp_mat_req::<E>(ib, 1)?,
            tsmlq_req::<E>(Side::Right, m, ib, ib)?,
        ])?,
    ])
}

/// Computes the LQ factorization of the pair `[A1 A2]`, where `A1` is an `m × m` lower triangular
/// tile and `A2` is an `m × n` tile: `[A1 A2] = [L 0] * Q`.
///
/// On exit, the lower triangle of `A1` holds `L`, `A2` holds the tails of the rowwise reflectors
/// (stored conjugated, as `vᴴ`), and the first `ib` rows of `t` hold the block factors, one
/// `ib × ib` upper triangular matrix every `ib` columns. The strictly upper part of `A1` is
/// neither read nor written. `A1` may have more than `m` columns, in which case only the first
/// `m` are used.
///
/// Returns immediately without touching anything if `m`, `n` or `ib` is zero.
///
/// # Errors
/// Returns an error without modifying anything if the row counts of `A1` and `A2` differ, if `A1`
/// has fewer than `m` columns, if `t` is too small, or if one of the matrices is not column-major
/// with a leading dimension at least `max(1, m)`.
#[track_caller]
pub fn tslqt<E: ComplexField>(
    ib: usize,
    mut a1: MatMut<'_, E>,
    mut a2: MatMut<'_, E>,
    mut t: MatMut<'_, E>,
    stack: PodStack<'_>,
) -> Result<(), IllegalArgument> {
    let m = a2.nrows();
    let n = a2.ncols();

    if a1.nrows() != m {
        return Err(IllegalArgument::new("m"));
    }
    if a1.ncols() < m {
        return Err(IllegalArgument::new("a1"));
    }
    check_layout(a1.rb(), "lda1")?;
    check_layout(a2.rb(), "lda2")?;

    if m == 0 || n == 0 || ib == 0 {
        return Ok(());
    }
    check_factor(t.rb(), ib, m)?;

    let one = E::faer_one();
    let (tau, mut stack) = stack.make_raw::<E>(m);

    let mut ii = 0;
    while ii < m {
        let sb = Ord::min(m - ii, ib);

        for i in 0..sb {
            let r = ii + i;

            // annihilate A2(r, :) with a reflector of length n + 1 over A1(r, r) ++ A2(r, :)
            if E::IS_COMPLEX {
                conjugate_in_place(a2.rb_mut().row_as_col_mut(r));
                a1.write(r, r, a1.read(r, r).faer_conj());
            }
            let mut head = a1.read(r, r);
            tau[r] = make_householder_in_place(&mut head, a2.rb_mut().row_as_col_mut(r));
            a1.write(r, r, head);
            let alpha = -tau[r];

            // delayed update of the remaining rows of the block
            let below = sb - i - 1;
            if below > 0 {
                let (a2_top, a2_bot) = a2.rb_mut().split_at_row_mut(r + 1);
                let v = a2_top.into_const().row_as_col(r);
                let a2_bot = a2_bot.submatrix_mut(0, 0, below, n);

                let (w, _) = temp_mat_uninit::<E>(below, 1, stack.rb_mut());
                let mut w = w.col_mut(0);
                w.copy_from(a1.rb().col(r).subrows(r + 1, below));
                matvec(w.rb_mut(), Some(one), a2_bot.rb(), Conj::No, v, one);
                axpy(alpha, w.rb(), a1.rb_mut().col_mut(r).subrows_mut(r + 1, below));
                rank_one_update_conj(a2_bot, alpha, w.rb(), v);
            }

            let (t_left, t_right) = t.rb_mut().split_at_col_mut(r);
            let mut t_col = t_right.col_mut(0).subrows_mut(0, i);
            matvec(
                t_col.rb_mut(),
                None,
                a2.rb().submatrix(ii, 0, i, n),
                Conj::No,
                a2.rb().row_as_col(r),
                alpha,
            );

            if E::IS_COMPLEX {
                conjugate_in_place(a2.rb_mut().row_as_col_mut(r));
                a1.write(r, r, a1.read(r, r).faer_conj());
            }

            upper_triangular_matvec_in_place(t_left.into_const().submatrix(0, ii, i, i), t_col);
            t.write(i, r, tau[r]);
        }

        if m > ii + sb {
            let rest = m - (ii + sb);
            let (v, a2_bot) = a2.rb_mut().split_at_row_mut(ii + sb);
            tsmlq(
                Side::Right,
                Trans::ConjTrans,
                ib,
                a1.rb_mut().submatrix_mut(ii + sb, ii, rest, sb),
                a2_bot,
                v.into_const().submatrix(ii, 0, sb, n),
                t.rb().submatrix(0, ii, sb, sb),
                stack.rb_mut(),
            )?;
        }

        ii += sb;
    }

    Ok(())
}
