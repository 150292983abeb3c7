//! Householder reflectors and block Householder transformations.
//!
//! A Householder reflection is a linear transformation that describes a reflection about a
//! hyperplane that crosses the origin of the space. The reflectors in this module follow the
//! LAPACK convention
//! $$H = I - \tau v v^H,$$
//! where $v_0 = 1$ and $\tau$ is complex in general, so that $H$ is unitary but not necessarily
//! Hermitian.
//!
//! A block Householder transformation is the product $H_0 H_1 \dots H_{k-1}$ of $k$ reflectors
//! whose vectors are stored *rowwise*: row $i$ of the $k \times n$ matrix $V$ holds $v_i^H$, with
//! an implicit one at column $i$ and zeros before it. There exists a unique upper triangular
//! matrix $T$, that we call the Householder factor, such that
//! $$H_0 \times \dots \times H_{k-1} = I - V^H T V.$$
//!
//! The LQ kernels store $Q = (H_0 \dots H_{k-1})^H$. Applying $Q$ from the right therefore uses
//! $T^H$, and applying $Q^H$ uses $T$.
//!
//! Two storage shapes of $V$ are supported:
//! - the general shape, where $V = [V_1\ V_2]$ with $V_1$ unit upper triangular (its diagonal and
//!   strictly lower part are never read),
//! - the triangle-on-square shape produced by [`tslqt`](crate::linalg::lq::tslqt), where $V_1$ is
//!   the identity and only $V_2$ is stored.

use crate::{
    assert,
    linalg::{
        blas::{
            hypot3, matmul_with_conj, norm_l2, scale, sub_assign, triangular_upper_mul_left,
            triangular_upper_mul_right,
        },
        temp_mat_req, temp_mat_uninit,
    },
    ColMut, ComplexField, Conj, Diag, MatMut, MatRef, RealField, Trans,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use num_traits::Float;
use reborrow::*;

/// Generates an elementary reflector $H$ such that $H^H \begin{bmatrix}\alpha \\ x\end{bmatrix} =
/// \begin{bmatrix}\beta \\ 0\end{bmatrix}$, with $\beta$ real (`larfg`).
///
/// On entry, `head` holds $\alpha$ and `tail` holds $x$. On exit, `head` holds $\beta$ and `tail`
/// holds the essential part of $v$. The factor $\tau$ is returned. When $x = 0$ and $\alpha$ is
/// real, $\tau = 0$ and $H$ is the identity.
pub fn make_householder_in_place<E: ComplexField>(head: &mut E, mut tail: ColMut<'_, E>) -> E {
    let zero = <E::Real as ComplexField>::faer_zero();
    let one = <E::Real as ComplexField>::faer_one();

    let mut tail_norm = norm_l2(tail.rb());
    let mut alpha_re = head.faer_real();
    let mut alpha_im = head.faer_imag();

    if tail_norm == zero && alpha_im == zero {
        return E::faer_zero();
    }

    let signed = |value: E::Real, sign: E::Real| {
        if sign >= zero {
            Float::abs(value)
        } else {
            -Float::abs(value)
        }
    };

    let mut beta = -signed(hypot3(alpha_re, alpha_im, tail_norm), alpha_re);
    let safe_min =
        <E::Real as RealField>::faer_min_positive() / <E::Real as RealField>::faer_epsilon();
    let safe_min_inv = one / safe_min;

    // beta may be denormalized, in which case the tail is rescaled and beta recomputed
    let mut rescale_count = 0usize;
    if Float::abs(beta) < safe_min {
        loop {
            rescale_count += 1;
            scale(tail.rb_mut(), E::faer_from_real(safe_min_inv));
            beta = beta * safe_min_inv;
            alpha_re = alpha_re * safe_min_inv;
            alpha_im = alpha_im * safe_min_inv;
            if !(Float::abs(beta) < safe_min && rescale_count < 20) {
                break;
            }
        }
        tail_norm = norm_l2(tail.rb());
        beta = -signed(hypot3(alpha_re, alpha_im, tail_norm), alpha_re);
    }

    let tau = E::faer_from_parts((beta - alpha_re) / beta, -alpha_im / beta);
    let alpha = E::faer_from_parts(alpha_re, alpha_im);
    scale(tail, (alpha - E::faer_from_real(beta)).faer_inv());

    for _ in 0..rescale_count {
        beta = beta * safe_min;
    }
    *head = E::faer_from_real(beta);

    tau
}

/// Computes the size and alignment of required workspace for applying a block Householder
/// transformation with `blocksize` reflectors to a matrix with `lhs_nrows` rows, from the right.
pub fn apply_block_householder_on_the_right_in_place_req<E: ComplexField>(
    lhs_nrows: usize,
    blocksize: usize,
) -> Result<StackReq, SizeOverflow> {
    temp_mat_req::<E>(lhs_nrows, blocksize)
}

/// Computes the size and alignment of required workspace for applying a block Householder
/// transformation with `blocksize` reflectors to a matrix with `rhs_ncols` columns, from the
/// left.
pub fn apply_block_householder_on_the_left_in_place_req<E: ComplexField>(
    rhs_ncols: usize,
    blocksize: usize,
) -> Result<StackReq, SizeOverflow> {
    temp_mat_req::<E>(blocksize, rhs_ncols)
}

#[inline(always)]
fn factor_trans(trans: Trans) -> Trans {
    // Q uses the adjoint of the factor, and Qᴴ uses the factor itself
    trans.flip()
}

/// Computes `C = C * op(Q)`, where `Q` is represented by the general shaped rowwise basis `v` and
/// the factor `t`, and `op(Q)` is `Q` for [`Trans::NoTrans`] and `Qᴴ` for [`Trans::ConjTrans`].
#[track_caller]
pub fn apply_block_householder_on_the_right_in_place<E: ComplexField>(
    v: MatRef<'_, E>,
    t: MatRef<'_, E>,
    trans: Trans,
    c: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let k = v.nrows();
    assert!(all(
        k <= v.ncols(),
        c.ncols() == v.ncols(),
        t.nrows() == k,
        t.ncols() == k,
    ));

    let one = E::faer_one();
    let (v1, v2) = v.split_at_col(k);
    let (c1, mut c2) = c.split_at_col_mut(k);

    let (mut w, _) = temp_mat_uninit::<E>(c1.nrows(), k, stack);
    w.copy_from(c1.rb());
    triangular_upper_mul_right(w.rb_mut(), v1, Trans::ConjTrans, Diag::Unit);
    matmul_with_conj(
        w.rb_mut(),
        c2.rb(),
        Conj::No,
        v2.transpose(),
        Conj::Yes,
        Some(one),
        one,
    );
    triangular_upper_mul_right(w.rb_mut(), t, factor_trans(trans), Diag::NonUnit);
    matmul_with_conj(
        c2.rb_mut(),
        w.rb(),
        Conj::No,
        v2,
        Conj::No,
        Some(one),
        -one,
    );
    triangular_upper_mul_right(w.rb_mut(), v1, Trans::NoTrans, Diag::Unit);
    sub_assign(c1, w.rb());
}

/// Computes `C = op(Q) * C`, where `Q` is represented by the general shaped rowwise basis `v` and
/// the factor `t`, and `op(Q)` is `Q` for [`Trans::NoTrans`] and `Qᴴ` for [`Trans::ConjTrans`].
#[track_caller]
pub fn apply_block_householder_on_the_left_in_place<E: ComplexField>(
    v: MatRef<'_, E>,
    t: MatRef<'_, E>,
    trans: Trans,
    c: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let k = v.nrows();
    assert!(all(
        k <= v.ncols(),
        c.nrows() == v.ncols(),
        t.nrows() == k,
        t.ncols() == k,
    ));

    let one = E::faer_one();
    let (v1, v2) = v.split_at_col(k);
    let (c1, mut c2) = c.split_at_row_mut(k);

    let (mut w, _) = temp_mat_uninit::<E>(k, c1.ncols(), stack);
    w.copy_from(c1.rb());
    triangular_upper_mul_left(v1, Trans::NoTrans, Diag::Unit, w.rb_mut());
    matmul_with_conj(w.rb_mut(), v2, Conj::No, c2.rb(), Conj::No, Some(one), one);
    triangular_upper_mul_left(t, factor_trans(trans), Diag::NonUnit, w.rb_mut());
    matmul_with_conj(
        c2.rb_mut(),
        v2.transpose(),
        Conj::Yes,
        w.rb(),
        Conj::No,
        Some(one),
        -one,
    );
    triangular_upper_mul_left(v1, Trans::ConjTrans, Diag::Unit, w.rb_mut());
    sub_assign(c1, w.rb());
}

/// Computes `[C1 C2] = [C1 C2] * op(Q)`, where `Q` is represented by the triangle-on-square basis
/// `[I v2]` and the factor `t`.
#[track_caller]
pub fn apply_ts_block_householder_on_the_right_in_place<E: ComplexField>(
    v2: MatRef<'_, E>,
    t: MatRef<'_, E>,
    trans: Trans,
    mut c1: MatMut<'_, E>,
    mut c2: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let k = v2.nrows();
    assert!(all(
        c1.ncols() == k,
        c2.ncols() == v2.ncols(),
        c1.nrows() == c2.nrows(),
        t.nrows() == k,
        t.ncols() == k,
    ));

    let one = E::faer_one();
    let (mut w, _) = temp_mat_uninit::<E>(c1.nrows(), k, stack);
    w.copy_from(c1.rb());
    matmul_with_conj(
        w.rb_mut(),
        c2.rb(),
        Conj::No,
        v2.transpose(),
        Conj::Yes,
        Some(one),
        one,
    );
    triangular_upper_mul_right(w.rb_mut(), t, factor_trans(trans), Diag::NonUnit);
    sub_assign(c1.rb_mut(), w.rb());
    matmul_with_conj(
        c2.rb_mut(),
        w.rb(),
        Conj::No,
        v2,
        Conj::No,
        Some(one),
        -one,
    );
}

/// Computes `[C1; C2] = op(Q) * [C1; C2]`, where `Q` is represented by the triangle-on-square
/// basis `[I v2]` and the factor `t`.
#[track_caller]
pub fn apply_ts_block_householder_on_the_left_in_place<E: ComplexField>(
    v2: MatRef<'_, E>,
    t: MatRef<'_, E>,
    trans: Trans,
    mut c1: MatMut<'_, E>,
    mut c2: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let k = v2.nrows();
    assert!(all(
        c1.nrows() == k,
        c2.nrows() == v2.ncols(),
        c1.ncols() == c2.ncols(),
        t.nrows() == k,
        t.ncols() == k,
    ));

    let one = E::faer_one();
    let (mut w, _) = temp_mat_uninit::<E>(k, c1.ncols(), stack);
    w.copy_from(c1.rb());
    matmul_with_conj(w.rb_mut(), v2, Conj::No, c2.rb(), Conj::No, Some(one), one);
    triangular_upper_mul_left(t, factor_trans(trans), Diag::NonUnit, w.rb_mut());
    sub_assign(c1.rb_mut(), w.rb());
    matmul_with_conj(
        c2.rb_mut(),
        v2.transpose(),
        Conj::Yes,
        w.rb(),
        Conj::No,
        Some(one),
        -one,
    );
}
