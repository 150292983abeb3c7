//! Level 1 and level 2 primitives over strided views, plus the small set of level 3 products used
//! by the block reflector routines. General products go through `nano-gemm` or `gemm`, and the
//! level 2 and triangular routines are expressed in terms of them.
//!
//! The naming follows the rest of the crate rather than the BLAS: the BLAS name of each routine
//! is given in its documentation. When a routine takes `alpha: Option<E>` and `beta: E`, the
//! destination is first scaled by `alpha` (or overwritten when `alpha` is `None`), then the
//! product scaled by `beta` is accumulated into it.

use crate::{
    assert, c32, c64, ColMut, ColRef, ComplexField, Conj, Diag, MatMut, MatRef, RealField, Trans,
};
use core::any::TypeId;
use num_traits::Float;
use reborrow::*;

/// Copies `src` into `dst` (`copy`).
#[track_caller]
pub fn copy<E: ComplexField>(mut dst: ColMut<'_, E>, src: ColRef<'_, E>) {
    dst.copy_from(src);
}

/// Computes `y += alpha * x` (`axpy`).
#[track_caller]
pub fn axpy<E: ComplexField>(alpha: E, x: ColRef<'_, E>, mut y: ColMut<'_, E>) {
    assert!(x.nrows() == y.nrows());
    for i in 0..x.nrows() {
        y.write(i, y.read(i) + alpha * x.read(i));
    }
}

/// Computes `x *= factor` (`scal`).
pub fn scale<E: ComplexField>(mut x: ColMut<'_, E>, factor: E) {
    for i in 0..x.nrows() {
        x.write(i, factor * x.read(i));
    }
}

/// Conjugates every element of `x` (`lacgv`).
///
/// Callers guard this with [`ComplexField::IS_COMPLEX`], so real instantiations never run it.
pub fn conjugate_in_place<E: ComplexField>(mut x: ColMut<'_, E>) {
    for i in 0..x.nrows() {
        x.write(i, x.read(i).faer_conj());
    }
}

/// Returns the euclidean norm of `x` (`nrm2`), accumulated with scaling so that intermediate
/// squares neither overflow nor underflow.
pub fn norm_l2<E: ComplexField>(x: ColRef<'_, E>) -> E::Real {
    let zero = <E::Real as ComplexField>::faer_zero();
    let one = <E::Real as ComplexField>::faer_one();

    let mut scale = zero;
    let mut ssq = one;

    let mut accumulate = |value: E::Real| {
        if value != zero {
            let abs = Float::abs(value);
            if scale < abs {
                let ratio = scale / abs;
                ssq = one + ssq * ratio * ratio;
                scale = abs;
            } else {
                let ratio = abs / scale;
                ssq = ssq + ratio * ratio;
            }
        }
    };

    for i in 0..x.nrows() {
        let value = x.read(i);
        accumulate(value.faer_real());
        if E::IS_COMPLEX {
            accumulate(value.faer_imag());
        }
    }

    scale * Float::sqrt(ssq)
}

/// Returns `sqrt(x² + y² + z²)` without unnecessary overflow (`lapy3`).
pub fn hypot3<T: RealField>(x: T, y: T, z: T) -> T {
    let (x, y, z) = (Float::abs(x), Float::abs(y), Float::abs(z));
    let w = Float::max(Float::max(x, y), z);
    if w == T::faer_zero() {
        // also covers the case where one of the values is NaN
        x + y + z
    } else {
        let (x, y, z) = (x / w, y / w, z / w);
        w * Float::sqrt(x * x + y * y + z * z)
    }
}

/// Computes `dst = alpha * dst + beta * op(lhs) * rhs` (`gemv`), where `op(lhs)` is `lhs`
/// conjugated if `conj_lhs == Conj::Yes`.
#[track_caller]
pub fn matvec<E: ComplexField>(
    dst: ColMut<'_, E>,
    alpha: Option<E>,
    lhs: MatRef<'_, E>,
    conj_lhs: Conj,
    rhs: ColRef<'_, E>,
    beta: E,
) {
    matmul_with_conj(
        dst.as_2d_mut(),
        lhs,
        conj_lhs,
        rhs.as_2d(),
        Conj::No,
        alpha,
        beta,
    );
}

/// Computes `dst += alpha * x * yᴴ` (`gerc`).
#[track_caller]
pub fn rank_one_update_conj<E: ComplexField>(
    dst: MatMut<'_, E>,
    alpha: E,
    x: ColRef<'_, E>,
    y: ColRef<'_, E>,
) {
    matmul_with_conj(
        dst,
        x.as_2d(),
        Conj::No,
        y.as_2d().transpose(),
        Conj::Yes,
        Some(E::faer_one()),
        alpha,
    );
}

const NANO_GEMM_THRESHOLD: usize = 32 * 32 * 32;

/// Runs the product with `nano-gemm` if `E` is one of the native scalar types, and returns
/// whether it did.
///
/// # Safety
/// The pointers and strides must describe valid `m × n`, `m × k` and `k × n` matrices, and `dst`
/// must not alias `lhs` or `rhs`.
#[inline]
unsafe fn nano_gemm_dispatch<E: ComplexField>(
    m: usize,
    n: usize,
    k: usize,
    dst: (*mut E, isize, isize),
    lhs: (*const E, isize, isize),
    rhs: (*const E, isize, isize),
    alpha: E,
    beta: E,
    conj_lhs: bool,
    conj_rhs: bool,
) -> bool {
    macro_rules! nano_gemm_call {
        ($ty: ty, $nano_ty: ty, $execute: ident) => {
            if TypeId::of::<E>() == TypeId::of::<$ty>() {
                nano_gemm::planless::$execute(
                    m,
                    n,
                    k,
                    dst.0 as *mut $nano_ty,
                    dst.1,
                    dst.2,
                    lhs.0 as *const $nano_ty,
                    lhs.1,
                    lhs.2,
                    rhs.0 as *const $nano_ty,
                    rhs.1,
                    rhs.2,
                    core::mem::transmute_copy::<E, $nano_ty>(&alpha),
                    core::mem::transmute_copy::<E, $nano_ty>(&beta),
                    conj_lhs,
                    conj_rhs,
                );
                return true;
            }
        };
    }

    nano_gemm_call!(f32, f32, execute_f32);
    nano_gemm_call!(f64, f64, execute_f64);
    nano_gemm_call!(c32, nano_gemm::c32, execute_c32);
    nano_gemm_call!(c64, nano_gemm::c64, execute_c64);
    false
}

/// Computes `dst = alpha * dst + beta * op(lhs) * op(rhs)` (`gemm`), where each `op` optionally
/// conjugates its operand.
///
/// Transposed operands are expressed by passing transposed views. Small products are dispatched
/// to `nano-gemm`, the others to `gemm`. Tile kernels run inside scheduler tasks, so the product
/// itself is sequential.
#[track_caller]
pub fn matmul_with_conj<E: ComplexField>(
    mut dst: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    conj_lhs: Conj,
    rhs: MatRef<'_, E>,
    conj_rhs: Conj,
    alpha: Option<E>,
    beta: E,
) {
    assert!(all(
        dst.nrows() == lhs.nrows(),
        dst.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));
    let (m, n, k) = (dst.nrows(), dst.ncols(), lhs.ncols());
    if m == 0 || n == 0 {
        return;
    }
    if alpha.is_none() {
        // the destination may be uninitialized workspace
        dst.fill_zero();
    }
    if k == 0 {
        if let Some(alpha) = alpha {
            for j in 0..n {
                for i in 0..m {
                    dst.write(i, j, alpha * dst.read(i, j));
                }
            }
        }
        return;
    }

    let (dst_rs, dst_cs) = (dst.row_stride(), dst.col_stride());
    let dst_ptr = dst.rb_mut().as_ptr_mut();
    let (conj_lhs, conj_rhs) = (conj_lhs == Conj::Yes, conj_rhs == Conj::Yes);
    let alpha = alpha.unwrap_or(E::faer_zero());

    if m.saturating_mul(n).saturating_mul(k) <= NANO_GEMM_THRESHOLD {
        // SAFETY: the views are valid for their dimensions, and `dst` is borrowed mutably.
        let done = unsafe {
            nano_gemm_dispatch(
                m,
                n,
                k,
                (dst_ptr, dst_rs, dst_cs),
                (lhs.as_ptr(), lhs.row_stride(), lhs.col_stride()),
                (rhs.as_ptr(), rhs.row_stride(), rhs.col_stride()),
                alpha,
                beta,
                conj_lhs,
                conj_rhs,
            )
        };
        if done {
            return;
        }
    }

    // SAFETY: the views are valid for their dimensions, and `dst` is borrowed mutably.
    unsafe {
        gemm::gemm(
            m,
            n,
            k,
            dst_ptr,
            dst_cs,
            dst_rs,
            true,
            lhs.as_ptr(),
            lhs.col_stride(),
            lhs.row_stride(),
            rhs.as_ptr(),
            rhs.col_stride(),
            rhs.row_stride(),
            alpha,
            beta,
            false,
            conj_lhs,
            conj_rhs,
            gemm::Parallelism::None,
        )
    };
}

/// Computes `dst -= src`.
#[track_caller]
pub fn sub_assign<E: ComplexField>(mut dst: MatMut<'_, E>, src: MatRef<'_, E>) {
    assert!(all(dst.nrows() == src.nrows(), dst.ncols() == src.ncols()));
    for j in 0..dst.ncols() {
        for i in 0..dst.nrows() {
            dst.write(i, j, dst.read(i, j) - src.read(i, j));
        }
    }
}

#[inline(always)]
fn upper_entry<E: ComplexField>(t: MatRef<'_, E>, diag: Diag, i: usize, j: usize) -> E {
    if i == j && diag == Diag::Unit {
        E::faer_one()
    } else {
        t.read(i, j)
    }
}

/// Below this order, triangular products are computed directly instead of being split.
const TRIANGULAR_BLOCKSIZE: usize = 16;

/// Computes `x = T * x` in place, where `T` is upper triangular (`trmv` with `Upper`, `NoTrans`,
/// `NonUnit`).
///
/// Only the upper triangle of `t` is read.
#[track_caller]
pub fn upper_triangular_matvec_in_place<E: ComplexField>(t: MatRef<'_, E>, x: ColMut<'_, E>) {
    triangular_upper_mul_left(t, Trans::NoTrans, Diag::NonUnit, x.as_2d_mut());
}

fn triangular_upper_mul_right_unblocked<E: ComplexField>(
    mut w: MatMut<'_, E>,
    t: MatRef<'_, E>,
    trans: Trans,
    diag: Diag,
) {
    let k = w.ncols();
    match trans {
        Trans::NoTrans => {
            // column j of the result depends on the columns l <= j of w
            for j in (0..k).rev() {
                for i in 0..w.nrows() {
                    let mut acc = E::faer_zero();
                    for l in 0..=j {
                        acc = acc + w.read(i, l) * upper_entry(t, diag, l, j);
                    }
                    w.write(i, j, acc);
                }
            }
        }
        Trans::ConjTrans => {
            // column j of the result depends on the columns l >= j of w
            for j in 0..k {
                for i in 0..w.nrows() {
                    let mut acc = E::faer_zero();
                    for l in j..k {
                        acc = acc + w.read(i, l) * upper_entry(t, diag, j, l).faer_conj();
                    }
                    w.write(i, j, acc);
                }
            }
        }
    }
}

/// Computes `w = w * op(T)` in place, where `T` is upper triangular and `op` is the identity or
/// the conjugate transpose (`trmm` with `Right`, `Upper`).
///
/// Only the upper triangle of `t` is read. The diagonal is not read when `diag == Diag::Unit`.
#[track_caller]
pub fn triangular_upper_mul_right<E: ComplexField>(
    w: MatMut<'_, E>,
    t: MatRef<'_, E>,
    trans: Trans,
    diag: Diag,
) {
    let k = w.ncols();
    assert!(all(t.nrows() == k, t.ncols() == k));
    if k <= TRIANGULAR_BLOCKSIZE {
        return triangular_upper_mul_right_unblocked(w, t, trans, diag);
    }

    let bs = k / 2;
    let one = E::faer_one();
    let t11 = t.submatrix(0, 0, bs, bs);
    let t12 = t.submatrix(0, bs, bs, k - bs);
    let t22 = t.submatrix(bs, bs, k - bs, k - bs);
    let (mut w1, mut w2) = w.split_at_col_mut(bs);

    match trans {
        Trans::NoTrans => {
            // [w1 w2] * [t11 t12; 0 t22] = [w1 t11, w1 t12 + w2 t22]
            triangular_upper_mul_right(w2.rb_mut(), t22, trans, diag);
            matmul_with_conj(w2, w1.rb(), Conj::No, t12, Conj::No, Some(one), one);
            triangular_upper_mul_right(w1, t11, trans, diag);
        }
        Trans::ConjTrans => {
            // [w1 w2] * [t11ᴴ 0; t12ᴴ t22ᴴ] = [w1 t11ᴴ + w2 t12ᴴ, w2 t22ᴴ]
            triangular_upper_mul_right(w1.rb_mut(), t11, trans, diag);
            matmul_with_conj(
                w1,
                w2.rb(),
                Conj::No,
                t12.transpose(),
                Conj::Yes,
                Some(one),
                one,
            );
            triangular_upper_mul_right(w2, t22, trans, diag);
        }
    }
}

fn triangular_upper_mul_left_unblocked<E: ComplexField>(
    t: MatRef<'_, E>,
    trans: Trans,
    diag: Diag,
    mut w: MatMut<'_, E>,
) {
    let k = w.nrows();
    match trans {
        Trans::NoTrans => {
            for i in 0..k {
                for j in 0..w.ncols() {
                    let mut acc = E::faer_zero();
                    for l in i..k {
                        acc = acc + upper_entry(t, diag, i, l) * w.read(l, j);
                    }
                    w.write(i, j, acc);
                }
            }
        }
        Trans::ConjTrans => {
            for i in (0..k).rev() {
                for j in 0..w.ncols() {
                    let mut acc = E::faer_zero();
                    for l in 0..=i {
                        acc = acc + upper_entry(t, diag, l, i).faer_conj() * w.read(l, j);
                    }
                    w.write(i, j, acc);
                }
            }
        }
    }
}

/// Computes `w = op(T) * w` in place, where `T` is upper triangular and `op` is the identity or
/// the conjugate transpose (`trmm` with `Left`, `Upper`).
///
/// Only the upper triangle of `t` is read. The diagonal is not read when `diag == Diag::Unit`.
#[track_caller]
pub fn triangular_upper_mul_left<E: ComplexField>(
    t: MatRef<'_, E>,
    trans: Trans,
    diag: Diag,
    w: MatMut<'_, E>,
) {
    let k = w.nrows();
    assert!(all(t.nrows() == k, t.ncols() == k));
    if k <= TRIANGULAR_BLOCKSIZE {
        return triangular_upper_mul_left_unblocked(t, trans, diag, w);
    }

    let bs = k / 2;
    let one = E::faer_one();
    let t11 = t.submatrix(0, 0, bs, bs);
    let t12 = t.submatrix(0, bs, bs, k - bs);
    let t22 = t.submatrix(bs, bs, k - bs, k - bs);
    let (mut w1, mut w2) = w.split_at_row_mut(bs);

    match trans {
        Trans::NoTrans => {
            // [t11 t12; 0 t22] * [w1; w2] = [t11 w1 + t12 w2; t22 w2]
            triangular_upper_mul_left(t11, trans, diag, w1.rb_mut());
            matmul_with_conj(w1, t12, Conj::No, w2.rb(), Conj::No, Some(one), one);
            triangular_upper_mul_left(t22, trans, diag, w2);
        }
        Trans::ConjTrans => {
            // [t11ᴴ 0; t12ᴴ t22ᴴ] * [w1; w2] = [t11ᴴ w1; t12ᴴ w1 + t22ᴴ w2]
            triangular_upper_mul_left(t22, trans, diag, w2.rb_mut());
            matmul_with_conj(
                w2,
                t12.transpose(),
                Conj::Yes,
                w1.rb(),
                Conj::No,
                Some(one),
                one,
            );
            triangular_upper_mul_left(t11, trans, diag, w1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert, c64, col,
        testing::{max_abs_diff, random, random_mat, tolerance},
        Mat,
    };
    use assert_approx_eq::assert_approx_eq;
    use rand::prelude::*;

    fn naive_matmul<E: ComplexField>(
        dst: MatRef<'_, E>,
        lhs: MatRef<'_, E>,
        conj_lhs: Conj,
        rhs: MatRef<'_, E>,
        conj_rhs: Conj,
        alpha: Option<E>,
        beta: E,
    ) -> Mat<E> {
        Mat::from_fn(dst.nrows(), dst.ncols(), |i, j| {
            let mut acc = E::faer_zero();
            for k in 0..lhs.ncols() {
                acc = acc + conj_lhs.apply(lhs.read(i, k)) * conj_rhs.apply(rhs.read(k, j));
            }
            match alpha {
                Some(alpha) => alpha * dst.read(i, j) + beta * acc,
                None => beta * acc,
            }
        })
    }

    fn dense_upper(t: MatRef<'_, c64>, diag: Diag) -> Mat<c64> {
        Mat::from_fn(t.nrows(), t.ncols(), |i, j| {
            if i > j {
                c64::faer_zero()
            } else {
                upper_entry(t, diag, i, j)
            }
        })
    }

    #[test]
    fn test_norm_l2() {
        let data = [c64::new(3.0, 4.0), c64::new(0.0, 12.0)];
        assert_approx_eq!(norm_l2(col::from_slice(&data)), 13.0);

        let tiny = [1e-300f64, 1e-300];
        assert_approx_eq!(norm_l2(col::from_slice(&tiny)) / 1e-300, 2.0f64.sqrt());

        let huge = [1e300f64, 1e300];
        assert_approx_eq!(norm_l2(col::from_slice(&huge)) / 1e300, 2.0f64.sqrt());

        let empty: [f64; 0] = [];
        assert_eq!(norm_l2(col::from_slice(&empty)), 0.0);
    }

    #[test]
    fn test_hypot3() {
        assert_approx_eq!(hypot3(2.0f64, 3.0, 6.0), 7.0);
        assert_eq!(hypot3(0.0f64, 0.0, 0.0), 0.0);
        assert_approx_eq!(hypot3(1e200f64, 1e200, 0.0) / 1e200, 2.0f64.sqrt());
    }

    #[test]
    fn test_rank_one_update_matches_matmul() {
        let rng = &mut StdRng::seed_from_u64(0);
        let a = random_mat::<c64>(rng, 5, 4);
        let x = random_mat::<c64>(rng, 5, 1);
        let y = random_mat::<c64>(rng, 4, 1);
        let alpha = random::<c64>(rng);

        let mut dst = a.clone();
        rank_one_update_conj(dst.as_mut(), alpha, x.as_ref().col(0), y.as_ref().col(0));

        let mut expected = a.clone();
        matmul_with_conj(
            expected.as_mut(),
            x.as_ref(),
            Conj::No,
            y.as_ref().transpose(),
            Conj::Yes,
            Some(c64::faer_one()),
            alpha,
        );
        assert!(max_abs_diff(dst.as_ref(), expected.as_ref()) < tolerance::<c64>(4));
    }

    #[test]
    fn test_matvec_conj() {
        let rng = &mut StdRng::seed_from_u64(1);
        let a = random_mat::<c64>(rng, 3, 4);
        let x = random_mat::<c64>(rng, 4, 1);
        let d = random_mat::<c64>(rng, 3, 1);
        let alpha = random::<c64>(rng);
        let beta = random::<c64>(rng);

        let mut dst = d.clone();
        matvec(
            dst.as_mut().col_mut(0),
            Some(alpha),
            a.as_ref(),
            Conj::Yes,
            x.as_ref().col(0),
            beta,
        );

        for i in 0..3 {
            let mut acc = c64::faer_zero();
            for j in 0..4 {
                acc += a.read(i, j).conj() * x.read(j, 0);
            }
            let expected = alpha * d.read(i, 0) + beta * acc;
            assert!((dst.read(i, 0) - expected).norm() < tolerance::<c64>(4));
        }
    }

    fn check_matmul<E: ComplexField>(m: usize, n: usize, k: usize, seed: u64) {
        let rng = &mut StdRng::seed_from_u64(seed);
        let lhs = random_mat::<E>(rng, m, k);
        // stored transposed, to exercise row-major operands
        let rhs_t = random_mat::<E>(rng, n, k);
        let rhs = rhs_t.as_ref().transpose();
        let dst = random_mat::<E>(rng, m, n);
        let alpha = random::<E>(rng);
        let beta = random::<E>(rng);

        for conj_lhs in [Conj::No, Conj::Yes] {
            for conj_rhs in [Conj::No, Conj::Yes] {
                let expected = naive_matmul(
                    dst.as_ref(),
                    lhs.as_ref(),
                    conj_lhs,
                    rhs,
                    conj_rhs,
                    Some(alpha),
                    beta,
                );
                let mut actual = dst.clone();
                matmul_with_conj(
                    actual.as_mut(),
                    lhs.as_ref(),
                    conj_lhs,
                    rhs,
                    conj_rhs,
                    Some(alpha),
                    beta,
                );
                assert!(max_abs_diff(actual.as_ref(), expected.as_ref()) < tolerance::<E>(k));
            }
        }

        // without `alpha`, the previous contents are never read
        let nan = E::faer_from_f64(f64::NAN);
        let mut actual = Mat::from_fn(m, n, |_, _| nan);
        matmul_with_conj(
            actual.as_mut(),
            lhs.as_ref(),
            Conj::No,
            rhs,
            Conj::No,
            None,
            beta,
        );
        let expected = naive_matmul(
            dst.as_ref(),
            lhs.as_ref(),
            Conj::No,
            rhs,
            Conj::No,
            None,
            beta,
        );
        assert!(actual
            .as_slice()
            .iter()
            .all(|x| x.faer_abs().faer_to_f64().is_finite()));
        assert!(max_abs_diff(actual.as_ref(), expected.as_ref()) < tolerance::<E>(k));
    }

    #[test]
    fn test_matmul_small() {
        check_matmul::<f64>(3, 4, 5, 0);
        check_matmul::<c64>(3, 4, 5, 1);
        check_matmul::<c64>(7, 1, 9, 2);
        check_matmul::<f64>(2, 3, 0, 3);
    }

    #[test]
    fn test_matmul_large() {
        check_matmul::<f64>(40, 33, 35, 4);
        check_matmul::<c64>(41, 37, 30, 5);
    }

    fn check_triangular(k: usize, seed: u64) {
        let rng = &mut StdRng::seed_from_u64(seed);
        let t = random_mat::<c64>(rng, k, k);
        let w = random_mat::<c64>(rng, 3, k);
        let w_left = random_mat::<c64>(rng, k, 3);

        for diag in [Diag::Unit, Diag::NonUnit] {
            let upper = dense_upper(t.as_ref(), diag);
            let upper_adj = upper.as_ref().adjoint_to_owned();

            for (trans, op) in [(Trans::NoTrans, &upper), (Trans::ConjTrans, &upper_adj)] {
                let mut expected = Mat::<c64>::zeros(3, k);
                matmul_with_conj(
                    expected.as_mut(),
                    w.as_ref(),
                    Conj::No,
                    op.as_ref(),
                    Conj::No,
                    None,
                    c64::faer_one(),
                );
                let mut actual = w.clone();
                triangular_upper_mul_right(actual.as_mut(), t.as_ref(), trans, diag);
                assert!(max_abs_diff(actual.as_ref(), expected.as_ref()) < tolerance::<c64>(k));

                let mut expected = Mat::<c64>::zeros(k, 3);
                matmul_with_conj(
                    expected.as_mut(),
                    op.as_ref(),
                    Conj::No,
                    w_left.as_ref(),
                    Conj::No,
                    None,
                    c64::faer_one(),
                );
                let mut actual = w_left.clone();
                triangular_upper_mul_left(t.as_ref(), trans, diag, actual.as_mut());
                assert!(max_abs_diff(actual.as_ref(), expected.as_ref()) < tolerance::<c64>(k));
            }
        }

        let x = random_mat::<c64>(rng, k, 1);
        let mut actual = x.clone();
        upper_triangular_matvec_in_place(t.as_ref(), actual.as_mut().col_mut(0));
        let mut expected = Mat::<c64>::zeros(k, 1);
        let upper = dense_upper(t.as_ref(), Diag::NonUnit);
        matmul_with_conj(
            expected.as_mut(),
            upper.as_ref(),
            Conj::No,
            x.as_ref(),
            Conj::No,
            None,
            c64::faer_one(),
        );
        assert!(max_abs_diff(actual.as_ref(), expected.as_ref()) < tolerance::<c64>(k));
    }

    #[test]
    fn test_triangular_products() {
        check_triangular(4, 2);
        check_triangular(16, 3);
    }

    #[test]
    fn test_triangular_products_blocked() {
        check_triangular(37, 6);
        check_triangular(64, 7);
    }
}
