//! Scalar types supported by the kernels.
//!
//! Every kernel is written once, generically over [`ComplexField`]. Real instantiations have
//! [`ComplexField::IS_COMPLEX`] set to `false`, which lets kernels skip conjugation steps
//! entirely rather than running them as identities.

use bytemuck::Pod;
use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};
use num_complex::Complex;
use num_traits::Float;

/// 32-bit complex floating point type.
#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;
/// 64-bit complex floating point type.
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;

/// Unified trait for real and complex scalars.
pub trait ComplexField:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Pod
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Real part type.
    type Real: RealField;

    /// Whether the type carries an imaginary part.
    const IS_COMPLEX: bool;

    /// Returns zero.
    fn faer_zero() -> Self;
    /// Returns one.
    fn faer_one() -> Self;
    /// Builds a value from its real part, with a zero imaginary part.
    fn faer_from_real(re: Self::Real) -> Self;
    /// Builds a value from its real and imaginary parts. The imaginary part is ignored for real
    /// types.
    fn faer_from_parts(re: Self::Real, im: Self::Real) -> Self;
    /// Converts an `f64` to `Self`.
    fn faer_from_f64(value: f64) -> Self;

    /// Returns the real part.
    fn faer_real(self) -> Self::Real;
    /// Returns the imaginary part (zero for real types).
    fn faer_imag(self) -> Self::Real;
    /// Returns the complex conjugate.
    fn faer_conj(self) -> Self;
    /// Returns the squared modulus.
    fn faer_abs2(self) -> Self::Real;
    /// Returns the modulus.
    fn faer_abs(self) -> Self::Real;
    /// Returns the multiplicative inverse.
    fn faer_inv(self) -> Self;
    /// Multiplies by a real value.
    fn faer_scale_real(self, rhs: Self::Real) -> Self;
}

/// Trait for real scalars.
pub trait RealField: ComplexField<Real = Self> + Float {
    /// Machine epsilon.
    fn faer_epsilon() -> Self;
    /// Smallest positive normal number.
    fn faer_min_positive() -> Self;
    /// Converts `self` to `f64`.
    fn faer_to_f64(self) -> f64;
}

macro_rules! impl_real {
    ($ty: ty) => {
        impl ComplexField for $ty {
            type Real = $ty;
            const IS_COMPLEX: bool = false;

            #[inline(always)]
            fn faer_zero() -> Self {
                0.0
            }
            #[inline(always)]
            fn faer_one() -> Self {
                1.0
            }
            #[inline(always)]
            fn faer_from_real(re: Self::Real) -> Self {
                re
            }
            #[inline(always)]
            fn faer_from_parts(re: Self::Real, _: Self::Real) -> Self {
                re
            }
            #[inline(always)]
            fn faer_from_f64(value: f64) -> Self {
                value as $ty
            }
            #[inline(always)]
            fn faer_real(self) -> Self::Real {
                self
            }
            #[inline(always)]
            fn faer_imag(self) -> Self::Real {
                0.0
            }
            #[inline(always)]
            fn faer_conj(self) -> Self {
                self
            }
            #[inline(always)]
            fn faer_abs2(self) -> Self::Real {
                self * self
            }
            #[inline(always)]
            fn faer_abs(self) -> Self::Real {
                self.abs()
            }
            #[inline(always)]
            fn faer_inv(self) -> Self {
                1.0 / self
            }
            #[inline(always)]
            fn faer_scale_real(self, rhs: Self::Real) -> Self {
                self * rhs
            }
        }

        impl RealField for $ty {
            #[inline(always)]
            fn faer_epsilon() -> Self {
                <$ty>::EPSILON
            }
            #[inline(always)]
            fn faer_min_positive() -> Self {
                <$ty>::MIN_POSITIVE
            }
            #[inline(always)]
            fn faer_to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);

impl<T: RealField> ComplexField for Complex<T> {
    type Real = T;
    const IS_COMPLEX: bool = true;

    #[inline(always)]
    fn faer_zero() -> Self {
        Complex::new(T::faer_zero(), T::faer_zero())
    }
    #[inline(always)]
    fn faer_one() -> Self {
        Complex::new(T::faer_one(), T::faer_zero())
    }
    #[inline(always)]
    fn faer_from_real(re: Self::Real) -> Self {
        Complex::new(re, T::faer_zero())
    }
    #[inline(always)]
    fn faer_from_parts(re: Self::Real, im: Self::Real) -> Self {
        Complex::new(re, im)
    }
    #[inline(always)]
    fn faer_from_f64(value: f64) -> Self {
        Complex::new(T::faer_from_f64(value), T::faer_zero())
    }
    #[inline(always)]
    fn faer_real(self) -> Self::Real {
        self.re
    }
    #[inline(always)]
    fn faer_imag(self) -> Self::Real {
        self.im
    }
    #[inline(always)]
    fn faer_conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }
    #[inline(always)]
    fn faer_abs2(self) -> Self::Real {
        self.re * self.re + self.im * self.im
    }
    #[inline(always)]
    fn faer_abs(self) -> Self::Real {
        self.re.hypot(self.im)
    }
    #[inline(always)]
    fn faer_inv(self) -> Self {
        Self::faer_one() / self
    }
    #[inline(always)]
    fn faer_scale_real(self, rhs: Self::Real) -> Self {
        Complex::new(self.re * rhs, self.im * rhs)
    }
}
