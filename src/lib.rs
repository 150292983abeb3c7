//! `faer-tile` is a tile-based dense linear algebra library for shared-memory multicore machines.
//!
//! Matrices are stored as independent fixed-size tiles described by a [`tile::TileDesc`].
//! Factorizations are expressed as sequences of per-tile kernel calls (see [`linalg::lq`]), each
//! submitted to a [`runtime::Scheduler`] together with the memory footprint it touches. The
//! scheduler derives the dependency graph from footprint overlaps, so independent tile operations
//! run concurrently while conflicting ones run in submission order.
//!
//! Failures inside tasks never unwind across the task boundary. They are recorded in a shared
//! [`runtime::Sequence`], which later tasks observe before doing any work.
//!
//! # Example
//! ```
//! use faer_tile::{compute, runtime::{Context, TileParams}, tile::TileMatrix, Mat, c64};
//!
//! let mut params = TileParams::default();
//! params.tile_size = 4;
//! params.inner_blocksize = 2;
//! params.tuning = false;
//! let ctx = Context::new(params).unwrap();
//!
//! let a = Mat::<c64>::from_fn(6, 9, |i, j| c64::new((i + 2 * j) as f64, (i * j) as f64 + 1.0));
//! let mut tiles = TileMatrix::<c64>::from_mat(&ctx, a.as_ref()).unwrap();
//! let mut t = compute::lq_factor_alloc::<c64>(&ctx, tiles.desc()).unwrap();
//! compute::gelqf(&ctx, &mut tiles, &mut t).unwrap();
//! ```

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(non_snake_case)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use equator::assert;

pub mod col;
pub mod compute;
pub mod entity;
pub mod linalg;
pub mod mat;
pub mod runtime;
pub mod tile;
pub mod utils;

mod error;

pub use dyn_stack;
pub use reborrow;

pub use col::{ColMut, ColRef};
pub use entity::{c32, c64, ComplexField, RealField};
pub use error::{Error, ErrorCode, IllegalArgument};
pub use mat::{Mat, MatMut, MatRef};

/// Side from which a transformation is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// The transformation multiplies the operand from the left.
    Left,
    /// The transformation multiplies the operand from the right.
    Right,
}

/// Whether an operator is applied as is or as its conjugate transpose.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trans {
    /// Apply the operator.
    NoTrans,
    /// Apply the conjugate transpose of the operator.
    ConjTrans,
}

impl Trans {
    /// Returns the opposite transposition.
    #[inline]
    pub fn flip(self) -> Trans {
        match self {
            Trans::NoTrans => Trans::ConjTrans,
            Trans::ConjTrans => Trans::NoTrans,
        }
    }
}

/// Whether a matrix should be implicitly conjugated when read or not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Conj {
    /// Do conjugate.
    Yes,
    /// Do not conjugate.
    No,
}

impl Conj {
    /// Combine `self` and `other` to create a new conjugation object.
    #[inline]
    pub fn compose(self, other: Conj) -> Conj {
        if self == other {
            Conj::No
        } else {
            Conj::Yes
        }
    }

    #[inline(always)]
    pub(crate) fn apply<E: ComplexField>(self, value: E) -> E {
        match self {
            Conj::Yes => value.faer_conj(),
            Conj::No => value,
        }
    }
}

/// Whether the diagonal of a triangular matrix is read from memory or implicitly one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diag {
    /// The diagonal is implicitly made of ones and never read.
    Unit,
    /// The diagonal is read from memory.
    NonUnit,
}

/// Parallelism strategy used by the task scheduler and the layout conversions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// Tasks are executed on the calling thread as soon as they are submitted.
    None,
    /// Rayon parallelism.
    ///
    /// Tasks are executed on a dedicated rayon thread pool. The contained value is the number of
    /// worker threads, `0` meaning `rayon::current_num_threads()`.
    Rayon(usize),
}
