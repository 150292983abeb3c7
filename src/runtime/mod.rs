//! Asynchronous execution of tile kernels.
//!
//! Operations are expressed as tasks submitted to a [`Scheduler`], each declaring the
//! [`Footprint`] of the tiles it reads and writes. Conflicting tasks run in submission order,
//! independent ones run concurrently.
//!
//! Failures inside tasks are reported through a [`Sequence`], shared by every task of one logical
//! operation. Each task checks the sequence before doing any work, and turns into a no-op once an
//! earlier task has failed. The caller inspects the sequence once all tasks have completed.

use crate::{IllegalArgument, Parallelism};
use thiserror::Error;

mod scheduler;
mod sequence;
pub mod tasks;

pub use scheduler::{Access, Footprint, Region, Scheduler};
pub use sequence::{Request, RequestId, Sequence};

/// Tuning parameters of a [`Context`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct TileParams {
    /// Number of rows and columns of the tiles.
    pub tile_size: usize,
    /// Number of reflectors per inner block of the tile kernels. Ignored when `tuning` is set.
    pub inner_blocksize: usize,
    /// Whether the inner block size is chosen from the tile size.
    pub tuning: bool,
    /// Parallelism of the scheduler and of the layout conversions.
    pub parallelism: Parallelism,
}

impl Default for TileParams {
    #[inline]
    fn default() -> Self {
        Self {
            tile_size: 256,
            inner_blocksize: 64,
            tuning: true,
            parallelism: Parallelism::Rayon(0),
        }
    }
}

/// Error returned by [`Context::new`].
#[derive(Debug, Error)]
pub enum ContextError {
    /// The parameters are invalid.
    #[error(transparent)]
    IllegalArgument(#[from] IllegalArgument),
    /// The thread pool of the scheduler could not be created.
    #[error("failed to build the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Returns the inner block size used for tiles of size `nb`.
pub fn recommended_inner_blocksize(nb: usize) -> usize {
    let ib = if nb >= 512 {
        128
    } else if nb >= 256 {
        64
    } else if nb >= 128 {
        32
    } else if nb >= 64 {
        16
    } else if nb >= 16 {
        8
    } else {
        Ord::min(nb, 4)
    };
    Ord::max(ib, 1)
}

/// Library session: the tuning parameters and the scheduler running the tasks.
///
/// Every operation takes the context explicitly, there is no global state.
#[derive(Debug)]
pub struct Context {
    params: TileParams,
    scheduler: Scheduler,
}

impl Context {
    /// Creates a context, along with its worker threads.
    pub fn new(params: TileParams) -> Result<Self, ContextError> {
        if params.tile_size == 0 {
            return Err(IllegalArgument::new("tile_size").into());
        }
        if !params.tuning && params.inner_blocksize == 0 {
            return Err(IllegalArgument::new("inner_blocksize").into());
        }
        let scheduler = Scheduler::new(params.parallelism)?;
        log::debug!(
            target: "faer_tile",
            "context created: nb = {}, ib = {}, {} worker thread(s)",
            params.tile_size,
            Self::select_inner_blocksize(&params),
            scheduler.num_threads(),
        );
        Ok(Self { params, scheduler })
    }

    fn select_inner_blocksize(params: &TileParams) -> usize {
        let ib = if params.tuning {
            recommended_inner_blocksize(params.tile_size)
        } else {
            params.inner_blocksize
        };
        ib.clamp(1, params.tile_size)
    }

    /// Returns the parameters of the context.
    #[inline]
    pub fn params(&self) -> &TileParams {
        &self.params
    }

    /// Returns the tile size.
    #[inline]
    pub fn tile_size(&self) -> usize {
        self.params.tile_size
    }

    /// Returns the inner block size of the tile kernels.
    #[inline]
    pub fn inner_blocksize(&self) -> usize {
        Self::select_inner_blocksize(&self.params)
    }

    /// Returns the parallelism of the context.
    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.params.parallelism
    }

    /// Returns the scheduler of the context.
    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
