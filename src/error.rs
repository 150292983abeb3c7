use thiserror::Error;

/// A caller-side mistake detected synchronously, before any work is queued.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("illegal value of `{arg}`")]
pub struct IllegalArgument {
    /// Name of the offending parameter.
    pub arg: &'static str,
}

impl IllegalArgument {
    #[inline]
    pub(crate) fn new(arg: &'static str) -> Self {
        log::error!(target: "faer_tile", "illegal value of `{arg}`");
        Self { arg }
    }
}

/// Status code recorded in a [`Sequence`](crate::runtime::Sequence) or a
/// [`Request`](crate::runtime::Request) when an asynchronous operation fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
#[repr(u32)]
pub enum ErrorCode {
    /// A kernel rejected its arguments while running inside a task.
    #[error("illegal value")]
    IllegalValue = 1,
    /// Scratch workspace for a task could not be allocated.
    #[error("out of memory")]
    OutOfMemory = 2,
}

impl ErrorCode {
    #[inline]
    pub(crate) fn to_raw(self) -> u32 {
        self as u32
    }

    #[inline]
    pub(crate) fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(ErrorCode::IllegalValue),
            2 => Some(ErrorCode::OutOfMemory),
            _ => None,
        }
    }
}

/// Error returned by the synchronous front ends in [`compute`](crate::compute).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The arguments were rejected before any task was submitted.
    #[error(transparent)]
    IllegalArgument(#[from] IllegalArgument),
    /// At least one task failed. No part of the output should be trusted.
    #[error("asynchronous operation failed: {0}")]
    Failed(#[from] ErrorCode),
}
