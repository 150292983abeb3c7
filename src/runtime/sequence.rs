use crate::{assert, ErrorCode};
use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

/// Identifier of a [`Request`], unique within its sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u32);

impl RequestId {
    /// Returns the index of the request, in creation order.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SUCCESS: u64 = 0;

#[inline]
fn pack(code: ErrorCode, id: RequestId) -> u64 {
    ((code.to_raw() as u64) << 32) | id.0 as u64
}

#[inline]
fn unpack(state: u64) -> Option<(ErrorCode, RequestId)> {
    if state == SUCCESS {
        return None;
    }
    let code = ErrorCode::from_raw((state >> 32) as u32)?;
    Some((code, RequestId(state as u32)))
}

/// Shared status of one logical asynchronous operation, spanning every task it submits.
///
/// The status starts out successful. The first call to [`Sequence::fail`] records its error
/// code and request, and no later call can change them.
#[derive(Debug, Default)]
pub struct Sequence {
    // 0 on success, otherwise `code << 32 | request id` of the first failure
    state: AtomicU64,
    next_request: AtomicU32,
}

impl Sequence {
    /// Creates a new successful sequence.
    #[inline]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns `Ok(())` if no request of the sequence has failed, and the first error code
    /// otherwise.
    #[inline]
    pub fn status(&self) -> Result<(), ErrorCode> {
        match unpack(self.state.load(Ordering::Acquire)) {
            None => Ok(()),
            Some((code, _)) => Err(code),
        }
    }

    /// Returns the first failed request and its error code, if any.
    #[inline]
    pub fn failed_request(&self) -> Option<(RequestId, ErrorCode)> {
        unpack(self.state.load(Ordering::Acquire)).map(|(code, id)| (id, code))
    }

    /// Marks `request` as failed with `code`.
    ///
    /// If the sequence has not failed yet, it records `code` and `request` as its first failure.
    /// Otherwise the existing failure is kept.
    ///
    /// # Panics
    /// Panics if `request` belongs to another sequence.
    #[track_caller]
    pub fn fail(&self, request: &Request, code: ErrorCode) {
        assert!(core::ptr::eq(self, &*request.sequence));
        request.state.store(code.to_raw(), Ordering::Release);

        let first = self
            .state
            .compare_exchange(
                SUCCESS,
                pack(code, request.id),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if first {
            log::error!(
                target: "faer_tile",
                "request {} failed: {code}",
                request.id.0,
            );
        } else {
            log::debug!(
                target: "faer_tile",
                "request {} failed after the sequence: {code}",
                request.id.0,
            );
        }
    }
}

/// Error slot of one operation submitted on behalf of a [`Sequence`].
#[derive(Debug)]
pub struct Request {
    sequence: Arc<Sequence>,
    id: RequestId,
    state: AtomicU32,
}

impl Request {
    /// Creates a new successful request attached to `sequence`.
    pub fn new(sequence: &Arc<Sequence>) -> Arc<Self> {
        let id = RequestId(sequence.next_request.fetch_add(1, Ordering::Relaxed));
        Arc::new(Self {
            sequence: sequence.clone(),
            id,
            state: AtomicU32::new(0),
        })
    }

    /// Returns the identifier of the request.
    #[inline]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the sequence the request belongs to.
    #[inline]
    pub fn sequence(&self) -> &Arc<Sequence> {
        &self.sequence
    }

    /// Returns the status of the request.
    #[inline]
    pub fn status(&self) -> Result<(), ErrorCode> {
        match ErrorCode::from_raw(self.state.load(Ordering::Acquire)) {
            None => Ok(()),
            Some(code) => Err(code),
        }
    }

    /// Returns `true` if the request has not failed.
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.status().is_ok()
    }
}
