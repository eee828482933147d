//! Completion retrieval and the [`Completion`] type.

use std::io;

use log::trace;

use crate::backend::RawCompletion;
use crate::error::{Result, RingError};

use super::core::Ring;

/// Result of one finished read.
///
/// Carries the originating request's tag and the raw kernel result: a
/// non-negative byte count, or a negated errno for a per-request failure.
/// A short count — including zero at or past end-of-file — is a valid read,
/// not an error.
///
/// A completion is consumed exactly once by
/// [`Ring::acknowledge`]; it is deliberately neither `Clone` nor `Copy`.
#[derive(Debug)]
pub struct Completion {
    tag: u64,
    raw: i32,
}

impl Completion {
    pub(super) fn new(tag: u64, raw: i32) -> Self {
        Self { tag, raw }
    }

    /// The tag supplied at submission. Correlation happens through this
    /// value, never through delivery order.
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// The raw kernel result: byte count if non-negative, negated errno if
    /// negative.
    pub fn raw(&self) -> i32 {
        self.raw
    }

    /// The result as `io::Result`: bytes transferred, or the error the
    /// negative raw value encodes.
    pub fn result(&self) -> io::Result<usize> {
        if self.raw < 0 {
            Err(io::Error::from_raw_os_error(-self.raw))
        } else {
            Ok(self.raw as usize)
        }
    }

    /// Bytes transferred, or `None` if the read failed.
    pub fn bytes_read(&self) -> Option<usize> {
        (self.raw >= 0).then_some(self.raw as usize)
    }

    /// Whether the read finished without a per-request error.
    pub fn is_success(&self) -> bool {
        self.raw >= 0
    }
}

impl Ring {
    /// Block until at least one outstanding read finishes, and return the
    /// oldest undelivered completion.
    ///
    /// Delivery order is completion-time FIFO, not submission order — the
    /// kernel reorders reads freely. Use the tag to correlate.
    ///
    /// # Errors
    ///
    /// - [`RingError::NothingInFlight`] — nothing is outstanding; waiting
    ///   would block forever.
    /// - [`RingError::Wait`] — the kernel interface failed independently of
    ///   any individual read; fatal for this ring instance.
    pub fn wait_completion(&mut self) -> Result<Completion> {
        loop {
            if let Some(completion) = self.ready.pop_front() {
                return Ok(completion);
            }
            if self.awaiting == 0 {
                return Err(RingError::NothingInFlight);
            }
            let harvested = self.backend.wait_complete()?;
            self.absorb(harvested);
        }
    }

    /// Return the oldest undelivered completion if one is available, without
    /// blocking.
    pub fn try_completion(&mut self) -> Result<Option<Completion>> {
        if let Some(completion) = self.ready.pop_front() {
            return Ok(Some(completion));
        }
        if self.awaiting > 0 {
            let harvested = self.backend.try_complete()?;
            self.absorb(harvested);
        }
        Ok(self.ready.pop_front())
    }

    /// Queue harvested raw completions for delivery, preserving their
    /// completion-time order.
    fn absorb(&mut self, harvested: Vec<RawCompletion>) {
        for (tag, raw) in harvested {
            trace!("complete: tag={tag} raw={raw}");
            debug_assert!(
                self.slots.contains_key(&tag),
                "backend produced a completion for unknown tag {tag}"
            );
            self.awaiting = self.awaiting.saturating_sub(1);
            self.ready.push_back(Completion::new(tag, raw));
        }
    }
}
