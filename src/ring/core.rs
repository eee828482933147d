//! Ring construction, submission, depth accounting, and teardown.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::unix::io::RawFd;

use log::{debug, trace, warn};

use crate::backend::{detect_backend, ReadBackend};
use crate::buffer::ReadBuffer;
use crate::config::RingConfig;
use crate::error::{RejectedRead, Result, RingError};

use super::completion::Completion;

/// A bounded-depth asynchronous read submitter.
///
/// A ring has exactly two states: initialized (every operation valid) and
/// destroyed. Destruction happens exactly once, through [`shutdown`](Ring::shutdown)
/// or `Drop`, and Rust's ownership rules make use-after-destroy
/// unrepresentable.
///
/// One thread drives one ring. [`submit_read`](Ring::submit_read) never
/// blocks on the read itself; [`wait_completion`](Ring::wait_completion) is
/// the sole blocking point. The type is `Send` but intentionally not `Sync` —
/// move it between threads, never share it.
pub struct Ring {
    pub(super) backend: Box<dyn ReadBackend>,
    pub(super) depth: u32,
    /// Destination buffers of submitted-but-unacknowledged reads, keyed by
    /// tag. An entry exists from submission until [`Ring::acknowledge`];
    /// `slots.len()` is therefore the occupancy the depth invariant bounds.
    pub(super) slots: HashMap<u64, ReadBuffer>,
    /// Harvested completions not yet handed to the caller, oldest first.
    pub(super) ready: VecDeque<Completion>,
    /// Requests the backend still owes a completion for.
    pub(super) awaiting: usize,
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("backend", &self.backend.name())
            .field("depth", &self.depth)
            .field("occupied", &self.slots.len())
            .field("awaiting", &self.awaiting)
            .finish()
    }
}

impl Ring {
    /// Create a ring able to keep `queue_depth` reads in flight, with
    /// automatic backend selection.
    ///
    /// # Errors
    ///
    /// [`RingError::Init`] if `queue_depth` is zero or the kernel facility
    /// cannot be initialized. Nothing is left held on failure.
    pub fn new(queue_depth: u32) -> Result<Self> {
        Self::with_config(RingConfig::new(queue_depth))
    }

    /// Create a ring from an explicit [`RingConfig`].
    pub fn with_config(config: RingConfig) -> Result<Self> {
        if config.queue_depth == 0 {
            return Err(RingError::Init(io::Error::new(
                io::ErrorKind::InvalidInput,
                "queue depth must be greater than zero",
            )));
        }

        let backend = detect_backend(config.backend, config.queue_depth)?;
        debug!(
            "ring created: depth={} backend={}",
            config.queue_depth,
            backend.name()
        );

        Ok(Self {
            backend,
            depth: config.queue_depth,
            slots: HashMap::new(),
            ready: VecDeque::new(),
            awaiting: 0,
        })
    }

    /// Maximum number of simultaneously outstanding reads.
    pub fn queue_depth(&self) -> u32 {
        self.depth
    }

    /// Occupied request slots: in flight plus delivered-but-unacknowledged.
    pub fn occupied(&self) -> usize {
        self.slots.len()
    }

    /// Reads submitted whose completions have not been delivered yet.
    pub fn in_flight(&self) -> usize {
        self.awaiting + self.ready.len()
    }

    /// Name of the backend actually selected ("io_uring" or "sync").
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Submit one read of `len` bytes from `fd` at byte `offset` into
    /// `buffer`, correlated by `tag`.
    ///
    /// Returns once the request is accepted for execution; the read itself
    /// proceeds asynchronously. On success the buffer belongs to the request
    /// slot until the matching completion is acknowledged.
    ///
    /// A closed or invalid `fd` is *not* a submission error: it surfaces as
    /// a negative completion result, the same way the kernel reports it.
    ///
    /// # Errors
    ///
    /// Refusals hand the buffer back inside [`RejectedRead`]:
    ///
    /// - [`RingError::QueueFull`] — all `queue_depth` slots occupied; drain
    ///   and acknowledge completions first.
    /// - [`RingError::TagInUse`] — `tag` already correlates an outstanding
    ///   read.
    /// - [`RingError::BufferTooSmall`] — `buffer` cannot hold `len` bytes.
    /// - [`RingError::Submit`] — the kernel rejected the submission batch.
    pub fn submit_read(
        &mut self,
        fd: RawFd,
        mut buffer: ReadBuffer,
        len: usize,
        offset: u64,
        tag: u64,
    ) -> std::result::Result<(), RejectedRead> {
        if self.slots.len() >= self.depth as usize {
            return Err(RejectedRead {
                error: RingError::QueueFull { depth: self.depth },
                buffer,
            });
        }
        if self.slots.contains_key(&tag) {
            return Err(RejectedRead {
                error: RingError::TagInUse { tag },
                buffer,
            });
        }
        if buffer.capacity() < len {
            return Err(RejectedRead {
                error: RingError::BufferTooSmall {
                    capacity: buffer.capacity(),
                    requested: len,
                },
                buffer,
            });
        }

        trace!("submit: fd={fd} len={len} offset={offset} tag={tag}");
        if let Err(error) = self
            .backend
            .submit_read(fd, buffer.as_mut_ptr(), len, offset, tag)
        {
            return Err(RejectedRead { error, buffer });
        }

        // The slot owns the buffer from here until acknowledgment. Moving
        // the handle into the table does not move the heap allocation the
        // kernel is writing into.
        self.slots.insert(tag, buffer);
        self.awaiting += 1;
        Ok(())
    }

    /// Consume a delivered completion, freeing its request slot and
    /// returning the destination buffer to the caller.
    ///
    /// Acknowledgment is exactly-once by construction: [`Completion`] is
    /// consumed by value, so a second acknowledgment of the same completion
    /// does not compile. A completion that is never acknowledged keeps its
    /// slot occupied, and further submissions eventually see
    /// [`RingError::QueueFull`].
    ///
    /// # Panics
    ///
    /// Panics if `completion` was produced by a different ring. Completions
    /// are not transferable between rings.
    pub fn acknowledge(&mut self, completion: Completion) -> ReadBuffer {
        trace!("acknowledge: tag={}", completion.tag());
        self.slots
            .remove(&completion.tag())
            .expect("completion does not belong to this ring")
    }

    /// Destroy the ring, releasing all kernel resources.
    ///
    /// Outstanding requests are forfeited: their completions are drained and
    /// discarded so the kernel is finished with every buffer before the slot
    /// table frees them. Dropping the ring does the same on a best-effort
    /// basis; `shutdown` additionally reports a drain failure instead of
    /// swallowing it.
    pub fn shutdown(mut self) -> Result<()> {
        self.drain_forfeited()
    }

    /// Collect completions for every request still owed one, discarding the
    /// results.
    pub(super) fn drain_forfeited(&mut self) -> Result<()> {
        while self.awaiting > 0 {
            let harvested = self.backend.wait_complete()?;
            self.awaiting = self.awaiting.saturating_sub(harvested.len());
        }
        Ok(())
    }
}

impl Drop for Ring {
    fn drop(&mut self) {
        if self.awaiting == 0 {
            return;
        }
        warn!(
            "ring dropped with {} reads outstanding; draining before teardown",
            self.awaiting
        );
        if self.drain_forfeited().is_err() {
            // The kernel may still write into these allocations; freeing
            // them would hand it dangling memory. Leaking is the only safe
            // terminal state once the ring itself cannot be waited on.
            for (_, buffer) in self.slots.drain() {
                std::mem::forget(buffer);
            }
        }
    }
}
