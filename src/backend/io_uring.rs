//! io_uring backend: one `Read` SQE per request, CQE harvesting.

use std::collections::HashSet;
use std::os::unix::io::RawFd;

use io_uring::{opcode, types, IoUring};
use log::trace;

use crate::backend::{RawCompletion, ReadBackend};
use crate::error::{Result, RingError};

/// Kernel submission/completion queue pair.
pub struct IoUringBackend {
    ring: IoUring,
    in_flight: HashSet<u64>,
    // Set when io_uring_enter fails hard after an SQE was pushed. The entry
    // stays committed in the submission queue, so another enter would hand
    // the kernel a buffer the caller got back; all further kernel calls on
    // this ring are refused instead.
    poisoned: bool,
}

impl IoUringBackend {
    /// Set up a queue pair sized for `entries` concurrent requests.
    ///
    /// The kernel rounds the submission queue up to a power of two; the ring
    /// layer still enforces the exact depth the caller configured.
    pub fn new(entries: u32) -> Result<Self> {
        let ring = IoUring::new(entries).map_err(RingError::Init)?;
        Ok(Self {
            ring,
            in_flight: HashSet::new(),
            poisoned: false,
        })
    }

    fn poisoned_error(&self) -> std::io::Error {
        std::io::Error::other("ring disabled by an earlier kernel submission failure")
    }

    /// Drain every CQE currently visible and mark it seen.
    fn harvest(&mut self) -> Vec<RawCompletion> {
        let mut harvested = Vec::new();
        let mut cq = self.ring.completion();
        for cqe in &mut cq {
            let user_data = cqe.user_data();
            self.in_flight.remove(&user_data);
            trace!("io_uring cqe: user_data={user_data} res={}", cqe.result());
            harvested.push((user_data, cqe.result()));
        }
        // Marks the CQEs seen so the kernel can reuse those queue positions.
        cq.sync();
        harvested
    }
}

impl ReadBackend for IoUringBackend {
    fn submit_read(
        &mut self,
        fd: RawFd,
        buf: *mut u8,
        len: usize,
        offset: u64,
        user_data: u64,
    ) -> Result<()> {
        if self.poisoned {
            return Err(RingError::Submit(self.poisoned_error()));
        }

        let entry = opcode::Read::new(types::Fd(fd), buf, len as u32)
            .offset(offset)
            .build()
            .user_data(user_data);

        // SAFETY: the ring's slot table keeps the destination allocation
        // alive and immovable until this request's completion is harvested.
        let pushed = unsafe { self.ring.submission().push(&entry) };
        if pushed.is_err() {
            return Err(RingError::QueueFull {
                depth: self.ring.params().sq_entries(),
            });
        }

        // Tell the kernel immediately rather than batching; submit_read's
        // contract is "accepted for execution" on return.
        match self.ring.submit() {
            Ok(_) => {
                self.in_flight.insert(user_data);
                Ok(())
            }
            Err(e)
                if matches!(
                    e.raw_os_error(),
                    Some(libc::EINTR | libc::EAGAIN | libc::EBUSY)
                ) =>
            {
                // The entry is committed to the queue either way; the next
                // enter, at latest the one inside wait_complete, flushes it.
                self.in_flight.insert(user_data);
                Ok(())
            }
            Err(e) => {
                self.poisoned = true;
                Err(RingError::Submit(e))
            }
        }
    }

    fn try_complete(&mut self) -> Result<Vec<RawCompletion>> {
        Ok(self.harvest())
    }

    fn wait_complete(&mut self) -> Result<Vec<RawCompletion>> {
        if self.poisoned {
            return Err(RingError::Wait(self.poisoned_error()));
        }
        if self.in_flight.is_empty() {
            return Err(RingError::NothingInFlight);
        }

        loop {
            let harvested = self.harvest();
            if !harvested.is_empty() {
                return Ok(harvested);
            }

            // Park until the kernel signals at least one completion. A
            // signal can interrupt the wait before anything finishes.
            if let Err(e) = self.ring.submit_and_wait(1) {
                if e.raw_os_error() == Some(libc::EINTR) {
                    continue;
                }
                return Err(RingError::Wait(e));
            }
        }
    }

    fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn name(&self) -> &'static str {
        "io_uring"
    }

    fn capacity(&self) -> u32 {
        self.ring.params().sq_entries()
    }
}
