//! Synchronous fallback backend.
//!
//! Containers, seccomp profiles, and older kernels routinely make io_uring
//! unavailable. This backend preserves the submission/completion contract by
//! executing each positioned read with `pread(2)` at submission time and
//! queueing the result for FIFO harvest. Completion order equals submission
//! order, which is a legal completion-time order for reads that finish
//! instantly.
//!
//! The degradation is documented rather than hidden: `submit_read` here does
//! block for the duration of the read. Callers that cannot accept that pin
//! [`BackendChoice::IoUring`](crate::BackendChoice::IoUring).

use std::collections::VecDeque;
use std::io;
use std::os::unix::io::RawFd;

use log::trace;

use crate::backend::{RawCompletion, ReadBackend};
use crate::error::{Result, RingError};

/// Eager `pread(2)` executor with a queued completion list.
pub struct SyncBackend {
    ready: VecDeque<RawCompletion>,
    capacity: u32,
}

impl SyncBackend {
    /// Executor reporting `entries` as its nominal capacity.
    pub fn new(entries: u32) -> Self {
        Self {
            ready: VecDeque::new(),
            capacity: entries,
        }
    }
}

impl ReadBackend for SyncBackend {
    fn submit_read(
        &mut self,
        fd: RawFd,
        buf: *mut u8,
        len: usize,
        offset: u64,
        user_data: u64,
    ) -> Result<()> {
        // Per-request failures become negative completion values, exactly as
        // a CQE would carry them; submission itself only fails for ring-level
        // reasons, and there are none here.
        let raw = loop {
            // SAFETY: the caller guarantees `buf` is valid for `len` bytes
            // for the duration of this call, which is the whole read.
            let n = unsafe {
                libc::pread(
                    fd,
                    buf.cast::<libc::c_void>(),
                    len,
                    offset as libc::off_t,
                )
            };
            if n >= 0 {
                break n as i32;
            }
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            break -err.raw_os_error().unwrap_or(libc::EIO);
        };

        trace!("sync pread: fd={fd} len={len} offset={offset} user_data={user_data} raw={raw}");
        self.ready.push_back((user_data, raw));
        Ok(())
    }

    fn try_complete(&mut self) -> Result<Vec<RawCompletion>> {
        Ok(self.ready.drain(..).collect())
    }

    fn wait_complete(&mut self) -> Result<Vec<RawCompletion>> {
        // Every submitted read has already finished; an empty queue means
        // there is nothing that could ever complete.
        if self.ready.is_empty() {
            return Err(RingError::NothingInFlight);
        }
        self.try_complete()
    }

    fn in_flight(&self) -> usize {
        self.ready.len()
    }

    fn name(&self) -> &'static str {
        "sync"
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}
