//! Backend abstraction over the kernel read mechanism.
//!
//! The ring itself is backend-agnostic: it enforces queue depth, owns the
//! destination buffers, and orders completion delivery. A [`ReadBackend`]
//! supplies the actual submission/completion plumbing. The io_uring backend
//! is the point of the crate; the synchronous fallback keeps the same
//! contract alive on hosts where io_uring is disabled (containers, seccomp
//! profiles, pre-5.1 kernels).

use std::os::unix::io::RawFd;

use crate::config::BackendChoice;
use crate::error::Result;

#[cfg(target_os = "linux")]
pub mod io_uring;
pub mod sync;

/// One harvested completion: the originating request's tag and the raw
/// result. Non-negative is the byte count transferred; negative is a negated
/// errno identifying the per-request failure.
pub type RawCompletion = (u64, i32);

/// A submission/completion executor for positioned reads.
///
/// Implementations do not track buffer ownership or queue depth — the ring
/// does. The pointer handed to [`submit_read`](ReadBackend::submit_read)
/// stays valid until the request's completion has been harvested; the ring's
/// slot table guarantees it.
pub trait ReadBackend: Send {
    /// Hand one read of `len` bytes from `fd` at `offset` to the executor,
    /// correlated by `user_data`. Returns once the request is accepted for
    /// execution; never blocks on the read itself completing.
    fn submit_read(
        &mut self,
        fd: RawFd,
        buf: *mut u8,
        len: usize,
        offset: u64,
        user_data: u64,
    ) -> Result<()>;

    /// Harvest finished requests without blocking. May return an empty
    /// vector.
    fn try_complete(&mut self) -> Result<Vec<RawCompletion>>;

    /// Block until at least one outstanding request finishes, then harvest.
    /// Results are ordered by completion time, oldest first.
    fn wait_complete(&mut self) -> Result<Vec<RawCompletion>>;

    /// Requests submitted but not yet harvested.
    fn in_flight(&self) -> usize;

    /// Identifier for logs and tests.
    fn name(&self) -> &'static str;

    /// Submission slots the executor was sized for.
    fn capacity(&self) -> u32;
}

/// Construct the backend selected by `choice`, sized for `entries` requests.
///
/// `Auto` tries io_uring first and falls back silently; the ring logs which
/// backend it ended up with.
pub fn detect_backend(choice: BackendChoice, entries: u32) -> Result<Box<dyn ReadBackend>> {
    match choice {
        BackendChoice::IoUring => {
            #[cfg(target_os = "linux")]
            {
                Ok(Box::new(io_uring::IoUringBackend::new(entries)?))
            }
            #[cfg(not(target_os = "linux"))]
            {
                Err(crate::error::RingError::Init(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "io_uring is only available on Linux",
                )))
            }
        }
        BackendChoice::Sync => Ok(Box::new(sync::SyncBackend::new(entries))),
        BackendChoice::Auto => {
            #[cfg(target_os = "linux")]
            if let Ok(backend) = io_uring::IoUringBackend::new(entries) {
                return Ok(Box::new(backend));
            }
            Ok(Box::new(sync::SyncBackend::new(entries)))
        }
    }
}
