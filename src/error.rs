//! Error types for ring creation, submission, and completion retrieval.
//!
//! Per-request I/O failure is deliberately absent from this taxonomy: a read
//! that fails in the kernel still *completes*, and the failure travels inside
//! [`Completion`](crate::Completion) as a negative raw result, mirroring the
//! completion-queue convention. The variants here cover failures of the ring
//! itself.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::buffer::ReadBuffer;

/// Result type alias for ring operations.
pub type Result<T> = std::result::Result<T, RingError>;

/// Failure modes of the ring itself.
///
/// The caller decides retry versus abort; the ring never retries internally.
/// [`Init`](RingError::Init) and [`Wait`](RingError::Wait) are fatal for the
/// ring instance. [`QueueFull`](RingError::QueueFull) is recoverable by
/// draining completions and acknowledging them first.
#[derive(Debug, Error)]
pub enum RingError {
    /// The kernel queue pair could not be created.
    ///
    /// Resource exhaustion, an unsupported kernel, a permission failure, or
    /// a zero queue depth. Nothing is left held when this is returned.
    #[error("ring initialization failed: {0}")]
    Init(#[source] io::Error),

    /// Every request slot is occupied.
    ///
    /// Raised at submission when in-flight plus delivered-but-unacknowledged
    /// requests already equal the configured depth. The ring never queues
    /// beyond capacity and never blocks a submission.
    #[error("submission queue full: all {depth} request slots occupied")]
    QueueFull {
        /// Configured queue depth of the ring.
        depth: u32,
    },

    /// The kernel reported a failure while waiting for completions.
    ///
    /// Independent of any individual read; the ring instance should be torn
    /// down.
    #[error("completion wait failed: {0}")]
    Wait(#[source] io::Error),

    /// The kernel rejected the submission batch itself.
    ///
    /// Distinct from a per-request failure: the request was never accepted
    /// for execution.
    #[error("submission rejected by kernel: {0}")]
    Submit(#[source] io::Error),

    /// Another outstanding read already carries this tag.
    ///
    /// Tags correlate completions with submissions, so they must be unique
    /// among requests that have not been acknowledged yet.
    #[error("tag {tag} is already attached to an outstanding read")]
    TagInUse {
        /// The rejected duplicate tag.
        tag: u64,
    },

    /// The destination buffer cannot hold the requested length.
    #[error("buffer of {capacity} bytes cannot receive a {requested}-byte read")]
    BufferTooSmall {
        /// Capacity of the supplied buffer.
        capacity: usize,
        /// Length the caller asked to read.
        requested: usize,
    },

    /// Waiting would block forever: no read is outstanding.
    #[error("no outstanding reads to wait for")]
    NothingInFlight,
}

// Completion results cross thread boundaries when a ring is moved; the error
// type must travel with them.
static_assertions::assert_impl_all!(RingError: Send, Sync);

/// A refused submission, carrying the destination buffer back to the caller.
///
/// Ownership of the buffer only transfers to the ring once a submission is
/// accepted. On any refusal — a full queue, a duplicate tag, an undersized
/// buffer, or a kernel-level rejection — the untouched buffer is handed back
/// here so the caller can drain completions and resubmit without
/// reallocating.
#[derive(Debug)]
pub struct RejectedRead {
    /// Why the submission was refused.
    pub error: RingError,
    /// The destination buffer, returned untouched.
    pub buffer: ReadBuffer,
}

impl RejectedRead {
    /// Split the rejection into its failure and the returned buffer.
    pub fn into_parts(self) -> (RingError, ReadBuffer) {
        (self.error, self.buffer)
    }
}

impl fmt::Display for RejectedRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for RejectedRead {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::{Error as IoError, ErrorKind};

    /// Message formatting for every variant the CLI layer reports verbatim.
    mod error_messages {
        use super::*;

        #[test]
        fn queue_full() {
            let error = RingError::QueueFull { depth: 4 };
            assert_eq!(
                error.to_string(),
                "submission queue full: all 4 request slots occupied"
            );
        }

        #[test]
        fn tag_in_use() {
            let error = RingError::TagInUse { tag: 7 };
            assert_eq!(
                error.to_string(),
                "tag 7 is already attached to an outstanding read"
            );
        }

        #[test]
        fn buffer_too_small() {
            let error = RingError::BufferTooSmall {
                capacity: 16,
                requested: 64,
            };
            assert_eq!(
                error.to_string(),
                "buffer of 16 bytes cannot receive a 64-byte read"
            );
        }

        #[test]
        fn nothing_in_flight() {
            let error = RingError::NothingInFlight;
            assert_eq!(error.to_string(), "no outstanding reads to wait for");
        }

        #[test]
        fn init_includes_cause() {
            let error = RingError::Init(IoError::new(ErrorKind::PermissionDenied, "EPERM"));
            assert!(error.to_string().starts_with("ring initialization failed"));
            assert!(error.to_string().contains("EPERM"));
        }
    }

    mod error_traits {
        use super::*;

        #[test]
        fn preserves_wait_source() {
            let error = RingError::Wait(IoError::new(ErrorKind::InvalidData, "ring corrupt"));

            let source = error.source().expect("Wait must chain its cause");
            let io_err = source.downcast_ref::<IoError>().unwrap();
            assert_eq!(io_err.kind(), ErrorKind::InvalidData);
        }

        #[test]
        fn simple_variants_have_no_source() {
            assert!(RingError::NothingInFlight.source().is_none());
            assert!(RingError::QueueFull { depth: 1 }.source().is_none());
        }
    }

    mod rejected_read {
        use super::*;
        use crate::buffer::ReadBuffer;

        #[test]
        fn display_delegates_to_error() {
            let rejected = RejectedRead {
                error: RingError::QueueFull { depth: 2 },
                buffer: ReadBuffer::new(8),
            };
            assert_eq!(
                rejected.to_string(),
                RingError::QueueFull { depth: 2 }.to_string()
            );
        }

        #[test]
        fn into_parts_returns_the_buffer() {
            let rejected = RejectedRead {
                error: RingError::TagInUse { tag: 3 },
                buffer: ReadBuffer::from_slice(b"kept"),
            };
            let (error, buffer) = rejected.into_parts();
            assert!(matches!(error, RingError::TagInUse { tag: 3 }));
            assert_eq!(buffer.as_slice(), b"kept");
        }
    }
}
