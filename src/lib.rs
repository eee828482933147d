//! # readring: bounded-depth asynchronous file reads
//!
//! A minimal, reusable wrapper around a kernel submission/completion queue
//! pair for positioned reads. A [`Ring`] is created with a fixed queue depth,
//! accepts up to that many concurrent read requests, and hands their results
//! back through a completion queue in completion order.
//!
//! The hard part of the single-shot liburing pattern — init ring, get a
//! submission slot, prepare, submit, wait, check, mark seen, clean up, with
//! an early return at every step — is the lifetime of the ring and of each
//! destination buffer. `readring` models both with ownership: every fallible
//! step is a typed [`Result`], buffers move into the ring at submission and
//! come back at acknowledgment, and teardown runs on every exit path.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use readring::{ReadBuffer, Ring};
//! use std::os::unix::io::AsRawFd;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = std::fs::File::open("data.bin")?;
//!
//! // One request slot is enough for a single-shot read.
//! let mut ring = Ring::new(1)?;
//!
//! // The buffer is owned by the ring while the read is in flight.
//! let buffer = ReadBuffer::new(4096);
//! ring.submit_read(file.as_raw_fd(), buffer, 4096, 0, 0)?;
//!
//! let completion = ring.wait_completion()?;
//! let bytes = completion.result()?;
//!
//! // Acknowledging frees the request slot and returns the buffer.
//! let buffer = ring.acknowledge(completion);
//! println!("read {} bytes: {:?}", bytes, &buffer.as_slice()[..bytes]);
//!
//! ring.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Ownership model
//!
//! A buffer submitted with [`Ring::submit_read`] belongs to its request slot
//! until the matching completion is consumed by [`Ring::acknowledge`]. The
//! ring never frees a buffer on the success path, and a completion cannot be
//! acknowledged twice: [`Completion`] is consumed by value.
//!
//! Completions are correlated with submissions by caller-chosen tag, never by
//! submission order — the kernel finishes reads in whatever order their
//! latency dictates.
//!
//! ## Backends
//!
//! The default backend is io_uring. Containers, seccomp profiles, and older
//! kernels routinely make io_uring unavailable; in that case the ring falls
//! back to a synchronous `pread(2)` executor that preserves the submission/
//! completion contract (see [`backend`]). [`BackendChoice`] pins a specific
//! backend when the fallback is not acceptable.
//!
//! ## Threading
//!
//! One ring is driven by one thread. [`Ring::submit_read`] never blocks on
//! the read itself; [`Ring::wait_completion`] is the sole blocking point.
//! `Ring` can be moved between threads but is deliberately not `Sync`.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, rust_2018_idioms)]

// Core modules - the ring, its buffers, and the kernel interface behind it
pub mod backend;
pub mod buffer;
pub mod config;
pub mod error;
pub mod ring;

// Re-exports for convenience - commonly used types at crate root
pub use buffer::ReadBuffer;
pub use config::{BackendChoice, RingConfig};
pub use error::{RejectedRead, Result, RingError};
pub use ring::{Completion, Ring};
