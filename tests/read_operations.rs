//! End-to-end read scenarios against real files.
//!
//! These run against whatever backend the host allows: io_uring where the
//! kernel permits it, the synchronous fallback everywhere else. The
//! observable contract is identical.

use std::fs::File;
use std::io::Write;
use std::os::unix::io::AsRawFd;

use readring::{ReadBuffer, Ring};
use tempfile::NamedTempFile;

fn fixture(contents: &[u8]) -> (NamedTempFile, File) {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    tmp.write_all(contents).expect("write fixture");
    tmp.as_file().sync_all().expect("flush fixture");
    let file = tmp.reopen().expect("reopen fixture for reading");
    (tmp, file)
}

/// Depth-1 single-shot scenario: a 4096-byte request against a 10-byte file
/// completes with count 10 and the file's exact bytes.
#[test]
fn short_file_full_read() {
    let (_tmp, file) = fixture(b"0123456789");
    let mut ring = Ring::new(1).expect("create ring");

    ring.submit_read(file.as_raw_fd(), ReadBuffer::new(4096), 4096, 0, 42)
        .expect("submit single read");
    assert_eq!(ring.occupied(), 1);

    let completion = ring.wait_completion().expect("wait for the read");
    assert_eq!(completion.tag(), 42);
    assert_eq!(completion.result().expect("read succeeds"), 10);

    let buffer = ring.acknowledge(completion);
    assert_eq!(&buffer.as_slice()[..10], b"0123456789");
    assert_eq!(ring.occupied(), 0);

    ring.shutdown().expect("clean teardown");
}

/// A read that starts mid-file returns only the remaining range.
#[test]
fn offset_read_returns_the_tail() {
    let (_tmp, file) = fixture(b"hello world");
    let mut ring = Ring::new(1).expect("create ring");

    ring.submit_read(file.as_raw_fd(), ReadBuffer::new(64), 64, 6, 1)
        .expect("submit offset read");

    let completion = ring.wait_completion().expect("wait");
    assert_eq!(completion.result().expect("read succeeds"), 5);

    let buffer = ring.acknowledge(completion);
    assert_eq!(&buffer.as_slice()[..5], b"world");
}

/// Reading at or past end-of-file completes with count 0, not an error.
#[test]
fn read_at_eof_is_zero_bytes() {
    let (_tmp, file) = fixture(b"abc");
    let mut ring = Ring::new(2).expect("create ring");

    ring.submit_read(file.as_raw_fd(), ReadBuffer::new(16), 16, 3, 1)
        .expect("submit read at eof");
    ring.submit_read(file.as_raw_fd(), ReadBuffer::new(16), 16, 1000, 2)
        .expect("submit read past eof");

    for _ in 0..2 {
        let completion = ring.wait_completion().expect("wait");
        assert!(completion.is_success(), "eof is a valid short read");
        assert_eq!(completion.bytes_read(), Some(0));
        ring.acknowledge(completion);
    }
}

/// A bad file descriptor is accepted at submission and reported as a
/// negative completion carrying EBADF.
#[test]
fn bad_descriptor_completes_negative() {
    let mut ring = Ring::new(1).expect("create ring");

    ring.submit_read(-1, ReadBuffer::new(32), 32, 0, 7)
        .expect("submit_read itself must not fail on a bad fd");

    let completion = ring.wait_completion().expect("completion arrives");
    assert_eq!(completion.tag(), 7);
    assert!(!completion.is_success());
    assert_eq!(completion.raw(), -libc::EBADF);
    let err = completion.result().unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::EBADF));

    // The slot and buffer are reclaimed the same way as on success.
    let buffer = ring.acknowledge(completion);
    assert_eq!(buffer.capacity(), 32);
}

/// An acknowledged buffer is immediately reusable for the next request.
#[test]
fn acknowledged_buffer_round_trips() {
    let (_tmp, file) = fixture(b"first second");
    let mut ring = Ring::new(1).expect("create ring");

    ring.submit_read(file.as_raw_fd(), ReadBuffer::new(5), 5, 0, 1)
        .expect("first read");
    let completion = ring.wait_completion().expect("wait");
    assert_eq!(completion.result().unwrap(), 5);
    let buffer = ring.acknowledge(completion);
    assert_eq!(buffer.as_slice(), b"first");

    ring.submit_read(file.as_raw_fd(), buffer, 5, 6, 2)
        .expect("reuse the same buffer");
    let completion = ring.wait_completion().expect("wait");
    assert_eq!(completion.tag(), 2);
    let buffer = ring.acknowledge(completion);
    assert_eq!(buffer.as_slice(), b"econd");
}

/// Several reads in flight at once; each completion correlates by tag, not
/// by delivery order.
#[test]
fn concurrent_reads_correlate_by_tag() {
    let (_tmp, file) = fixture(b"aaaabbbbcccc");
    let mut ring = Ring::new(4).expect("create ring");

    for (tag, offset) in [(10u64, 0u64), (11, 4), (12, 8)] {
        ring.submit_read(file.as_raw_fd(), ReadBuffer::new(4), 4, offset, tag)
            .expect("submit within depth");
    }
    assert_eq!(ring.occupied(), 3);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let completion = ring.wait_completion().expect("wait");
        assert_eq!(completion.result().unwrap(), 4);
        let tag = completion.tag();
        let buffer = ring.acknowledge(completion);
        let expected = match tag {
            10 => b"aaaa",
            11 => b"bbbb",
            12 => b"cccc",
            other => panic!("unknown tag {other}"),
        };
        assert_eq!(buffer.as_slice(), expected);
        seen.push(tag);
    }

    seen.sort_unstable();
    assert_eq!(seen, [10, 11, 12]);
    assert_eq!(ring.occupied(), 0);
}

/// Dropping a ring with an in-flight read must not hang, panic, or leave the
/// kernel writing into freed memory.
#[test]
fn drop_with_outstanding_read_is_clean() {
    let (_tmp, file) = fixture(b"forfeited");
    let mut ring = Ring::new(1).expect("create ring");
    ring.submit_read(file.as_raw_fd(), ReadBuffer::new(64), 64, 0, 1)
        .expect("submit");
    drop(ring);
}
