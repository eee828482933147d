//! Read the first block of a file through the ring and print it.
//!
//! Each failure class maps to its own exit status so scripts can tell them
//! apart: 1 usage/open, 2 ring initialization, 3 queue full, 4 wait/submit
//! failure, 5 per-request I/O error.

use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::process::ExitCode;

use readring::{ReadBuffer, Ring, RingError};

const BLOCK_SIZE: usize = 4096;
const TAG: u64 = 0;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "ringcat".into());
    let Some(path) = args.next() else {
        eprintln!("Usage: {program} <file>");
        return ExitCode::from(1);
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{program}: {path}: {e}");
            return ExitCode::from(1);
        }
    };

    let mut ring = match Ring::new(1) {
        Ok(ring) => ring,
        Err(e) => {
            eprintln!("{program}: {e}");
            return ExitCode::from(2);
        }
    };

    let buffer = ReadBuffer::new(BLOCK_SIZE);
    if let Err(rejected) = ring.submit_read(file.as_raw_fd(), buffer, BLOCK_SIZE, 0, TAG) {
        eprintln!("{program}: {rejected}");
        let status = match rejected.error {
            RingError::QueueFull { .. } => 3,
            _ => 4,
        };
        return ExitCode::from(status);
    }

    let completion = match ring.wait_completion() {
        Ok(completion) => completion,
        Err(e) => {
            eprintln!("{program}: {e}");
            return ExitCode::from(4);
        }
    };

    match completion.result() {
        Ok(bytes) => {
            let buffer = ring.acknowledge(completion);
            println!("Read {bytes} bytes from file: {path}");
            println!(
                "Data: {}",
                String::from_utf8_lossy(&buffer.as_slice()[..bytes])
            );
            if let Err(e) = ring.shutdown() {
                eprintln!("{program}: {e}");
                return ExitCode::from(4);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{program}: I/O error: {e}");
            ExitCode::from(5)
        }
    }
}
