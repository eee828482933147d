//! Backend detection and selection.

use readring::backend::{detect_backend, ReadBackend};
use readring::{BackendChoice, Ring, RingConfig};

#[test]
fn auto_detection_always_yields_a_backend() {
    let backend = detect_backend(BackendChoice::Auto, 8).expect("auto detection cannot fail");
    assert!(
        backend.name() == "io_uring" || backend.name() == "sync",
        "unexpected backend: {}",
        backend.name()
    );
    assert_eq!(backend.in_flight(), 0);
}

#[test]
fn sync_backend_is_always_available() {
    let backend = detect_backend(BackendChoice::Sync, 8).expect("sync backend always initializes");
    assert_eq!(backend.name(), "sync");
    assert_eq!(backend.capacity(), 8);
}

#[cfg(target_os = "linux")]
#[test]
fn pinned_io_uring_reports_its_name_when_available() {
    // Restricted hosts may refuse io_uring; a pinned choice must then fail
    // loudly instead of falling back.
    match detect_backend(BackendChoice::IoUring, 8) {
        Ok(backend) => assert_eq!(backend.name(), "io_uring"),
        Err(e) => assert!(matches!(e, readring::RingError::Init(_))),
    }
}

#[test]
fn ring_reports_the_selected_backend() {
    let ring = Ring::with_config(RingConfig::new(2).backend(BackendChoice::Sync))
        .expect("create sync ring");
    assert_eq!(ring.backend_name(), "sync");

    let ring = Ring::new(2).expect("create auto ring");
    assert!(ring.backend_name() == "io_uring" || ring.backend_name() == "sync");
}
