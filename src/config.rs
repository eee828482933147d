//! Ring construction options.

/// Which mechanism executes the reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// io_uring when the kernel allows it, otherwise the synchronous
    /// fallback. The right choice almost everywhere.
    #[default]
    Auto,
    /// io_uring only. Ring creation fails where io_uring is unavailable.
    IoUring,
    /// The synchronous `pread(2)` fallback only. Deterministic; useful in
    /// tests and in environments known to block io_uring.
    Sync,
}

/// Configuration for [`Ring::with_config`](crate::Ring::with_config).
///
/// [`Ring::new`](crate::Ring::new) covers the common case of picking only a
/// queue depth.
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Maximum number of requests outstanding simultaneously. Must be
    /// positive; submitted-but-unacknowledged requests count against it.
    pub queue_depth: u32,
    /// Backend selection policy.
    pub backend: BackendChoice,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            queue_depth: 32,
            backend: BackendChoice::default(),
        }
    }
}

impl RingConfig {
    /// Configuration with the given queue depth and automatic backend
    /// selection.
    pub fn new(queue_depth: u32) -> Self {
        Self {
            queue_depth,
            ..Self::default()
        }
    }

    /// Pin the backend instead of auto-detecting.
    pub fn backend(mut self, choice: BackendChoice) -> Self {
        self.backend = choice;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selects_auto_backend() {
        let config = RingConfig::default();
        assert_eq!(config.queue_depth, 32);
        assert_eq!(config.backend, BackendChoice::Auto);
    }

    #[test]
    fn builder_pins_backend() {
        let config = RingConfig::new(4).backend(BackendChoice::Sync);
        assert_eq!(config.queue_depth, 4);
        assert_eq!(config.backend, BackendChoice::Sync);
    }
}
