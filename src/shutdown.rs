//! Interruption handling for the fetch loop
//!
//! The loop runs on the calling thread with blocking I/O, so interruption is
//! a shared flag it polls between requests. [`listen_for_ctrl_c`] sets the
//! flag from a task on a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{error, warn};

/// Cloneable handle to a shared "stop requested" flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the fetch loop to stop and write what it has
    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Spawn a task on `runtime` that sets `flag` on the first Ctrl+C
///
/// While the task is alive, Ctrl+C no longer kills the process.
pub fn listen_for_ctrl_c(runtime: &Runtime, flag: ShutdownFlag) {
    runtime.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Keyboard interrupt detected, stopping after the current request...");
                flag.request_shutdown();
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_clear() {
        assert!(!ShutdownFlag::new().is_shutdown_requested());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = ShutdownFlag::new();
        let handle = flag.clone();

        handle.request_shutdown();

        assert!(flag.is_shutdown_requested());
        // idempotent
        handle.request_shutdown();
        assert!(flag.is_shutdown_requested());
    }

    #[test]
    fn test_listener_leaves_flag_clear_without_signal() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let flag = ShutdownFlag::new();

        listen_for_ctrl_c(&runtime, flag.clone());

        assert!(!flag.is_shutdown_requested());
    }
}
