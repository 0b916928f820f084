//! services/sync/src/adapters/connectivity.rs
//!
//! The connectivity adapter. Connectivity changes are pushed into the layer
//! by the embedding environment (the `navigator.onLine` analog); the
//! reconciler only ever reads the current flag.

use std::sync::atomic::{AtomicBool, Ordering};

use studymate_core::ports::ConnectivityProbe;

/// A `ConnectivityProbe` backed by an atomic flag that the embedding
/// environment flips from its online/offline callbacks.
pub struct SharedConnectivity {
    online: AtomicBool,
}

impl SharedConnectivity {
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
        }
    }

    /// Called by the environment whenever its connectivity changes.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl ConnectivityProbe for SharedConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflects_the_last_environment_signal() {
        let probe = SharedConnectivity::new(true);
        assert!(probe.is_online());

        probe.set_online(false);
        assert!(!probe.is_online());

        probe.set_online(true);
        assert!(probe.is_online());
    }
}
