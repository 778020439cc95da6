//! Single-slot wake primitive.
//!
//! Each car owns one [`WakeSlot`]: a boolean guarded by a mutex plus a
//! condition variable. A notification is latched in the flag, so a wake sent
//! before the car starts waiting is not lost. Every wait also watches a shared
//! shutdown flag; whoever sets that flag must call [`WakeSlot::interrupt`]
//! afterwards so a parked waiter re-checks it.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The awaited notification arrived.
    Woken,
    /// Shutdown was requested.
    Stopping,
}

/// Latched notification with an associated condition variable.
#[derive(Debug, Default)]
pub struct WakeSlot {
    woken: Mutex<bool>,
    cvar: Condvar,
}

impl WakeSlot {
    /// Create an un-notified slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            woken: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    /// Latch a wake and signal the owner.
    pub fn notify(&self) {
        let mut woken = self.woken.lock();
        *woken = true;
        self.cvar.notify_one();
    }

    /// Signal the owner without latching, so it re-reads the shutdown flag.
    pub fn interrupt(&self) {
        let _guard = self.woken.lock();
        self.cvar.notify_one();
    }

    /// Block until notified or until `stopping` is set.
    ///
    /// A consumed wake clears the latch. Shutdown wins over a pending wake.
    pub fn wait(&self, stopping: &AtomicBool) -> WaitOutcome {
        let mut woken = self.woken.lock();
        loop {
            if stopping.load(Ordering::Acquire) {
                return WaitOutcome::Stopping;
            }
            if *woken {
                *woken = false;
                return WaitOutcome::Woken;
            }
            self.cvar.wait(&mut woken);
        }
    }

    /// Whether a wake is latched and not yet consumed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        *self.woken.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_notify_before_wait_is_latched() {
        let slot = WakeSlot::new();
        let stopping = AtomicBool::new(false);
        slot.notify();
        assert!(slot.is_pending());
        assert_eq!(slot.wait(&stopping), WaitOutcome::Woken);
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_wait_blocks_until_notify() {
        let slot = Arc::new(WakeSlot::new());
        let stopping = Arc::new(AtomicBool::new(false));

        let waiter = {
            let slot = Arc::clone(&slot);
            let stopping = Arc::clone(&stopping);
            thread::spawn(move || slot.wait(&stopping))
        };

        thread::sleep(Duration::from_millis(20));
        slot.notify();
        assert_eq!(waiter.join().unwrap(), WaitOutcome::Woken);
    }

    #[test]
    fn test_interrupt_releases_waiter_on_shutdown() {
        let slot = Arc::new(WakeSlot::new());
        let stopping = Arc::new(AtomicBool::new(false));

        let waiter = {
            let slot = Arc::clone(&slot);
            let stopping = Arc::clone(&stopping);
            thread::spawn(move || slot.wait(&stopping))
        };

        thread::sleep(Duration::from_millis(20));
        stopping.store(true, Ordering::Release);
        slot.interrupt();
        assert_eq!(waiter.join().unwrap(), WaitOutcome::Stopping);
    }

    #[test]
    fn test_shutdown_wins_over_pending_wake() {
        let slot = WakeSlot::new();
        let stopping = AtomicBool::new(true);
        slot.notify();
        assert_eq!(slot.wait(&stopping), WaitOutcome::Stopping);
    }
}
