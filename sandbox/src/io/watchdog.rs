//! Wall-clock budget enforcement for code running inside the isolate.
//!
//! JavaScript running on the checker thread cannot be preempted from that
//! thread, so a helper thread waits for the budget and asks V8 to terminate
//! execution if the phase has not finished by then.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use deno_core::v8;
use tracing::{debug, warn};

/// An armed deadline for one bounded phase.
pub struct Watchdog {
    isolate: v8::IsolateHandle,
    disarm: mpsc::Sender<()>,
    fired: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

impl Watchdog {
    pub fn arm(isolate: v8::IsolateHandle, budget: Duration) -> Self {
        let (disarm, signal) = mpsc::channel::<()>();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = isolate.clone();
        let thread = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = signal.recv_timeout(budget) {
                warn!(budget_ms = budget.as_millis() as u64, "budget exceeded, terminating");
                flag.store(true, Ordering::SeqCst);
                handle.terminate_execution();
            }
        });
        Self {
            isolate,
            disarm,
            fired,
            thread,
        }
    }

    /// Stop the deadline. Returns whether the budget was exceeded.
    ///
    /// A termination requested by this watchdog is cancelled before
    /// returning, so the isolate accepts new work afterwards.
    pub fn disarm(self) -> bool {
        let _ = self.disarm.send(());
        if self.thread.join().is_err() {
            warn!("watchdog thread panicked");
        }
        let fired = self.fired.load(Ordering::SeqCst);
        if fired {
            debug!("cancelling terminate request");
            self.isolate.cancel_terminate_execution();
        }
        fired
    }
}
