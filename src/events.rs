// src/events.rs

use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Scan granularity of [`wait_any`]. Callers block at one-sampling-tick
/// granularity, which is orders of magnitude coarser than this.
const WAIT_ANY_SLICE: Duration = Duration::from_millis(10);

/// Outcome of a single-event wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Signaled,
    TimedOut,
}

/// Outcome of a multi-event wait.
///
/// `Abandoned` is never produced by the primitive itself; the monitor layer
/// returns it when the guard condition for the wait has lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiWaitState {
    Signaled(usize),
    TimedOut,
    Abandoned,
}

/// A manual-reset latch. Once signaled it stays set for every current and
/// future waiter until [`reset`](ManualResetEvent::reset) is called, so a
/// late-arriving waiter can never miss the signal.
pub struct ManualResetEvent {
    state: Mutex<bool>,
    cond: Condvar,
}

impl ManualResetEvent {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Blocks until the event is set or `timeout` elapses. Returns
    /// [`WaitState::Signaled`] immediately when the event is already set.
    pub fn wait(&self, timeout: Duration) -> WaitState {
        let guard = self.state.lock().unwrap();
        let (guard, _) = self
            .cond
            .wait_timeout_while(guard, timeout, |set| !*set)
            .unwrap();
        if *guard {
            WaitState::Signaled
        } else {
            WaitState::TimedOut
        }
    }

    /// Sets the event and wakes every waiter. Signaling an already-set event
    /// is a no-op.
    pub fn signal(&self) {
        let mut state = self.state.lock().unwrap();
        *state = true;
        self.cond.notify_all();
    }

    /// Atomically performs the unset-to-set transition. Returns true only for
    /// the one caller that performed it; the print-once gates rely on this.
    pub fn signal_once(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state {
            return false;
        }
        *state = true;
        self.cond.notify_all();
        true
    }

    /// Clears the event; subsequent waiters block until the next signal.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        *state = false;
    }

    pub fn is_set(&self) -> bool {
        *self.state.lock().unwrap()
    }
}

/// Waits until any event in `events` is set or `timeout` elapses. When
/// several events are set concurrently the lowest index wins, so callers get
/// a deterministic tie-break.
pub fn wait_any(events: &[&ManualResetEvent], timeout: Duration) -> MultiWaitState {
    let deadline = Instant::now() + timeout;
    loop {
        for (index, event) in events.iter().enumerate() {
            if event.is_set() {
                return MultiWaitState::Signaled(index);
            }
        }
        let now = Instant::now();
        if now >= deadline {
            return MultiWaitState::TimedOut;
        }
        thread::sleep(WAIT_ANY_SLICE.min(deadline - now));
    }
}

/// Counting semaphore. The monitor uses one instance with a single permit as
/// the dump slot, keeping at most one core-dump child in flight.
pub struct Semaphore {
    permits: Mutex<u32>,
    cond: Condvar,
}

impl Semaphore {
    pub fn new(permits: u32) -> Self {
        Self {
            permits: Mutex::new(permits),
            cond: Condvar::new(),
        }
    }

    /// Blocks until a permit is available and takes it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.cond.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    /// Returns a permit and wakes one blocked acquirer.
    pub fn release(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;
        self.cond.notify_one();
    }
}
