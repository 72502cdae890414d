use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;

struct TimerSignal {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Fixed-period timer running a tick closure on a named thread.
///
/// Cancelling wakes the thread immediately and joins it, so once `cancel`
/// (or `drop`) returns the closure will not run again. A tick already in
/// progress is allowed to finish first.
pub struct DrainTimer {
    signal: Arc<TimerSignal>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DrainTimer {
    pub fn start<F>(name: &str, interval: Duration, mut on_tick: F) -> Result<Self, CaptureError>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(CaptureError::ConfigurationFailed(
                "timer interval must be positive".into(),
            ));
        }

        let signal = Arc::new(TimerSignal {
            cancelled: Mutex::new(false),
            wake: Condvar::new(),
        });
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let mut next_tick = Instant::now() + interval;
                loop {
                    {
                        let mut cancelled = thread_signal.cancelled.lock();
                        while !*cancelled {
                            if thread_signal.wake.wait_until(&mut cancelled, next_tick).timed_out() {
                                break;
                            }
                        }
                        if *cancelled {
                            break;
                        }
                    }

                    on_tick();

                    next_tick += interval;
                    let now = Instant::now();
                    if next_tick < now {
                        // Missed ticks are skipped rather than replayed in a burst.
                        next_tick = now + interval;
                    }
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn timer thread: {}", e)))?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the timer and wait for its thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        *self.signal.cancelled.lock() = true;
        self.signal.wake.notify_all();

        if let Some(handle) = self.handle.take() {
            // A tick that tears down its own session cannot join itself.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for DrainTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
