//! Repeating background timer
//!
//! Runs a callback on its own thread after an initial delay and then once per
//! period. The wait restarts after each callback returns, so callbacks never
//! overlap. Dropping the timer stops it; a callback already running finishes.

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::debug;

/// Handle to a running repeating timer
pub struct RepeatingTimer {
    name: String,
    // Never sent on: dropping it disconnects the channel and ends the loop
    _stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl RepeatingTimer {
    /// Start a timer thread named `name`
    pub fn spawn<F>(name: &str, initial_delay: Duration, period: Duration, mut on_tick: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stop_rx) = bounded::<()>(0);
        let thread_name = name.to_string();

        let handle = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let mut wait = initial_delay;
                loop {
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            on_tick();
                            wait = period;
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Timer '{}' stopped", thread_name);
            })?;

        Ok(Self {
            name: name.to_string(),
            _stop: stop,
            handle,
        })
    }

    /// Name given at spawn time
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the timer thread is still alive
    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_ticks_until_dropped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let timer = RepeatingTimer::spawn("test-timer", Duration::from_millis(5), Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(timer.name(), "test-timer");

        std::thread::sleep(Duration::from_millis(200));
        assert!(timer.is_running());
        drop(timer);

        let after_drop = ticks.load(Ordering::SeqCst);
        assert!(after_drop >= 2, "expected repeated ticks, got {}", after_drop);

        std::thread::sleep(Duration::from_millis(100));
        assert!(ticks.load(Ordering::SeqCst) <= after_drop + 1);
    }

    #[test]
    fn test_initial_delay_is_respected() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let timer = RepeatingTimer::spawn("slow-start", Duration::from_secs(5), Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        drop(timer);
    }
}
