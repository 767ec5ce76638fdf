// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::task::JoinHandle;

/// A callback waiting on a delay. Once cancelled, the callback will not run.
pub struct Timer {
    /// Set when the timer is cancelled. Checked right before the callback runs.
    cancelled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl Timer {
    /// Runs the callback after the given delay. A zero delay still defers the callback
    /// to the runtime rather than running it in place.
    pub fn after<F>(delay: Duration, callback: F) -> Timer
    where
        F: FnOnce() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let join = {
            let cancelled = cancelled.clone();
            tokio::spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if !cancelled.load(Ordering::Acquire) {
                    callback();
                }
            })
        };

        Timer { cancelled, join }
    }

    /// Cancels the timer. Cancelling twice is harmless.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.join.abort();
    }

    /// Returns true if the timer was cancelled.
    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// The set of timers that are still pending.
#[derive(Default)]
pub struct Timers {
    timers: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Timers {
        Timers::default()
    }

    /// Schedules the callback and keeps its timer so that it can be cancelled later.
    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.timers.push(Timer::after(delay, callback));
    }

    /// Cancels every timer and forgets them.
    pub fn cancel_all(&mut self) {
        for timer in self.timers.drain(..) {
            timer.cancel();
        }
    }

    /// The number of timers scheduled since the last cancel_all.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use parking_lot::Mutex;

    use super::{Timer, Timers};

    #[tokio::test(start_paused = true)]
    async fn test_timers_fire_in_order() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut timers = Timers::new();
        for index in [2u64, 0, 1] {
            let fired = fired.clone();
            timers.schedule(Duration::from_secs(index * 10), move || fired.lock().push(index));
        }
        assert_eq!(3, timers.len());

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(vec![0, 1, 2], *fired.lock());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut timers = Timers::new();
        for index in 0..3u64 {
            let fired = fired.clone();
            timers.schedule(Duration::from_secs(index * 10), move || fired.lock().push(index));
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        timers.cancel_all();
        assert!(timers.is_empty());

        // Cancelling again is harmless.
        timers.cancel_all();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(vec![0], *fired.lock());
    }

    #[tokio::test]
    async fn test_cancel_before_zero_delay_runs() {
        let fired = Arc::new(Mutex::new(false));
        let timer = {
            let fired = fired.clone();
            Timer::after(Duration::ZERO, move || *fired.lock() = true)
        };
        timer.cancel();
        assert!(timer.is_cancelled());

        tokio::task::yield_now().await;
        assert!(!*fired.lock());
    }
}
