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
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use tracing::{info, span, Level};

use super::{Error, StartResult};

/// A mock handle. Doesn't actually play anything, but remembers whether it would be.
#[derive(Clone)]
pub struct Handle {
    name: String,
    is_active: Arc<AtomicBool>,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    /// When set, every start request fails with this reason.
    failure: Arc<Mutex<Option<String>>>,
    /// When true, start requests wait in held_starts until released.
    hold: Arc<AtomicBool>,
    held_starts: Arc<Mutex<Vec<oneshot::Sender<Result<(), Error>>>>>,
    finished_tx: broadcast::Sender<()>,
}

impl Handle {
    /// Gets the given mock handle.
    pub fn get(name: &str) -> Handle {
        let (finished_tx, _) = broadcast::channel(4);
        Handle {
            name: name.to_string(),
            is_active: Arc::new(AtomicBool::new(false)),
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
            failure: Arc::new(Mutex::new(None)),
            hold: Arc::new(AtomicBool::new(false)),
            held_starts: Arc::new(Mutex::new(Vec::new())),
            finished_tx,
        }
    }

    /// Makes subsequent starts fail with the given reason, or succeed again if None.
    #[cfg(test)]
    pub fn fail_with(&self, reason: Option<&str>) {
        *self.failure.lock() = reason.map(str::to_string);
    }

    /// Holds start requests unanswered until release_starts is called.
    #[cfg(test)]
    pub fn hold_starts(&self, hold: bool) {
        self.hold.store(hold, Ordering::Relaxed);
    }

    /// Answers every held start request successfully.
    #[cfg(test)]
    pub fn release_starts(&self) {
        let held: Vec<_> = self.held_starts.lock().drain(..).collect();
        for start_tx in held {
            self.is_active.store(true, Ordering::Relaxed);
            let _ = start_tx.send(Ok(()));
        }
    }

    /// Plays the track to its end.
    #[cfg(test)]
    pub fn finish(&self) {
        if self.is_active.swap(false, Ordering::Relaxed) {
            let _ = self.finished_tx.send(());
        }
    }

    /// The number of start requests seen.
    #[cfg(test)]
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::Relaxed)
    }

    /// The number of stop requests seen.
    #[cfg(test)]
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }
}

impl super::Handle for Handle {
    fn start(&self) -> StartResult {
        let span = span!(Level::INFO, "start (mock)");
        let _enter = span.enter();

        self.starts.fetch_add(1, Ordering::Relaxed);
        let (start_tx, start_rx) = oneshot::channel();

        if let Some(reason) = self.failure.lock().clone() {
            info!(handle = self.name, reason, "Refusing to start.");
            let _ = start_tx.send(Err(Error::StartFailed {
                handle: self.name.clone(),
                reason,
            }));
            return start_rx;
        }

        if self.hold.load(Ordering::Relaxed) {
            info!(handle = self.name, "Holding start request.");
            self.held_starts.lock().push(start_tx);
            return start_rx;
        }

        info!(handle = self.name, "Starting.");
        self.is_active.store(true, Ordering::Relaxed);
        let _ = start_tx.send(Ok(()));
        start_rx
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
        self.is_active.store(false, Ordering::Relaxed);
    }

    fn finished(&self) -> broadcast::Receiver<()> {
        self.finished_tx.subscribe()
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod test {
    use crate::media::Handle as _;

    use super::Handle;

    #[tokio::test]
    async fn test_start_and_stop() {
        let handle = Handle::get("mock");
        assert!(handle.start().await.unwrap().is_ok());
        assert!(handle.is_active());

        handle.stop();
        assert!(!handle.is_active());
        assert_eq!(1, handle.starts());
        assert_eq!(1, handle.stops());
    }

    #[tokio::test]
    async fn test_failed_start() {
        let handle = Handle::get("mock");
        handle.fail_with(Some("autoplay blocked"));

        let error = handle.start().await.unwrap().unwrap_err();
        assert_eq!("mock refused to start: autoplay blocked", error.to_string());
        assert!(!handle.is_active());
    }

    #[tokio::test]
    async fn test_held_start() {
        let handle = Handle::get("mock");
        handle.hold_starts(true);

        let mut start = handle.start();
        assert!(start.try_recv().is_err());
        assert!(!handle.is_active());

        handle.release_starts();
        assert!(start.await.unwrap().is_ok());
        assert!(handle.is_active());
    }

    #[tokio::test]
    async fn test_finish() {
        let handle = Handle::get("mock");
        let mut finished = handle.finished();

        // Finishing an idle handle sends nothing.
        handle.finish();
        assert!(finished.try_recv().is_err());

        assert!(handle.start().await.unwrap().is_ok());
        handle.finish();
        assert!(finished.recv().await.is_ok());
        assert!(!handle.is_active());
    }
}
