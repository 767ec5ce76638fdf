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
use std::{fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    sync::{broadcast, oneshot},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info};

use super::{Error, StartResult};

/// Where the simulated track currently is.
struct Transport {
    /// How far into the track playback has progressed, not counting the running stretch.
    position: Duration,
    /// Set while the track is running.
    running_since: Option<Instant>,
    /// Bumped on every start and stop so an outdated end-of-track task knows to bail.
    generation: u64,
    /// Fires the finished notification when the track runs out.
    end_of_track: Option<JoinHandle<()>>,
}

/// A handle that pretends to play a track of a fixed length. Like a tape, stopping keeps the
/// position and starting again resumes from it. A track that has played to its end rewinds.
pub struct Handle {
    name: String,
    duration: Duration,
    transport: Arc<Mutex<Transport>>,
    finished_tx: broadcast::Sender<()>,
}

impl Handle {
    pub fn new(name: &str, duration: Duration) -> Handle {
        let (finished_tx, _) = broadcast::channel(4);
        Handle {
            name: name.to_string(),
            duration,
            transport: Arc::new(Mutex::new(Transport {
                position: Duration::ZERO,
                running_since: None,
                generation: 0,
                end_of_track: None,
            })),
            finished_tx,
        }
    }

    /// The current position within the track.
    #[cfg(test)]
    pub fn position(&self) -> Duration {
        let transport = self.transport.lock();
        match transport.running_since {
            Some(since) => (transport.position + since.elapsed()).min(self.duration),
            None => transport.position,
        }
    }
}

impl super::Handle for Handle {
    fn start(&self) -> StartResult {
        let (start_tx, start_rx) = oneshot::channel();

        if self.duration.is_zero() {
            let _ = start_tx.send(Err(Error::StartFailed {
                handle: self.name.clone(),
                reason: "the track is empty".to_string(),
            }));
            return start_rx;
        }

        let mut transport = self.transport.lock();
        if transport.running_since.is_some() {
            debug!(handle = self.name, "Already running.");
            let _ = start_tx.send(Ok(()));
            return start_rx;
        }

        let remaining = self.duration.saturating_sub(transport.position);
        info!(
            handle = self.name,
            position = format!("{:?}", transport.position),
            remaining = format!("{:?}", remaining),
            "Starting track."
        );

        transport.generation += 1;
        transport.running_since = Some(Instant::now());
        let generation = transport.generation;
        let end_of_track = {
            let transport = self.transport.clone();
            let finished_tx = self.finished_tx.clone();
            let name = self.name.clone();
            tokio::spawn(async move {
                tokio::time::sleep(remaining).await;

                let mut transport = transport.lock();
                if transport.generation != generation {
                    return;
                }
                transport.position = Duration::ZERO;
                transport.running_since = None;
                transport.end_of_track = None;
                info!(handle = name, "Track finished.");
                let _ = finished_tx.send(());
            })
        };
        transport.end_of_track = Some(end_of_track);

        let _ = start_tx.send(Ok(()));
        start_rx
    }

    fn stop(&self) {
        let mut transport = self.transport.lock();
        let Some(since) = transport.running_since.take() else {
            return;
        };

        transport.generation += 1;
        transport.position = (transport.position + since.elapsed()).min(self.duration);
        if let Some(end_of_track) = transport.end_of_track.take() {
            end_of_track.abort();
        }
        info!(
            handle = self.name,
            position = format!("{:?}", transport.position),
            "Stopped track."
        );
    }

    fn finished(&self) -> broadcast::Receiver<()> {
        self.finished_tx.subscribe()
    }

    fn is_active(&self) -> bool {
        self.transport.lock().running_since.is_some()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Simulated, {:?})", self.name, self.duration)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::media::Handle as _;

    use super::Handle;

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_the_end() {
        let handle = Handle::new("sim", Duration::from_secs(10));
        let mut finished = handle.finished();

        assert!(handle.start().await.unwrap().is_ok());
        assert!(handle.is_active());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(Duration::from_secs(4), handle.position());

        assert!(finished.recv().await.is_ok());
        assert!(!handle.is_active());
        assert_eq!(Duration::ZERO, handle.position());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumes_after_stop() {
        let handle = Handle::new("sim", Duration::from_secs(10));
        let mut finished = handle.finished();

        assert!(handle.start().await.unwrap().is_ok());
        tokio::time::sleep(Duration::from_secs(6)).await;
        handle.stop();
        assert!(!handle.is_active());
        assert_eq!(Duration::from_secs(6), handle.position());

        // Nothing finishes while stopped.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(finished.try_recv().is_err());

        assert!(handle.start().await.unwrap().is_ok());
        let started = tokio::time::Instant::now();
        assert!(finished.recv().await.is_ok());
        assert_eq!(Duration::from_secs(4), started.elapsed());
    }

    #[tokio::test]
    async fn test_empty_track_fails() {
        let handle = Handle::new("sim", Duration::ZERO);
        assert!(handle.start().await.unwrap().is_err());
        assert!(!handle.is_active());
    }
}
