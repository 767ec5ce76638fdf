// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
use std::io;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{error, info, span, Instrument, Level};

use crate::cassette::{self, KeepsakeKind, PlaybackController};
use crate::side::Side;

pub mod keyboard;

/// Controller events that will trigger behavior in the cassette player.
#[derive(Debug, PartialEq)]
pub enum Event {
    /// Plays the selected side. If it is already playing, playback and its notes restart.
    Play,

    /// Pauses the selected side.
    Pause,

    /// Pauses if playing, plays otherwise.
    Toggle,

    /// Selects the given side. If the tape is playing, playback moves to that side.
    Side(Side),

    /// Opens one of the keepsake messages.
    Keepsake(KeepsakeKind),

    /// Stops playback and shuts the controller down.
    Quit,
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Controls the cassette player.
pub struct Controller {
    handle: JoinHandle<()>,
}

impl Controller {
    /// Creates a new controller with the given driver. The controller takes ownership of the
    /// playback controller and the receiver for its deferred results.
    pub fn new(
        cassette: PlaybackController,
        deferred_rx: mpsc::UnboundedReceiver<cassette::Event>,
        driver: Arc<dyn Driver>,
    ) -> Controller {
        Controller {
            handle: tokio::spawn(
                Controller::trigger_events(cassette, deferred_rx, driver)
                    .instrument(span!(Level::INFO, "controller")),
            ),
        }
    }

    /// Join will block until the controller finishes.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    /// Triggers cassette events by watching the driver and getting events from it. Deferred
    /// results are handled in between, so the playback controller only ever sees one thing at
    /// a time.
    async fn trigger_events(
        mut cassette: PlaybackController,
        mut deferred_rx: mpsc::UnboundedReceiver<cassette::Event>,
        driver: Arc<dyn Driver>,
    ) {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!(
            side = cassette.current_side().to_string(),
            "Controller started."
        );

        loop {
            tokio::select! {
                event = events_rx.recv() => match event {
                    Some(Event::Quit) | None => {
                        info!(
                            playing = cassette.is_playing(),
                            revealed = cassette.revealed().len(),
                            pending = cassette.pending_reveals(),
                            "Controller closing."
                        );
                        // A start may still be pending, so stop even when nothing is playing yet.
                        cassette.pause();
                        break;
                    }
                    Some(event) => {
                        info!(event = format!("{:?}", event), "Received event.");
                        Controller::apply(&mut cassette, event);
                    }
                },
                Some(deferred) = deferred_rx.recv() => cassette.handle(deferred),
            }
        }

        if let Err(e) = join_handle.await {
            error!("Error waiting for event monitor to stop: {}", e);
        }
    }

    fn apply(cassette: &mut PlaybackController, event: Event) {
        match event {
            Event::Play => cassette.play(),
            Event::Pause => cassette.pause(),
            Event::Toggle => cassette.toggle_play_pause(),
            Event::Side(side) => cassette.switch_side(side),
            Event::Keepsake(kind) => cassette.open_keepsake(kind),
            Event::Quit => {}
        }
    }
}
